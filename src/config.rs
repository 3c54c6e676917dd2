use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
}

impl Config {
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using the development default");
            DEFAULT_JWT_SECRET.to_owned()
        });

        Self {
            port: try_load("PORT", "8001"),
            database_url: try_load("DATABASE_URL", "sqlite://velvetline.db"),
            jwt_secret,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_owned()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
