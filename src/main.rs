use tokio::signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};
use velvetline::{AppState, auth::JwtKeys, config::Config, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load();

    let db_pool = db::connect(&config.database_url).await?;
    db::init_schema(&db_pool).await?;

    let state = AppState {
        db_pool,
        keys: JwtKeys::new(config.jwt_secret.as_bytes()),
    };
    let app = velvetline::router(state);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
