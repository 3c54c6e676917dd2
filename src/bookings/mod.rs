mod create;
mod detail;
mod list;
mod stats;
mod status;

use std::fmt;

use axum::{
    Router,
    routing::{get, patch, post},
};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::{Date, OffsetDateTime};

use crate::{AppState, rfc3339, rfc3339_opt};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create::create).get(list::list))
        .route("/{id}", get(detail::detail))
        .route("/{id}/status", patch(status::update_status))
        .route("/stats/overview", get(stats::overview))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ServiceType {
    Incall,
    Outcall,
}

impl ServiceType {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "incall" => Some(Self::Incall),
            "outcall" => Some(Self::Outcall),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

impl PaymentMethod {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    #[serde(rename = "no-show")]
    #[sqlx(rename = "no-show")]
    NoShow,
}

impl BookingStatus {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            "no-show" => Some(Self::NoShow),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
            Self::NoShow => "no-show",
        }
    }

    /// The booking lifecycle. Cancelled, completed and no-show are terminal;
    /// a booking must be confirmed before it can complete or no-show.
    pub fn can_transition(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, NoShow)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    pub id: String,
    pub customer_id: String,
    pub model_id: String,
    pub profile_id: String,
    pub date: Date,
    pub time: String,
    pub duration: i64,
    pub service_type: ServiceType,
    pub services: String,
    pub location_address: Option<String>,
    pub location_city: Option<String>,
    pub location_notes: Option<String>,
    pub hourly_rate: f64,
    pub total_amount: f64,
    pub currency: String,
    pub status: BookingStatus,
    pub customer_notes: Option<String>,
    pub model_notes: Option<String>,
    pub customer_phone: String,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub confirmation_code: String,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<OffsetDateTime>,
    pub cancellation_reason: Option<String>,
    pub completed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A booking joined with the two parties and the listing it was made
/// against, which is how every endpoint returns it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingJoinedRow {
    #[sqlx(flatten)]
    pub booking: BookingRow,
    pub customer_name: String,
    pub customer_email: String,
    pub model_name: String,
    pub model_email: String,
    pub profile_name: String,
    pub profile_location: String,
}

pub(crate) const JOINED_SELECT: &str = "SELECT b.*, \
     cu.name AS customer_name, cu.email AS customer_email, \
     mu.name AS model_name, mu.email AS model_email, \
     p.name AS profile_name, p.location AS profile_location \
     FROM bookings b \
     JOIN users cu ON cu.id = b.customer_id \
     JOIN users mu ON mu.id = b.model_id \
     JOIN profiles p ON p.id = b.profile_id";

impl BookingJoinedRow {
    pub fn json(&self) -> Value {
        let b = &self.booking;
        let services: Vec<String> = serde_json::from_str(&b.services).unwrap_or_default();
        json!({
            "id": b.id,
            "customer": { "id": b.customer_id, "name": self.customer_name, "email": self.customer_email },
            "model": { "id": b.model_id, "name": self.model_name, "email": self.model_email },
            "profile": { "id": b.profile_id, "name": self.profile_name, "location": self.profile_location },
            "date": b.date.to_string(),
            "time": b.time,
            "duration": b.duration,
            "service_type": b.service_type,
            "services": services,
            "location": {
                "address": b.location_address,
                "city": b.location_city,
                "notes": b.location_notes,
            },
            "pricing": {
                "hourly_rate": b.hourly_rate,
                "total_amount": b.total_amount,
                "currency": b.currency,
            },
            "status": b.status,
            "customer_notes": b.customer_notes,
            "model_notes": b.model_notes,
            "customer_phone": b.customer_phone,
            "payment_status": b.payment_status,
            "payment_method": b.payment_method,
            "confirmation_code": b.confirmation_code,
            "cancelled_by": b.cancelled_by,
            "cancelled_at": rfc3339_opt(b.cancelled_at),
            "cancellation_reason": b.cancellation_reason,
            "completed_at": rfc3339_opt(b.completed_at),
            "created_at": rfc3339(b.created_at),
            "updated_at": rfc3339(b.updated_at),
        })
    }
}

/// Human-readable booking reference: `VV` + 8 digits + 4 uppercase
/// alphanumerics.
pub(crate) fn confirmation_code() -> String {
    const DIGITS: &[u8] = b"0123456789";
    const TAIL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let mut rng = rand::rng();
    let mut code = String::with_capacity(14);
    code.push_str("VV");
    for _ in 0..8 {
        code.push(*DIGITS.choose(&mut rng).expect("non-empty") as char);
    }
    for _ in 0..4 {
        code.push(*TAIL.choose(&mut rng).expect("non-empty") as char);
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition(Confirmed));
        assert!(Pending.can_transition(Cancelled));
        assert!(Confirmed.can_transition(Cancelled));
        assert!(Confirmed.can_transition(Completed));
        assert!(Confirmed.can_transition(NoShow));
    }

    #[test]
    fn terminal_states_stay_terminal() {
        use BookingStatus::*;
        for terminal in [Cancelled, Completed, NoShow] {
            for next in [Pending, Confirmed, Cancelled, Completed, NoShow] {
                assert!(!terminal.can_transition(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn pending_cannot_skip_confirmation() {
        use BookingStatus::*;
        assert!(!Pending.can_transition(Completed));
        assert!(!Pending.can_transition(NoShow));
        assert!(!Pending.can_transition(Pending));
    }

    #[test]
    fn confirmation_code_shape() {
        let code = confirmation_code();
        assert_eq!(code.len(), 14);
        assert!(code.starts_with("VV"));
        assert!(code[2..10].bytes().all(|b| b.is_ascii_digit()));
        assert!(
            code[10..]
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        );
    }

    #[test]
    fn status_round_trips_through_wire_names() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
            BookingStatus::NoShow,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
    }
}
