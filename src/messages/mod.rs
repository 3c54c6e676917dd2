mod conversation;
mod delete;
mod inbox;
mod send;
mod unread;

use axum::{
    Router,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{AppState, rfc3339, rfc3339_opt};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(send::send))
        .route("/conversations", get(inbox::conversations))
        .route("/conversation/{user_id}/{profile_id}", get(conversation::conversation))
        .route("/unread-count", get(unread::unread_count))
        .route("/{id}", delete(delete::delete_message))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    System,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub profile_id: String,
    pub content: String,
    pub message_type: MessageType,
    pub is_read: bool,
    pub read_at: Option<OffsetDateTime>,
    pub is_deleted: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MessageJoinedRow {
    #[sqlx(flatten)]
    pub message: MessageRow,
    pub sender_name: String,
    pub receiver_name: String,
}

pub(crate) const JOINED_SELECT: &str = "SELECT m.*, \
     su.name AS sender_name, ru.name AS receiver_name \
     FROM messages m \
     JOIN users su ON su.id = m.sender_id \
     JOIN users ru ON ru.id = m.receiver_id";

impl MessageJoinedRow {
    pub fn json(&self) -> Value {
        let m = &self.message;
        json!({
            "id": m.id,
            "sender": { "id": m.sender_id, "name": self.sender_name },
            "receiver": { "id": m.receiver_id, "name": self.receiver_name },
            "profile_id": m.profile_id,
            "content": m.content,
            "message_type": m.message_type,
            "is_read": m.is_read,
            "read_at": rfc3339_opt(m.read_at),
            "created_at": rfc3339(m.created_at),
        })
    }
}
