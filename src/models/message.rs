//! Messages sent by users to the site administrators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::not_blank;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    /// Sender
    pub user_id: Uuid,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Admin view: a message joined with its sender's email.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MessageWithSender {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sender_email: String,
    pub subject: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, max = 200), custom(function = "not_blank"))]
    pub subject: String,
    #[validate(length(min = 1, max = 5000), custom(function = "not_blank"))]
    pub body: String,
}
