//! User account records.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored user account. `password_hash` never leaves the service boundary;
/// API responses are built from the sanitized [`crate::api::models::users::UserResponse`].
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub subscription_tier: String,
    pub created_at: DateTime<Utc>,
}

/// Request to create a user record.
#[derive(Debug, Clone)]
pub struct UserCreate {
    /// Fixed identifier for seeded accounts; `None` assigns a fresh UUID.
    pub id: Option<UserId>,
    pub email: String,
    pub username: String,
    pub password_hash: Option<String>,
}
