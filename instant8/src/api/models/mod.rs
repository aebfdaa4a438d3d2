//! Request/response data structures for API communication.

pub mod auth;
pub mod cloud_providers;
pub mod dashboard;
pub mod deployments;
pub mod pricing;
pub mod user_settings;
pub mod users;

use crate::types::{UserId, DEMO_USER_ID};
use serde::Deserialize;
use utoipa::IntoParams;

/// Owner scoping for unauthenticated resource endpoints. When no `user_id`
/// is supplied, requests operate on the seeded demo account.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserScope {
    /// Owner of the records being accessed; defaults to the demo user
    #[param(value_type = Option<String>, format = "uuid")]
    pub user_id: Option<UserId>,
}

impl UserScope {
    pub fn user_id(&self) -> UserId {
        self.user_id.unwrap_or(DEMO_USER_ID)
    }
}
