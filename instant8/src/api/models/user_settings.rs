//! API request/response models for per-user settings.

use crate::db::models::cloud_providers::ProviderKind;
use crate::db::models::user_settings::{UserSettings, UserSettingsPatch};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSettingsResponse {
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub theme: String,
    pub notifications_enabled: bool,
    pub email_notifications: bool,
    pub budget_alert_threshold: f64,
    pub default_provider: ProviderKind,
    pub default_region: String,
    pub updated_at: DateTime<Utc>,
}

impl From<UserSettings> for UserSettingsResponse {
    fn from(settings: UserSettings) -> Self {
        Self {
            user_id: settings.user_id,
            theme: settings.theme,
            notifications_enabled: settings.notifications_enabled,
            email_notifications: settings.email_notifications,
            budget_alert_threshold: settings.budget_alert_threshold,
            default_provider: settings.default_provider,
            default_region: settings.default_region,
            updated_at: settings.updated_at,
        }
    }
}

/// Partial update of a user's settings. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserSettingsUpdateRequest {
    /// Owner of the settings; defaults to the demo user
    #[schema(value_type = Option<String>, format = "uuid")]
    pub user_id: Option<UserId>,
    pub theme: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub email_notifications: Option<bool>,
    pub budget_alert_threshold: Option<f64>,
    pub default_provider: Option<ProviderKind>,
    pub default_region: Option<String>,
}

impl From<UserSettingsUpdateRequest> for UserSettingsPatch {
    fn from(request: UserSettingsUpdateRequest) -> Self {
        Self {
            theme: request.theme,
            notifications_enabled: request.notifications_enabled,
            email_notifications: request.email_notifications,
            budget_alert_threshold: request.budget_alert_threshold,
            default_provider: request.default_provider,
            default_region: request.default_region,
        }
    }
}
