//! Per-user settings records.

use crate::db::models::cloud_providers::ProviderKind;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dashboard preferences for one user. Exactly one record per user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSettings {
    pub id: Uuid,
    pub user_id: UserId,
    pub theme: String,
    pub notifications_enabled: bool,
    pub email_notifications: bool,
    pub budget_alert_threshold: f64,
    pub default_provider: ProviderKind,
    pub default_region: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSettings {
    /// Default settings assigned when a user record is first seeded.
    pub fn defaults_for(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            theme: "light".to_string(),
            notifications_enabled: true,
            email_notifications: true,
            budget_alert_threshold: 100.0,
            default_provider: ProviderKind::Aws,
            default_region: "us-east-1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial patch for user settings. Absent fields keep their previous values;
/// when no record exists yet the patch is applied on top of the defaults.
#[derive(Debug, Clone, Default)]
pub struct UserSettingsPatch {
    pub theme: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub email_notifications: Option<bool>,
    pub budget_alert_threshold: Option<f64>,
    pub default_provider: Option<ProviderKind>,
    pub default_region: Option<String>,
}
