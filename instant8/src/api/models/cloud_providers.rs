//! API request/response models for cloud provider connections.

use crate::db::models::cloud_providers::{CloudProvider, ProviderKind};
use crate::types::{CloudProviderId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CloudProviderResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: CloudProviderId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub name: ProviderKind,
    pub enabled: bool,
    #[schema(value_type = Object)]
    pub credentials: serde_json::Value,
    pub regions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CloudProvider> for CloudProviderResponse {
    fn from(provider: CloudProvider) -> Self {
        Self {
            id: provider.id,
            user_id: provider.user_id,
            name: provider.name,
            enabled: provider.enabled,
            credentials: provider.credentials,
            regions: provider.regions,
            created_at: provider.created_at,
        }
    }
}

/// Replace a provider's stored credentials, optionally toggling it on or off.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialsUpdateRequest {
    #[schema(value_type = Object)]
    pub credentials: serde_json::Value,
    pub enabled: Option<bool>,
}
