//! Cloud provider credential records.

use crate::types::{CloudProviderId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Supported cloud providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Aws,
    Azure,
    Gcp,
}

impl ProviderKind {
    /// Canned region list seeded for each provider.
    pub fn default_regions(self) -> Vec<String> {
        let regions: &[&str] = match self {
            ProviderKind::Aws => &["us-east-1", "us-west-1", "eu-west-1"],
            ProviderKind::Azure => &["eastus", "westus", "westeurope"],
            ProviderKind::Gcp => &["us-central1", "us-east1", "europe-west1"],
        };
        regions.iter().map(|r| r.to_string()).collect()
    }

    pub const ALL: [ProviderKind; 3] = [ProviderKind::Aws, ProviderKind::Azure, ProviderKind::Gcp];
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderKind::Aws => "aws",
            ProviderKind::Azure => "azure",
            ProviderKind::Gcp => "gcp",
        };
        write!(f, "{s}")
    }
}

/// Stored credentials and enabled regions for one provider, scoped to a user.
///
/// `credentials` is an opaque secret blob; the service never inspects its
/// structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudProvider {
    pub id: CloudProviderId,
    pub user_id: UserId,
    pub name: ProviderKind,
    pub enabled: bool,
    pub credentials: serde_json::Value,
    pub regions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
