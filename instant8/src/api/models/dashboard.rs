//! API response models for the dashboard summary.

use crate::db::models::cloud_providers::ProviderKind;
use crate::db::models::deployments::{Deployment, DeploymentStatus};
use crate::types::DeploymentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate view of a user's deployments and providers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_deployments: usize,
    /// Deployments currently in the `running` state
    pub active_deployments: usize,
    /// Distinct providers targeted across all deployments
    pub total_providers: usize,
    /// Sum of estimated monthly costs across all deployments
    pub total_cost: f64,
    /// The five most recently created deployments, newest first
    pub recent_deployments: Vec<RecentDeployment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentDeployment {
    #[schema(value_type = String, format = "uuid")]
    pub id: DeploymentId,
    pub name: String,
    pub status: DeploymentStatus,
    /// First listed target provider
    pub provider: ProviderKind,
    pub created_at: DateTime<Utc>,
}

impl From<&Deployment> for RecentDeployment {
    fn from(deployment: &Deployment) -> Self {
        Self {
            id: deployment.id,
            name: deployment.name.clone(),
            status: deployment.status,
            provider: deployment.providers.first().copied().unwrap_or(ProviderKind::Aws),
            created_at: deployment.created_at,
        }
    }
}
