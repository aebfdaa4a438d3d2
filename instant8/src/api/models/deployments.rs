//! API request/response models for deployments.

use crate::db::models::cloud_providers::ProviderKind;
use crate::db::models::deployments::{CostEstimate, Deployment, DeploymentConfig, DeploymentPatch, DeploymentStatus};
use crate::types::{DeploymentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Create a deployment from a free-form prompt. The first 50 characters of
/// the prompt become the deployment name; the full prompt is kept as the
/// description.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeploymentCreateRequest {
    pub prompt: String,
    /// Target providers; defaults to `["aws"]`
    pub providers: Option<Vec<ProviderKind>>,
    /// Hours until automatic termination; a value nested under `config`
    /// takes precedence
    pub auto_terminate_hours: Option<i32>,
    /// Instance configuration overrides
    pub config: Option<DeploymentConfigOverrides>,
    /// Owner of the record; defaults to the demo user
    #[schema(value_type = Option<String>, format = "uuid")]
    pub user_id: Option<UserId>,
}

/// Overrides applied on top of the default instance configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DeploymentConfigOverrides {
    pub performance: Option<String>,
    pub region: Option<String>,
    pub auto_terminate_hours: Option<i32>,
}

impl DeploymentConfigOverrides {
    /// Merge onto the default configuration.
    pub fn apply(self) -> DeploymentConfig {
        let defaults = DeploymentConfig::default();
        DeploymentConfig {
            performance: self.performance.unwrap_or(defaults.performance),
            region: self.region.unwrap_or(defaults.region),
            auto_terminate_hours: self.auto_terminate_hours.unwrap_or(defaults.auto_terminate_hours),
        }
    }
}

/// Response to a deployment creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeploymentCreateResponse {
    #[schema(value_type = String, format = "uuid")]
    pub deployment_id: DeploymentId,
    pub status: DeploymentStatus,
    /// Estimated total monthly cost
    pub estimated_cost: f64,
    pub instance_details: DeploymentConfig,
}

/// Partial update of a deployment. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DeploymentUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<DeploymentStatus>,
    pub providers: Option<Vec<ProviderKind>>,
    pub config: Option<DeploymentConfig>,
    pub cost_estimate: Option<CostEstimate>,
}

impl From<DeploymentUpdateRequest> for DeploymentPatch {
    fn from(request: DeploymentUpdateRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            status: request.status,
            providers: request.providers,
            config: request.config,
            cost_estimate: request.cost_estimate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeploymentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: DeploymentId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub status: DeploymentStatus,
    pub providers: Vec<ProviderKind>,
    pub config: DeploymentConfig,
    pub cost_estimate: CostEstimate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Deployment> for DeploymentResponse {
    fn from(deployment: Deployment) -> Self {
        Self {
            id: deployment.id,
            user_id: deployment.user_id,
            name: deployment.name,
            description: deployment.description,
            status: deployment.status,
            providers: deployment.providers,
            config: deployment.config,
            cost_estimate: deployment.cost_estimate,
            created_at: deployment.created_at,
            updated_at: deployment.updated_at,
        }
    }
}
