//! Deployment records and the structured fields they carry.

use crate::db::models::cloud_providers::ProviderKind;
use crate::types::{DeploymentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Provisioning lifecycle state of a deployment.
///
/// `configuring` is the initial state at creation. A deploy request moves the
/// record to `deploying` synchronously; the scheduler moves it to `running`
/// after the simulated provisioning delay. `stopped` is set immediately on an
/// explicit stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deployment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Configuring,
    Deploying,
    Running,
    Stopped,
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeploymentStatus::Configuring => "configuring",
            DeploymentStatus::Deploying => "deploying",
            DeploymentStatus::Running => "running",
            DeploymentStatus::Stopped => "stopped",
        };
        write!(f, "{s}")
    }
}

/// Instance configuration for a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeploymentConfig {
    pub performance: String,
    pub region: String,
    pub auto_terminate_hours: i32,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            performance: "standard".to_string(),
            region: "us-east-1".to_string(),
            auto_terminate_hours: 24,
        }
    }
}

/// Simulated monthly cost estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CostEstimate {
    pub total: f64,
    pub breakdown: CostBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CostBreakdown {
    pub compute: f64,
    pub storage: f64,
    pub network: f64,
}

/// A stored deployment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
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

/// Request to create a deployment record.
#[derive(Debug, Clone)]
pub struct DeploymentCreate {
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub status: DeploymentStatus,
    pub providers: Vec<ProviderKind>,
    pub config: DeploymentConfig,
    pub cost_estimate: CostEstimate,
}

/// Partial patch for a deployment. Absent fields keep their previous values.
#[derive(Debug, Clone, Default)]
pub struct DeploymentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<DeploymentStatus>,
    pub providers: Option<Vec<ProviderKind>>,
    pub config: Option<DeploymentConfig>,
    pub cost_estimate: Option<CostEstimate>,
}

impl DeploymentPatch {
    /// Patch that only changes the status.
    pub fn status(status: DeploymentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
