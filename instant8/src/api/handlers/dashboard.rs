//! Dashboard aggregation endpoint.

use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::instrument;

use crate::{
    api::models::dashboard::{DashboardStats, RecentDeployment},
    api::models::UserScope,
    db::models::deployments::DeploymentStatus,
    errors::Result,
    AppState,
};

/// Get dashboard statistics
///
/// Aggregates are computed on read from the user's deployments; nothing is
/// cached.
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "dashboard",
    params(UserScope),
    responses(
        (status = 200, description = "Aggregate deployment statistics", body = DashboardStats),
    )
)]
#[instrument(skip_all)]
pub async fn get_dashboard_stats(State(state): State<AppState>, Query(scope): Query<UserScope>) -> Result<Json<DashboardStats>> {
    let deployments = state.storage.deployments_for_user(scope.user_id()).await?;

    let stats = DashboardStats {
        total_deployments: deployments.len(),
        active_deployments: deployments.iter().filter(|d| d.status == DeploymentStatus::Running).count(),
        total_providers: deployments
            .iter()
            .flat_map(|d| d.providers.iter())
            .collect::<HashSet<_>>()
            .len(),
        total_cost: deployments.iter().map(|d| d.cost_estimate.total).sum(),
        // deployments_for_user returns newest first
        recent_deployments: deployments.iter().take(5).map(RecentDeployment::from).collect(),
    };

    Ok(Json(stats))
}
