//! Deployment CRUD and lifecycle endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rand::prelude::RngExt;
use rand::rng;
use tracing::{info, instrument};

use crate::{
    api::models::deployments::{
        DeploymentCreateRequest, DeploymentCreateResponse, DeploymentResponse, DeploymentUpdateRequest,
    },
    api::models::UserScope,
    db::models::cloud_providers::ProviderKind,
    db::models::deployments::{CostBreakdown, CostEstimate, DeploymentCreate, DeploymentStatus},
    errors::{Error, Result},
    types::{DeploymentId, DEMO_USER_ID},
    AppState,
};

fn deployment_not_found(id: DeploymentId) -> Error {
    Error::NotFound {
        resource: "Deployment".to_string(),
        id: id.to_string(),
    }
}

/// Simulated monthly cost. The breakdown components are drawn independently
/// and summed, so the total is always consistent with the parts.
fn estimate_cost() -> CostEstimate {
    let mut rng = rng();
    let breakdown = CostBreakdown {
        compute: rng.random_range(10.0..60.0),
        storage: rng.random_range(5.0..35.0),
        network: rng.random_range(5.0..25.0),
    };
    CostEstimate {
        total: breakdown.compute + breakdown.storage + breakdown.network,
        breakdown,
    }
}

/// Create a deployment from a prompt
#[utoipa::path(
    post,
    path = "/deployments",
    tag = "deployments",
    request_body = DeploymentCreateRequest,
    responses(
        (status = 201, description = "Deployment created", body = DeploymentCreateResponse),
        (status = 400, description = "Missing or empty prompt"),
    )
)]
#[instrument(skip_all)]
pub async fn create_deployment(
    State(state): State<AppState>,
    Json(request): Json<DeploymentCreateRequest>,
) -> Result<(StatusCode, Json<DeploymentCreateResponse>)> {
    if request.prompt.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "A prompt is required".to_string(),
        });
    }

    let name: String = request.prompt.chars().take(50).collect();
    let providers = request.providers.filter(|p| !p.is_empty()).unwrap_or_else(|| vec![ProviderKind::Aws]);
    let mut overrides = request.config.unwrap_or_default();
    overrides.auto_terminate_hours = overrides.auto_terminate_hours.or(request.auto_terminate_hours);
    let config = overrides.apply();
    let user_id = request.user_id.unwrap_or(DEMO_USER_ID);

    let deployment = state
        .storage
        .create_deployment(&DeploymentCreate {
            user_id,
            name,
            description: request.prompt,
            status: DeploymentStatus::Configuring,
            providers,
            config,
            cost_estimate: estimate_cost(),
        })
        .await?;

    info!("Created deployment {} for user {}", deployment.id, user_id);
    Ok((
        StatusCode::CREATED,
        Json(DeploymentCreateResponse {
            deployment_id: deployment.id,
            status: deployment.status,
            estimated_cost: deployment.cost_estimate.total,
            instance_details: deployment.config,
        }),
    ))
}

/// List deployments, most recent first
#[utoipa::path(
    get,
    path = "/deployments",
    tag = "deployments",
    params(UserScope),
    responses(
        (status = 200, description = "Deployments owned by the user", body = Vec<DeploymentResponse>),
    )
)]
#[instrument(skip_all)]
pub async fn list_deployments(State(state): State<AppState>, Query(scope): Query<UserScope>) -> Result<Json<Vec<DeploymentResponse>>> {
    let deployments = state.storage.deployments_for_user(scope.user_id()).await?;
    Ok(Json(deployments.into_iter().map(DeploymentResponse::from).collect()))
}

/// Get a single deployment
#[utoipa::path(
    get,
    path = "/deployments/{id}",
    tag = "deployments",
    params(("id" = String, Path, format = "uuid", description = "Deployment ID")),
    responses(
        (status = 200, description = "The deployment", body = DeploymentResponse),
        (status = 404, description = "Unknown deployment"),
    )
)]
#[instrument(skip_all, fields(deployment = %id))]
pub async fn get_deployment(State(state): State<AppState>, Path(id): Path<DeploymentId>) -> Result<Json<DeploymentResponse>> {
    let deployment = state.storage.deployment(id).await?.ok_or_else(|| deployment_not_found(id))?;
    Ok(Json(DeploymentResponse::from(deployment)))
}

/// Update a deployment
///
/// Partial update: absent fields keep their stored values.
#[utoipa::path(
    put,
    path = "/deployments/{id}",
    tag = "deployments",
    params(("id" = String, Path, format = "uuid", description = "Deployment ID")),
    request_body = DeploymentUpdateRequest,
    responses(
        (status = 200, description = "The updated deployment", body = DeploymentResponse),
        (status = 404, description = "Unknown deployment"),
    )
)]
#[instrument(skip_all, fields(deployment = %id))]
pub async fn update_deployment(
    State(state): State<AppState>,
    Path(id): Path<DeploymentId>,
    Json(request): Json<DeploymentUpdateRequest>,
) -> Result<Json<DeploymentResponse>> {
    let updated = state
        .storage
        .update_deployment(id, &request.into())
        .await?
        .ok_or_else(|| deployment_not_found(id))?;
    Ok(Json(DeploymentResponse::from(updated)))
}

/// Delete a deployment
#[utoipa::path(
    delete,
    path = "/deployments/{id}",
    tag = "deployments",
    params(("id" = String, Path, format = "uuid", description = "Deployment ID")),
    responses(
        (status = 204, description = "Deployment deleted"),
        (status = 404, description = "Unknown deployment"),
    )
)]
#[instrument(skip_all, fields(deployment = %id))]
pub async fn delete_deployment(State(state): State<AppState>, Path(id): Path<DeploymentId>) -> Result<StatusCode> {
    // Any in-flight provisioning timer must not fire after the delete
    state.lifecycle.cancel_pending(id);

    if !state.storage.delete_deployment(id).await? {
        return Err(deployment_not_found(id));
    }
    info!("Deleted deployment {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// Start provisioning a deployment
///
/// Moves the deployment to `deploying` immediately; it reaches `running`
/// after the configured provisioning delay.
#[utoipa::path(
    post,
    path = "/deployments/{id}/deploy",
    tag = "deployments",
    params(("id" = String, Path, format = "uuid", description = "Deployment ID")),
    responses(
        (status = 200, description = "Provisioning started", body = DeploymentResponse),
        (status = 404, description = "Unknown deployment"),
    )
)]
#[instrument(skip_all, fields(deployment = %id))]
pub async fn deploy_deployment(State(state): State<AppState>, Path(id): Path<DeploymentId>) -> Result<Json<DeploymentResponse>> {
    let deployment = state.lifecycle.deploy(id).await?.ok_or_else(|| deployment_not_found(id))?;
    Ok(Json(DeploymentResponse::from(deployment)))
}

/// Stop a deployment
///
/// Cancels any pending provisioning and moves the record to `stopped`.
#[utoipa::path(
    post,
    path = "/deployments/{id}/stop",
    tag = "deployments",
    params(("id" = String, Path, format = "uuid", description = "Deployment ID")),
    responses(
        (status = 200, description = "Deployment stopped", body = DeploymentResponse),
        (status = 404, description = "Unknown deployment"),
    )
)]
#[instrument(skip_all, fields(deployment = %id))]
pub async fn stop_deployment(State(state): State<AppState>, Path(id): Path<DeploymentId>) -> Result<Json<DeploymentResponse>> {
    let deployment = state.lifecycle.stop(id).await?.ok_or_else(|| deployment_not_found(id))?;
    Ok(Json(DeploymentResponse::from(deployment)))
}
