//! Cloud provider connection endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument};

use crate::{
    api::models::cloud_providers::{CloudProviderResponse, CredentialsUpdateRequest},
    api::models::UserScope,
    errors::{Error, Result},
    types::CloudProviderId,
    AppState,
};

/// List cloud provider connections
#[utoipa::path(
    get,
    path = "/cloud-providers",
    tag = "cloud-providers",
    params(UserScope),
    responses(
        (status = 200, description = "Provider connections owned by the user", body = Vec<CloudProviderResponse>),
    )
)]
#[instrument(skip_all)]
pub async fn list_cloud_providers(
    State(state): State<AppState>,
    Query(scope): Query<UserScope>,
) -> Result<Json<Vec<CloudProviderResponse>>> {
    let providers = state.storage.cloud_providers_for_user(scope.user_id()).await?;
    Ok(Json(providers.into_iter().map(CloudProviderResponse::from).collect()))
}

/// Update a provider's credentials
///
/// Replaces the stored credentials blob wholesale and optionally toggles the
/// connection on or off. Credentials are treated as opaque; nothing validates
/// them against the actual cloud.
#[utoipa::path(
    put,
    path = "/cloud-providers/{id}",
    tag = "cloud-providers",
    params(("id" = String, Path, format = "uuid", description = "Provider connection ID")),
    request_body = CredentialsUpdateRequest,
    responses(
        (status = 200, description = "The updated connection", body = CloudProviderResponse),
        (status = 404, description = "Unknown provider connection"),
    )
)]
#[instrument(skip_all, fields(provider = %id))]
pub async fn update_credentials(
    State(state): State<AppState>,
    Path(id): Path<CloudProviderId>,
    Json(request): Json<CredentialsUpdateRequest>,
) -> Result<Json<CloudProviderResponse>> {
    let updated = state
        .storage
        .update_cloud_provider(id, &request.credentials, request.enabled)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Cloud provider".to_string(),
            id: id.to_string(),
        })?;

    info!("Updated credentials for provider connection {id}");
    Ok(Json(CloudProviderResponse::from(updated)))
}
