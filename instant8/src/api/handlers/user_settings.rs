//! Per-user settings endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::instrument;

use crate::{
    api::models::user_settings::{UserSettingsResponse, UserSettingsUpdateRequest},
    api::models::UserScope,
    errors::{Error, Result},
    types::DEMO_USER_ID,
    AppState,
};

/// Get the user's settings
#[utoipa::path(
    get,
    path = "/user-settings",
    tag = "user-settings",
    params(UserScope),
    responses(
        (status = 200, description = "The user's settings", body = UserSettingsResponse),
        (status = 404, description = "No settings stored for this user"),
    )
)]
#[instrument(skip_all)]
pub async fn get_user_settings(State(state): State<AppState>, Query(scope): Query<UserScope>) -> Result<Json<UserSettingsResponse>> {
    let user_id = scope.user_id();
    let settings = state.storage.user_settings(user_id).await?.ok_or_else(|| Error::NotFound {
        resource: "User settings".to_string(),
        id: user_id.to_string(),
    })?;
    Ok(Json(UserSettingsResponse::from(settings)))
}

/// Update the user's settings
///
/// Partial update; creates the settings record from defaults when none
/// exists yet.
#[utoipa::path(
    put,
    path = "/user-settings",
    tag = "user-settings",
    request_body = UserSettingsUpdateRequest,
    responses(
        (status = 200, description = "The updated settings", body = UserSettingsResponse),
    )
)]
#[instrument(skip_all)]
pub async fn update_user_settings(
    State(state): State<AppState>,
    Json(request): Json<UserSettingsUpdateRequest>,
) -> Result<Json<UserSettingsResponse>> {
    let user_id = request.user_id.unwrap_or(DEMO_USER_ID);
    let settings = state.storage.upsert_user_settings(user_id, &request.into()).await?;
    Ok(Json(UserSettingsResponse::from(settings)))
}
