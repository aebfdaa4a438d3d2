//! Authenticated user profile.

use axum::{extract::State, Json};
use tracing::instrument;

use crate::{
    api::models::users::{CurrentUser, UserResponse},
    errors::{Error, Result},
    AppState,
};

/// Get the authenticated user's profile
///
/// The session token carries a snapshot of the user; this returns the
/// current stored record.
#[utoipa::path(
    get,
    path = "/user/profile",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Account no longer exists"),
    )
)]
#[instrument(skip_all, fields(user = %current_user.id))]
pub async fn get_profile(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>> {
    let user = state.storage.user_by_id(current_user.id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: current_user.id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}
