//! Registration and login.

use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, instrument};

use crate::{
    api::models::auth::{AuthResponse, LoginRequest, RegisterRequest},
    api::models::users::{CurrentUser, UserResponse},
    auth::{password, session},
    db::models::users::UserCreate,
    errors::{Error, Result},
    AppState,
};

/// Register a new user account
///
/// Creates the account, seeds its default cloud providers and settings, and
/// returns a session token.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email or username already taken"),
    )
)]
#[instrument(skip_all, fields(email = %request.email))]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<(StatusCode, Json<AuthResponse>)> {
    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "Registration is disabled".to_string(),
        });
    }

    let password_policy = &state.config.auth.password;
    if request.password.len() < password_policy.min_length || request.password.len() > password_policy.max_length {
        return Err(Error::BadRequest {
            message: format!(
                "Password must be between {} and {} characters",
                password_policy.min_length, password_policy.max_length
            ),
        });
    }
    if request.email.is_empty() || !request.email.contains('@') {
        return Err(Error::BadRequest {
            message: "A valid email address is required".to_string(),
        });
    }
    if request.username.is_empty() {
        return Err(Error::BadRequest {
            message: "A username is required".to_string(),
        });
    }

    // Argon2 hashing is CPU-bound; keep it off the async worker threads
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("hash password task: {e}"),
        })??;

    let user = state
        .storage
        .create_user(&UserCreate {
            id: None,
            email: request.email,
            username: request.username,
            password_hash: Some(password_hash),
        })
        .await?;

    state.storage.ensure_user_defaults(user.id).await?;
    info!("Registered user {}", user.id);

    let token = session::create_session_token(&CurrentUser::from(&user), &state.config)?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(token, UserResponse::from(user)))))
}

/// Log in with email and password
///
/// Unknown email, missing password hash, and wrong password all produce the
/// same response, so the endpoint does not reveal which accounts exist.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[instrument(skip_all, fields(email = %request.email))]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<AuthResponse>> {
    let invalid_credentials = || Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    };

    let Some(user) = state.storage.user_by_email(&request.email).await? else {
        return Err(invalid_credentials());
    };
    let Some(stored_hash) = user.password_hash.clone() else {
        return Err(invalid_credentials());
    };

    let password = request.password.clone();
    let verified = tokio::task::spawn_blocking(move || password::verify_password(&password, &stored_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("verify password task: {e}"),
        })??;

    if !verified {
        return Err(invalid_credentials());
    }

    let token = session::create_session_token(&CurrentUser::from(&user), &state.config)?;
    Ok(Json(AuthResponse::new(token, UserResponse::from(user))))
}
