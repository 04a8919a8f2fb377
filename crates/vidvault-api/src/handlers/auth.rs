use crate::auth::models::TokenResponse;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthState;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::DbState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;
use vidvault_core::models::{LoginRequest, RegisterRequest, UserResponse};
use vidvault_core::AppError;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid username or password", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(db, request), fields(username = %request.username))]
pub async fn register(
    State(db): State<DbState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate().map_err(AppError::from)?;

    let password_hash = hash_password(request.password).await?;
    let user = db
        .users
        .create_user(request.username.trim(), &password_hash)
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(db, auth, request), fields(username = %request.username))]
pub async fn login(
    State(db): State<DbState>,
    State(auth): State<AuthState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, HttpAppError> {
    let user = db
        .users
        .find_user_by_username(request.username.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(request.password, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
    }

    let token = auth.jwt.issue(user.id, &user.username)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: auth.jwt.expires_in(),
    }))
}
