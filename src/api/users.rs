use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::{
    auth::AuthUser,
    dto::{CurrentUserDto, TokenResponse, UserCredentials, UserDto},
    errors::AppError,
    AppState,
};

/// Create a user account.
#[utoipa::path(
    post,
    path = "/register",
    request_body = UserCredentials,
    responses(
        (status = 200, description = "User created", body = UserDto),
        (status = 400, description = "Username already registered or malformed payload"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<UserCredentials>, JsonRejection>,
) -> Result<Json<UserDto>, AppError> {
    let Json(creds) = payload?;
    let user = state
        .credentials
        .register(&state.pool, &creds.username, &creds.password)
        .await?;
    Ok(Json(user.into()))
}

/// Exchange a username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = UserCredentials,
    responses(
        (status = 200, description = "Signed access token", body = TokenResponse),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<UserCredentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let Json(creds) = payload?;
    let token = state
        .credentials
        .login(&state.pool, &creds.username, &creds.password)
        .await?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// Identify the caller from their bearer token.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Token subject", body = CurrentUserDto),
        (status = 401, description = "Missing, invalid or expired token"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn me(AuthUser(claims): AuthUser) -> Json<CurrentUserDto> {
    Json(CurrentUserDto { username: claims.sub })
}
