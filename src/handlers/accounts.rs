use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};

use crate::error::AppError;
use crate::middleware::auth::Caller;
use crate::models::account::{ChangePasswordRequest, RegisterRequest};
use crate::AppState;

/// POST /api/v1/public/users — self-registration; new accounts get the USER
/// role and an empty owned-entries list.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "register",
        username = %body.username,
        "Handler: POST /api/v1/public/users"
    );

    let account = state.accounts.register_user(body).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /api/v1/users/me — the caller's own account, credential excluded.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "get_me",
        username = %caller.username,
        "Handler: GET /api/v1/users/me"
    );

    let account = state
        .accounts
        .find_by_username(&caller.username)
        .await?
        .ok_or_else(|| AppError::AccountNotFound(format!("no account '{}'", caller.username)))?;
    Ok(Json(account.to_dto()))
}

/// PUT /api/v1/users/me/password — usernames are immutable, so the credential
/// is the only self-service mutation.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "change_password",
        username = %caller.username,
        "Handler: PUT /api/v1/users/me/password"
    );

    body.validate().map_err(AppError::Validation)?;
    state
        .accounts
        .change_password(&caller.username, &body.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/users/me — removes the account. Owned entries stay in the
/// entry store as orphans.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "delete_me",
        username = %caller.username,
        "Handler: DELETE /api/v1/users/me"
    );

    state.accounts.delete_by_username(&caller.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
