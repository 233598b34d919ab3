use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::error::AppError;
use crate::models::account::RegisterRequest;
use crate::models::entry::{EntryDto, JournalEntry};
use crate::AppState;

/// GET /api/v1/admin/users — every account, credentials excluded.
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    tracing::info!(handler = "list_users", "Handler: GET /api/v1/admin/users");

    let accounts = state.accounts.list_all().await?;
    Ok(Json(accounts))
}

/// POST /api/v1/admin/users — provision an account with ADMIN and USER roles.
pub async fn create_admin_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "create_admin_user",
        username = %body.username,
        "Handler: POST /api/v1/admin/users"
    );

    let account = state.accounts.register_admin(body).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /api/v1/admin/journal — all entries across all accounts, for
/// debugging; no ownership filter.
pub async fn list_all_entries(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "list_all_entries",
        "Handler: GET /api/v1/admin/journal"
    );

    let entries = state.journal.list_all().await?;
    let dtos: Vec<EntryDto> = entries.iter().map(JournalEntry::to_dto).collect();
    Ok(Json(dtos))
}
