use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::error::AppError;
use crate::middleware::auth::Caller;
use crate::models::account::Account;
use crate::models::entry::{EntryDto, JournalEntry};
use crate::AppState;

async fn caller_account(state: &AppState, caller: &Caller) -> Result<Account, AppError> {
    state
        .accounts
        .find_by_username(&caller.username)
        .await?
        .ok_or_else(|| AppError::AccountNotFound(format!("no account '{}'", caller.username)))
}

/// The ownership check: authorized iff the id is in the caller's owned list.
/// Runs before any entry store lookup, so "not yours" and "does not exist"
/// are the same 404.
fn check_ownership(account: &Account, entry_id: &str) -> Result<(), AppError> {
    if account.entry_ids.iter().any(|id| id == entry_id) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("no entry '{entry_id}'")))
    }
}

/// GET /api/v1/journal — the caller's entries, resolved through the owned
/// list.
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "list_mine",
        username = %caller.username,
        "Handler: GET /api/v1/journal"
    );

    let account = caller_account(&state, &caller).await?;
    let entries = state.journal.entries_for(&account).await?;
    let dtos: Vec<EntryDto> = entries.iter().map(JournalEntry::to_dto).collect();
    Ok(Json(dtos))
}

/// POST /api/v1/journal — create when the body carries no id; with an id this
/// is a save of an existing entry and the ownership check applies first.
pub async fn save(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<EntryDto>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "save",
        username = %caller.username,
        entry_id = ?body.id,
        "Handler: POST /api/v1/journal"
    );

    if let Some(id) = &body.id {
        let account = caller_account(&state, &caller).await?;
        check_ownership(&account, id)?;
    }

    let saved = state.journal.save(&body, &caller.username).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/v1/journal/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "get_by_id",
        username = %caller.username,
        entry_id = %id,
        "Handler: GET /api/v1/journal/{{id}}"
    );

    let account = caller_account(&state, &caller).await?;
    check_ownership(&account, &id)?;

    let entry = state
        .journal
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no entry '{id}'")))?;
    Ok(Json(entry.to_dto()))
}

/// PUT /api/v1/journal/{id} — merge-based partial update: title is required,
/// absent content preserves the stored content.
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(body): Json<EntryDto>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "update",
        username = %caller.username,
        entry_id = %id,
        "Handler: PUT /api/v1/journal/{{id}}"
    );

    let account = caller_account(&state, &caller).await?;
    check_ownership(&account, &id)?;

    let dto = EntryDto {
        id: Some(id),
        ..body
    };
    let saved = state.journal.save(&dto, &caller.username).await?;
    Ok(Json(saved))
}

/// DELETE /api/v1/journal/{id} — 204 when the caller owned the entry, 404
/// otherwise (including retries of a successful delete).
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!(
        handler = "delete",
        username = %caller.username,
        entry_id = %id,
        "Handler: DELETE /api/v1/journal/{{id}}"
    );

    if state.journal.delete_by_id(&id, &caller.username).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("no entry '{id}'")))
    }
}
