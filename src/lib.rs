pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod memory_store;
pub mod middleware;
pub mod models;
pub mod services;
pub mod sqlite_store;
pub mod store;
pub mod util;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};

use services::account::AccountService;
use services::journal::JournalService;
use store::{AccountStore, EntryStore};

#[derive(Clone)]
pub struct AppState {
    pub journal: JournalService,
    pub accounts: AccountService,
}

impl AppState {
    /// The journal service is the only writer to either store; handlers only
    /// ever reach the stores through it and the account service.
    pub fn new(entries: Arc<dyn EntryStore>, accounts: Arc<dyn AccountStore>) -> Self {
        let accounts = AccountService::new(accounts);
        let journal = JournalService::new(entries, accounts.clone());
        Self { journal, accounts }
    }
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/health", get(handlers::health::health_check))
        .route("/api/v1/public/users", post(handlers::accounts::register))
}

fn authenticated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/users/me",
            get(handlers::accounts::get_me).delete(handlers::accounts::delete_me),
        )
        .route(
            "/api/v1/users/me/password",
            put(handlers::accounts::change_password),
        )
        .route(
            "/api/v1/journal",
            get(handlers::entries::list_mine).post(handlers::entries::save),
        )
        .route(
            "/api/v1/journal/:id",
            get(handlers::entries::get_by_id)
                .put(handlers::entries::update)
                .delete(handlers::entries::delete),
        )
        .layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::require_basic_auth,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/admin/users",
            get(handlers::admin::list_users).post(handlers::admin::create_admin_user),
        )
        .route(
            "/api/v1/admin/journal",
            get(handlers::admin::list_all_entries),
        )
        .layer(axum_middleware::from_fn(middleware::auth::require_admin))
        .layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::require_basic_auth,
        ))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(authenticated_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .with_state(state)
}
