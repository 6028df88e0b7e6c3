use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{actions, views};
use crate::state::SharedState;

/// The admin surface, mounted under the configured route prefix
pub fn app(state: SharedState) -> Router {
    let prefix = state.config.server.route_prefix.clone();

    let routes = Router::new()
        .merge(view_routes())
        .merge(action_routes())
        .merge(backup_routes());

    let router = if prefix.is_empty() {
        routes
    } else {
        Router::new().nest(&prefix, routes)
    };

    router
        .with_state(state)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(views::overview))
        .route("/health", get(views::health))
        .route("/environment", get(views::environment_list))
        .route("/files", get(views::files_index))
        .route("/backups", get(views::backups_list))
        .route("/logs", get(views::logs_view))
}

fn action_routes() -> Router<SharedState> {
    Router::new()
        .route("/artisan/run", post(actions::artisan_run))
        .route("/environment/upsert", post(actions::environment_upsert))
        .route("/sql/run", post(actions::sql_run))
        .route("/logs/tail", post(actions::logs_tail))
        .route("/files/save", post(actions::file_save))
        .route("/git/action", post(actions::git_action))
        .route("/maintenance/run", post(actions::maintenance_run))
        .route("/queues/flush-failed", post(actions::queues_flush_failed))
        .route("/queues/clear-pending", post(actions::queues_clear_pending))
}

fn backup_routes() -> Router<SharedState> {
    Router::new()
        .route("/backups/run", post(actions::backup_run))
        .route("/backups/restore", post(actions::backup_restore))
        .route("/backups/delete", delete(actions::backup_delete))
        .route("/backups/download", post(actions::backup_download))
}
