//! Router configuration for the web server.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Documents
        .route("/", get(handlers::document_list))
        .route("/refresh", get(handlers::refresh_documents))
        .route("/export", get(handlers::export_csv))
        .route(
            "/analyze/:id",
            get(handlers::analyze_document).post(handlers::analyze_document),
        )
        // Clients
        .route("/clients", get(handlers::client_list))
        .route("/clients/:id", get(handlers::client_documents))
        .route(
            "/clients/:id/edit",
            get(handlers::client_edit_form).post(handlers::client_edit_submit),
        )
        .route(
            "/clients/:id/assign-documents",
            get(handlers::assign_documents_form).post(handlers::assign_documents_submit),
        )
        // Priorities
        .route("/priorities", get(handlers::priority_list))
        .route(
            "/priority/update/:client_id/:document_id",
            post(handlers::update_priority).fallback(handlers::method_not_allowed),
        )
        .route(
            "/priority/delete/:client_id/:document_id",
            delete(handlers::delete_priority).fallback(handlers::method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
