//! API route configuration.

use crate::api::handlers::{
    create_link_handler, delete_link_handler, extract_code_handler, get_link_handler,
    list_links_handler, rebind_link_handler, stats_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Routes open to admins and identified clients.
///
/// Callers are resolved per handler via the [`crate::domain::entities::Caller`]
/// extractor.
///
/// # Endpoints
///
/// - `POST  /links`          - Create a short link
/// - `PATCH /links/{code}`   - Rebind a code to a new target
/// - `POST  /codes/extract`  - Pull a code out of scanned text
pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/links", post(create_link_handler))
        .route("/links/{code}", patch(rebind_link_handler))
        .route("/codes/extract", post(extract_code_handler))
}

/// Admin routes, protected by Bearer token authentication.
///
/// # Endpoints
///
/// - `GET    /links`          - Paginated listing
/// - `GET    /links/{code}`   - Single link, no click counted
/// - `DELETE /links/{code}`   - Hard delete
/// - `GET    /stats`          - Totals and top links
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler))
        .route(
            "/links/{code}",
            get(get_link_handler).delete(delete_link_handler),
        )
        .route("/stats", get(stats_handler))
}
