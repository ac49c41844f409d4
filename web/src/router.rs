//! Router composition.
//!
//! Composes all handlers into a single Axum router.

use crate::handlers::{admin, health, requests};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};
use encore_core::RequestStore;
use tower_http::cors::CorsLayer;

/// Create the application router with all endpoints.
///
/// # Routes
///
/// ## Public
/// - `POST /api/requests` - Submit a song request
/// - `GET /api/requests/:id/position` - Queue rank of a request
/// - `GET /api/queue` - Approved queue, reduced fields
/// - `GET /health` - Liveness
///
/// ## Operator (bearer token)
/// - `GET /api/admin/requests?status=S` - Full listing of one bucket
/// - `GET /api/admin/requests/discarded` - Skipped + removed, merged
/// - `GET /api/admin/history` - Paginated audit view
/// - `PATCH /api/admin/requests/:id` - Transition one request
/// - `POST /api/admin/requests/bulk` - Transition a batch
/// - `DELETE /api/admin/requests` - Delete ids, or everything via `"ALL"`
/// - `GET /api/admin/stats` - Dashboard window counts
pub fn app_router<S>(state: AppState<S>) -> Router
where
    S: RequestStore + 'static,
{
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        .route("/api/requests", post(requests::submit::<S>))
        .route("/api/requests/:id/position", get(requests::position::<S>))
        .route("/api/queue", get(requests::queue::<S>))
        // Operator routes
        .route(
            "/api/admin/requests",
            get(admin::list_by_status::<S>).delete(admin::delete::<S>),
        )
        .route(
            "/api/admin/requests/discarded",
            get(admin::list_discarded::<S>),
        )
        .route("/api/admin/requests/bulk", post(admin::bulk_transition::<S>))
        .route("/api/admin/requests/:id", patch(admin::transition::<S>))
        .route("/api/admin/history", get(admin::history::<S>))
        .route("/api/admin/stats", get(admin::stats::<S>))
        .layer(correlation_id_layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
