//! Operator endpoints: triage, bulk operations, deletion, history, stats.

use crate::error::AppError;
use crate::extractors::OperatorActor;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use encore_core::{
    DashboardStats, DeleteSelection, EngineError, HistoryFilter, HistoryPage, RequestId,
    RequestStatus, RequestStore, SongRequest, DEFAULT_PAGE_SIZE,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query for the exact-status listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    /// Status bucket to list.
    pub status: String,
}

/// Query for the history view.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    /// Free-text filter across name, email and title.
    pub search: Option<String>,

    /// Exact status filter.
    pub status: Option<String>,

    /// Inclusive lower creation-date bound (RFC 3339).
    pub from: Option<DateTime<Utc>>,

    /// Inclusive upper creation-date bound (RFC 3339).
    pub to: Option<DateTime<Utc>>,

    /// 1-based page number (default 1).
    pub page: Option<u32>,

    /// Rows per page (default 20).
    pub page_size: Option<u32>,
}

/// Transition payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransitionRequest {
    /// Target status.
    pub status: String,
}

/// Bulk transition payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BulkTransitionRequest {
    /// Requests to transition.
    pub ids: Vec<RequestId>,

    /// Target status for every id.
    pub status: String,
}

/// One failed item of a bulk transition.
#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
    /// The id that failed.
    pub id: RequestId,

    /// Machine-readable failure code.
    pub code: &'static str,

    /// Human-readable failure message.
    pub message: String,
}

/// Bulk transition outcome: successes and per-id failures, side by side.
#[derive(Debug, Clone, Serialize)]
pub struct BulkTransitionResponse {
    /// Ids whose transition was applied.
    pub succeeded: Vec<RequestId>,

    /// Ids whose transition failed.
    pub failed: Vec<BulkFailure>,
}

/// Delete payload: explicit ids, or the `"ALL"` sentinel.
///
/// The confirmation dialog for `"ALL"` is the caller's job.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRequest {
    /// `["id", ...]` or `"ALL"`.
    pub ids: IdSelection,
}

/// Either a list of ids or a sentinel string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdSelection {
    /// Sentinel form; only `"ALL"` is accepted.
    Sentinel(String),
    /// Explicit id list.
    Ids(Vec<RequestId>),
}

/// Count of rows removed by a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Rows actually deleted.
    pub deleted: u64,
}

fn failure_code(err: &EngineError) -> &'static str {
    match err {
        EngineError::NotFound { .. } => "NOT_FOUND",
        EngineError::Validation { .. } | EngineError::InvalidStatus { .. } => "VALIDATION_ERROR",
        EngineError::DuplicateTitle { .. } => "CONFLICT",
        EngineError::Unauthorized => "FORBIDDEN",
        EngineError::Store(_) => "STORE_ERROR",
    }
}

/// Full listing of one status bucket, oldest first.
///
/// # Endpoint
///
/// ```text
/// GET /api/admin/requests?status=PENDING
/// ```
pub async fn list_by_status<S: RequestStore + 'static>(
    State(state): State<AppState<S>>,
    OperatorActor(_actor): OperatorActor,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SongRequest>>, AppError> {
    let status: RequestStatus = query.status.parse()?;
    Ok(Json(state.engine.list_by_status(status).await?))
}

/// Skipped and removed requests, merged, oldest first.
///
/// # Endpoint
///
/// ```text
/// GET /api/admin/requests/discarded
/// ```
pub async fn list_discarded<S: RequestStore + 'static>(
    State(state): State<AppState<S>>,
    OperatorActor(_actor): OperatorActor,
) -> Result<Json<Vec<SongRequest>>, AppError> {
    Ok(Json(state.engine.list_discarded().await?))
}

/// Paginated audit view over all statuses, newest first.
///
/// # Endpoint
///
/// ```text
/// GET /api/admin/history?search=alice&status=PLAYED&page=2&page_size=20
/// ```
///
/// The response carries the total matching count so clients can compute
/// the page count.
pub async fn history<S: RequestStore + 'static>(
    State(state): State<AppState<S>>,
    OperatorActor(_actor): OperatorActor,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryPage>, AppError> {
    let status = match query.status.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<RequestStatus>()?),
        _ => None,
    };

    let filter = HistoryFilter {
        search: query.search,
        status,
        from: query.from,
        to: query.to,
        page: query.page.unwrap_or(1).max(1),
        page_size: query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
    };

    Ok(Json(state.engine.list_history(filter).await?))
}

/// Move one request to a new status, recording the acting operator.
///
/// # Endpoint
///
/// ```text
/// PATCH /api/admin/requests/{id}
/// Content-Type: application/json
///
/// { "status": "APPROVED" }
/// ```
///
/// Any status is accepted as a target; `404` for unknown ids, `422` for a
/// value outside the enumeration.
pub async fn transition<S: RequestStore + 'static>(
    State(state): State<AppState<S>>,
    OperatorActor(actor): OperatorActor,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<SongRequest>, AppError> {
    let target: RequestStatus = body.status.parse()?;
    let updated = state
        .engine
        .transition(RequestId(id), target, &actor)
        .await?;
    Ok(Json(updated))
}

/// Transition a batch of requests, isolating per-item failures.
///
/// # Endpoint
///
/// ```text
/// POST /api/admin/requests/bulk
/// Content-Type: application/json
///
/// { "ids": ["..."], "status": "APPROVED" }
/// ```
///
/// One unknown id never aborts the batch; it shows up under `failed`.
pub async fn bulk_transition<S: RequestStore + 'static>(
    State(state): State<AppState<S>>,
    OperatorActor(actor): OperatorActor,
    Json(body): Json<BulkTransitionRequest>,
) -> Result<Json<BulkTransitionResponse>, AppError> {
    let target: RequestStatus = body.status.parse()?;
    let outcome = state
        .engine
        .bulk_transition(&body.ids, target, &actor)
        .await;

    let mut failed: Vec<BulkFailure> = outcome
        .failed
        .into_iter()
        .map(|(id, err)| BulkFailure {
            id,
            code: failure_code(&err),
            message: err.to_string(),
        })
        .collect();
    failed.sort_by_key(|failure| failure.id);

    Ok(Json(BulkTransitionResponse {
        succeeded: outcome.succeeded,
        failed,
    }))
}

/// Delete selected requests, or wipe the table with the `"ALL"` sentinel.
///
/// # Endpoint
///
/// ```text
/// DELETE /api/admin/requests
/// Content-Type: application/json
///
/// { "ids": ["..."] }     — delete exactly these (missing ids ignored)
/// { "ids": "ALL" }       — delete everything
/// ```
pub async fn delete<S: RequestStore + 'static>(
    State(state): State<AppState<S>>,
    OperatorActor(_actor): OperatorActor,
    Json(body): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, AppError> {
    let selection = match body.ids {
        IdSelection::Ids(ids) => DeleteSelection::Ids(ids),
        IdSelection::Sentinel(sentinel) if sentinel == "ALL" => DeleteSelection::All,
        IdSelection::Sentinel(other) => {
            return Err(AppError::bad_request(format!(
                "unknown delete selector: {other}"
            )));
        }
    };

    let deleted = state.engine.apply_delete(selection).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// Dashboard counts for the current window.
///
/// # Endpoint
///
/// ```text
/// GET /api/admin/stats
/// ```
///
/// Queue and pending count requests *created* since the window boundary
/// (yesterday 03:00 local); played and discarded count requests whose
/// *status changed* since then.
pub async fn stats<S: RequestStore + 'static>(
    State(state): State<AppState<S>>,
    OperatorActor(_actor): OperatorActor,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(state.engine.dashboard_stats().await?))
}
