//! Public guest endpoints: submission, queue view, position lookup.

use crate::error::AppError;
use crate::extractors::CorrelationId;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use encore_core::{NewRequest, QueueEntry, RequestId, RequestStore, SongRequest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Guest submission payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitRequest {
    /// Guest display name.
    pub name: String,

    /// Requested song title.
    pub song: String,

    /// Contact email (optional; an empty string counts as absent).
    #[serde(default)]
    pub email: Option<String>,
}

/// Queue rank of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionResponse {
    /// The request id asked about.
    pub id: RequestId,

    /// 1-based rank within the pending+approved line.
    pub position: u64,
}

/// Submit a song request.
///
/// # Endpoint
///
/// ```text
/// POST /api/requests
/// Content-Type: application/json
///
/// {
///   "name": "Alice",
///   "song": "Imagine",
///   "email": "alice@example.com"
/// }
/// ```
///
/// Returns `201` with the created request, `409` when the title is already
/// pending or approved, `422` when a required field is empty.
pub async fn submit<S: RequestStore + 'static>(
    State(state): State<AppState<S>>,
    correlation_id: CorrelationId,
    Json(body): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SongRequest>), AppError> {
    tracing::debug!(correlation_id = %correlation_id.0, "guest submission");

    let created = state
        .engine
        .submit(NewRequest {
            requester_name: body.name,
            song_title: body.song,
            requester_email: body.email.filter(|email| !email.trim().is_empty()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// The playback queue, as guests see it.
///
/// Approved requests only, oldest first, reduced fields (no email, no
/// operator attribution).
///
/// # Endpoint
///
/// ```text
/// GET /api/queue
/// ```
pub async fn queue<S: RequestStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<QueueEntry>>, AppError> {
    Ok(Json(state.engine.queue().await?))
}

/// "Your song is number N in the queue."
///
/// # Endpoint
///
/// ```text
/// GET /api/requests/{id}/position
/// ```
///
/// Returns `404` when the request is unknown or no longer in line.
pub async fn position<S: RequestStore + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PositionResponse>, AppError> {
    let id = RequestId(id);
    let position = state.engine.position_of(id).await?;
    Ok(Json(PositionResponse { id, position }))
}
