//! Status lifecycle engine.
//!
//! [`QueueEngine`] validates and applies status transitions, enforces the
//! duplicate-submission policy, computes queue ordering and positions, and
//! produces the windowed aggregates for the operator dashboard. It derives
//! every answer from the store; there is no in-process cache or scheduler.

use crate::error::{EngineError, Result};
use crate::request::{
    normalized_title, Actor, NewRequest, QueueEntry, RequestId, RequestStatus, SongRequest,
};
use crate::store::{HistoryFilter, HistoryPage, RequestStore};
use crate::window;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of a bulk transition: per-item failure isolation means one bad id
/// never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkOutcome {
    /// Ids whose transition was applied.
    pub succeeded: Vec<RequestId>,

    /// Ids whose transition failed, with the error for each.
    pub failed: HashMap<RequestId, EngineError>,
}

/// Target of a delete operation: an explicit id set, or the whole table.
///
/// Callers must obtain operator confirmation before using [`Self::All`];
/// that UX lives outside the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteSelection {
    /// Delete exactly these rows; missing ids are silently ignored.
    Ids(Vec<RequestId>),
    /// Delete every request unconditionally.
    All,
}

/// Aggregate counts scoped to the current dashboard window.
///
/// Queue and pending count by *creation* time; played and discarded count by
/// *status-change* time. A request created before the window but played
/// inside it counts as played — the event is what matters, not the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Approved requests created inside the window.
    pub queue_count: u64,

    /// Pending requests created inside the window.
    pub pending_count: u64,

    /// Requests played inside the window.
    pub played_count: u64,

    /// Requests skipped or removed inside the window.
    pub discarded_count: u64,
}

/// The request queue and status lifecycle engine.
///
/// Generic over its persistence seam so tests run against the in-memory
/// mock and production runs against PostgreSQL.
#[derive(Debug, Clone)]
pub struct QueueEngine<S> {
    store: S,
}

impl<S: RequestStore> QueueEngine<S> {
    /// Create an engine on top of a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Accept a guest submission as a new PENDING request.
    ///
    /// The duplicate check reads the current pending/approved titles and
    /// compares case/whitespace-normalized; it is deliberately not wrapped
    /// in a store transaction (see the concurrency notes on the crate).
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] if name or title is empty after trimming
    /// - [`EngineError::DuplicateTitle`] if the title is already active
    /// - [`EngineError::Store`] if the store fails
    pub async fn submit(&self, new: NewRequest) -> Result<SongRequest> {
        let requester_name = new.requester_name.trim();
        if requester_name.is_empty() {
            return Err(EngineError::Validation {
                field: "requester_name",
            });
        }
        let song_title = new.song_title.trim();
        if song_title.is_empty() {
            return Err(EngineError::Validation {
                field: "song_title",
            });
        }

        let wanted = normalized_title(song_title);
        let taken = self.store.active_titles().await?;
        if taken.iter().any(|title| normalized_title(title) == wanted) {
            tracing::info!(song_title, "rejected duplicate submission");
            return Err(EngineError::DuplicateTitle {
                song_title: song_title.to_string(),
            });
        }

        let request = SongRequest {
            id: RequestId::new(),
            requester_name: requester_name.to_string(),
            requester_email: new.requester_email,
            song_title: song_title.to_string(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            status_changed_at: None,
            status_changed_by: None,
        };

        let created = self.store.insert(&request).await?;
        tracing::info!(id = %created.id, song_title = %created.song_title, "request submitted");
        Ok(created)
    }

    /// Move a request to `target`, recording who did it and when.
    ///
    /// Any status reaches any other status — the lifecycle is deliberately
    /// permissive so an operator can always recover a mis-click. The update
    /// is a single atomic row write; no partial state is observable.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the id does not exist
    /// - [`EngineError::Store`] if the store fails
    pub async fn transition(
        &self,
        id: RequestId,
        target: RequestStatus,
        actor: &Actor,
    ) -> Result<SongRequest> {
        let updated = self
            .store
            .set_status(id, target, Utc::now(), actor.id)
            .await?
            .ok_or(EngineError::NotFound { id })?;
        tracing::info!(id = %id, status = %target, actor = %actor.id, "request transitioned");
        Ok(updated)
    }

    /// Apply [`Self::transition`] to each id independently.
    ///
    /// Failures are collected per id and returned alongside successes; no
    /// cross-item locking, no automatic retry.
    pub async fn bulk_transition(
        &self,
        ids: &[RequestId],
        target: RequestStatus,
        actor: &Actor,
    ) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for &id in ids {
            match self.transition(id, target, actor).await {
                Ok(_) => outcome.succeeded.push(id),
                Err(err) => {
                    outcome.failed.insert(id, err);
                }
            }
        }
        outcome
    }

    /// Delete the selected rows, or everything.
    ///
    /// Delete is idempotent by nature: ids that no longer exist are ignored.
    /// Returns the number of rows actually removed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the store fails.
    pub async fn apply_delete(&self, selection: DeleteSelection) -> Result<u64> {
        let deleted = match selection {
            DeleteSelection::Ids(ids) => self.store.delete_by_ids(&ids).await?,
            DeleteSelection::All => {
                let count = self.store.delete_all().await?;
                tracing::warn!(count, "deleted all requests");
                count
            }
        };
        Ok(deleted)
    }

    /// 1-based rank of a request within the merged pending+approved set,
    /// ordered by creation time.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the id does not exist **or** the
    ///   request is not currently pending/approved (position is undefined
    ///   for discarded and played items)
    /// - [`EngineError::Store`] if the store fails
    pub async fn position_of(&self, id: RequestId) -> Result<u64> {
        let request = self
            .store
            .get(id)
            .await?
            .ok_or(EngineError::NotFound { id })?;
        if !request.status.is_active() {
            return Err(EngineError::NotFound { id });
        }
        let older = self.store.count_active_before(request.created_at).await?;
        Ok(older + 1)
    }

    /// All requests with exactly this status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the store fails.
    pub async fn list_by_status(&self, status: RequestStatus) -> Result<Vec<SongRequest>> {
        self.store.list_by_status(status).await
    }

    /// Guest-facing projection of the approved bucket: reduced fields, same
    /// first-come-first-served ordering.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the store fails.
    pub async fn queue(&self) -> Result<Vec<QueueEntry>> {
        let approved = self.store.list_by_status(RequestStatus::Approved).await?;
        Ok(approved.into_iter().map(QueueEntry::from).collect())
    }

    /// Union of skipped and removed requests, merged, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the store fails.
    pub async fn list_discarded(&self) -> Result<Vec<SongRequest>> {
        self.store
            .list_by_statuses(&RequestStatus::DISCARDED)
            .await
    }

    /// Paginated, filterable audit view over all statuses, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the store fails.
    pub async fn list_history(&self, filter: HistoryFilter) -> Result<HistoryPage> {
        self.store.search(&filter).await
    }

    /// Dashboard aggregates for the current window (local time).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the store fails.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.dashboard_stats_at(&Local::now()).await
    }

    /// Dashboard aggregates with a pinned "now", for deterministic callers.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the store fails.
    pub async fn dashboard_stats_at<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<DashboardStats> {
        let since = window::boundary(now).with_timezone(&Utc);

        let (queue_count, pending_count, played_count, discarded_count) = futures::try_join!(
            self.store
                .count_created_since(RequestStatus::Approved, since),
            self.store.count_created_since(RequestStatus::Pending, since),
            self.store
                .count_status_changed_since(&[RequestStatus::Played], since),
            self.store
                .count_status_changed_since(&RequestStatus::DISCARDED, since),
        )?;

        Ok(DashboardStats {
            queue_count,
            pending_count,
            played_count,
            discarded_count,
        })
    }
}
