//! Persistence seam for the queue engine.
//!
//! [`RequestStore`] abstracts the durable request table behind primitive,
//! composable queries; the engine owns all semantics (duplicate policy,
//! position arithmetic, window boundaries) and the store only reads and
//! writes rows. Network-level timeouts are the store implementation's
//! responsibility, not the engine's.

use crate::error::Result;
use crate::request::{ActorId, RequestId, RequestStatus, SongRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Default history page size, matching the operator dashboard.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Filter for the paginated audit view over all statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    /// Case-insensitive substring match across name, email and title.
    pub search: Option<String>,

    /// Exact status filter.
    pub status: Option<RequestStatus>,

    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,

    /// Inclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,

    /// 1-based page number.
    pub page: u32,

    /// Rows per page.
    pub page_size: u32,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            from: None,
            to: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl HistoryFilter {
    /// Row offset of the requested page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * (self.page_size as u64)
    }
}

/// One page of history results plus the total matching count, so callers can
/// compute the page count themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    /// Requests on this page, newest first.
    pub items: Vec<SongRequest>,

    /// Total rows matching the filter across all pages.
    pub total: u64,

    /// Echo of the requested page number.
    pub page: u32,

    /// Echo of the requested page size.
    pub page_size: u32,
}

impl HistoryPage {
    /// Number of pages the filter spans.
    #[must_use]
    pub const fn page_count(&self) -> u64 {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size as u64)
        }
    }
}

/// Durable request table.
///
/// Implementations must provide atomic single-row updates for
/// [`RequestStore::set_status`]; nothing else requires transactional
/// behavior. All listings order by `created_at` ascending unless stated
/// otherwise.
pub trait RequestStore: Send + Sync {
    /// Insert a freshly created request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the write fails.
    fn insert(
        &self,
        request: &SongRequest,
    ) -> impl Future<Output = Result<SongRequest>> + Send;

    /// Fetch a request by id, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the query fails.
    fn get(
        &self,
        id: RequestId,
    ) -> impl Future<Output = Result<Option<SongRequest>>> + Send;

    /// Atomically set status and attribution on one row, returning the
    /// updated row, or `None` if the id does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the write fails.
    fn set_status(
        &self,
        id: RequestId,
        status: RequestStatus,
        changed_at: DateTime<Utc>,
        changed_by: ActorId,
    ) -> impl Future<Output = Result<Option<SongRequest>>> + Send;

    /// All requests with exactly this status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the query fails.
    fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> impl Future<Output = Result<Vec<SongRequest>>> + Send;

    /// All requests whose status is in `statuses`, merged, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the query fails.
    fn list_by_statuses(
        &self,
        statuses: &[RequestStatus],
    ) -> impl Future<Output = Result<Vec<SongRequest>>> + Send;

    /// Titles of all pending and approved requests, unordered.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the query fails.
    fn active_titles(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Count pending/approved requests created strictly before `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the query fails.
    fn count_active_before(
        &self,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Filtered, paginated view over all statuses, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the query fails.
    fn search(
        &self,
        filter: &HistoryFilter,
    ) -> impl Future<Output = Result<HistoryPage>> + Send;

    /// Count requests with this status created at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the query fails.
    fn count_created_since(
        &self,
        status: RequestStatus,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Count requests whose status is in `statuses` and whose last
    /// transition happened at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the query fails.
    fn count_status_changed_since(
        &self,
        statuses: &[RequestStatus],
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Delete exactly these rows; missing ids are ignored.
    ///
    /// Returns the number of rows actually deleted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the write fails.
    fn delete_by_ids(
        &self,
        ids: &[RequestId],
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Delete every request unconditionally.
    ///
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Store`] if the write fails.
    fn delete_all(&self) -> impl Future<Output = Result<u64>> + Send;
}
