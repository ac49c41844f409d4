//! Mock request store for testing.

use crate::error::{EngineError, Result};
use crate::request::{ActorId, RequestId, RequestStatus, SongRequest};
use crate::store::{HistoryFilter, HistoryPage, RequestStore};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

/// Mock request store.
///
/// Uses in-memory storage for testing. Ordering mirrors the PostgreSQL
/// store: ascending `created_at` (id as tie-break) for listings, descending
/// for history.
#[derive(Debug, Clone, Default)]
pub struct MockRequestStore {
    requests: Arc<Mutex<HashMap<RequestId, SongRequest>>>,
}

impl MockRequestStore {
    /// Create an empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RequestId, SongRequest>>> {
        self.requests
            .lock()
            .map_err(|_| EngineError::Store("mock store mutex poisoned".to_string()))
    }

    fn sorted(mut requests: Vec<SongRequest>, newest_first: bool) -> Vec<SongRequest> {
        requests.sort_by_key(|r| (r.created_at, r.id));
        if newest_first {
            requests.reverse();
        }
        requests
    }
}

impl RequestStore for MockRequestStore {
    fn insert(
        &self,
        request: &SongRequest,
    ) -> impl Future<Output = Result<SongRequest>> + Send {
        let store = self.clone();
        let request = request.clone();

        async move {
            store.lock()?.insert(request.id, request.clone());
            Ok(request)
        }
    }

    fn get(
        &self,
        id: RequestId,
    ) -> impl Future<Output = Result<Option<SongRequest>>> + Send {
        let store = self.clone();

        async move { Ok(store.lock()?.get(&id).cloned()) }
    }

    fn set_status(
        &self,
        id: RequestId,
        status: RequestStatus,
        changed_at: DateTime<Utc>,
        changed_by: ActorId,
    ) -> impl Future<Output = Result<Option<SongRequest>>> + Send {
        let store = self.clone();

        async move {
            let mut guard = store.lock()?;
            Ok(guard.get_mut(&id).map(|request| {
                request.status = status;
                request.status_changed_at = Some(changed_at);
                request.status_changed_by = Some(changed_by);
                request.clone()
            }))
        }
    }

    fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> impl Future<Output = Result<Vec<SongRequest>>> + Send {
        let store = self.clone();

        async move {
            let matching = store
                .lock()?
                .values()
                .filter(|r| r.status == status)
                .cloned()
                .collect();
            Ok(Self::sorted(matching, false))
        }
    }

    fn list_by_statuses(
        &self,
        statuses: &[RequestStatus],
    ) -> impl Future<Output = Result<Vec<SongRequest>>> + Send {
        let store = self.clone();
        let statuses = statuses.to_vec();

        async move {
            let matching = store
                .lock()?
                .values()
                .filter(|r| statuses.contains(&r.status))
                .cloned()
                .collect();
            Ok(Self::sorted(matching, false))
        }
    }

    fn active_titles(&self) -> impl Future<Output = Result<Vec<String>>> + Send {
        let store = self.clone();

        async move {
            Ok(store
                .lock()?
                .values()
                .filter(|r| r.status.is_active())
                .map(|r| r.song_title.clone())
                .collect())
        }
    }

    fn count_active_before(
        &self,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send {
        let store = self.clone();

        async move {
            let count = store
                .lock()?
                .values()
                .filter(|r| r.status.is_active() && r.created_at < created_at)
                .count();
            Ok(count as u64)
        }
    }

    fn search(
        &self,
        filter: &HistoryFilter,
    ) -> impl Future<Output = Result<HistoryPage>> + Send {
        let store = self.clone();
        let filter = filter.clone();

        async move {
            let needle = filter.search.as_deref().map(str::to_lowercase);
            let matching: Vec<SongRequest> = store
                .lock()?
                .values()
                .filter(|r| {
                    let text_matches = needle.as_deref().is_none_or(|needle| {
                        r.requester_name.to_lowercase().contains(needle)
                            || r.song_title.to_lowercase().contains(needle)
                            || r.requester_email
                                .as_deref()
                                .is_some_and(|email| email.to_lowercase().contains(needle))
                    });
                    text_matches
                        && filter.status.is_none_or(|status| r.status == status)
                        && filter.from.is_none_or(|from| r.created_at >= from)
                        && filter.to.is_none_or(|to| r.created_at <= to)
                })
                .cloned()
                .collect();

            let total = matching.len() as u64;
            let items = Self::sorted(matching, true)
                .into_iter()
                .skip(usize::try_from(filter.offset()).unwrap_or(usize::MAX))
                .take(filter.page_size as usize)
                .collect();

            Ok(HistoryPage {
                items,
                total,
                page: filter.page,
                page_size: filter.page_size,
            })
        }
    }

    fn count_created_since(
        &self,
        status: RequestStatus,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send {
        let store = self.clone();

        async move {
            let count = store
                .lock()?
                .values()
                .filter(|r| r.status == status && r.created_at >= since)
                .count();
            Ok(count as u64)
        }
    }

    fn count_status_changed_since(
        &self,
        statuses: &[RequestStatus],
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64>> + Send {
        let store = self.clone();
        let statuses = statuses.to_vec();

        async move {
            let count = store
                .lock()?
                .values()
                .filter(|r| {
                    statuses.contains(&r.status)
                        && r.status_changed_at.is_some_and(|at| at >= since)
                })
                .count();
            Ok(count as u64)
        }
    }

    fn delete_by_ids(
        &self,
        ids: &[RequestId],
    ) -> impl Future<Output = Result<u64>> + Send {
        let store = self.clone();
        let ids = ids.to_vec();

        async move {
            let mut guard = store.lock()?;
            let deleted = ids.iter().filter(|id| guard.remove(id).is_some()).count();
            Ok(deleted as u64)
        }
    }

    fn delete_all(&self) -> impl Future<Output = Result<u64>> + Send {
        let store = self.clone();

        async move {
            let mut guard = store.lock()?;
            let deleted = guard.len() as u64;
            guard.clear();
            Ok(deleted)
        }
    }
}
