//! PostgreSQL implementation of the request store.

use chrono::{DateTime, Utc};
use encore_core::{
    ActorId, EngineError, HistoryFilter, HistoryPage, RequestId, RequestStatus, RequestStore,
    Result, SongRequest,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const COLUMNS: &str = "id, requester_name, requester_email, song_title, status, \
                       created_at, status_changed_at, status_changed_by";

/// PostgreSQL request store.
///
/// All listings order by `(created_at, id)` so rows created in the same
/// instant still come back in a stable order.
#[derive(Debug, Clone)]
pub struct PostgresRequestStore {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

/// Row shape shared by every query that returns full requests.
#[derive(sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    requester_name: String,
    requester_email: Option<String>,
    song_title: String,
    status: RequestStatus,
    created_at: DateTime<Utc>,
    status_changed_at: Option<DateTime<Utc>>,
    status_changed_by: Option<Uuid>,
}

impl From<RequestRow> for SongRequest {
    fn from(row: RequestRow) -> Self {
        Self {
            id: RequestId(row.id),
            requester_name: row.requester_name,
            requester_email: row.requester_email,
            song_title: row.song_title,
            status: row.status,
            created_at: row.created_at,
            status_changed_at: row.status_changed_at,
            status_changed_by: row.status_changed_by.map(ActorId),
        }
    }
}

fn store_error(context: &str, err: &sqlx::Error) -> EngineError {
    EngineError::Store(format!("{context}: {err}"))
}

fn non_negative(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Append the history filter conditions to a query that already ends in a
/// `WHERE` clause.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &HistoryFilter) {
    if let Some(search) = filter.search.as_deref().map(str::trim) {
        if !search.is_empty() {
            let pattern = format!("%{search}%");
            builder
                .push(" AND (requester_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR requester_email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR song_title ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(from) = filter.from {
        builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND created_at <= ").push_bind(to);
    }
}

impl PostgresRequestStore {
    /// Create a new store over an existing connection pool.
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| EngineError::Store(format!("migration failed: {e}")))?;
        Ok(())
    }
}

impl RequestStore for PostgresRequestStore {
    async fn insert(&self, request: &SongRequest) -> Result<SongRequest> {
        sqlx::query(
            r"
            INSERT INTO song_requests
                (id, requester_name, requester_email, song_title, status,
                 created_at, status_changed_at, status_changed_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(request.id.0)
        .bind(&request.requester_name)
        .bind(&request.requester_email)
        .bind(&request.song_title)
        .bind(request.status)
        .bind(request.created_at)
        .bind(request.status_changed_at)
        .bind(request.status_changed_by.map(|actor| actor.0))
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("failed to insert request", &e))?;

        Ok(request.clone())
    }

    async fn get(&self, id: RequestId) -> Result<Option<SongRequest>> {
        let row: Option<RequestRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM song_requests WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("failed to get request", &e))?;

        Ok(row.map(SongRequest::from))
    }

    async fn set_status(
        &self,
        id: RequestId,
        status: RequestStatus,
        changed_at: DateTime<Utc>,
        changed_by: ActorId,
    ) -> Result<Option<SongRequest>> {
        let row: Option<RequestRow> = sqlx::query_as(&format!(
            r"
            UPDATE song_requests
            SET status = $2,
                status_changed_at = $3,
                status_changed_by = $4
            WHERE id = $1
            RETURNING {COLUMNS}
            ",
        ))
        .bind(id.0)
        .bind(status)
        .bind(changed_at)
        .bind(changed_by.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("failed to update status", &e))?;

        Ok(row.map(SongRequest::from))
    }

    async fn list_by_status(&self, status: RequestStatus) -> Result<Vec<SongRequest>> {
        let rows: Vec<RequestRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM song_requests WHERE status = $1 ORDER BY created_at, id"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("failed to list requests", &e))?;

        Ok(rows.into_iter().map(SongRequest::from).collect())
    }

    async fn list_by_statuses(&self, statuses: &[RequestStatus]) -> Result<Vec<SongRequest>> {
        let rows: Vec<RequestRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM song_requests WHERE status = ANY($1) ORDER BY created_at, id"
        ))
        .bind(statuses.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("failed to list requests", &e))?;

        Ok(rows.into_iter().map(SongRequest::from).collect())
    }

    async fn active_titles(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            "SELECT song_title FROM song_requests WHERE status IN ('PENDING', 'APPROVED')",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("failed to list active titles", &e))
    }

    async fn count_active_before(&self, created_at: DateTime<Utc>) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM song_requests
            WHERE status IN ('PENDING', 'APPROVED') AND created_at < $1
            ",
        )
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("failed to count active requests", &e))?;

        Ok(non_negative(count))
    }

    async fn search(&self, filter: &HistoryFilter) -> Result<HistoryPage> {
        let mut count_query =
            QueryBuilder::new("SELECT COUNT(*) FROM song_requests WHERE TRUE");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| store_error("failed to count history", &e))?;

        let mut page_query = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM song_requests WHERE TRUE"
        ));
        push_filters(&mut page_query, filter);
        page_query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(filter.page_size))
            .push(" OFFSET ")
            .push_bind(i64::try_from(filter.offset()).unwrap_or(i64::MAX));
        let rows: Vec<RequestRow> = page_query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("failed to search history", &e))?;

        Ok(HistoryPage {
            items: rows.into_iter().map(SongRequest::from).collect(),
            total: non_negative(total),
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    async fn count_created_since(
        &self,
        status: RequestStatus,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM song_requests WHERE status = $1 AND created_at >= $2",
        )
        .bind(status)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("failed to count by creation time", &e))?;

        Ok(non_negative(count))
    }

    async fn count_status_changed_since(
        &self,
        statuses: &[RequestStatus],
        since: DateTime<Utc>,
    ) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM song_requests
            WHERE status = ANY($1) AND status_changed_at >= $2
            ",
        )
        .bind(statuses.to_vec())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("failed to count by change time", &e))?;

        Ok(non_negative(count))
    }

    async fn delete_by_ids(&self, ids: &[RequestId]) -> Result<u64> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let result = sqlx::query("DELETE FROM song_requests WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("failed to delete requests", &e))?;

        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM song_requests")
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("failed to delete all requests", &e))?;

        tracing::warn!(deleted = result.rows_affected(), "wiped song_requests table");
        Ok(result.rows_affected())
    }
}
