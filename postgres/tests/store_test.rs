//! Integration test for the PostgreSQL store.
//!
//! Needs a real database:
//!
//! ```text
//! DATABASE_URL=postgresql://localhost/encore_test \
//!     cargo test -p encore-postgres -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use chrono::{DateTime, Utc};
use encore_core::{
    ActorId, HistoryFilter, RequestId, RequestStatus, RequestStore, SongRequest,
};
use encore_postgres::PostgresRequestStore;
use sqlx::PgPool;
use uuid::Uuid;

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().expect("test timestamp")
}

fn request(song: &str, status: RequestStatus, created_at: DateTime<Utc>) -> SongRequest {
    SongRequest {
        id: RequestId::new(),
        requester_name: "Tester".to_string(),
        requester_email: Some("tester@example.com".to_string()),
        song_title: song.to_string(),
        status,
        created_at,
        status_changed_at: None,
        status_changed_by: None,
    }
}

/// Single sequential scenario so parallel test execution cannot race on the
/// shared table.
#[tokio::test]
#[ignore = "requires PostgreSQL; set DATABASE_URL and run with --ignored"]
async fn store_round_trip() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("connect");
    let store = PostgresRequestStore::new(pool);
    store.migrate().await.expect("migrate");
    store.delete_all().await.expect("clean slate");

    // Insert out of creation order to prove ordering comes from the column.
    let second = store
        .insert(&request("Second", RequestStatus::Pending, utc("2024-01-01T11:00:00Z")))
        .await
        .expect("insert");
    let first = store
        .insert(&request("First", RequestStatus::Pending, utc("2024-01-01T10:00:00Z")))
        .await
        .expect("insert");
    let skipped = store
        .insert(&request("Skipped", RequestStatus::Skipped, utc("2024-01-01T09:00:00Z")))
        .await
        .expect("insert");

    // get
    let fetched = store.get(first.id).await.expect("get").expect("exists");
    assert_eq!(fetched, first);
    assert!(store.get(RequestId::new()).await.expect("get").is_none());

    // set_status is atomic and returns the updated row.
    let actor = ActorId(Uuid::new_v4());
    let changed_at = utc("2024-01-01T12:00:00Z");
    let updated = store
        .set_status(second.id, RequestStatus::Approved, changed_at, actor)
        .await
        .expect("set_status")
        .expect("exists");
    assert_eq!(updated.status, RequestStatus::Approved);
    assert_eq!(updated.status_changed_at, Some(changed_at));
    assert_eq!(updated.status_changed_by, Some(actor));
    assert!(
        store
            .set_status(RequestId::new(), RequestStatus::Played, changed_at, actor)
            .await
            .expect("set_status")
            .is_none()
    );

    // Listings are oldest-first and status-exact.
    let pending = store
        .list_by_status(RequestStatus::Pending)
        .await
        .expect("list");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, first.id);

    let active = store
        .list_by_statuses(&RequestStatus::ACTIVE)
        .await
        .expect("list");
    let titles: Vec<_> = active.iter().map(|r| r.song_title.as_str()).collect();
    assert_eq!(titles, ["First", "Second"]);

    let mut active_titles = store.active_titles().await.expect("titles");
    active_titles.sort();
    assert_eq!(active_titles, ["First", "Second"]);

    assert_eq!(
        store
            .count_active_before(utc("2024-01-01T11:00:00Z"))
            .await
            .expect("count"),
        1
    );

    // History search: text, status, date range, pagination.
    let page = store
        .search(&HistoryFilter::default())
        .await
        .expect("search");
    assert_eq!(page.total, 3);
    let titles: Vec<_> = page.items.iter().map(|r| r.song_title.as_str()).collect();
    assert_eq!(titles, ["Second", "First", "Skipped"]);

    let page = store
        .search(&HistoryFilter {
            search: Some("fIrSt".to_string()),
            ..HistoryFilter::default()
        })
        .await
        .expect("search");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, first.id);

    let page = store
        .search(&HistoryFilter {
            status: Some(RequestStatus::Skipped),
            ..HistoryFilter::default()
        })
        .await
        .expect("search");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, skipped.id);

    let page = store
        .search(&HistoryFilter {
            from: Some(utc("2024-01-01T10:00:00Z")),
            to: Some(utc("2024-01-01T10:30:00Z")),
            ..HistoryFilter::default()
        })
        .await
        .expect("search");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, first.id);

    let page = store
        .search(&HistoryFilter {
            page: 2,
            page_size: 2,
            ..HistoryFilter::default()
        })
        .await
        .expect("search");
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].song_title, "Skipped");

    // Window counts.
    assert_eq!(
        store
            .count_created_since(RequestStatus::Pending, utc("2024-01-01T00:00:00Z"))
            .await
            .expect("count"),
        1
    );
    assert_eq!(
        store
            .count_status_changed_since(&[RequestStatus::Approved], utc("2024-01-01T11:30:00Z"))
            .await
            .expect("count"),
        1
    );
    assert_eq!(
        store
            .count_status_changed_since(&RequestStatus::DISCARDED, utc("2024-01-01T00:00:00Z"))
            .await
            .expect("count"),
        0
    );

    // Deletes: explicit ids ignore missing rows; delete_all wipes.
    let deleted = store
        .delete_by_ids(&[skipped.id, RequestId::new()])
        .await
        .expect("delete");
    assert_eq!(deleted, 1);

    let deleted = store.delete_all().await.expect("delete all");
    assert_eq!(deleted, 2);
    let page = store
        .search(&HistoryFilter::default())
        .await
        .expect("search");
    assert_eq!(page.total, 0);
}
