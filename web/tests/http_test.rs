//! End-to-end HTTP tests against the mock store and mock actor provider.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use axum_test::TestServer;
use encore_core::mocks::MockRequestStore;
use encore_core::{
    Actor, ActorId, ActorRole, QueueEngine, RequestId, RequestStatus, RequestStore, SongRequest,
};
use encore_web::auth::MockActorProvider;
use encore_web::{app_router, AppState};
use http::header::AUTHORIZATION;
use http::HeaderValue;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

const OPERATOR_TOKEN: &str = "operator-token";
const GUEST_TOKEN: &str = "guest-token";

fn operator_header() -> HeaderValue {
    HeaderValue::from_static("Bearer operator-token")
}

struct TestApp {
    server: TestServer,
    store: MockRequestStore,
    operator: Actor,
}

fn test_app() -> TestApp {
    let store = MockRequestStore::new();
    let operator = Actor {
        id: ActorId(Uuid::new_v4()),
        role: ActorRole::Operator,
    };
    let guest = Actor {
        id: ActorId(Uuid::new_v4()),
        role: ActorRole::Guest,
    };
    let actors = MockActorProvider::new()
        .with_actor(OPERATOR_TOKEN, operator)
        .with_actor(GUEST_TOKEN, guest);

    let state = AppState::new(QueueEngine::new(store.clone()), Arc::new(actors));
    let server = TestServer::new(app_router(state)).expect("test server");

    TestApp {
        server,
        store,
        operator,
    }
}

async fn submit(server: &TestServer, name: &str, song: &str) -> SongRequest {
    let response = server
        .post("/api/requests")
        .json(&json!({ "name": name, "song": song }))
        .await;
    response.assert_status(http::StatusCode::CREATED);
    response.json::<SongRequest>()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("ok");
}

#[tokio::test]
async fn submit_creates_a_pending_request() {
    let app = test_app();

    let response = app
        .server
        .post("/api/requests")
        .json(&json!({
            "name": "Alice",
            "song": "Imagine",
            "email": "alice@example.com"
        }))
        .await;

    response.assert_status(http::StatusCode::CREATED);
    let created = response.json::<SongRequest>();
    assert_eq!(created.status, RequestStatus::Pending);
    assert_eq!(created.requester_name, "Alice");
    assert_eq!(created.requester_email.as_deref(), Some("alice@example.com"));
    assert_eq!(created.status_changed_at, None);
    assert_eq!(created.status_changed_by, None);
}

#[tokio::test]
async fn submit_rejects_duplicates_and_empty_fields() {
    let app = test_app();
    submit(&app.server, "Alice", "Imagine").await;

    // Duplicate (case/whitespace-insensitive) while active.
    let response = app
        .server
        .post("/api/requests")
        .json(&json!({ "name": "Bob", "song": "  IMAGINE " }))
        .await;
    response.assert_status(http::StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "CONFLICT");

    // Empty required field.
    let response = app
        .server
        .post("/api/requests")
        .json(&json!({ "name": "   ", "song": "Yesterday" }))
        .await;
    response.assert_status(http::StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // An empty email string counts as absent.
    let response = app
        .server
        .post("/api/requests")
        .json(&json!({ "name": "Carol", "song": "Yesterday", "email": "  " }))
        .await;
    response.assert_status(http::StatusCode::CREATED);
    assert_eq!(response.json::<SongRequest>().requester_email, None);
}

#[tokio::test]
async fn queue_is_public_ordered_and_reduced() {
    let app = test_app();
    let first = submit(&app.server, "Alice", "First song").await;
    let second = submit(&app.server, "Bob", "Second song").await;

    // Approve both through the operator endpoint, out of order.
    for id in [second.id, first.id] {
        app.server
            .patch(&format!("/api/admin/requests/{id}"))
            .add_header(AUTHORIZATION, operator_header())
            .json(&json!({ "status": "APPROVED" }))
            .await
            .assert_status_ok();
    }

    let response = app.server.get("/api/queue").await;
    response.assert_status_ok();
    let entries = response.json::<Vec<Value>>();
    assert_eq!(entries.len(), 2);

    // Oldest submission first, regardless of approval order.
    assert_eq!(entries[0]["song_title"], "First song");
    assert_eq!(entries[1]["song_title"], "Second song");

    // Reduced projection: no email, no operator attribution.
    assert!(entries[0].get("requester_email").is_none());
    assert!(entries[0].get("status_changed_by").is_none());
}

#[tokio::test]
async fn position_tracks_the_active_line() {
    let app = test_app();
    let first = submit(&app.server, "Alice", "First song").await;
    let second = submit(&app.server, "Bob", "Second song").await;

    let response = app
        .server
        .get(&format!("/api/requests/{}/position", second.id))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["position"], 2);

    // Played requests have no position.
    app.server
        .patch(&format!("/api/admin/requests/{}", first.id))
        .add_header(AUTHORIZATION, operator_header())
        .json(&json!({ "status": "PLAYED" }))
        .await
        .assert_status_ok();
    let response = app
        .server
        .get(&format!("/api/requests/{}/position", first.id))
        .await;
    response.assert_status(http::StatusCode::NOT_FOUND);

    // The second request moves up.
    let response = app
        .server
        .get(&format!("/api/requests/{}/position", second.id))
        .await;
    assert_eq!(response.json::<Value>()["position"], 1);
}

#[tokio::test]
async fn admin_endpoints_require_an_operator() {
    let app = test_app();

    // No token.
    let response = app
        .server
        .get("/api/admin/requests")
        .add_query_param("status", "PENDING")
        .await;
    response.assert_status(http::StatusCode::UNAUTHORIZED);

    // Unknown token.
    let response = app
        .server
        .get("/api/admin/requests")
        .add_query_param("status", "PENDING")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer nope"))
        .await;
    response.assert_status(http::StatusCode::FORBIDDEN);

    // Known token, wrong role.
    let response = app
        .server
        .get("/api/admin/requests")
        .add_query_param("status", "PENDING")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer guest-token"))
        .await;
    response.assert_status(http::StatusCode::FORBIDDEN);

    // Operator.
    let response = app
        .server
        .get("/api/admin/requests")
        .add_query_param("status", "PENDING")
        .add_header(AUTHORIZATION, operator_header())
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn transition_updates_status_with_attribution() {
    let app = test_app();
    let request = submit(&app.server, "Alice", "Imagine").await;

    let response = app
        .server
        .patch(&format!("/api/admin/requests/{}", request.id))
        .add_header(AUTHORIZATION, operator_header())
        .json(&json!({ "status": "APPROVED" }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<SongRequest>();
    assert_eq!(updated.status, RequestStatus::Approved);
    assert_eq!(updated.status_changed_by, Some(app.operator.id));
    assert!(updated.status_changed_at.is_some());

    // Unknown id.
    let response = app
        .server
        .patch(&format!("/api/admin/requests/{}", RequestId::new()))
        .add_header(AUTHORIZATION, operator_header())
        .json(&json!({ "status": "APPROVED" }))
        .await;
    response.assert_status(http::StatusCode::NOT_FOUND);

    // Value outside the enumeration.
    let response = app
        .server
        .patch(&format!("/api/admin/requests/{}", request.id))
        .add_header(AUTHORIZATION, operator_header())
        .json(&json!({ "status": "ENCORED" }))
        .await;
    response.assert_status(http::StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn bulk_transition_reports_partial_failures() {
    let app = test_app();
    let a = submit(&app.server, "Alice", "Song A").await;
    let b = submit(&app.server, "Bob", "Song B").await;
    let missing = RequestId::new();

    let response = app
        .server
        .post("/api/admin/requests/bulk")
        .add_header(AUTHORIZATION, operator_header())
        .json(&json!({
            "ids": [a.id, missing, b.id],
            "status": "APPROVED"
        }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    let succeeded = body["succeeded"].as_array().unwrap();
    assert_eq!(succeeded.len(), 2);
    let failed = body["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["id"], json!(missing));
    assert_eq!(failed[0]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn delete_supports_id_sets_and_the_all_sentinel() {
    let app = test_app();
    let keep = submit(&app.server, "Alice", "Keep me").await;
    let goner = submit(&app.server, "Bob", "Drop me").await;

    // Explicit ids; a missing id is silently ignored.
    let response = app
        .server
        .delete("/api/admin/requests")
        .add_header(AUTHORIZATION, operator_header())
        .json(&json!({ "ids": [goner.id, RequestId::new()] }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["deleted"], 1);
    assert!(app.store.get(keep.id).await.expect("get").is_some());

    // Unknown sentinel is rejected.
    let response = app
        .server
        .delete("/api/admin/requests")
        .add_header(AUTHORIZATION, operator_header())
        .json(&json!({ "ids": "EVERYTHING" }))
        .await;
    response.assert_status(http::StatusCode::BAD_REQUEST);

    // The ALL sentinel wipes the table regardless of status.
    submit(&app.server, "Carol", "Another").await;
    let response = app
        .server
        .delete("/api/admin/requests")
        .add_header(AUTHORIZATION, operator_header())
        .json(&json!({ "ids": "ALL" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["deleted"], 2);
    assert!(app.store.get(keep.id).await.expect("get").is_none());
}

#[tokio::test]
async fn history_filters_and_paginates() {
    let app = test_app();
    submit(&app.server, "Alice", "Alpha").await;
    let beta = submit(&app.server, "Bob", "Beta").await;
    submit(&app.server, "Carol", "Gamma").await;

    app.server
        .patch(&format!("/api/admin/requests/{}", beta.id))
        .add_header(AUTHORIZATION, operator_header())
        .json(&json!({ "status": "PLAYED" }))
        .await
        .assert_status_ok();

    // Unfiltered: everything, with the total for page-count computation.
    let response = app
        .server
        .get("/api/admin/history")
        .add_header(AUTHORIZATION, operator_header())
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 20);

    // Status filter.
    let response = app
        .server
        .get("/api/admin/history")
        .add_query_param("status", "PLAYED")
        .add_header(AUTHORIZATION, operator_header())
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["song_title"], "Beta");

    // Case-insensitive text search across requester names.
    let response = app
        .server
        .get("/api/admin/history")
        .add_query_param("search", "cAr")
        .add_header(AUTHORIZATION, operator_header())
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["song_title"], "Gamma");

    // Pagination.
    let response = app
        .server
        .get("/api/admin/history")
        .add_query_param("page", "2")
        .add_query_param("page_size", "2")
        .add_header(AUTHORIZATION, operator_header())
        .await;
    let body = response.json::<Value>();
    assert_eq!(body["total"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn stats_count_the_current_window() {
    let app = test_app();
    let played = submit(&app.server, "Alice", "Played song").await;
    let skipped = submit(&app.server, "Bob", "Skipped song").await;
    submit(&app.server, "Carol", "Waiting song").await;
    let approved = submit(&app.server, "Dave", "Queued song").await;

    for (id, status) in [
        (played.id, "PLAYED"),
        (skipped.id, "SKIPPED"),
        (approved.id, "APPROVED"),
    ] {
        app.server
            .patch(&format!("/api/admin/requests/{id}"))
            .add_header(AUTHORIZATION, operator_header())
            .json(&json!({ "status": status }))
            .await
            .assert_status_ok();
    }

    // Everything above happened "now", well inside the window that opened
    // yesterday at 03:00.
    let response = app
        .server
        .get("/api/admin/stats")
        .add_header(AUTHORIZATION, operator_header())
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["pending_count"], 1);
    assert_eq!(body["queue_count"], 1);
    assert_eq!(body["played_count"], 1);
    assert_eq!(body["discarded_count"], 1);
}
