// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /chat  (match, fallback, malformed body)
// - GET /events/upcoming

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use campus_event_bot::{api, AppState, ChatEngine, Event, EventStore};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

fn date(s: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Far-future dates keep these tests independent of the wall clock.
fn test_router() -> Router {
    let store = EventStore::from_events(vec![
        Event {
            tags: vec!["tech".into(), "fest".into()],
            date: date("2099-03-14"),
            venue: Some("Main Auditorium".into()),
            ..Event::new("Tech Fest")
        },
        Event {
            tags: vec!["hackathon".into()],
            date: date("2099-02-20"),
            venue: Some("Innovation Lab".into()),
            ..Event::new("CodeSprint")
        },
        Event {
            tags: vec!["music".into()],
            date: date("2099-01-05"),
            ..Event::new("Cultural Night")
        },
        Event {
            tags: vec!["alumni".into()],
            date: date("2001-01-01"),
            ..Event::new("Alumni Meet")
        },
    ]);
    api::router(AppState::new(ChatEngine::with_defaults(store)))
}

async fn post_chat(app: Router, body: String) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("build POST /chat");

    let resp = app.oneshot(req).await.expect("oneshot /chat");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse chat json");
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn api_chat_answers_with_intent_and_events() {
    let payload = json!({ "message": "Where is the hackathon venue?" });
    let (status, v) = post_chat(test_router(), payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    // Contract checks for UI consumers
    assert_eq!(v["intent"], "WHERE");
    assert_eq!(v["kind"], "match");
    assert_eq!(v["events"], json!(["CodeSprint"]));
    assert!(v["score"].as_u64().unwrap_or(0) > 0, "score missing: {v}");
    assert!(
        v["reply"].as_str().unwrap_or_default().contains("Innovation Lab"),
        "reply: {v}"
    );
}

#[tokio::test]
async fn api_chat_fallback_lists_upcoming() {
    let payload = json!({ "message": "asdkj qwoiej" });
    let (status, v) = post_chat(test_router(), payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["intent"], "UNKNOWN");
    assert_eq!(v["kind"], "fallback");
    assert_eq!(v["events"], json!(["Cultural Night", "CodeSprint", "Tech Fest"]));
    assert!(v["score"].is_null());
}

#[tokio::test]
async fn api_chat_malformed_body_is_answered_gracefully() {
    for body in ["not json", "{}", r#"{"message": 42}"#] {
        let (status, v) = post_chat(test_router(), body.to_string()).await;
        assert_eq!(status, StatusCode::OK, "body {body:?}");
        assert_eq!(v["kind"], "empty_question", "body {body:?}");
        assert_eq!(v["intent"], "UNKNOWN");
    }
}

#[tokio::test]
async fn api_upcoming_respects_limit_and_order() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/events/upcoming?limit=2")
        .body(Body::empty())
        .expect("build GET /events/upcoming");

    let resp = app.oneshot(req).await.expect("oneshot /events/upcoming");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read json")
        .to_vec();
    let arr: Json = serde_json::from_slice(&bytes).expect("parse upcoming json");
    let arr = arr.as_array().expect("upcoming response must be an array");
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["title"], "Cultural Night");
    assert_eq!(arr[0]["date"], "2099-01-05");
    assert_eq!(arr[1]["title"], "CodeSprint");
}
