use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

use hotline::router::{HotlineState, hotline_router};

const TEST_KEY: &str = "test-key";

async fn test_app(tag: &str) -> Router {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "hotline-routes-{tag}-{}-{nanos}.sqlite",
        std::process::id()
    ));

    let database_url = format!("sqlite:{}", temp_path.display());
    let db = hotline::db::connect(&database_url)
        .await
        .expect("failed to open temp database");

    let state = HotlineState::new(db, Arc::from(TEST_KEY));
    hotline_router(state)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-hotline-key", TEST_KEY)
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not JSON")
}

#[tokio::test]
async fn create_then_fetch_hotline() {
    let app = test_app("create-fetch").await;

    let resp = app
        .clone()
        .oneshot(post_json(
            "/hotlines",
            json!({
                "name": "Conference CoC Hotline",
                "slug": "pycon",
                "voice_greeting": "Thank you for calling.",
                "user": "margaret"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    assert_eq!(created["slug"], "pycon");
    assert_eq!(created["country"], "US");

    let resp = app.clone().oneshot(get_req("/hotlines/pycon")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = json_body(resp).await;
    assert_eq!(fetched["name"], "Conference CoC Hotline");

    // Creation is audited.
    let resp = app
        .clone()
        .oneshot(get_req("/hotlines/pycon/auditlog"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let log = json_body(resp).await;
    assert_eq!(log[0]["kind"], "hotline_created");
    assert_eq!(log[0]["user"], "margaret");
}

#[tokio::test]
async fn duplicate_slug_returns_conflict() {
    let app = test_app("duplicate-slug").await;

    let body = json!({ "name": "Line", "slug": "taken" });
    let resp = app
        .clone()
        .oneshot(post_json("/hotlines", body.clone()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.clone().oneshot(post_json("/hotlines", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let err = json_body(resp).await;
    assert_eq!(err["error"]["code"], "DUPLICATE_SLUG");
}

#[tokio::test]
async fn unknown_hotline_is_not_found() {
    let app = test_app("not-found").await;

    let resp = app.clone().oneshot(get_req("/hotlines/ghost")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let err = json_body(resp).await;
    assert_eq!(err["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn writes_require_the_api_key() {
    let app = test_app("auth").await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hotlines")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "name": "Line", "slug": "locked" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Reads stay open.
    let resp = app.clone().oneshot(get_req("/hotlines")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn member_lifecycle_over_http() {
    let app = test_app("members").await;

    let resp = app
        .clone()
        .oneshot(post_json(
            "/hotlines",
            json!({ "name": "Line", "slug": "conf" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/hotlines/conf/members",
            json!({ "name": "Grace", "number": "+15105550150" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let member = json_body(resp).await;
    assert_eq!(member["verified"], false);
    let member_id = member["id"].as_i64().unwrap();

    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/hotlines/conf/members/{member_id}/verify"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .clone()
        .oneshot(get_req("/hotlines/conf/members"))
        .await
        .unwrap();
    let members = json_body(resp).await;
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["verified"], true);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/hotlines/conf/members/{member_id}"))
                .header("x-hotline-key", TEST_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .clone()
        .oneshot(get_req("/hotlines/conf/members"))
        .await
        .unwrap();
    let members = json_body(resp).await;
    assert!(members.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn member_removal_cannot_cross_hotlines() {
    let app = test_app("cross-tenant").await;

    for slug in ["tenant-a", "tenant-b"] {
        let resp = app
            .clone()
            .oneshot(post_json(
                "/hotlines",
                json!({ "name": "Line", "slug": slug }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = app
        .clone()
        .oneshot(post_json(
            "/hotlines/tenant-b/members",
            json!({ "name": "Grace", "number": "+15105550151" }),
        ))
        .await
        .unwrap();
    let member = json_body(resp).await;
    let member_id = member["id"].as_i64().unwrap();

    // Deleting through the other hotline's path must not touch the row.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/hotlines/tenant-a/members/{member_id}"))
                .header("x-hotline-key", TEST_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .clone()
        .oneshot(get_req("/hotlines/tenant-b/members"))
        .await
        .unwrap();
    let members = json_body(resp).await;
    assert_eq!(members.as_array().unwrap().len(), 1);

    // Nothing was attributed to tenant-a beyond its creation.
    let resp = app
        .clone()
        .oneshot(get_req("/hotlines/tenant-a/auditlog"))
        .await
        .unwrap();
    let log = json_body(resp).await;
    assert_eq!(log.as_array().unwrap().len(), 1);
    assert_eq!(log[0]["kind"], "hotline_created");
}

#[tokio::test]
async fn malformed_body_gets_the_error_envelope() {
    let app = test_app("bad-body").await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hotlines")
                .header("content-type", "application/json")
                .header("x-hotline-key", TEST_KEY)
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err = json_body(resp).await;
    assert_eq!(err["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn number_assignment_and_blocklist_over_http() {
    let app = test_app("number-block").await;

    let resp = app
        .clone()
        .oneshot(post_json(
            "/hotlines",
            json!({ "name": "Line", "slug": "main" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/hotlines/main/number",
            json!({
                "number": "+15105550160",
                "features": { "voice": true, "sms": false }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = json_body(resp).await;
    assert_eq!(updated["primary_number"], "+15105550160");

    // Assignment is audited with the features payload attached.
    let resp = app
        .clone()
        .oneshot(get_req("/hotlines/main/auditlog"))
        .await
        .unwrap();
    let log = json_body(resp).await;
    assert_eq!(log[0]["kind"], "number_assigned");
    assert!(log[0]["metadata"].as_str().unwrap().contains("voice"));

    let resp = app
        .clone()
        .oneshot(post_json(
            "/hotlines/main/blocklist",
            json!({ "number": "+15105550161", "blocked_by": "margaret" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(get_req("/hotlines/main/blocklist"))
        .await
        .unwrap();
    let blocked = json_body(resp).await;
    assert_eq!(blocked[0]["number"], "+15105550161");

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/hotlines/main/blocklist/+15105550161")
                .header("x-hotline-key", TEST_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .clone()
        .oneshot(get_req("/hotlines/main/blocklist"))
        .await
        .unwrap();
    let blocked = json_body(resp).await;
    assert!(blocked.as_array().unwrap().is_empty());

    // Release the number and check the assignment is gone.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/hotlines/main/number")
                .header("x-hotline-key", TEST_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let released = json_body(resp).await;
    assert_eq!(released["primary_number"], Value::Null);
    assert_eq!(released["primary_number_id"], Value::Null);

    let resp = app
        .clone()
        .oneshot(get_req("/hotlines/main/auditlog"))
        .await
        .unwrap();
    let log = json_body(resp).await;
    assert_eq!(log[0]["kind"], "number_released");

    // Releasing with nothing assigned is a 404.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/hotlines/main/number")
                .header("x-hotline-key", TEST_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
