mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{OfficeSeed, TestApp};
use permit_finder::db::queries;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use serial_test::serial;

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn user_event(event_type: &str, first: &str, last: &str) -> serde_json::Value {
    json!({
        "type": event_type,
        "data": {
            "id": "user_hook",
            "email_addresses": [{ "email_address": "hook@test.com" }],
            "first_name": first,
            "last_name": last,
            "image_url": "https://img.test/hook.png",
            "phone_numbers": [{ "phone_number": "+15550100" }],
        }
    })
}

// ─── Lifecycle events ────────────────────────────────────────────────────────

#[serial]
#[tokio::test]
async fn user_created_and_updated_sync_profile() {
    let app = TestApp::new().await;

    let resp = app
        .request(TestApp::signed_webhook(&user_event("user.created", "Grace", ""), now()))
        .await;
    resp.assert_status(StatusCode::OK);
    let json: serde_json::Value = resp.json();
    assert_eq!(json["received"], true);

    let user = queries::users::find_by_external_id(&app.state.db, "user_hook")
        .await
        .unwrap()
        .expect("user not synced");
    assert_eq!(user.email, "hook@test.com");
    assert_eq!(user.name.as_deref(), Some("Grace"));
    assert_eq!(user.phone.as_deref(), Some("+15550100"));

    queries::users::promote_to_admin(&app.state.db, "hook@test.com")
        .await
        .unwrap();

    app.request(TestApp::signed_webhook(
        &user_event("user.updated", "Grace", "Hopper"),
        now(),
    ))
    .await
    .assert_status(StatusCode::OK);

    let user = queries::users::find_by_external_id(&app.state.db, "user_hook")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.name.as_deref(), Some("Grace Hopper"));
    assert_eq!(user.role, "admin");
    assert_eq!(
        entity::user::Entity::find().count(&app.state.db).await.unwrap(),
        1
    );
}

#[serial]
#[tokio::test]
async fn user_deleted_removes_data_and_is_idempotent() {
    let app = TestApp::new().await;
    let office_id = app.insert_office(OfficeSeed::named("Alpha Permits")).await;
    let (token, _) = app.sign_in("user_gone", "gone@test.com").await;
    app.create_application(&token, &office_id).await;

    let event = json!({ "type": "user.deleted", "data": { "id": "user_gone", "deleted": true } });
    app.request(TestApp::signed_webhook(&event, now()))
        .await
        .assert_status(StatusCode::OK);

    let db = &app.state.db;
    assert_eq!(entity::user::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(entity::application::Entity::find().count(db).await.unwrap(), 0);

    app.request(TestApp::signed_webhook(&event, now()))
        .await
        .assert_status(StatusCode::OK);
}

#[serial]
#[tokio::test]
async fn unknown_event_is_acknowledged() {
    let app = TestApp::new().await;
    let event = json!({ "type": "session.created", "data": { "id": "sess_1" } });
    let resp = app.request(TestApp::signed_webhook(&event, now())).await;
    resp.assert_status(StatusCode::OK);
    let json: serde_json::Value = resp.json();
    assert_eq!(json["received"], true);
}

// ─── Signature checks ────────────────────────────────────────────────────────

#[serial]
#[tokio::test]
async fn rejects_missing_headers() {
    let app = TestApp::new().await;
    let req = Request::builder()
        .method("POST")
        .uri("/api/webhooks/clerk/users")
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"type":"user.created","data":{}}"#))
        .unwrap();

    let resp = app.request(req).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = resp.json();
    assert_eq!(json["error"], "missing_webhook_headers");
}

#[serial]
#[tokio::test]
async fn rejects_bad_signature_and_stale_timestamp() {
    let app = TestApp::new().await;
    let event = user_event("user.created", "Eve", "");

    let mut req = TestApp::signed_webhook(&event, now());
    req.headers_mut()
        .insert("svix-signature", "v1,AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=".parse().unwrap());
    let resp = app.request(req).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = resp.json();
    assert_eq!(json["error"], "invalid_webhook_signature");

    let stale = TestApp::signed_webhook(&event, now() - 3600);
    app.request(stale)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    for extreme in [i64::MIN, i64::MAX] {
        app.request(TestApp::signed_webhook(&event, extreme))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    assert!(queries::users::find_by_external_id(&app.state.db, "user_hook")
        .await
        .unwrap()
        .is_none());
}

#[serial]
#[tokio::test]
async fn unconfigured_secret_is_500() {
    let app = TestApp::with_webhooks(false).await;
    let event = user_event("user.created", "Eve", "");
    let resp = app.request(TestApp::signed_webhook(&event, now())).await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[serial]
#[tokio::test]
async fn webhook_health() {
    let app = TestApp::new().await;
    let resp = app.get("/api/webhooks/health", None).await;
    resp.assert_status(StatusCode::OK);
    let json: serde_json::Value = resp.json();
    assert_eq!(json["service"], "webhooks");
}
