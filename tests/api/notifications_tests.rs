//! Notification API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{TestApp, TestUser};

async fn comment(app: &TestApp, user: &TestUser, poem_id: &str, text: &str) {
    app.server
        .post(&format!("/api/poems/{poem_id}/comments"))
        .authorization_bearer(&user.token)
        .json(&json!({ "text": text }))
        .await
        .assert_status(StatusCode::CREATED);
}

async fn unread_count(app: &TestApp, user: &TestUser) -> i64 {
    app.server
        .get("/api/notifications/unread-count")
        .authorization_bearer(&user.token)
        .await
        .json::<Value>()["count"]
        .as_i64()
        .unwrap()
}

#[tokio::test]
async fn test_notifications_require_token() {
    let app = TestApp::new().await;

    app.server
        .get("/api/notifications")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_own_activity_does_not_notify() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let poem_id = app.create_poem(&author, "Self", true).await;

    comment(&app, &author, &poem_id, "note to self").await;
    app.server
        .post(&format!("/api/poems/{poem_id}/like"))
        .authorization_bearer(&author.token)
        .await
        .assert_status_ok();

    assert_eq!(unread_count(&app, &author).await, 0);
}

#[tokio::test]
async fn test_mark_read_flow() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let reader = app.user("Bob");
    let poem_id = app.create_poem(&author, "Letters", true).await;

    comment(&app, &reader, &poem_id, "one").await;
    comment(&app, &reader, &poem_id, "two").await;
    comment(&app, &reader, &poem_id, "three").await;
    assert_eq!(unread_count(&app, &author).await, 3);

    let notifications = app
        .server
        .get("/api/notifications")
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();
    assert_eq!(notifications[0]["poemTitle"], "Letters");
    assert_eq!(notifications[0]["type"], "new_comment");
    let first_id = notifications[0]["id"].as_str().unwrap().to_string();

    // Someone else cannot acknowledge the author's notification.
    app.server
        .put(&format!("/api/notifications/read/{first_id}"))
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .put(&format!("/api/notifications/read/{first_id}"))
        .authorization_bearer(&author.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(unread_count(&app, &author).await, 2);

    let unread = app
        .server
        .get("/api/notifications")
        .add_query_param("unreadOnly", true)
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();
    assert_eq!(unread.as_array().unwrap().len(), 2);

    let marked = app
        .server
        .put("/api/notifications/read-all")
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();
    assert_eq!(marked["updated"], 2);
    assert_eq!(unread_count(&app, &author).await, 0);
}

#[tokio::test]
async fn test_notifications_survive_poem_deletion() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let reader = app.user("Bob");
    let poem_id = app.create_poem(&author, "Ephemeral", true).await;

    app.server
        .post(&format!("/api/poems/{poem_id}/like"))
        .authorization_bearer(&reader.token)
        .await
        .assert_status_ok();
    app.server
        .delete(&format!("/api/mypoems/{poem_id}"))
        .authorization_bearer(&author.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let notifications = app
        .server
        .get("/api/notifications")
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();
    assert_eq!(notifications.as_array().unwrap().len(), 1);
    assert_eq!(notifications[0]["poemTitle"], "Unknown Poem");
}
