//! Collection API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::TestApp;

#[tokio::test]
async fn test_create_and_list_collections() {
    let app = TestApp::new().await;
    let owner = app.user("Ada");

    let response = app
        .server
        .post("/api/collections")
        .authorization_bearer(&owner.token)
        .json(&json!({ "name": "Favourites", "description": "  ", "isPublic": true }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();
    assert_eq!(created["name"], "Favourites");
    assert_eq!(created["description"], Value::Null);
    assert_eq!(created["poemCount"], 0);

    let listed = app
        .server
        .get("/api/collections")
        .authorization_bearer(&owner.token)
        .await
        .json::<Value>();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let other = app.user("Bob");
    let others = app
        .server
        .get("/api/collections")
        .authorization_bearer(&other.token)
        .await
        .json::<Value>();
    assert_eq!(others, json!([]));
}

#[tokio::test]
async fn test_collection_name_required() {
    let app = TestApp::new().await;
    let owner = app.user("Ada");

    app.server
        .post("/api/collections")
        .authorization_bearer(&owner.token)
        .json(&json!({ "name": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_poem_is_idempotent_and_notifies_author() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let reader = app.user("Bob");
    let poem_id = app.create_poem(&author, "Tide", true).await;
    let collection_id = app.create_collection(&reader, "Sea", false).await;
    let path = format!("/api/collections/{collection_id}/poems/{poem_id}");

    app.server
        .post(&path)
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::CREATED);
    app.server
        .post(&path)
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::OK);

    let collection = app
        .server
        .get(&format!("/api/collections/{collection_id}"))
        .authorization_bearer(&reader.token)
        .await
        .json::<Value>();
    assert_eq!(collection["poemCount"], 1);
    assert_eq!(collection["poems"][0]["title"], "Tide");
    assert_eq!(collection["poems"][0]["statistics"]["saveCount"], 1);

    let notifications = app
        .server
        .get("/api/notifications")
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();
    assert_eq!(notifications.as_array().unwrap().len(), 1);
    assert_eq!(notifications[0]["type"], "poem_saved");
}

#[tokio::test]
async fn test_private_collection_forbidden_to_others() {
    let app = TestApp::new().await;
    let owner = app.user("Ada");
    let other = app.user("Bob");
    let private_id = app.create_collection(&owner, "Private", false).await;
    let public_id = app.create_collection(&owner, "Public", true).await;

    app.server
        .get(&format!("/api/collections/{private_id}"))
        .authorization_bearer(&other.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .get(&format!("/api/collections/{public_id}"))
        .authorization_bearer(&other.token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_only_owner_can_add_poems() {
    let app = TestApp::new().await;
    let owner = app.user("Ada");
    let other = app.user("Bob");
    let poem_id = app.create_poem(&owner, "Stone", true).await;
    let collection_id = app.create_collection(&owner, "Mine", true).await;

    app.server
        .post(&format!("/api/collections/{collection_id}/poems/{poem_id}"))
        .authorization_bearer(&other.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_remove_poem_and_delete_collection() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let reader = app.user("Bob");
    let poem_id = app.create_poem(&author, "Wind", true).await;
    let collection_id = app.create_collection(&reader, "Air", true).await;
    let path = format!("/api/collections/{collection_id}/poems/{poem_id}");

    app.server
        .post(&path)
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::CREATED);
    app.server
        .delete(&path)
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .delete(&path)
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .post(&path)
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::CREATED);
    app.server
        .delete(&format!("/api/collections/{collection_id}"))
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .get(&format!("/api/collections/{collection_id}"))
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let poem = app
        .server
        .get(&format!("/api/poems/{poem_id}/poemDetailed"))
        .await
        .json::<Value>();
    assert_eq!(poem["statistics"]["saveCount"], 0);
}
