//! Poem, Like and Comment API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

use crate::common::{token_for, TestApp};

#[tokio::test]
async fn test_create_poem_requires_token() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/mypoems")
        .json(&json!({ "title": "t", "content": "c" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_token_rejected_even_on_public_routes() {
    let app = TestApp::new().await;
    let forged = token_for(uuid::Uuid::new_v4(), "Mallory", "some-other-secret-that-is-long-enough");

    let response = app
        .server
        .get("/api/poems")
        .authorization_bearer(&forged)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[test_case(json!({ "title": "", "content": "text" }) ; "empty title")]
#[test_case(json!({ "title": "t", "content": "" }) ; "empty content")]
#[test_case(json!({ "title": "x".repeat(201), "content": "text" }) ; "long title")]
#[tokio::test]
async fn test_create_poem_validation(body: Value) {
    let app = TestApp::new().await;
    let author = app.user("Ada");

    let response = app
        .server
        .post("/api/mypoems")
        .authorization_bearer(&author.token)
        .json(&body)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_and_fetch_own_poem() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let poem_id = app.create_poem(&author, "Morning", false).await;

    let response = app
        .server
        .get(&format!("/api/mypoems/{poem_id}"))
        .authorization_bearer(&author.token)
        .await;

    response.assert_status_ok();
    let poem = response.json::<Value>();
    assert_eq!(poem["title"], "Morning");
    assert_eq!(poem["authorName"], "Ada");
    assert_eq!(poem["isPublished"], false);
    assert!(poem["excerpt"].as_str().unwrap().starts_with("Morning"));
    assert_eq!(poem["tags"], json!(["nature"]));
    assert_eq!(poem["categories"], json!(["Haiku"]));
    assert_eq!(poem["statistics"]["likeCount"], 0);

    let stranger = app.user("Bob");
    app.server
        .get(&format!("/api/mypoems/{poem_id}"))
        .authorization_bearer(&stranger.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_search_lists_only_published_poems() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    app.create_poem(&author, "Published one", true).await;
    app.create_poem(&author, "Draft", false).await;
    app.create_poem(&author, "Published two", true).await;

    let response = app.server.get("/api/poems").await;

    response.assert_status_ok();
    let page = response.json::<Value>();
    assert_eq!(page["totalCount"], 2);
    let titles: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Published two", "Published one"]);
}

#[tokio::test]
async fn test_search_term_and_paging() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    for i in 0..7 {
        app.create_poem(&author, &format!("River {i}"), true).await;
    }
    app.create_poem(&author, "Mountain", true).await;

    let response = app
        .server
        .get("/api/poems")
        .add_query_param("searchTerm", "river")
        .add_query_param("page", 2)
        .await;

    response.assert_status_ok();
    let page = response.json::<Value>();
    assert_eq!(page["totalCount"], 7);
    assert_eq!(page["pageSize"], 5);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_drafts_hidden_from_other_readers() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let reader = app.user("Bob");
    let poem_id = app.create_poem(&author, "Draft", false).await;

    app.server
        .get(&format!("/api/poems/{poem_id}/poemDetailed"))
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .get(&format!("/api/poems/{poem_id}/poemDetailed"))
        .authorization_bearer(&author.token)
        .await
        .assert_status_ok();

    let author_list = app
        .server
        .get(&format!("/api/poems/author/{}", author.id))
        .await
        .json::<Value>();
    assert_eq!(author_list, json!([]));
}

#[tokio::test]
async fn test_like_twice_counts_once_and_notifies_author() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let reader = app.user("Bob");
    let poem_id = app.create_poem(&author, "Evening", true).await;

    for _ in 0..2 {
        app.server
            .post(&format!("/api/poems/{poem_id}/like"))
            .authorization_bearer(&reader.token)
            .await
            .assert_status_ok();
    }

    let details = app
        .server
        .get(&format!("/api/poems/{poem_id}/poemDetailed"))
        .authorization_bearer(&reader.token)
        .await
        .json::<Value>();
    assert_eq!(details["statistics"]["likeCount"], 1);
    assert_eq!(details["isLikedByCurrentUser"], true);

    let notifications = app
        .server
        .get("/api/notifications")
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "new_like");
    let message = notifications[0]["message"].as_str().unwrap();
    assert!(message.contains("Bob"));
    assert!(message.contains("Evening"));
}

#[tokio::test]
async fn test_unlike_without_like_is_not_found() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let reader = app.user("Bob");
    let poem_id = app.create_poem(&author, "Evening", true).await;

    app.server
        .delete(&format!("/api/poems/{poem_id}/like"))
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.server
        .post(&format!("/api/poems/{poem_id}/like"))
        .authorization_bearer(&reader.token)
        .await
        .assert_status_ok();
    app.server
        .delete(&format!("/api/poems/{poem_id}/like"))
        .authorization_bearer(&reader.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let status = app
        .server
        .get(&format!("/api/poems/{poem_id}/liked"))
        .authorization_bearer(&reader.token)
        .await
        .json::<Value>();
    assert_eq!(status["liked"], false);
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let reader = app.user("Bob");
    let stranger = app.user("Eve");
    let poem_id = app.create_poem(&author, "Dusk", true).await;

    let created = app
        .server
        .post(&format!("/api/poems/{poem_id}/comments"))
        .authorization_bearer(&reader.token)
        .json(&json!({ "text": "  Lovely  " }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let comment = created.json::<Value>();
    assert_eq!(comment["text"], "Lovely");
    assert_eq!(comment["userName"], "Bob");
    let comment_id = comment["id"].as_str().unwrap().to_string();

    let listed = app
        .server
        .get(&format!("/api/poems/{poem_id}/comments"))
        .await
        .json::<Value>();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    app.server
        .delete(&format!("/api/poems/comments/{comment_id}"))
        .authorization_bearer(&stranger.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // The poem author may remove comments on their poem.
    app.server
        .delete(&format!("/api/poems/comments/{comment_id}"))
        .authorization_bearer(&author.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let details = app
        .server
        .get(&format!("/api/poems/{poem_id}/poemDetailed"))
        .await
        .json::<Value>();
    assert_eq!(details["statistics"]["commentCount"], 0);
    assert_eq!(details["comments"], json!([]));

    app.server
        .delete(&format!("/api/poems/comments/{comment_id}"))
        .authorization_bearer(&author.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comments_on_my_poems() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let reader = app.user("Bob");
    let poem_id = app.create_poem(&author, "Dawn", true).await;

    app.server
        .post(&format!("/api/poems/{poem_id}/comments"))
        .authorization_bearer(&reader.token)
        .json(&json!({ "text": "First" }))
        .await
        .assert_status(StatusCode::CREATED);

    let page = app
        .server
        .get("/api/mypoems/comments")
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();

    assert_eq!(page["totalCount"], 1);
    assert_eq!(page["items"][0]["poemTitle"], "Dawn");
    assert_eq!(page["items"][0]["text"], "First");
}

#[tokio::test]
async fn test_update_rejects_mismatched_id() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let poem_id = app.create_poem(&author, "Noon", false).await;

    app.server
        .put(&format!("/api/mypoems/{poem_id}"))
        .authorization_bearer(&author.token)
        .json(&json!({ "id": "12345", "title": "Noon", "content": "text" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .put(&format!("/api/mypoems/{poem_id}"))
        .authorization_bearer(&author.token)
        .json(&json!({
            "id": poem_id,
            "title": "High Noon",
            "content": "new text",
            "tags": ["Sun", "sun", "heat"],
        }))
        .await;
    response.assert_status_ok();
    let poem = response.json::<Value>();
    assert_eq!(poem["title"], "High Noon");
    assert_eq!(poem["tags"], json!(["Sun", "heat"]));
}

#[tokio::test]
async fn test_publish_unpublish_and_delete() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let poem_id = app.create_poem(&author, "Night", false).await;

    let published = app
        .server
        .put(&format!("/api/mypoems/publish/{poem_id}"))
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();
    assert_eq!(published["isPublished"], true);

    app.server
        .get(&format!("/api/poems/{poem_id}/content"))
        .await
        .assert_status_ok();

    let unpublished = app
        .server
        .put(&format!("/api/mypoems/unpublish/{poem_id}"))
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();
    assert_eq!(unpublished["isPublished"], false);

    app.server
        .delete(&format!("/api/mypoems/{poem_id}"))
        .authorization_bearer(&author.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(&format!("/api/mypoems/{poem_id}"))
        .authorization_bearer(&author.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_view_counter() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let poem_id = app.create_poem(&author, "Rain", true).await;

    for _ in 0..3 {
        app.server
            .post(&format!("/api/poems/{poem_id}/view"))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    let details = app
        .server
        .get(&format!("/api/poems/{poem_id}/poemDetailed"))
        .await
        .json::<Value>();
    assert_eq!(details["statistics"]["viewCount"], 3);

    app.server
        .post("/api/poems/999/view")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .post("/api/poems/not-a-number/view")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_view_counter_ignores_drafts() {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let poem_id = app.create_poem(&author, "Unfinished", false).await;

    app.server
        .post(&format!("/api/poems/{poem_id}/view"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let poem = app
        .server
        .get(&format!("/api/mypoems/{poem_id}"))
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();
    assert_eq!(poem["statistics"]["viewCount"], 0);
}

#[test_case(json!({ "tags": ["t".repeat(60)] }) ; "long tag")]
#[test_case(json!({ "categories": ["c".repeat(80)] }) ; "long category")]
#[tokio::test]
async fn test_create_rejects_names_wider_than_columns(names: Value) {
    let app = TestApp::new().await;
    let author = app.user("Ada");
    let mut body = json!({ "title": "Wide", "content": "text" });
    body.as_object_mut().unwrap().extend(names.as_object().unwrap().clone());

    app.server
        .post("/api/mypoems")
        .authorization_bearer(&author.token)
        .json(&body)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let mine = app
        .server
        .get("/api/mypoems")
        .authorization_bearer(&author.token)
        .await
        .json::<Value>();
    assert_eq!(mine, json!([]));
}

#[tokio::test]
async fn test_long_display_name_is_cut_to_column_width() {
    let app = TestApp::new().await;
    let author = app.user(&"A".repeat(150));
    let poem_id = app.create_poem(&author, "Signed", true).await;

    let poem = app
        .server
        .get(&format!("/api/poems/{poem_id}/poemDetailed"))
        .await
        .json::<Value>();
    assert_eq!(poem["authorName"], "A".repeat(100));
}
