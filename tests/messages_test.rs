// ============================================================================
// Messages API Tests
// ============================================================================
//
// - visibility of received, sent and archived lists
// - creation rules (sender binding, receiver by e-mail, failure writes nothing)
// - receiver-only lookup
// - forward-only status changes and bulk archive
// - master view
//
// ============================================================================

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use missive_types::{MessageStatus, Permission};
use serde_json::json;

use test_utils::{error_message, spawn_app, titles};

#[tokio::test]
async fn scenario_message_reaches_receiver_and_sent_list() {
    let app = spawn_app();
    let a = app.create_user("Alice", "T_A").await;
    let b = app.create_user("Bob", "T_B").await;
    let c = app.create_user("Carol", "T_C").await;
    app.insert_message(&c, &c, "for carol", MessageStatus::Unread, Utc::now())
        .await;

    let created = app
        .request(
            Method::POST,
            "/messages",
            Some("T_A"),
            Some(json!({"title": "Hi", "content": "Hello", "receiver_email": b.email})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["title"], "Hi");
    assert_eq!(created.body["content"], "Hello");
    assert_eq!(created.body["status"], "unread");
    assert_eq!(created.body["read_at"], json!(null));
    assert_eq!(created.body["archived_at"], json!(null));
    assert_eq!(created.body["sender"]["id"], json!(a.id));
    assert_eq!(created.body["sender"]["email"], "alice@email.com");
    assert_eq!(created.body["receiver"]["id"], json!(b.id));
    assert!(created.body["receiver"].get("email").is_none());

    let inbox = app.get("/messages", "T_B").await;
    assert_eq!(inbox.status, StatusCode::OK);
    assert_eq!(titles(&inbox.body), vec!["Hi"]);

    let sent = app.get("/messages/sent", "T_A").await;
    assert_eq!(titles(&sent.body), vec!["Hi"]);

    assert!(!titles(&inbox.body).contains(&"for carol".to_string()));
}

#[tokio::test]
async fn sender_cannot_be_chosen_by_the_caller() {
    let app = spawn_app();
    let a = app.create_user("Alice", "T_A").await;
    let b = app.create_user("Bob", "T_B").await;

    let created = app
        .request(
            Method::POST,
            "/messages",
            Some("T_A"),
            Some(json!({
                "title": "Hi",
                "content": "Hello",
                "receiver_email": "bob@email.com",
                "sender_id": b.id,
            })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["sender"]["id"], json!(a.id));
}

#[tokio::test]
async fn inbox_excludes_archived_and_is_newest_first() {
    let app = spawn_app();
    let a = app.create_user("Alice", "T_A").await;
    let b = app.create_user("Bob", "T_B").await;
    let now = Utc::now();

    app.insert_message(&a, &b, "oldest", MessageStatus::Read, now - Duration::hours(3))
        .await;
    app.insert_message(&a, &b, "newest", MessageStatus::Unread, now)
        .await;
    app.insert_message(&a, &b, "middle", MessageStatus::Unread, now - Duration::hours(1))
        .await;
    app.insert_message(&a, &b, "archived", MessageStatus::Archived, now - Duration::minutes(5))
        .await;
    app.insert_message(&b, &a, "reply", MessageStatus::Unread, now)
        .await;

    let inbox = app.get("/messages", "T_B").await;
    assert_eq!(titles(&inbox.body), vec!["newest", "middle", "oldest"]);

    let archived = app.get("/messages/archived", "T_B").await;
    assert_eq!(titles(&archived.body), vec!["archived"]);

    let sent = app.get("/messages/sent", "T_A").await;
    assert_eq!(titles(&sent.body), vec!["newest", "middle", "oldest"]);
}

#[tokio::test]
async fn unknown_receiver_fails_and_writes_nothing() {
    let app = spawn_app();
    app.create_user("Alice", "T_A").await;

    let response = app
        .request(
            Method::POST,
            "/messages",
            Some("T_A"),
            Some(json!({"title": "Hi", "content": "Hello", "receiver_email": "ghost@email.com"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error_message(&response.body).starts_with("Validation failed"));
    assert!(error_message(&response.body).contains("Receiver must exist"));
    assert_eq!(app.store.message_count().await, 0);
}

#[tokio::test]
async fn blank_fields_fail_and_write_nothing() {
    let app = spawn_app();
    app.create_user("Alice", "T_A").await;
    app.create_user("Bob", "T_B").await;

    for body in [
        json!({"title": "", "content": "Hello", "receiver_email": "bob@email.com"}),
        json!({"title": "Hi", "content": "   ", "receiver_email": "bob@email.com"}),
        json!({"content": "Hello", "receiver_email": "bob@email.com"}),
        json!({"title": "Hi", "content": "Hello"}),
    ] {
        let response = app
            .request(Method::POST, "/messages", Some("T_A"), Some(body.clone()))
            .await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY, "{}", body);
        assert!(error_message(&response.body).starts_with("Validation failed"));
    }
    assert_eq!(app.store.message_count().await, 0);
}

#[tokio::test]
async fn malformed_body_is_a_validation_failure() {
    let app = spawn_app();
    app.create_user("Alice", "T_A").await;

    let response = app
        .request(Method::POST, "/messages", Some("T_A"), Some(json!(["not", "an", "object"])))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error_message(&response.body).starts_with("Validation failed: "));
}

#[tokio::test]
async fn oversized_body_is_rejected_with_413() {
    let app = spawn_app();
    app.create_user("Alice", "T_A").await;
    app.create_user("Bob", "T_B").await;

    let response = app
        .request(
            Method::POST,
            "/messages",
            Some("T_A"),
            Some(json!({
                "title": "Big",
                "content": "x".repeat(70 * 1024),
                "receiver_email": "bob@email.com",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        response.body,
        json!({"error": {"message": "Request body is too large"}})
    );
    assert_eq!(app.store.message_count().await, 0);
}

#[tokio::test]
async fn show_is_receiver_only_and_hides_existence() {
    let app = spawn_app();
    let a = app.create_user("Alice", "T_A").await;
    let b = app.create_user("Bob", "T_B").await;
    app.create_user("Carol", "T_C").await;
    let message = app
        .insert_message(&a, &b, "Hi", MessageStatus::Unread, Utc::now())
        .await;
    let path = format!("/messages/{}", message.message.id);

    let own = app.get(&path, "T_B").await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["id"], json!(message.message.id));

    let foreign = app.get(&path, "T_C").await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let sender = app.get(&path, "T_A").await;
    assert_eq!(sender.status, StatusCode::NOT_FOUND);

    let missing = app
        .get(&format!("/messages/{}", uuid::Uuid::new_v4()), "T_B")
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(error_message(&missing.body).contains("Couldn't find Message"));

    // Same shape whether the id exists or not
    assert_eq!(
        foreign.body["error"]["message"]
            .as_str()
            .map(|m| m.starts_with("Couldn't find Message")),
        Some(true)
    );

    let garbage = app.get("/messages/42", "T_B").await;
    assert_eq!(garbage.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_moves_forward_and_stamps_once() {
    let app = spawn_app();
    let a = app.create_user("Alice", "T_A").await;
    let b = app.create_user("Bob", "T_B").await;
    let message = app
        .insert_message(&a, &b, "Hi", MessageStatus::Unread, Utc::now())
        .await;
    let path = format!("/messages/{}/status", message.message.id);

    let read = app
        .request(Method::PATCH, &path, Some("T_B"), Some(json!({"status": "read"})))
        .await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["status"], "read");
    let read_at = read.body["read_at"].clone();
    assert!(read_at.is_string());
    assert_eq!(read.body["archived_at"], json!(null));

    let repeat = app
        .request(Method::PATCH, &path, Some("T_B"), Some(json!({"status": "read"})))
        .await;
    assert_eq!(repeat.status, StatusCode::OK);
    assert_eq!(repeat.body["read_at"], read_at);

    let back = app
        .request(Method::PATCH, &path, Some("T_B"), Some(json!({"status": "unread"})))
        .await;
    assert_eq!(back.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        error_message(&back.body),
        "Validation failed: Status cannot change from read to unread"
    );

    let archived = app
        .request(Method::PATCH, &path, Some("T_B"), Some(json!({"status": "archived"})))
        .await;
    assert_eq!(archived.status, StatusCode::OK);
    assert_eq!(archived.body["read_at"], read_at);
    assert!(archived.body["archived_at"].is_string());

    let inbox = app.get("/messages", "T_B").await;
    assert!(titles(&inbox.body).is_empty());
}

#[tokio::test]
async fn status_change_requires_receiver_and_known_status() {
    let app = spawn_app();
    let a = app.create_user("Alice", "T_A").await;
    let b = app.create_user("Bob", "T_B").await;
    let message = app
        .insert_message(&a, &b, "Hi", MessageStatus::Unread, Utc::now())
        .await;
    let path = format!("/messages/{}/status", message.message.id);

    let by_sender = app
        .request(Method::PATCH, &path, Some("T_A"), Some(json!({"status": "read"})))
        .await;
    assert_eq!(by_sender.status, StatusCode::NOT_FOUND);

    let unknown = app
        .request(Method::PATCH, &path, Some("T_B"), Some(json!({"status": "deleted"})))
        .await;
    assert_eq!(unknown.status, StatusCode::UNPROCESSABLE_ENTITY);

    let unchanged = app.get(&format!("/messages/{}", message.message.id), "T_B").await;
    assert_eq!(unchanged.body["status"], "unread");
}

#[tokio::test]
async fn bulk_archive_ignores_foreign_ids() {
    let app = spawn_app();
    let a = app.create_user("Alice", "T_A").await;
    let b = app.create_user("Bob", "T_B").await;
    let c = app.create_user("Carol", "T_C").await;
    let now = Utc::now();
    let first = app.insert_message(&a, &b, "first", MessageStatus::Unread, now).await;
    let second = app.insert_message(&a, &b, "second", MessageStatus::Read, now).await;
    let other = app.insert_message(&a, &c, "other", MessageStatus::Unread, now).await;

    let response = app
        .request(
            Method::PATCH,
            "/messages/archive",
            Some("T_B"),
            Some(json!({"ids": [first.message.id, second.message.id, other.message.id]})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"archived": 2}));

    assert!(titles(&app.get("/messages", "T_B").await.body).is_empty());
    assert_eq!(titles(&app.get("/messages", "T_C").await.body), vec!["other"]);
    assert_eq!(app.get("/messages/archived", "T_B").await.body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn admin_view_is_master_only() {
    let app = spawn_app();
    app.create_user_with("Admin", "T_ADMIN", Permission::Master).await;
    let a = app.create_user("Alice", "T_A").await;
    let b = app.create_user("Bob", "T_B").await;
    let now = Utc::now();
    app.insert_message(&a, &b, "active", MessageStatus::Unread, now).await;
    app.insert_message(&b, &a, "archived", MessageStatus::Archived, now).await;

    let admin = app.get("/admin/messages", "T_ADMIN").await;
    assert_eq!(admin.status, StatusCode::OK);
    assert_eq!(titles(&admin.body), vec!["active"]);

    let normal = app.get("/admin/messages", "T_A").await;
    assert_eq!(normal.status, StatusCode::FORBIDDEN);
    assert_eq!(
        error_message(&normal.body),
        "You are not allowed to access this resource"
    );
}
