mod common;

use axum::http::StatusCode;
use common::{assert_redirect, Browser, TestApp};
use studybud::db::{MessageRepository, RoomRepository};

async fn create_room(browser: &mut Browser, topic: &str, name: &str, description: &str) {
    let page = browser
        .post(
            "/create-room/",
            &[("topic", topic), ("name", name), ("description", description)],
        )
        .await;
    assert_redirect(&page, "/");
}

#[tokio::test]
async fn anonymous_requests_never_mutate() {
    let app = TestApp::new().await;
    let mut host = app.signed_in("host").await;
    create_room(&mut host, "Python", "Django help", "").await;
    let room_id = app.room_id("Django help").await;
    host.post(&format!("/room/{room_id}/"), &[("body", "hello")]).await;
    let (message_id,): (String,) = sqlx::query_as("SELECT id FROM messages")
        .fetch_one(&app.db_pool)
        .await
        .unwrap();

    let mut anon = app.browser();
    let attempts = [
        ("/create-room/".to_owned(), vec![("topic", "X"), ("name", "Y")]),
        (format!("/update-room/{room_id}/"), vec![("topic", "X"), ("name", "Hijacked")]),
        (format!("/delete-room/{room_id}/"), vec![]),
        (format!("/delete-msg/{message_id}/"), vec![]),
        (format!("/room/{room_id}/"), vec![("body", "drive-by")]),
        ("/update-user/".to_owned(), vec![]),
    ];
    for (uri, form) in &attempts {
        let page = anon.post(uri, form).await;
        assert_redirect(&page, "/login/");
        if !uri.starts_with("/room/") {
            assert_redirect(&anon.get(uri).await, "/login/");
        }
    }

    assert_eq!(app.count("rooms").await, 1);
    assert_eq!(app.count("messages").await, 1);
    assert_eq!(app.count("topics").await, 1);
    let room = RoomRepository::get(&app.db_pool, &room_id).await.unwrap().unwrap();
    assert_eq!(room.name, "Django help");
}

#[tokio::test]
async fn create_room_gets_or_creates_topic() {
    let app = TestApp::new().await;
    let mut host = app.signed_in("host").await;

    assert_eq!(host.get("/create-room/").await.status, StatusCode::OK);
    create_room(&mut host, "Python", "Django help", "views").await;
    create_room(&mut host, "Python", "Flask help", "").await;

    assert_eq!(app.count("topics").await, 1);
    let room = RoomRepository::get(&app.db_pool, &app.room_id("Flask help").await)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(room.topic_name.as_deref(), Some("Python"));
    assert_eq!(room.description, None);
    assert_eq!(room.host_id, Some(app.user_id("host").await));
}

#[tokio::test]
async fn create_room_requires_name_and_topic() {
    let app = TestApp::new().await;
    let mut host = app.signed_in("host").await;

    let page = host
        .post("/create-room/", &[("topic", " "), ("name", ""), ("description", "d")])
        .await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("The room needs a name."));
    assert!(page.body.contains("Pick or type a topic."));
    assert_eq!(app.count("rooms").await, 0);
    assert_eq!(app.count("topics").await, 0);
}

#[tokio::test]
async fn only_host_updates_room() {
    let app = TestApp::new().await;
    let mut host = app.signed_in("host").await;
    let mut other = app.signed_in("other").await;
    create_room(&mut host, "Python", "Django help", "views").await;
    let room_id = app.room_id("Django help").await;
    let uri = format!("/update-room/{room_id}/");

    let page = other.get(&uri).await;
    assert_eq!(page.status, StatusCode::FORBIDDEN);
    assert_eq!(page.body, "You are not allowed to update the room!");

    let page = other
        .post(&uri, &[("topic", "Rust"), ("name", "Hijacked"), ("description", "")])
        .await;
    assert_eq!(page.status, StatusCode::FORBIDDEN);
    let room = RoomRepository::get(&app.db_pool, &room_id).await.unwrap().unwrap();
    assert_eq!(room.name, "Django help");
    assert_eq!(room.topic_name.as_deref(), Some("Python"));
    assert_eq!(app.count("topics").await, 1);

    let form = host.get(&uri).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("value=\"Django help\""));

    let page = host
        .post(&uri, &[("topic", "Rust"), ("name", "Axum help"), ("description", "routers")])
        .await;
    assert_redirect(&page, "/");
    let room = RoomRepository::get(&app.db_pool, &room_id).await.unwrap().unwrap();
    assert_eq!(room.name, "Axum help");
    assert_eq!(room.topic_name.as_deref(), Some("Rust"));
    assert_eq!(room.description.as_deref(), Some("routers"));
    assert!(room.updated >= room.created);
}

#[tokio::test]
async fn only_host_deletes_room() {
    let app = TestApp::new().await;
    let mut host = app.signed_in("host").await;
    let mut other = app.signed_in("other").await;
    create_room(&mut host, "Python", "Django help", "").await;
    let room_id = app.room_id("Django help").await;
    other.post(&format!("/room/{room_id}/"), &[("body", "hi")]).await;
    let uri = format!("/delete-room/{room_id}/");

    let page = other.post(&uri, &[]).await;
    assert_eq!(page.status, StatusCode::FORBIDDEN);
    assert_eq!(page.body, "You are not allowed to delete the room!!");
    assert_eq!(app.count("rooms").await, 1);

    let confirm = host.get(&uri).await;
    assert_eq!(confirm.status, StatusCode::OK);
    assert!(confirm.body.contains("Are you sure you want to delete"));
    assert!(confirm.body.contains("Django help"));
    assert_eq!(app.count("rooms").await, 1);

    assert_redirect(&host.post(&uri, &[]).await, "/");
    assert_eq!(app.count("rooms").await, 0);
    assert_eq!(app.count("messages").await, 0);
    assert_eq!(app.count("room_participants").await, 0);
}

#[tokio::test]
async fn posting_adds_one_message_and_at_most_one_participant() {
    let app = TestApp::new().await;
    let mut host = app.signed_in("host").await;
    let mut guest = app.signed_in("guest").await;
    create_room(&mut host, "Python", "Django help", "").await;
    let room_id = app.room_id("Django help").await;
    let uri = format!("/room/{room_id}/");

    assert_eq!(app.count("room_participants").await, 0);

    assert_redirect(&guest.post(&uri, &[("body", "first!")]).await, &uri);
    assert_eq!(app.count("messages").await, 1);
    assert_eq!(app.count("room_participants").await, 1);

    assert_redirect(&guest.post(&uri, &[("body", "second")]).await, &uri);
    assert_eq!(app.count("messages").await, 2);
    assert_eq!(app.count("room_participants").await, 1);

    let participants = RoomRepository::participants(&app.db_pool, &room_id).await.unwrap();
    assert_eq!(participants[0].username, "guest");

    let page = guest.get(&uri).await;
    assert_eq!(page.status, StatusCode::OK);
    let second = page.body.find("second").unwrap();
    let first = page.body.find("first!").unwrap();
    assert!(second < first, "newest message comes first");
    assert!(page.body.contains("1 joined"));
}

#[tokio::test]
async fn blank_message_is_ignored() {
    let app = TestApp::new().await;
    let mut host = app.signed_in("host").await;
    create_room(&mut host, "Python", "Django help", "").await;
    let uri = format!("/room/{}/", app.room_id("Django help").await);

    assert_redirect(&host.post(&uri, &[("body", "   ")]).await, &uri);
    assert_eq!(app.count("messages").await, 0);
    assert!(host.get(&uri).await.body.contains("Write something before sending."));
}

#[tokio::test]
async fn only_author_deletes_message() {
    let app = TestApp::new().await;
    let mut host = app.signed_in("host").await;
    let mut author = app.signed_in("author").await;
    create_room(&mut host, "Python", "Django help", "").await;
    let room_id = app.room_id("Django help").await;
    author.post(&format!("/room/{room_id}/"), &[("body", "mine")]).await;
    let message = MessageRepository::in_room(&app.db_pool, &room_id).await.unwrap().remove(0);
    let uri = format!("/delete-msg/{}/", message.id);

    let page = host.post(&uri, &[]).await;
    assert_eq!(page.status, StatusCode::FORBIDDEN);
    assert_eq!(page.body, "You are not allowed to delete the message!!");
    assert_eq!(app.count("messages").await, 1);

    assert_eq!(author.get(&uri).await.status, StatusCode::OK);
    assert_redirect(&author.post(&uri, &[]).await, &format!("/room/{room_id}/"));
    assert_eq!(app.count("messages").await, 0);
}

#[tokio::test]
async fn message_markup_is_not_interpreted() {
    let app = TestApp::new().await;
    let mut host = app.signed_in("host").await;
    create_room(&mut host, "Python", "Django help", "").await;
    let uri = format!("/room/{}/", app.room_id("Django help").await);

    host.post(&uri, &[("body", "**bold** <img src=x onerror=alert(1)>")]).await;
    let page = host.get(&uri).await;

    assert!(page.body.contains("<strong>bold</strong>"));
    assert!(!page.body.contains("<img src=x"));

    host.post(&uri, &[("body", "[click](javascript:alert(document.cookie))")]).await;
    let page = host.get(&uri).await;
    assert!(page.body.contains("<a href=\"#\">click</a>"));
    assert!(!page.body.contains("javascript:"));
    assert!(!app.browser().get("/activity/").await.body.contains("javascript:"));
}

#[tokio::test]
async fn missing_rooms_and_messages_are_404() {
    let app = TestApp::new().await;
    let mut browser = app.signed_in("host").await;
    let ghost = uuid::Uuid::now_v7();

    assert_eq!(browser.get(&format!("/room/{ghost}/")).await.status, StatusCode::NOT_FOUND);
    assert_eq!(browser.get(&format!("/update-room/{ghost}/")).await.status, StatusCode::NOT_FOUND);
    assert_eq!(browser.post(&format!("/delete-room/{ghost}/"), &[]).await.status, StatusCode::NOT_FOUND);
    assert_eq!(browser.post(&format!("/delete-msg/{ghost}/"), &[]).await.status, StatusCode::NOT_FOUND);

    for uri in ["/room/42/", "/update-room/42/", "/delete-room/not-a-room/", "/delete-msg/42/"] {
        let page = browser.get(uri).await;
        assert_eq!(page.status, StatusCode::NOT_FOUND, "{uri}");
        assert!(page.body.contains("doesn't exist"));
    }
    assert_eq!(browser.post("/room/42/", &[("body", "hello")]).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.count("messages").await, 0);
}
