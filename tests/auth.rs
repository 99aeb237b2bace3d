mod common;

use axum::http::StatusCode;
use common::{assert_redirect, TestApp, PASSWORD};

#[tokio::test]
async fn register_lowercases_username_and_signs_in() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let page = browser
        .post(
            "/register/",
            &[
                ("name", "Alice Liddell"),
                ("username", "Alice"),
                ("email", "Alice@Example.com"),
                ("password1", PASSWORD),
                ("password2", PASSWORD),
            ],
        )
        .await;
    assert_redirect(&page, "/");

    let (username, email, name): (String, String, Option<String>) =
        sqlx::query_as("SELECT username, email, name FROM users")
            .fetch_one(&app.db_pool)
            .await
            .unwrap();
    assert_eq!(username, "alice");
    assert_eq!(email, "alice@example.com");
    assert_eq!(name.as_deref(), Some("Alice Liddell"));

    let home = browser.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("@alice"));
    assert!(home.body.contains("/logout/"));
}

#[tokio::test]
async fn invalid_registration_redisplays_form() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let page = browser
        .post(
            "/register/",
            &[
                ("username", "bob"),
                ("email", "bob@example.com"),
                ("password1", PASSWORD),
                ("password2", "something else"),
            ],
        )
        .await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("An error occurred during registration"));
    assert!(page.body.contains("didn&#x27;t match"));
    assert!(page.body.contains("value=\"bob@example.com\""));
    assert!(!page.body.contains(PASSWORD));
    assert_eq!(app.count("users").await, 0);
}

#[tokio::test]
async fn login_with_correct_password() {
    let app = TestApp::new().await;
    let mut first = app.signed_in("carol").await;
    assert_redirect(&first.get("/logout/").await, "/");

    let mut browser = app.browser();
    let page = browser
        .post("/login/", &[("email", "  CAROL@example.com "), ("password", PASSWORD)])
        .await;
    assert_redirect(&page, "/");

    // signed-in users are bounced off the login page
    assert_redirect(&browser.get("/login/").await, "/");
    assert!(browser.get("/").await.body.contains("@carol"));
}

#[tokio::test]
async fn login_with_wrong_password_shows_generic_error() {
    let app = TestApp::new().await;
    app.signed_in("dave").await;

    let mut browser = app.browser();
    let page = browser
        .post("/login/", &[("email", "dave@example.com"), ("password", "nope")])
        .await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Invalid username or password. Please try again."));
    assert!(!page.body.contains("User does not exist"));
    assert!(page.body.contains("value=\"dave@example.com\""));
    assert!(!browser.get("/").await.body.contains("@dave"));
}

#[tokio::test]
async fn login_with_unknown_email_reports_both() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let page = browser
        .post("/login/", &[("email", "ghost@example.com"), ("password", PASSWORD)])
        .await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("User does not exist"));
    assert!(page.body.contains("Invalid username or password. Please try again."));
}

#[tokio::test]
async fn flashes_show_once() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    browser
        .post("/login/", &[("email", "ghost@example.com"), ("password", "x")])
        .await;
    let next = browser.get("/login/").await;
    assert!(!next.body.contains("User does not exist"));
}

#[tokio::test]
async fn logout_ends_session() {
    let app = TestApp::new().await;
    let mut browser = app.signed_in("erin").await;

    assert_redirect(&browser.get("/logout/").await, "/");

    let home = browser.get("/").await;
    assert!(!home.body.contains("@erin"));
    assert_redirect(&browser.get("/create-room/").await, "/login/");
}
