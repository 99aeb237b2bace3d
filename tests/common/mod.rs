#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use studybud::{app, db, res::query_escape, AppState, Config};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery";

pub struct TestApp {
    pub router: Router,
    pub db_pool: SqlitePool,
    pub media: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let media = tempfile::tempdir().unwrap();
        let config = Config {
            media_dir: media.path().to_path_buf(),
            ..Config::default()
        };
        let db_pool = db::connect("sqlite::memory:", 1).await.unwrap();
        let router = app(AppState {
            db_pool: db_pool.clone(),
            config: Arc::new(config),
        });

        TestApp { router, db_pool, media }
    }

    /// A fresh visitor with an empty cookie jar.
    pub fn browser(&self) -> Browser {
        Browser {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// A browser already signed in as a newly registered `username`.
    pub async fn signed_in(&self, username: &str) -> Browser {
        let mut browser = self.browser();
        let email = format!("{username}@example.com");
        let page = browser
            .post(
                "/register/",
                &[
                    ("username", username),
                    ("email", email.as_str()),
                    ("password1", PASSWORD),
                    ("password2", PASSWORD),
                ],
            )
            .await;
        assert_eq!(page.status, StatusCode::SEE_OTHER, "{}", page.body);
        browser
    }

    pub async fn user_id(&self, username: &str) -> String {
        let (id,): (String,) = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.db_pool)
            .await
            .unwrap();
        id
    }

    pub async fn count(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.db_pool)
            .await
            .unwrap();
        count
    }

    pub async fn room_id(&self, name: &str) -> String {
        let (id,): (String,) = sqlx::query_as("SELECT id FROM rooms WHERE name = ?")
            .bind(name)
            .fetch_one(&self.db_pool)
            .await
            .unwrap();
        id
    }
}

pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub struct Browser {
    router: Router,
    pub cookie: Option<String>,
}

impl Browser {
    pub async fn get(&mut self, uri: &str) -> Page {
        let request = Request::get(uri);
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> Page {
        let body = form
            .iter()
            .map(|(key, value)| format!("{key}={}", query_escape(value)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_multipart(&mut self, uri: &str, boundary: &str, body: Vec<u8>) -> Page {
        let request = Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> Page {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_owned();
            self.cookie = match pair.split_once('=') {
                Some((_, value)) if !value.is_empty() => Some(pair.clone()),
                _ => None,
            };
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_owned());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        Page {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

pub fn assert_redirect(page: &Page, to: &str) {
    assert_eq!(page.status, StatusCode::SEE_OTHER, "{}", page.body);
    assert_eq!(page.location.as_deref(), Some(to));
}
