pub mod activity;
pub mod auth;
pub mod config;
pub mod db;
pub mod index;
pub mod profiles;
pub mod res;
pub mod rooms;
pub mod session;
pub mod topics;

mod appresult;

use std::sync::Arc;

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
pub use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<Config>,
}

/// The whole site: pages, uploaded media, sessions and request tracing.
pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.session_inactivity_minutes,
        )));

    let media = ServeDir::new(&state.config.media_dir);

    Router::new()
        .route("/", get(index::home))
        .route("/topics/", get(topics::topics_page))
        .route("/activity/", get(activity::activity_page))
        .route("/static/avatar.svg", get(res::default_avatar))

        .merge(auth::router())
        .merge(rooms::router())
        .merge(profiles::router())
        .nest_service("/media", media)

        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
