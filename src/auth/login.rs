use axum::{
    debug_handler,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db::UserRepository,
    include_res,
    res::{self, escape, fill},
    session::{self, Visitor},
    AppResult, AppState,
};

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn login_page(Visitor { session, user }: Visitor) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render(&session, "").await
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    Visitor { session, user }: Visitor,
    Form(LoginForm { email, password }): Form<LoginForm>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let email = email.trim().to_lowercase();

    // an unknown email is reported, yet the credentials are still checked
    if UserRepository::get_by_email(&db_pool, &email).await?.is_none() {
        session::flash(&session, "User does not exist").await?;
    }

    match super::authenticate(&db_pool, &email, &password).await? {
        Some(user) => {
            session::log_in(&session, &user).await?;
            tracing::info!("welcome @{}#{}", user.username, user.id);
            Ok(Redirect::to("/").into_response())
        }
        None => {
            tracing::debug!("failed login for {email}");
            session::flash(&session, "Invalid username or password. Please try again.").await?;
            render(&session, &email).await
        }
    }
}

async fn render(session: &Session, email: &str) -> AppResult<Response> {
    let content = fill(
        include_res!(str, "/pages/login.html"),
        &[("email", escape(email).as_str())],
    );
    res::page(session, None, "Login", &content).await
}
