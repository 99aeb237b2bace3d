use axum::{routing::get, Router};
use sqlx::SqlitePool;

use crate::{
    db::{User, UserRepository},
    AppResult, AppState,
};

mod login;
mod logout;
pub mod password;
pub(crate) mod register;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login/", get(login::login_page).post(login::login))
        .route("/logout/", get(logout::logout))
        .route("/register/", get(register::register_page).post(register::register))
}

/// The user with this (already lowercased) email, if the password matches.
pub async fn authenticate(db_pool: &SqlitePool, email: &str, password: &str) -> AppResult<Option<User>> {
    let Some(user) = UserRepository::get_by_email(db_pool, email).await? else {
        return Ok(None);
    };

    if password::verify_password(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}
