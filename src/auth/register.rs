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
    db::{NewUser, UserRepository},
    include_res,
    res::{self, escape, fill},
    session::{self, Visitor},
    AppResult, AppState,
};

use super::password::hash_password;

const USERNAME_MAX: usize = 150;
const PASSWORD_MIN: usize = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RegisterForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn register_page(Visitor { session, user }: Visitor) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render(&session, &RegisterForm::default()).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    Visitor { session, user }: Visitor,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let errors = validate_registration(&db_pool, &form).await?;
    if !errors.is_empty() {
        session::flash(&session, "An error occurred during registration").await?;
        for error in errors {
            session::flash(&session, error).await?;
        }
        return render(&session, &form).await;
    }

    let username = form.username.trim().to_lowercase();
    let email = form.email.trim().to_lowercase();
    let name = form.name.trim();
    let password_hash = hash_password(&form.password1)?;

    let user = UserRepository::create(
        &db_pool,
        NewUser {
            name: (!name.is_empty()).then_some(name),
            username: &username,
            email: &email,
            password_hash: &password_hash,
        },
    )
    .await?;
    tracing::info!("registered @{}#{}", user.username, user.id);

    session::log_in(&session, &user).await?;
    Ok(Redirect::to("/").into_response())
}

/// Everything wrong with the form, in field order. Empty means it can be saved.
pub(crate) async fn validate_registration(db_pool: &SqlitePool, form: &RegisterForm) -> AppResult<Vec<String>> {
    let mut errors = Vec::new();

    if let Some(error) = check_username(&form.username) {
        errors.push(error);
    } else if UserRepository::username_taken(db_pool, form.username.trim(), None).await? {
        errors.push("A user with that username already exists.".to_owned());
    }

    if let Some(error) = check_email(&form.email) {
        errors.push(error);
    } else if UserRepository::email_taken(db_pool, form.email.trim(), None).await? {
        errors.push("A user with that email already exists.".to_owned());
    }

    if form.password1 != form.password2 {
        errors.push("The two password fields didn't match.".to_owned());
    } else if form.password1.chars().count() < PASSWORD_MIN {
        errors.push(format!("This password is too short. It must contain at least {PASSWORD_MIN} characters."));
    } else if form.password1.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_owned());
    }

    Ok(errors)
}

pub(crate) fn check_username(username: &str) -> Option<String> {
    let username = username.trim();
    if username.is_empty() {
        Some("Username is required.".to_owned())
    } else if username.chars().count() > USERNAME_MAX {
        Some(format!("Username must be at most {USERNAME_MAX} characters."))
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        Some("Username may contain only letters, numbers, and @/./+/-/_ characters.".to_owned())
    } else {
        None
    }
}

pub(crate) fn check_email(email: &str) -> Option<String> {
    match email.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => None,
        _ => Some("Enter a valid email address.".to_owned()),
    }
}

async fn render(session: &Session, form: &RegisterForm) -> AppResult<Response> {
    let content = fill(
        include_res!(str, "/pages/register.html"),
        &[
            ("name", escape(&form.name).as_str()),
            ("username", escape(&form.username).as_str()),
            ("email", escape(&form.email).as_str()),
        ],
    );
    res::page(session, None, "Register", &content).await
}
