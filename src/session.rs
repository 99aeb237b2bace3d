use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::{
    db::{User, UserRepository},
    AppError, AppResult, AppState,
};

pub const USER_ID: &str = "user_id";
pub const FLASHES: &str = "flashes";

pub const LOGIN_URL: &str = "/login/";

/// Whoever is making the request, signed in or not.
pub struct Visitor {
    pub session: Session,
    pub user: Option<User>,
}

/// A signed-in user. Anonymous requests are redirected to the login page
/// before the handler runs.
pub struct LoggedIn {
    pub session: Session,
    pub user: User,
}

impl FromRequestParts<AppState> for Visitor {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let user = current_user(&session, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(Visitor { session, user })
    }
}

impl FromRequestParts<AppState> for LoggedIn {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Visitor { session, user } = Visitor::from_request_parts(parts, state).await?;
        match user {
            Some(user) => Ok(LoggedIn { session, user }),
            None => {
                tracing::debug!("anonymous request to {}, sending to login", parts.uri.path());
                Err(Redirect::to(LOGIN_URL).into_response())
            }
        }
    }
}

async fn current_user(session: &Session, state: &AppState) -> AppResult<Option<User>> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(None);
    };

    let user = UserRepository::get_by_id(&state.db_pool, &user_id).await?;
    if user.is_none() {
        // the account is gone, forget it
        session.remove::<String>(USER_ID).await?;
    }
    Ok(user)
}

pub async fn log_in(session: &Session, user: &User) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, &user.id).await?;
    Ok(())
}

pub async fn log_out(session: &Session) -> AppResult<()> {
    session.flush().await.map_err(AppError::from)
}

/// Queues a one-shot message for the next rendered page.
pub async fn flash(session: &Session, message: impl Into<String>) -> AppResult<()> {
    let mut flashes: Vec<String> = session.get(FLASHES).await?.unwrap_or_default();
    flashes.push(message.into());
    session.insert(FLASHES, flashes).await?;
    Ok(())
}

pub async fn take_flashes(session: &Session) -> AppResult<Vec<String>> {
    Ok(session.remove(FLASHES).await?.unwrap_or_default())
}
