use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;

use crate::{
    db::{models::avatar_url, Message, MessageRepository, User},
    include_res,
    res::{self, escape, fill, markdown, time_since},
    session::LoggedIn,
    AppResult, AppState,
};

use super::delete::render_confirm;

/// Delete link, shown only to the author.
pub fn delete_link(message: &Message, viewer: Option<&User>) -> String {
    match viewer {
        Some(viewer) if message.is_authored_by(viewer) => fill(
            include_res!(str, "/pages/rooms/message_delete.html"),
            &[("id", message.id.as_str())],
        ),
        _ => String::new(),
    }
}

pub fn msg_to_html(message: &Message, viewer: Option<&User>) -> String {
    fill(
        include_res!(str, "/pages/rooms/message.html"),
        &[
            ("id", message.id.as_str()),
            ("user_id", message.user_id.as_str()),
            ("username", escape(&message.username).as_str()),
            ("avatar", escape(&avatar_url(message.avatar.as_deref())).as_str()),
            ("created", time_since(message.created).as_str()),
            ("delete", delete_link(message, viewer).as_str()),
            ("body", markdown(&message.body).as_str()),
        ],
    )
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_msg_page(
    State(db_pool): State<SqlitePool>,
    LoggedIn { session, user }: LoggedIn,
    Path(message_id): Path<String>,
) -> AppResult<Response> {
    let Some(message) = MessageRepository::get(&db_pool, &message_id).await? else {
        return res::sorry("message");
    };
    if !message.is_authored_by(&user) {
        return res::forbidden("You are not allowed to delete the message!!");
    }

    render_confirm(&session, &user, &message.body, &format!("/room/{}/", message.room_id)).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_msg(
    State(db_pool): State<SqlitePool>,
    LoggedIn { user, .. }: LoggedIn,
    Path(message_id): Path<String>,
) -> AppResult<Response> {
    let Some(message) = MessageRepository::get(&db_pool, &message_id).await? else {
        return res::sorry("message");
    };
    if !message.is_authored_by(&user) {
        tracing::debug!("@{} may not delete message {}", user.username, message.id);
        return res::forbidden("You are not allowed to delete the message!!");
    }

    MessageRepository::delete(&db_pool, &message.id).await?;
    tracing::debug!("@{} deleted message {}", user.username, message.id);

    Ok(Redirect::to(&format!("/room/{}/", message.room_id)).into_response())
}
