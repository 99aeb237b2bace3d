use axum::{debug_handler, extract::State, response::Response};
use sqlx::SqlitePool;

use crate::{
    db::{models::avatar_url, Message, MessageRepository, User},
    include_res,
    res::{self, escape, fill, markdown, time_since},
    rooms::msg::delete_link,
    session::Visitor,
    AppResult, AppState,
};

/// A message as it appears in activity feeds, linking back to its room.
pub fn feed_item_to_html(message: &Message, viewer: Option<&User>) -> String {
    fill(
        include_res!(str, "/pages/activity_item.html"),
        &[
            ("user_id", message.user_id.as_str()),
            ("username", escape(&message.username).as_str()),
            ("avatar", escape(&avatar_url(message.avatar.as_deref())).as_str()),
            ("created", time_since(message.created).as_str()),
            ("room_id", message.room_id.as_str()),
            ("room_name", escape(&message.room_name).as_str()),
            ("delete", delete_link(message, viewer).as_str()),
            ("body", markdown(&message.body).as_str()),
        ],
    )
}

pub fn feed_to_html(messages: &[Message], viewer: Option<&User>) -> String {
    if messages.is_empty() {
        return "<p class=\"activities__empty\">Nothing here yet.</p>".to_owned();
    }
    messages
        .iter()
        .map(|message| feed_item_to_html(message, viewer))
        .collect()
}

#[debug_handler(state = AppState)]
pub async fn activity_page(
    State(db_pool): State<SqlitePool>,
    Visitor { session, user }: Visitor,
) -> AppResult<Response> {
    let messages = MessageRepository::recent(&db_pool).await?;
    let feed = feed_to_html(&messages, user.as_ref());

    let content = fill(
        include_res!(str, "/pages/activity.html"),
        &[("feed", feed.as_str())],
    );
    res::page(&session, user.as_ref(), "Recent activity", &content).await
}
