use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db::{models::avatar_url, MessageRepository, RoomRepository},
    include_res,
    res::{self, escape, fill, time_since},
    session::{self, Visitor, LOGIN_URL},
    AppResult, AppState,
};

use super::msg;

#[derive(Deserialize)]
pub(crate) struct MessageForm {
    #[serde(default)]
    body: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn room(
    State(db_pool): State<SqlitePool>,
    Visitor { session, user }: Visitor,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    let Some(room) = RoomRepository::get(&db_pool, &room_id).await? else {
        return res::sorry("room");
    };

    let messages: String = MessageRepository::in_room(&db_pool, &room_id)
        .await?
        .iter()
        .map(|message| msg::msg_to_html(message, user.as_ref()))
        .collect();

    let participants = RoomRepository::participants(&db_pool, &room_id).await?;
    let participant_items: String = participants
        .iter()
        .map(|participant| {
            fill(
                include_res!(str, "/pages/rooms/participant.html"),
                &[
                    ("id", participant.id.as_str()),
                    ("avatar", escape(&participant.avatar_url()).as_str()),
                    ("display_name", escape(participant.display_name()).as_str()),
                    ("username", escape(&participant.username).as_str()),
                ],
            )
        })
        .collect();

    let actions = match &user {
        Some(user) if room.is_hosted_by(user) => fill(
            include_res!(str, "/pages/rooms/room_actions.html"),
            &[("id", room.id.as_str())],
        ),
        _ => String::new(),
    };

    let message_form = if user.is_some() {
        fill(
            include_res!(str, "/pages/rooms/message_form.html"),
            &[("id", room.id.as_str())],
        )
    } else {
        format!("<p class=\"room__join\"><a href=\"{LOGIN_URL}\">Log in</a> to join the conversation.</p>")
    };

    let content = fill(
        include_res!(str, "/pages/rooms/room.html"),
        &[
            ("name", escape(&room.name).as_str()),
            ("topic", escape(room.topic_name.as_deref().unwrap_or("")).as_str()),
            ("host_id", room.host_id.as_deref().unwrap_or("")),
            ("host_username", escape(room.host_username.as_deref().unwrap_or("nobody")).as_str()),
            ("host_avatar", escape(&avatar_url(room.host_avatar.as_deref())).as_str()),
            ("created", time_since(room.created).as_str()),
            ("description", escape(room.description.as_deref().unwrap_or("")).as_str()),
            ("actions", actions.as_str()),
            ("messages", messages.as_str()),
            ("message_form", message_form.as_str()),
            ("participant_count", participants.len().to_string().as_str()),
            ("participants", participant_items.as_str()),
        ],
    );

    res::page(&session, user.as_ref(), &room.name, &content).await
}

/// A POST to the room page. The author joins the room as a side effect.
#[debug_handler(state = AppState)]
pub(crate) async fn post_message(
    State(db_pool): State<SqlitePool>,
    Visitor { session, user }: Visitor,
    Path(room_id): Path<String>,
    Form(MessageForm { body }): Form<MessageForm>,
) -> AppResult<Response> {
    let Some(user) = user else {
        return Ok(Redirect::to(LOGIN_URL).into_response());
    };

    if RoomRepository::get(&db_pool, &room_id).await?.is_none() {
        return res::sorry("room");
    }

    let body = body.trim();
    if body.is_empty() {
        session::flash(&session, "Write something before sending.").await?;
    } else {
        let (message_id, joined) = MessageRepository::post(&db_pool, &room_id, &user.id, body).await?;
        tracing::debug!("@{} posted {message_id} in {room_id}", user.username);
        if joined {
            tracing::info!("@{} joined room {room_id}", user.username);
        }
    }

    Ok(Redirect::to(&format!("/room/{room_id}/")).into_response())
}
