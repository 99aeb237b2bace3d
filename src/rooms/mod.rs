mod delete;
mod edit;
pub mod msg;
mod new;
mod room;

use axum::{response::Response, routing::get, Router};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    db::{models::avatar_url, Room, Topic, User},
    include_res,
    res::{self, escape, fill, time_since},
    AppResult, AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/room/{id}/", get(room::room).post(room::post_message))
        .route("/create-room/", get(new::new_room_page).post(new::new_room))
        .route("/update-room/{id}/", get(edit::edit_room_page).post(edit::edit_room))
        .route("/delete-room/{id}/", get(delete::delete_room_page).post(delete::delete_room))
        .route("/delete-msg/{id}/", get(msg::delete_msg_page).post(msg::delete_msg))
}

/// Fields shared by the create and update forms.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RoomForm {
    topic: String,
    name: String,
    description: String,
}

impl RoomForm {
    fn from_room(room: &Room) -> Self {
        RoomForm {
            topic: room.topic_name.clone().unwrap_or_default(),
            name: room.name.clone(),
            description: room.description.clone().unwrap_or_default(),
        }
    }

    fn errors(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if self.topic.trim().is_empty() {
            errors.push("Pick or type a topic.");
        }
        if self.name.trim().is_empty() {
            errors.push("The room needs a name.");
        }
        errors
    }

    fn description(&self) -> Option<&str> {
        let description = self.description.trim();
        (!description.is_empty()).then_some(description)
    }
}

async fn render_room_form(
    session: &Session,
    user: &User,
    title: &str,
    form: &RoomForm,
    topics: &[Topic],
) -> AppResult<Response> {
    let topic_options: String = topics
        .iter()
        .map(|topic| format!("<option value=\"{}\"></option>", escape(&topic.name)))
        .collect();

    let content = fill(
        include_res!(str, "/pages/rooms/room_form.html"),
        &[
            ("title", escape(title).as_str()),
            ("topic", escape(&form.topic).as_str()),
            ("name", escape(&form.name).as_str()),
            ("description", escape(&form.description).as_str()),
            ("topic_options", topic_options.as_str()),
        ],
    );
    res::page(session, Some(user), title, &content).await
}

/// One entry of a room feed.
pub fn room_to_html(room: &Room) -> String {
    let host = match (&room.host_id, &room.host_username) {
        (Some(id), Some(username)) => fill(
            include_res!(str, "/pages/rooms/room_host.html"),
            &[
                ("host_id", id.as_str()),
                ("host_username", escape(username).as_str()),
                ("host_avatar", escape(&avatar_url(room.host_avatar.as_deref())).as_str()),
            ],
        ),
        _ => "<span class=\"room__host\">nobody</span>".to_owned(),
    };

    fill(
        include_res!(str, "/pages/rooms/room_item.html"),
        &[
            ("id", room.id.as_str()),
            ("name", escape(&room.name).as_str()),
            ("host", host.as_str()),
            ("topic", escape(room.topic_name.as_deref().unwrap_or("")).as_str()),
            ("participant_count", room.participant_count.to_string().as_str()),
            ("created", time_since(room.created).as_str()),
        ],
    )
}
