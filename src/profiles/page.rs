use axum::{
    debug_handler,
    extract::{Path, State},
    response::Response,
};
use sqlx::SqlitePool;

use crate::{
    activity::feed_to_html,
    db::{MessageRepository, RoomRepository, TopicRepository, UserRepository},
    include_res,
    res::{self, escape, fill},
    rooms::room_to_html,
    session::Visitor,
    topics::topic_to_html,
    AppResult, AppState,
};

#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    State(db_pool): State<SqlitePool>,
    Visitor { session, user: viewer }: Visitor,
    Path(profile_id): Path<String>,
) -> AppResult<Response> {
    let Some(user) = UserRepository::get_by_id(&db_pool, &profile_id).await? else {
        return res::sorry("profile");
    };

    let rooms = RoomRepository::hosted_by(&db_pool, &user.id).await?;
    let messages = MessageRepository::by_user(&db_pool, &user.id).await?;
    let topics = TopicRepository::all(&db_pool).await?;

    let room_items: String = if rooms.is_empty() {
        "<p class=\"roomList__empty\">No rooms yet.</p>".to_owned()
    } else {
        rooms.iter().map(room_to_html).collect()
    };
    let topic_items: String = topics.iter().map(topic_to_html).collect();

    let edit = match &viewer {
        Some(viewer) if viewer.id == user.id => include_res!(str, "/pages/profiles/edit_link.html"),
        _ => "",
    };

    let content = fill(
        include_res!(str, "/pages/profiles/profile.html"),
        &[
            ("avatar", escape(&user.avatar_url()).as_str()),
            ("display_name", escape(user.display_name()).as_str()),
            ("username", escape(&user.username).as_str()),
            ("bio", escape(user.bio.as_deref().unwrap_or("")).as_str()),
            ("edit", edit),
            ("room_count", rooms.len().to_string().as_str()),
            ("rooms", room_items.as_str()),
            ("activity", feed_to_html(&messages, viewer.as_ref()).as_str()),
            ("topics", topic_items.as_str()),
        ],
    );

    res::page(&session, viewer.as_ref(), &user.username, &content).await
}
