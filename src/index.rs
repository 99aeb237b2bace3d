use axum::{
    debug_handler,
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    activity::feed_to_html,
    db::{MessageRepository, RoomRepository, TopicRepository},
    include_res,
    res::{self, fill},
    rooms::room_to_html,
    session::Visitor,
    topics::topic_to_html,
    AppResult, AppState,
};

pub const SIDEBAR_TOPICS: i64 = 5;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[debug_handler(state = AppState)]
pub async fn home(
    State(db_pool): State<SqlitePool>,
    Visitor { session, user }: Visitor,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> AppResult<Response> {
    let q = q.unwrap_or_default();

    let rooms = RoomRepository::search(&db_pool, &q).await?;
    let room_messages = MessageRepository::in_topics_matching(&db_pool, &q).await?;
    let topics = TopicRepository::search(&db_pool, "", Some(SIDEBAR_TOPICS)).await?;
    let topic_total = TopicRepository::count(&db_pool).await?;

    let room_items: String = if rooms.is_empty() {
        "<p class=\"roomList__empty\">No rooms found.</p>".to_owned()
    } else {
        rooms.iter().map(room_to_html).collect()
    };
    let topic_items: String = topics.iter().map(topic_to_html).collect();
    let more_topics = if topic_total > SIDEBAR_TOPICS {
        "<a class=\"btn btn--link\" href=\"/topics/\">More</a>"
    } else {
        ""
    };

    let content = fill(
        include_res!(str, "/pages/home.html"),
        &[
            ("room_count", rooms.len().to_string().as_str()),
            ("rooms", room_items.as_str()),
            ("topics", topic_items.as_str()),
            ("more_topics", more_topics),
            ("activity", feed_to_html(&room_messages, user.as_ref()).as_str()),
        ],
    );

    res::page(&session, user.as_ref(), "Home", &content).await
}
