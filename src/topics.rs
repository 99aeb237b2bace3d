use axum::{
    debug_handler,
    extract::{Query, State},
    response::Response,
};
use sqlx::SqlitePool;

use crate::{
    db::{Topic, TopicRepository},
    include_res,
    index::SearchQuery,
    res::{self, escape, fill, query_escape},
    session::Visitor,
    AppResult, AppState,
};

pub fn topic_to_html(topic: &Topic) -> String {
    fill(
        include_res!(str, "/pages/topic_item.html"),
        &[
            ("q", query_escape(&topic.name).as_str()),
            ("name", escape(&topic.name).as_str()),
            ("room_count", topic.room_count.to_string().as_str()),
        ],
    )
}

#[debug_handler(state = AppState)]
pub async fn topics_page(
    State(db_pool): State<SqlitePool>,
    Visitor { session, user }: Visitor,
    Query(SearchQuery { q }): Query<SearchQuery>,
) -> AppResult<Response> {
    let q = q.unwrap_or_default();
    let topics: String = TopicRepository::search(&db_pool, &q, None)
        .await?
        .iter()
        .map(topic_to_html)
        .collect();

    let content = fill(
        include_res!(str, "/pages/topics.html"),
        &[("q", escape(&q).as_str()), ("topics", topics.as_str())],
    );
    res::page(&session, user.as_ref(), "Topics", &content).await
}
