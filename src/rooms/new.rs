use axum::{
    debug_handler,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;

use crate::{
    db::{RoomRepository, TopicRepository},
    session::{self, LoggedIn},
    AppResult, AppState,
};

use super::{render_room_form, RoomForm};

#[debug_handler(state = AppState)]
pub(crate) async fn new_room_page(
    State(db_pool): State<SqlitePool>,
    LoggedIn { session, user }: LoggedIn,
) -> AppResult<Response> {
    let topics = TopicRepository::all(&db_pool).await?;
    render_room_form(&session, &user, "Create room", &RoomForm::default(), &topics).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_room(
    State(db_pool): State<SqlitePool>,
    LoggedIn { session, user }: LoggedIn,
    Form(form): Form<RoomForm>,
) -> AppResult<Response> {
    let errors = form.errors();
    if !errors.is_empty() {
        for error in errors {
            session::flash(&session, error).await?;
        }
        let topics = TopicRepository::all(&db_pool).await?;
        return render_room_form(&session, &user, "Create room", &form, &topics).await;
    }

    let (topic_id, created) = TopicRepository::get_or_create(&db_pool, form.topic.trim()).await?;
    if created {
        tracing::info!("new topic {}", form.topic.trim());
    }

    let room_id = RoomRepository::create(
        &db_pool,
        &user.id,
        &topic_id,
        form.name.trim(),
        form.description(),
    )
    .await?;
    tracing::info!("@{} created room {room_id} ({})", user.username, form.name.trim());

    Ok(Redirect::to("/").into_response())
}
