use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;

use crate::{
    db::{RoomRepository, TopicRepository},
    res,
    session::{self, LoggedIn},
    AppResult, AppState,
};

use super::{render_room_form, RoomForm};

#[debug_handler(state = AppState)]
pub(crate) async fn edit_room_page(
    State(db_pool): State<SqlitePool>,
    LoggedIn { session, user }: LoggedIn,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    let Some(room) = RoomRepository::get(&db_pool, &room_id).await? else {
        return res::sorry("room");
    };
    if !room.is_hosted_by(&user) {
        return res::forbidden("You are not allowed to update the room!");
    }

    let topics = TopicRepository::all(&db_pool).await?;
    render_room_form(&session, &user, "Update room", &RoomForm::from_room(&room), &topics).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_room(
    State(db_pool): State<SqlitePool>,
    LoggedIn { session, user }: LoggedIn,
    Path(room_id): Path<String>,
    Form(form): Form<RoomForm>,
) -> AppResult<Response> {
    let Some(room) = RoomRepository::get(&db_pool, &room_id).await? else {
        return res::sorry("room");
    };
    if !room.is_hosted_by(&user) {
        tracing::debug!("@{} may not update room {}", user.username, room.id);
        return res::forbidden("You are not allowed to update the room!");
    }

    let errors = form.errors();
    if !errors.is_empty() {
        for error in errors {
            session::flash(&session, error).await?;
        }
        let topics = TopicRepository::all(&db_pool).await?;
        return render_room_form(&session, &user, "Update room", &form, &topics).await;
    }

    let (topic_id, _) = TopicRepository::get_or_create(&db_pool, form.topic.trim()).await?;
    RoomRepository::update(&db_pool, &room.id, &topic_id, form.name.trim(), form.description()).await?;
    tracing::info!("@{} updated room {}", user.username, room.id);

    Ok(Redirect::to("/").into_response())
}
