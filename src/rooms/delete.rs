use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db::{RoomRepository, User},
    include_res,
    res::{self, escape, fill},
    session::LoggedIn,
    AppResult, AppState,
};

#[debug_handler(state = AppState)]
pub(crate) async fn delete_room_page(
    State(db_pool): State<SqlitePool>,
    LoggedIn { session, user }: LoggedIn,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    let Some(room) = RoomRepository::get(&db_pool, &room_id).await? else {
        return res::sorry("room");
    };
    if !room.is_hosted_by(&user) {
        return res::forbidden("You are not allowed to delete the room!!");
    }

    render_confirm(&session, &user, &room.name, &format!("/room/{}/", room.id)).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_room(
    State(db_pool): State<SqlitePool>,
    LoggedIn { user, .. }: LoggedIn,
    Path(room_id): Path<String>,
) -> AppResult<Response> {
    let Some(room) = RoomRepository::get(&db_pool, &room_id).await? else {
        return res::sorry("room");
    };
    if !room.is_hosted_by(&user) {
        tracing::debug!("@{} may not delete room {}", user.username, room.id);
        return res::forbidden("You are not allowed to delete the room!!");
    }

    RoomRepository::delete(&db_pool, &room.id).await?;
    tracing::info!("@{} deleted room {} ({})", user.username, room.id, room.name);

    Ok(Redirect::to("/").into_response())
}

/// "Are you sure" page; the form posts back to the current URL.
pub(super) async fn render_confirm(
    session: &Session,
    user: &User,
    what: &str,
    cancel_url: &str,
) -> AppResult<Response> {
    let content = fill(
        include_res!(str, "/pages/delete.html"),
        &[
            ("what", escape(what).as_str()),
            ("cancel", escape(cancel_url).as_str()),
        ],
    );
    res::page(session, Some(user), "Delete", &content).await
}
