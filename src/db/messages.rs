use sqlx::SqlitePool;
use uuid::Uuid;

use super::{like_pattern, models::Message};

const SELECT_MESSAGES: &str = r#"
SELECT m.id, m.user_id, u.username, u.avatar, m.room_id, r.name AS room_name, m.body, m.created
FROM messages m
JOIN users u ON u.id = m.user_id
JOIN rooms r ON r.id = m.room_id
"#;

const ORDER_MESSAGES: &str = "ORDER BY m.created DESC, m.id DESC";

pub struct MessageRepository;

impl MessageRepository {
    /// Stores the message and makes its author a participant of the room.
    /// Returns the new message id and whether the author just joined.
    pub async fn post(
        db_pool: &SqlitePool,
        room_id: &str,
        user_id: &str,
        body: &str,
    ) -> sqlx::Result<(String, bool)> {
        let id = Uuid::now_v7().to_string();
        let now = super::now();

        let mut tx = db_pool.begin().await?;
        sqlx::query("INSERT INTO messages (id, user_id, room_id, body, created, updated) VALUES (?, ?, ?, ?, ?, ?)")
            .bind(&id)
            .bind(user_id)
            .bind(room_id)
            .bind(body)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        let joined = sqlx::query("INSERT OR IGNORE INTO room_participants (room_id, user_id) VALUES (?, ?)")
            .bind(room_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            == 1;
        tx.commit().await?;

        Ok((id, joined))
    }

    pub async fn get(db_pool: &SqlitePool, id: &str) -> sqlx::Result<Option<Message>> {
        sqlx::query_as::<_, Message>(&format!("{SELECT_MESSAGES} WHERE m.id = ?"))
            .bind(id)
            .fetch_optional(db_pool)
            .await
    }

    pub async fn in_room(db_pool: &SqlitePool, room_id: &str) -> sqlx::Result<Vec<Message>> {
        sqlx::query_as::<_, Message>(&format!("{SELECT_MESSAGES} WHERE m.room_id = ? {ORDER_MESSAGES}"))
            .bind(room_id)
            .fetch_all(db_pool)
            .await
    }

    pub async fn by_user(db_pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<Message>> {
        sqlx::query_as::<_, Message>(&format!("{SELECT_MESSAGES} WHERE m.user_id = ? {ORDER_MESSAGES}"))
            .bind(user_id)
            .fetch_all(db_pool)
            .await
    }

    /// Messages in rooms whose topic name contains `q`, ignoring case.
    pub async fn in_topics_matching(db_pool: &SqlitePool, q: &str) -> sqlx::Result<Vec<Message>> {
        sqlx::query_as::<_, Message>(&format!(
            r#"{SELECT_MESSAGES}
JOIN topics t ON t.id = r.topic_id
WHERE t.name LIKE ? ESCAPE '\'
{ORDER_MESSAGES}"#
        ))
        .bind(like_pattern(q))
        .fetch_all(db_pool)
        .await
    }

    pub async fn recent(db_pool: &SqlitePool) -> sqlx::Result<Vec<Message>> {
        sqlx::query_as::<_, Message>(&format!("{SELECT_MESSAGES} {ORDER_MESSAGES}"))
            .fetch_all(db_pool)
            .await
    }

    pub async fn delete(db_pool: &SqlitePool, id: &str) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(db_pool)
            .await?;
        Ok(())
    }
}
