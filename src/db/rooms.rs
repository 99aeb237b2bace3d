use sqlx::SqlitePool;
use uuid::Uuid;

use super::{
    like_pattern,
    models::{Room, User},
};

const SELECT_ROOMS: &str = r#"
SELECT r.id, r.host_id, u.username AS host_username, u.avatar AS host_avatar,
       t.name AS topic_name, r.name, r.description, r.created, r.updated,
       (SELECT COUNT(*) FROM room_participants p WHERE p.room_id = r.id) AS participant_count
FROM rooms r
LEFT JOIN users u ON u.id = r.host_id
LEFT JOIN topics t ON t.id = r.topic_id
"#;

const ORDER_ROOMS: &str = "ORDER BY r.updated DESC, r.created DESC, r.id DESC";

pub struct RoomRepository;

impl RoomRepository {
    pub async fn create(
        db_pool: &SqlitePool,
        host_id: &str,
        topic_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> sqlx::Result<String> {
        let id = Uuid::now_v7().to_string();
        let now = super::now();

        sqlx::query(
            "INSERT INTO rooms (id, host_id, topic_id, name, description, created, updated) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(host_id)
        .bind(topic_id)
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(db_pool)
        .await?;

        Ok(id)
    }

    pub async fn get(db_pool: &SqlitePool, id: &str) -> sqlx::Result<Option<Room>> {
        sqlx::query_as::<_, Room>(&format!("{SELECT_ROOMS} WHERE r.id = ?"))
            .bind(id)
            .fetch_optional(db_pool)
            .await
    }

    /// Rooms whose topic name, name or description contains `q`, ignoring case.
    pub async fn search(db_pool: &SqlitePool, q: &str) -> sqlx::Result<Vec<Room>> {
        let pattern = like_pattern(q);
        sqlx::query_as::<_, Room>(&format!(
            r#"{SELECT_ROOMS}
WHERE t.name LIKE ?1 ESCAPE '\'
   OR r.name LIKE ?1 ESCAPE '\'
   OR r.description LIKE ?1 ESCAPE '\'
{ORDER_ROOMS}"#
        ))
        .bind(&pattern)
        .fetch_all(db_pool)
        .await
    }

    pub async fn hosted_by(db_pool: &SqlitePool, host_id: &str) -> sqlx::Result<Vec<Room>> {
        sqlx::query_as::<_, Room>(&format!("{SELECT_ROOMS} WHERE r.host_id = ? {ORDER_ROOMS}"))
            .bind(host_id)
            .fetch_all(db_pool)
            .await
    }

    pub async fn update(
        db_pool: &SqlitePool,
        id: &str,
        topic_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE rooms SET topic_id = ?, name = ?, description = ?, updated = ? WHERE id = ?")
            .bind(topic_id)
            .bind(name)
            .bind(description)
            .bind(super::now())
            .bind(id)
            .execute(db_pool)
            .await?;
        Ok(())
    }

    /// Messages and participation rows go with it.
    pub async fn delete(db_pool: &SqlitePool, id: &str) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM rooms WHERE id = ?")
            .bind(id)
            .execute(db_pool)
            .await?;
        Ok(())
    }

    pub async fn participants(db_pool: &SqlitePool, room_id: &str) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
SELECT u.*
FROM room_participants p
JOIN users u ON u.id = p.user_id
WHERE p.room_id = ?
ORDER BY u.username
            "#,
        )
        .bind(room_id)
        .fetch_all(db_pool)
        .await
    }
}
