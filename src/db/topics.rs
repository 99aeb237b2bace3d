use sqlx::SqlitePool;
use uuid::Uuid;

use super::{like_pattern, models::Topic};

pub struct TopicRepository;

impl TopicRepository {
    /// Returns the id of the topic called `name`, inserting it first if needed.
    /// The flag is true when this call created it.
    pub async fn get_or_create(db_pool: &SqlitePool, name: &str) -> sqlx::Result<(String, bool)> {
        let inserted = sqlx::query("INSERT INTO topics (id, name) VALUES (?, ?) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::now_v7().to_string())
            .bind(name)
            .execute(db_pool)
            .await?
            .rows_affected();

        let (id,): (String,) = sqlx::query_as("SELECT id FROM topics WHERE name = ?")
            .bind(name)
            .fetch_one(db_pool)
            .await?;

        Ok((id, inserted == 1))
    }

    /// Topics whose name contains `q` (case-insensitive), oldest first, with room counts.
    pub async fn search(db_pool: &SqlitePool, q: &str, limit: Option<i64>) -> sqlx::Result<Vec<Topic>> {
        sqlx::query_as::<_, Topic>(
            r#"
SELECT t.id, t.name, (SELECT COUNT(*) FROM rooms r WHERE r.topic_id = t.id) AS room_count
FROM topics t
WHERE t.name LIKE ? ESCAPE '\'
ORDER BY t.id
LIMIT ?
            "#,
        )
        .bind(like_pattern(q))
        .bind(limit.unwrap_or(-1))
        .fetch_all(db_pool)
        .await
    }

    pub async fn all(db_pool: &SqlitePool) -> sqlx::Result<Vec<Topic>> {
        Self::search(db_pool, "", None).await
    }

    pub async fn count(db_pool: &SqlitePool) -> sqlx::Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM topics")
            .fetch_one(db_pool)
            .await?;
        Ok(count)
    }
}
