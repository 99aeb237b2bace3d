use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::User;

pub struct NewUser<'a> {
    pub name: Option<&'a str>,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

pub struct ProfileUpdate<'a> {
    pub name: Option<&'a str>,
    pub username: &'a str,
    pub email: &'a str,
    pub bio: Option<&'a str>,
    /// `None` keeps the current avatar.
    pub avatar: Option<&'a str>,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn create(db_pool: &SqlitePool, new: NewUser<'_>) -> sqlx::Result<User> {
        let id = Uuid::now_v7().to_string();

        sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (id, name, username, email, password_hash, created)
VALUES (?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(new.name)
        .bind(new.username)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(super::now())
        .fetch_one(db_pool)
        .await
    }

    pub async fn get_by_id(db_pool: &SqlitePool, id: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(db_pool)
            .await
    }

    pub async fn get_by_email(db_pool: &SqlitePool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(db_pool)
            .await
    }

    /// Whether another user (not `except`) already holds this username, ignoring case.
    pub async fn username_taken(
        db_pool: &SqlitePool,
        username: &str,
        except: Option<&str>,
    ) -> sqlx::Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM users WHERE lower(username) = lower(?) AND id IS NOT ?",
        )
        .bind(username)
        .bind(except)
        .fetch_optional(db_pool)
        .await?;
        Ok(row.is_some())
    }

    pub async fn email_taken(
        db_pool: &SqlitePool,
        email: &str,
        except: Option<&str>,
    ) -> sqlx::Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM users WHERE lower(email) = lower(?) AND id IS NOT ?",
        )
        .bind(email)
        .bind(except)
        .fetch_optional(db_pool)
        .await?;
        Ok(row.is_some())
    }

    pub async fn update_profile(
        db_pool: &SqlitePool,
        id: &str,
        update: ProfileUpdate<'_>,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
UPDATE users
SET name = ?, username = ?, email = ?, bio = ?, avatar = COALESCE(?, avatar)
WHERE id = ?
            "#,
        )
        .bind(update.name)
        .bind(update.username)
        .bind(update.email)
        .bind(update.bio)
        .bind(update.avatar)
        .bind(id)
        .execute(db_pool)
        .await?;

        Ok(())
    }
}
