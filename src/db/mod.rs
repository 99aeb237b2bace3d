pub mod models;
pub mod users;
pub mod topics;
pub mod rooms;
pub mod messages;

use std::str::FromStr;

use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

pub use models::{Message, Room, Topic, User};
pub use users::{NewUser, ProfileUpdate, UserRepository};
pub use topics::TopicRepository;
pub use rooms::RoomRepository;
pub use messages::MessageRepository;

pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Opens the pool and brings the schema up to date.
///
/// Foreign keys are on for every connection, which is what makes room
/// deletion cascade to messages and participants.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if database_url.contains(":memory:") {
        // every connection to :memory: is its own database
        pool_options = pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let db_pool = pool_options.connect_with(options).await?;
    MIGRATOR.run(&db_pool).await?;

    Ok(db_pool)
}

/// Unix milliseconds, the unit every `created`/`updated` column is stored in.
pub fn now() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// `LIKE` pattern for a case-insensitive substring match, used with `ESCAPE '\'`.
pub(crate) fn like_pattern(q: &str) -> String {
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for c in q.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    connect("sqlite::memory:", 1).await.unwrap()
}
