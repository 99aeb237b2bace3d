use sqlx::FromRow;

pub const DEFAULT_AVATAR: &str = "/static/avatar.svg";

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: Option<String>,
    /// File name under the media directory.
    pub avatar: Option<String>,
    pub created: i64,
}

impl User {
    pub fn avatar_url(&self) -> String {
        avatar_url(self.avatar.as_deref())
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

pub fn avatar_url(avatar: Option<&str>) -> String {
    match avatar {
        Some(file) => format!("/media/{file}"),
        None => DEFAULT_AVATAR.to_owned(),
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub room_count: i64,
}

/// A room joined with its host and topic names.
#[derive(Debug, Clone, FromRow)]
pub struct Room {
    pub id: String,
    pub host_id: Option<String>,
    pub host_username: Option<String>,
    pub host_avatar: Option<String>,
    pub topic_name: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub created: i64,
    pub updated: i64,
    pub participant_count: i64,
}

impl Room {
    pub fn is_hosted_by(&self, user: &User) -> bool {
        self.host_id.as_deref() == Some(user.id.as_str())
    }
}

/// A message joined with its author and room.
#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub avatar: Option<String>,
    pub room_id: String,
    pub room_name: String,
    pub body: String,
    pub created: i64,
}

impl Message {
    pub fn is_authored_by(&self, user: &User) -> bool {
        self.user_id == user.id
    }
}
