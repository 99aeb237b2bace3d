use std::{fmt::Display, path::PathBuf, str::FromStr};

use anyhow::anyhow;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Where uploaded avatars are written and served from.
    pub media_dir: PathBuf,
    pub session_inactivity_minutes: i64,
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "127.0.0.1".to_owned(),
            server_port: 8080,
            database_url: "sqlite://studybud.db".to_owned(),
            db_max_connections: 16,
            media_dir: PathBuf::from("media"),
            session_inactivity_minutes: 60,
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Reads the environment (and `.env` if present) over the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        Ok(Config {
            server_host: var("SERVER_HOST", defaults.server_host)?,
            server_port: var("SERVER_PORT", defaults.server_port)?,
            database_url: var("DATABASE_URL", defaults.database_url)?,
            db_max_connections: var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            media_dir: var("MEDIA_DIR", defaults.media_dir)?,
            session_inactivity_minutes: var(
                "SESSION_INACTIVITY_MINUTES",
                defaults.session_inactivity_minutes,
            )?,
            secure_cookies: var("SECURE_COOKIES", defaults.secure_cookies)?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match dotenv::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {key}: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_keys_fall_back_to_default() {
        assert_eq!(var("STUDYBUD_TEST_UNSET_PORT", 8080u16).unwrap(), 8080);
        assert_eq!(Config::default().server_address(), "127.0.0.1:8080");
    }

    #[test]
    fn bad_number_is_rejected() {
        // SAFETY: no other test reads this key
        unsafe { std::env::set_var("STUDYBUD_TEST_BAD_PORT", "eighty") };
        let err = var("STUDYBUD_TEST_BAD_PORT", 8080u16).unwrap_err();
        assert!(err.to_string().starts_with("Invalid STUDYBUD_TEST_BAD_PORT"));
    }
}
