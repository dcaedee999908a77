use anyhow::{Context, Result};

const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Application configuration loaded from environment variables.
/// Startup fails if the backend variables are missing; the voice key is optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub auth_url: String,
    pub auth_anon_key: String,
    pub voice_api_key: Option<String>,
    pub voice_id: String,
    pub analytics_measurement_id: Option<String>,
    pub feed_page_size: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            auth_url: require_env("AUTH_URL")?.trim_end_matches('/').to_string(),
            auth_anon_key: require_env("AUTH_ANON_KEY")?,
            voice_api_key: optional_env("VOICE_API_KEY"),
            voice_id: optional_env("VOICE_ID").unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            analytics_measurement_id: optional_env("ANALYTICS_MEASUREMENT_ID"),
            feed_page_size: parse_env("FEED_PAGE_SIZE", 20)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/pekikkan_test".to_string(),
            db_max_connections: 1,
            auth_url: "http://localhost:9999/auth/v1".to_string(),
            auth_anon_key: "anon".to_string(),
            voice_api_key: None,
            voice_id: DEFAULT_VOICE_ID.to_string(),
            analytics_measurement_id: None,
            feed_page_size: 20,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values both read as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
