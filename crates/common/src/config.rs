//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Live coverage feed configuration.
    #[serde(default)]
    pub live_coverage: LiveCoverageConfig,
    /// Admin account created at startup when missing.
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the site.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in hours.
    #[serde(default = "default_session_ttl_hours")]
    pub ttl_hours: i64,
    /// Whether the cookie is marked `Secure`.
    #[serde(default = "default_true")]
    pub secure_cookie: bool,
}

/// Live coverage feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveCoverageConfig {
    /// Interval advertised to feed clients between two polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Reset a question's `answered` flag when its last answer update is deleted.
    #[serde(default)]
    pub revert_answer_on_delete: bool,
}

/// Bootstrap admin credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Login of the admin account.
    pub username: String,
    /// Initial password, ignored once the account exists.
    pub password: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_hours: default_session_ttl_hours(),
            secure_cookie: true,
        }
    }
}

impl Default for LiveCoverageConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            revert_answer_on_delete: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_cookie_name() -> String {
    "tribune_session".to_string()
}

const fn default_session_ttl_hours() -> i64 {
    24 * 7
}

const fn default_poll_interval_secs() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, exported into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `TRIBUNE_ENV`)
    /// 4. Environment variables with `TRIBUNE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("TRIBUNE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TRIBUNE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TRIBUNE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_sections_take_defaults() {
        let raw = config::Config::builder()
            .set_override("server.url", "https://tribune.example")
            .and_then(|b| b.set_override("database.url", "postgres://localhost/tribune"))
            .and_then(|b| b.build())
            .unwrap();

        let config: Config = raw.try_deserialize().unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.session.cookie_name, "tribune_session");
        assert_eq!(config.session.ttl_hours, 168);
        assert_eq!(config.live_coverage.poll_interval_secs, 10);
        assert!(!config.live_coverage.revert_answer_on_delete);
        assert!(config.admin.is_none());
    }
}
