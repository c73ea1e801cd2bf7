//! Connection settings read from the environment.
//!
//! `DATABASE_URL` wins when set. Otherwise the URL is assembled from
//! `DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_PORT` and `DB_NAME`. `DB_ECHO`
//! turns on statement logging and `DB_MAX_CONNECTIONS` caps the pool.

use crate::errors::CrudError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::fmt;
use std::time::Duration;

const DEFAULT_USER: &str = "test_user";
const DEFAULT_PASSWORD: &str = "test_password";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_NAME: &str = "test_db";

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { key, value } => write!(f, "invalid value for {key}: '{value}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url_override: Option<String>,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub echo: bool,
    pub max_connections: Option<u32>,
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url_override", &self.url_override.as_ref().map(|_| "<set>"))
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("echo", &self.echo)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url_override: None,
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            name: DEFAULT_NAME.to_string(),
            echo: false,
            max_connections: None,
        }
    }
}

impl DatabaseConfig {
    /// # Errors
    ///
    /// `ConfigError::Invalid` when `DB_PORT` or `DB_MAX_CONNECTIONS` is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable source.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` when `DB_PORT` or `DB_MAX_CONNECTIONS` is not a number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let port = match lookup("DB_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "DB_PORT",
                value: raw,
            })?,
            None => defaults.port,
        };
        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: raw,
            })?),
            None => None,
        };

        Ok(Self {
            url_override: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            user: lookup("DB_USER").unwrap_or(defaults.user),
            password: lookup("DB_PASSWORD").unwrap_or(defaults.password),
            host: lookup("DB_HOST").unwrap_or(defaults.host),
            port,
            name: lookup("DB_NAME").unwrap_or(defaults.name),
            echo: lookup("DB_ECHO").is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            max_connections,
        })
    }

    #[must_use]
    pub fn url(&self) -> String {
        match &self.url_override {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                url_escape::encode_component(&self.user),
                url_escape::encode_component(&self.password),
                self.host,
                self.port,
                self.name
            ),
        }
    }

    #[must_use]
    pub fn connect_options(&self) -> ConnectOptions {
        let url = self.url();
        let in_memory = url.contains(":memory:");
        let mut opt = ConnectOptions::new(url);
        opt.sqlx_logging(self.echo)
            .connect_timeout(Duration::from_secs(30))
            .acquire_timeout(Duration::from_secs(30));
        if in_memory {
            // every pooled connection would otherwise see its own empty database
            opt.max_connections(1).min_connections(1);
        } else if let Some(max) = self.max_connections {
            opt.max_connections(max);
        }
        opt
    }

    /// Opens the pool.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when the store cannot be reached.
    pub async fn connect(&self) -> Result<DatabaseConnection, CrudError> {
        tracing::info!(host = %self.host, name = %self.name, echo = self.echo, "connecting");
        Database::connect(self.connect_options())
            .await
            .map_err(CrudError::StoreUnavailable)
    }
}
