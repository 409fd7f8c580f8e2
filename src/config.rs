use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

/// Process configuration, read from the environment (after `.env` is loaded).
///
/// | Env Var               | Default                    |
/// |-----------------------|----------------------------|
/// | `HOST`                | `0.0.0.0`                  |
/// | `PORT`                | `3000`                     |
/// | `DATABASE_URL`        | `sqlite://media_board.db`  |
/// | `UPLOAD_DIR`          | `uploads`                  |
/// | `MAX_BODY_BYTES`      | `52428800`                 |
/// | `DB_QUERY_TIMEOUT_MS` | `10000`                    |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    /// Upper bound on any request body, multipart uploads included.
    pub max_body_bytes: usize,
    pub query_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port = env_or("PORT", "3000")
            .parse::<u16>()
            .context("PORT must be a valid u16")?;

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://media_board.db".into());

        let upload_dir = PathBuf::from(env_or("UPLOAD_DIR", "uploads"));

        let max_body_bytes = env_or("MAX_BODY_BYTES", "52428800")
            .parse::<usize>()
            .context("MAX_BODY_BYTES must be a valid byte count")?;

        let query_timeout_ms = env_or("DB_QUERY_TIMEOUT_MS", "10000")
            .parse::<u64>()
            .context("DB_QUERY_TIMEOUT_MS must be a valid number of milliseconds")?;

        Ok(Self {
            host,
            port,
            database_url,
            upload_dir,
            max_body_bytes,
            query_timeout: Duration::from_millis(query_timeout_ms),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
