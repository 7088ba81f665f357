use std::net::SocketAddr;

use anyhow::{Context, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection string; see `qna_db::Database::connect`.
    pub db_uri: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_uri = get("DB_URI")
            .filter(|v| !v.trim().is_empty())
            .context("DB_URI not set")?;

        let host = get("QNA_HOST").unwrap_or_else(|| DEFAULT_HOST.into());
        let port = match get("QNA_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("QNA_PORT is not a valid port: {raw}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self { db_uri, host, port })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
