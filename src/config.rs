use std::net::SocketAddr;

use anyhow::Context;

pub const DEFAULT_DATABASE_URL: &str = "postgres://127.0.0.1:5432/social";
pub const DEFAULT_PORT: u16 = 5001;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let host = get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match get("PORT").or_else(|| get("APP_PORT")) {
            Some(v) => v.parse::<u16>().with_context(|| format!("invalid PORT {v:?}"))?,
            None => DEFAULT_PORT,
        };
        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("invalid DB_MAX_CONNECTIONS {v:?}"))?,
            None => 10,
        };
        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
