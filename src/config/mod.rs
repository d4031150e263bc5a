use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::str::FromStr;

use crate::domain::retention::RetentionPolicy;

pub const ENV_RETENTION_DAYS: &str = "DRIFTBOARD_RETENTION_DAYS";
pub const ENV_PORT: &str = "DRIFTBOARD_PORT";

const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_connect_timeout_seconds: u64,
    pub retention: RetentionPolicy,
    pub cleanup_interval_seconds: u64,
    pub cleanup_run_on_startup: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let mut retention = RetentionPolicy::default();
        if let Some(raw) = env.get(ENV_RETENTION_DAYS) {
            match raw.trim().parse::<i64>() {
                Ok(days) if retention.set_window_days(days) => {
                    tracing::info!(key = ENV_RETENTION_DAYS, days, "retention window configured");
                }
                _ => tracing::warn!(
                    key = ENV_RETENTION_DAYS,
                    value = %raw,
                    default = retention.window_days(),
                    "invalid retention window, keeping default"
                ),
            }
        }

        let port = match env.get(ENV_PORT) {
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => {
                    tracing::warn!(
                        key = ENV_PORT,
                        value = %raw,
                        default = DEFAULT_PORT,
                        "invalid port, keeping default"
                    );
                    DEFAULT_PORT
                }
            },
            None => DEFAULT_PORT,
        };

        let host = env.or("DRIFTBOARD_BIND_HOST", "0.0.0.0");
        let http_addr = format!("{}:{}", host, port);
        let _parsed_http_addr = SocketAddr::from_str(&http_addr)
            .map_err(|err| anyhow!("invalid DRIFTBOARD_BIND_HOST: {}", err))?;

        let cleanup_interval_seconds: u64 = env.or_parse("CLEANUP_INTERVAL_SECONDS", "3600")?;
        if cleanup_interval_seconds == 0 {
            return Err(anyhow!("invalid CLEANUP_INTERVAL_SECONDS: must be positive"));
        }

        Ok(Self {
            http_addr,
            database_url: env.or("DATABASE_URL", "sqlite://data/driftboard.db?mode=rwc"),
            db_max_connections: env.or_parse("DB_MAX_CONNECTIONS", "5")?,
            db_connect_timeout_seconds: env.or_parse("DB_CONNECT_TIMEOUT_SECONDS", "5")?,
            retention,
            cleanup_interval_seconds,
            cleanup_run_on_startup: env_flag(&env, "CLEANUP_RUN_ON_STARTUP")?,
        })
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn or_parse<T>(&self, key: &str, default: &str) -> Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: std::fmt::Display,
    {
        let value = self.or(key, default);
        value
            .parse::<T>()
            .map_err(|err| anyhow!("invalid {}: {}", key, err))
    }
}

fn env_flag<F>(env: &Env<F>, key: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match env.get(key).as_deref().map(str::trim) {
        None => Ok(false),
        Some("1") | Some("true") | Some("TRUE") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("FALSE") | Some("no") => Ok(false),
        Some(other) => Err(anyhow!("invalid {}: expected a boolean, got {:?}", key, other)),
    }
}
