use anyhow::{Context, Result, bail};
use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

const DEFAULT_BUCKET: &str = "final-app-profile-images";
const DEFAULT_TOPIC: &str = "blog-user-alerts";
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Settings read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub storage: StorageConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub public_base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// When unset, notifications are only logged.
    pub url: Option<String>,
    pub topic: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let session_secret = env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?;

        let bind_addr = var_or("BIND_ADDR", "0.0.0.0:3000")
            .parse()
            .context("parse BIND_ADDR")?;

        let bucket = var_or("STORAGE_BUCKET", DEFAULT_BUCKET);
        let default_host = format!("https://{bucket}.s3.amazonaws.com");
        let outbound_timeout = Duration::from_secs(parse_or("OUTBOUND_TIMEOUT_SECS", 10)?);

        Ok(Self {
            database_url: var_or("DATABASE_URL", "sqlite://blog.db"),
            bind_addr,
            session_secret,
            session_ttl_hours: validate_session_ttl(parse_or("SESSION_TTL_HOURS", 24)?)?,
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            static_dir: PathBuf::from(var_or("STATIC_DIR", "static")),
            max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            storage: StorageConfig {
                endpoint: var_or("STORAGE_ENDPOINT", &default_host),
                public_base_url: var_or("STORAGE_PUBLIC_URL", &default_host),
                token: env::var("STORAGE_TOKEN").ok(),
                timeout: outbound_timeout,
            },
            notify: NotifyConfig {
                url: env::var("NOTIFY_URL").ok(),
                topic: var_or("NOTIFY_TOPIC", DEFAULT_TOPIC),
                timeout: outbound_timeout,
            },
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("parse {key}")),
        Err(_) => Ok(default),
    }
}

fn validate_session_ttl(hours: i64) -> Result<i64> {
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        bail!("SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}");
    }
    Ok(hours)
}
