use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// S3 / MinIO settings. Present only when `S3_BUCKET` is set.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Local artifact root, used when S3 is not configured.
    pub artifact_dir: PathBuf,
    pub s3: Option<S3Config>,
    /// Bound on the materialization step of a job; exceeding it moves the job to `error`.
    /// Time spent queued for a worker is not counted.
    pub export_timeout: Duration,
    pub export_workers: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3 = match std::env::var("S3_BUCKET") {
            Ok(bucket) => Some(S3Config {
                bucket,
                endpoint: require_env("S3_ENDPOINT")?,
                aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            Err(_) => None,
        };

        Ok(Config {
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            artifact_dir: std::env::var("ARTIFACT_DIR")
                .unwrap_or_else(|_| "data/artifacts".to_string())
                .into(),
            s3,
            export_timeout: Duration::from_secs(
                parse_env("EXPORT_TIMEOUT_SECS", 60)
                    .context("EXPORT_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            export_workers: parse_env("EXPORT_WORKERS", 4)
                .context("EXPORT_WORKERS must be a positive integer")?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 50 * 1024 * 1024)
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(raw.trim().parse::<T>()?),
        Err(_) => Ok(default),
    }
}
