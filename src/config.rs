use std::env;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub event_buffer_size: usize,
    pub seed_batch_size: usize,
    pub max_upload_bytes: usize,
    pub classifier: ClassifierConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Internal(format!(
                    "invalid LOG_FORMAT: {other}, expected compact/json"
                )));
            }
        };

        let seed_batch_size = parse_or_default(&lookup, "SEED_BATCH_SIZE", 15)?;
        if seed_batch_size == 0 {
            return Err(AppError::Internal("SEED_BATCH_SIZE must be > 0".to_string()));
        }

        Ok(Self {
            http_port: parse_or_default(&lookup, "HTTP_PORT", 3000)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
            event_buffer_size: parse_or_default(&lookup, "EVENT_BUFFER_SIZE", 1024)?,
            seed_batch_size,
            max_upload_bytes: parse_or_default(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            classifier: ClassifierConfig {
                endpoint: lookup("CLASSIFIER_ENDPOINT")
                    .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
                model: lookup("CLASSIFIER_MODEL")
                    .unwrap_or_else(|| "gemini-2.5-flash".to_string()),
                api_key: lookup("CLASSIFIER_API_KEY").filter(|key| !key.trim().is_empty()),
                timeout: Duration::from_millis(parse_or_default(
                    &lookup,
                    "CLASSIFIER_TIMEOUT_MS",
                    30_000,
                )?),
            },
        })
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}
