use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::poller::PollPolicy;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub bind_addr: String,
    pub port: u16,
    pub poll: PollPolicy,
}

impl AppConfig {
    /// Reads configuration from the process environment. A local `.env`
    /// settings file is loaded once by `main` before this runs.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::Config("GEMINI_API_KEY not set in environment or .env".to_string()))?;

        let api_base = non_empty(lookup("GEMINI_API_BASE"))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = non_empty(lookup("GEMINI_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let bind_addr = non_empty(lookup("SENTIMENT_BIND_ADDR")).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let port = parse_number(&lookup, "SENTIMENT_API_PORT", DEFAULT_PORT)?;
        let defaults = PollPolicy::default();
        let interval_secs = parse_number(&lookup, "SENTIMENT_POLL_INTERVAL_SECS", defaults.interval.as_secs())?;
        let max_attempts = parse_number(&lookup, "SENTIMENT_POLL_MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(AppError::Config("SENTIMENT_POLL_MAX_ATTEMPTS must be at least 1".to_string()));
        }

        Ok(Self {
            api_key,
            api_base,
            model,
            bind_addr,
            port,
            poll: PollPolicy {
                interval: Duration::from_secs(interval_secs),
                max_attempts,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_number<F, T>(lookup: &F, key: &str, default_val: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match non_empty(lookup(key)) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", key, raw))),
        None => Ok(default_val),
    }
}
