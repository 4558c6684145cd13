use std::env;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    pub api_prefix: String,

    // External attendance backend
    pub attendance_api_url: String,
    pub backend_timeout_secs: u64,

    // Rate limiting
    pub rate_upload_per_min: u32,
    pub rate_protected_per_min: u32,

    pub max_upload_bytes: usize,
    pub default_page_size: usize,

    pub log_dir: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));

        fn parsed<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T>
        where
            T::Err: std::fmt::Display,
        {
            match value {
                Some(v) => v
                    .trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
                None => Ok(default),
            }
        }

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            attendance_api_url: required("ATTENDANCE_API_URL")?
                .trim_end_matches('/')
                .to_string(),
            backend_timeout_secs: parsed(lookup("BACKEND_TIMEOUT_SECS"), "BACKEND_TIMEOUT_SECS", 15)?,

            rate_upload_per_min: parsed(lookup("RATE_UPLOAD_PER_MIN"), "RATE_UPLOAD_PER_MIN", 30)?,
            rate_protected_per_min: parsed(lookup("RATE_PROTECTED_PER_MIN"), "RATE_PROTECTED_PER_MIN", 1000)?,

            // 10 MiB
            max_upload_bytes: parsed(lookup("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            default_page_size: parsed(lookup("DEFAULT_PAGE_SIZE"), "DEFAULT_PAGE_SIZE", 10)?,

            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "debug".to_string()),
        })
    }
}
