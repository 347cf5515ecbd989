//! Centralized configuration (environment variables + defaults).

use anyhow::{anyhow, Context};
use std::time::Duration;

use crate::storage::tables::airtable::AIRTABLE_API_URL;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_EMAIL_FROM: &str = "onboarding@resend.dev";
/// Room for a handful of inline phone photos in one CreateProject body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Airtable {
        api_url: String,
        base_id: String,
        api_key: String,
    },
    /// Process-local tables; contents vanish on restart.
    Memory,
}

impl StoreConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreConfig::Airtable { .. } => "airtable",
            StoreConfig::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub api_key: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub imgbb_api_key: Option<String>,
    /// Present only when both the API key and a recipient are set.
    pub email: Option<EmailConfig>,
    pub allowed_origins: Vec<String>,
    pub frontend_url: String,
    pub upstream_timeout: Duration,
    /// Request body cap for `POST /api/products`, which may carry inline images.
    pub max_body_bytes: usize,
    pub enable_debug_endpoint: bool,
}

impl AppConfig {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `HOST` | `0.0.0.0` |
    /// | `PORT` | `3000` |
    /// | `RECORD_STORE` | `airtable` (`AIRTABLE_API_KEY`, `AIRTABLE_BASE_ID` required) |
    /// | `AIRTABLE_API_URL` | `https://api.airtable.com/v0` |
    /// | `IMGBB_API_KEY` | unset: inline images are refused |
    /// | `RESEND_API_KEY` + `NOTIFY_EMAIL_TO` | unset: no notifications |
    /// | `NOTIFY_EMAIL_FROM` | `onboarding@resend.dev` |
    /// | `ALLOWED_ORIGINS` | `http://localhost:5173` |
    /// | `FRONTEND_URL` | first allowed origin |
    /// | `UPSTREAM_TIMEOUT_SECS` | `30` |
    /// | `MAX_BODY_BYTES` | `26214400` (25 MiB) |
    /// | `ENABLE_DEBUG_ENDPOINT` | `false` |
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match var("PORT") {
            Some(p) => p.parse::<u16>().context("PORT must be a valid u16")?,
            None => 3000,
        };

        let store = match var("RECORD_STORE").as_deref().unwrap_or("airtable") {
            "airtable" => StoreConfig::Airtable {
                api_url: var("AIRTABLE_API_URL").unwrap_or_else(|| AIRTABLE_API_URL.to_string()),
                base_id: var("AIRTABLE_BASE_ID").context("AIRTABLE_BASE_ID must be set")?,
                api_key: var("AIRTABLE_API_KEY").context("AIRTABLE_API_KEY must be set")?,
            },
            "memory" => StoreConfig::Memory,
            other => {
                return Err(anyhow!(
                    "RECORD_STORE must be 'airtable' or 'memory' (got '{}')",
                    other
                ))
            }
        };

        let email = match (var("RESEND_API_KEY"), var("NOTIFY_EMAIL_TO")) {
            (Some(api_key), Some(to)) => Some(EmailConfig {
                api_key,
                from: var("NOTIFY_EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
                to,
            }),
            (Some(_), None) => {
                return Err(anyhow!("NOTIFY_EMAIL_TO must be set when RESEND_API_KEY is set"))
            }
            (None, _) => None,
        };

        let allowed_origins: Vec<String> = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string())
            .split(',')
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if allowed_origins.iter().any(|o| o == "*") {
            return Err(anyhow!("ALLOWED_ORIGINS must list explicit origins, not '*'"));
        }

        let frontend_url = var("FRONTEND_URL")
            .or_else(|| allowed_origins.first().cloned())
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());

        let upstream_timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(s) => Duration::from_secs(
                s.parse::<u64>()
                    .context("UPSTREAM_TIMEOUT_SECS must be a valid u64")?
                    .max(1),
            ),
            None => Duration::from_secs(30),
        };

        let max_body_bytes = match var("MAX_BODY_BYTES") {
            Some(s) => match s.parse::<usize>().context("MAX_BODY_BYTES must be a valid usize")? {
                0 => return Err(anyhow!("MAX_BODY_BYTES must be greater than 0")),
                n => n,
            },
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let enable_debug_endpoint = var("ENABLE_DEBUG_ENDPOINT")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            store,
            imgbb_api_key: var("IMGBB_API_KEY"),
            email,
            allowed_origins,
            frontend_url,
            upstream_timeout,
            max_body_bytes,
            enable_debug_endpoint,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
