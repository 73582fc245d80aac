//! Client configuration.
//!
//! Everything has a default so `ClientConfig::default()` works against a
//! backend on the local machine. `from_env` layers environment overrides on top.

use std::{path::PathBuf, time::Duration};

use reqwest::Url;
use serde::Deserialize;

use crate::remote::{RemoteError, RemoteResult};

/// Overrides `api_base`.
pub const ENV_API_URL: &str = "COMMENTS_API_URL";
/// Overrides `origin`.
pub const ENV_ORIGIN: &str = "COMMENTS_ORIGIN";
/// Sets `fallback_path`.
pub const ENV_FALLBACK_PATH: &str = "COMMENTS_FALLBACK_PATH";

/// Settings for talking to the comments backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base, absolute or relative to `origin`.
    pub api_base: String,
    /// Origin used to resolve a relative `api_base`.
    pub origin: String,
    /// Static snapshot used when the live API cannot be loaded.
    pub fallback_path: Option<PathBuf>,
    /// Author recorded on locally created comments.
    pub author: String,
    /// How long a bulk delete can be undone, in milliseconds.
    pub undo_window_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".to_string(),
            origin: "http://127.0.0.1:8000".to_string(),
            fallback_path: None,
            author: "Admin".to_string(),
            undo_window_ms: 10_000,
        }
    }
}

impl ClientConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_var(ENV_API_URL) {
            config.api_base = v;
        }
        if let Some(v) = env_var(ENV_ORIGIN) {
            config.origin = v;
        }
        if let Some(v) = env_var(ENV_FALLBACK_PATH) {
            config.fallback_path = Some(PathBuf::from(v));
        }
        config
    }

    /// Undo window as a duration.
    pub fn undo_window(&self) -> Duration {
        Duration::from_millis(self.undo_window_ms)
    }

    /// Absolute API base without a trailing slash.
    pub fn resolved_api_base(&self) -> RemoteResult<String> {
        let url = match Url::parse(&self.api_base) {
            Ok(url) => url,
            Err(_) => Url::parse(&self.origin)
                .and_then(|origin| origin.join(&self.api_base))
                .map_err(|e| RemoteError::InvalidUrl(format!("{}: {e}", self.api_base)))?,
        };
        Ok(url.as_str().trim_end_matches('/').to_string())
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
