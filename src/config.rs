//! Application-level configuration loading: feed endpoint, countdown timing and hub sizes.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "RANKING_LIVE_CONFIG_PATH";
/// Environment variable that overrides the configured feed URL.
const FEED_URL_ENV: &str = "FEED_URL";

const DEFAULT_FEED_URL: &str = "ws://127.0.0.1:3001/feed";
const DEFAULT_COUNTDOWN_SECS: u32 = 180;
const DEFAULT_TICK_MS: u64 = 1_000;
const DEFAULT_PUBLIC_SSE_CAPACITY: usize = 64;
const DEFAULT_ADMIN_SSE_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    feed_url: String,
    countdown_secs: u32,
    tick_interval: Duration,
    public_sse_capacity: usize,
    admin_sse_capacity: usize,
    auto_connect: bool,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        match env::var(FEED_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => config.with_feed_url(url.trim()),
            _ => config,
        }
    }

    /// Parse a configuration document. Missing keys take their defaults.
    pub fn from_json_str(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Copy of this configuration pointing at another feed.
    pub fn with_feed_url(mut self, url: impl Into<String>) -> Self {
        self.feed_url = url.into();
        self
    }

    /// Copy of this configuration with a different tick length.
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// WebSocket endpoint of the ranking feed.
    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// Countdown length used when a start request does not name one.
    pub fn countdown_secs(&self) -> u32 {
        self.countdown_secs
    }

    /// Wall-clock length of one countdown unit.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Capacity of the public SSE broadcast channel.
    pub fn public_sse_capacity(&self) -> usize {
        self.public_sse_capacity
    }

    /// Capacity of the admin SSE broadcast channel.
    pub fn admin_sse_capacity(&self) -> usize {
        self.admin_sse_capacity
    }

    /// Whether to open the feed as soon as the server starts.
    pub fn auto_connect(&self) -> bool {
        self.auto_connect
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    feed_url: Option<String>,
    countdown_secs: Option<u32>,
    tick_ms: Option<u64>,
    public_sse_capacity: Option<usize>,
    admin_sse_capacity: Option<usize>,
    auto_connect: Option<bool>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            feed_url: value.feed_url.unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            countdown_secs: value.countdown_secs.unwrap_or(DEFAULT_COUNTDOWN_SECS),
            tick_interval: Duration::from_millis(value.tick_ms.unwrap_or(DEFAULT_TICK_MS).max(1)),
            public_sse_capacity: value
                .public_sse_capacity
                .unwrap_or(DEFAULT_PUBLIC_SSE_CAPACITY),
            admin_sse_capacity: value
                .admin_sse_capacity
                .unwrap_or(DEFAULT_ADMIN_SSE_CAPACITY),
            auto_connect: value.auto_connect.unwrap_or(true),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.feed_url(), DEFAULT_FEED_URL);
        assert_eq!(config.countdown_secs(), 180);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert!(config.auto_connect());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config =
            AppConfig::from_json_str(r#"{"feed_url":"wss://feed.example/ws","countdown_secs":60}"#)
                .unwrap();
        assert_eq!(config.feed_url(), "wss://feed.example/ws");
        assert_eq!(config.countdown_secs(), 60);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.public_sse_capacity(), DEFAULT_PUBLIC_SSE_CAPACITY);
    }

    #[test]
    fn zero_tick_is_clamped() {
        let config = AppConfig::from_json_str(r#"{"tick_ms":0}"#).unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn broken_document_is_an_error() {
        assert!(AppConfig::from_json_str(r#"{"countdown_secs":"soon"}"#).is_err());
    }
}
