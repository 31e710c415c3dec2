use anyhow::{Context, Result};
use std::time::Duration;

use crate::registry::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. "sqlite:./toolbox.db", or "memory" to
    /// keep short links in process memory only.
    pub database_url: String,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL, e.g. "https://tools.example.com".
    /// Must NOT have a trailing slash.
    pub base_url: String,

    /// Path of the shortener page. Short URLs are this page plus `#<code>`.
    pub shortener_path: String,

    /// Storage key the link registry is persisted under.
    pub storage_key: String,

    /// Cricket-data endpoint. The score poller only runs when this is set.
    pub cricket_api_url: Option<String>,

    pub cricket_api_key: Option<String>,

    /// Delay between score polls.
    pub cricket_poll_interval: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| var(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let port = var("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let base_url = var("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        let shortener_path = var("SHORTENER_PATH").unwrap_or_else(|| "/s".into());
        let shortener_path = format!("/{}", shortener_path.trim_matches('/'));
        if shortener_path == "/" {
            anyhow::bail!("SHORTENER_PATH must not be the site root");
        }

        let poll_secs = var("CRICKET_POLL_SECS")
            .unwrap_or_else(|| "120".into())
            .parse::<u64>()
            .context("CRICKET_POLL_SECS must be a whole number of seconds")?;
        if poll_secs == 0 {
            anyhow::bail!("CRICKET_POLL_SECS must be greater than zero");
        }

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite:./toolbox.db".into()),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            base_url,
            shortener_path,
            storage_key: non_empty("STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.into()),
            cricket_api_url: non_empty("CRICKET_API_URL"),
            cricket_api_key: non_empty("CRICKET_API_KEY"),
            cricket_poll_interval: Duration::from_secs(poll_secs),
        })
    }

    /// Absolute URL of the shortener page.
    pub fn shortener_url(&self) -> String {
        format!("{}{}", self.base_url, self.shortener_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.shortener_path, "/s");
        assert_eq!(config.storage_key, "shortenedUrls");
        assert_eq!(config.cricket_api_url, None);
        assert_eq!(config.cricket_poll_interval, Duration::from_secs(120));
        assert_eq!(config.shortener_url(), "http://localhost:3000/s");
    }

    #[test]
    fn trims_slashes() {
        let config = load(&[
            ("BASE_URL", "https://tools.example.com/"),
            ("SHORTENER_PATH", "tools/url-shortener/"),
        ])
        .unwrap();
        assert_eq!(
            config.shortener_url(),
            "https://tools.example.com/tools/url-shortener"
        );
    }

    #[test]
    fn blank_optional_values_are_unset() {
        let config = load(&[("CRICKET_API_URL", "  "), ("STORAGE_KEY", "")]).unwrap();
        assert_eq!(config.cricket_api_url, None);
        assert_eq!(config.storage_key, "shortenedUrls");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(load(&[("PORT", "http")]).is_err());
        assert!(load(&[("CRICKET_POLL_SECS", "0")]).is_err());
        assert!(load(&[("SHORTENER_PATH", "/")]).is_err());
    }
}
