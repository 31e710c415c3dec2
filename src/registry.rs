use crate::{
    models::{ShortLink, Shortened},
    shortcode,
    store::{KeyValueStore, StoreError},
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default storage key holding the serialized registry.
pub const DEFAULT_STORAGE_KEY: &str = "shortenedUrls";

/// Fresh codes drawn before `shorten` gives up on finding an unused one.
pub const MAX_CODE_ATTEMPTS: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("'{0}' is not a valid URL")]
    InvalidUrl(String),

    #[error("could not find an unused short code after {0} attempts")]
    CodeSpaceExhausted(usize),

    #[error("stored registry is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The short-link registry: an ordered list of [`ShortLink`] records kept as a
/// single JSON value in a [`KeyValueStore`].
///
/// Every mutation is a full read-modify-write of that value. Mutations are
/// serialized through `write_lock` so concurrent requests cannot lose each
/// other's updates within one process.
pub struct Registry {
    store: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
    generate: fn() -> String,
}

impl Registry {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
            generate: shortcode::generate_short_code,
        }
    }

    /// Replace the code generator. Used to force collisions in tests.
    #[cfg(test)]
    pub fn with_code_generator(mut self, generate: fn() -> String) -> Self {
        self.generate = generate;
        self
    }

    /// Shorten `url`, reusing the existing record when the normalized URL is
    /// already registered.
    pub async fn shorten(&self, url: &str) -> Result<Shortened, RegistryError> {
        let original_url = shortcode::normalize(url);
        if !shortcode::is_valid_url(&original_url) {
            return Err(RegistryError::InvalidUrl(url.trim().to_owned()));
        }

        let _guard = self.write_lock.lock().await;
        let mut links = self.load().await?;

        if let Some(existing) = links.iter().find(|l| l.original_url == original_url) {
            tracing::debug!(
                "'{}' already shortened as '{}'",
                original_url,
                existing.short_code
            );
            return Ok(Shortened {
                link: existing.clone(),
                created: false,
            });
        }

        let short_code = self.unused_code(&links)?;
        let link = ShortLink {
            original_url,
            short_code,
            created_at: Utc::now(),
        };
        links.push(link.clone());
        self.save(&links).await?;

        tracing::info!("Shortened '{}' as '{}'", link.original_url, link.short_code);
        Ok(Shortened {
            link,
            created: true,
        })
    }

    /// Original URL of the first record carrying `short_code`, if any.
    pub async fn resolve(&self, short_code: &str) -> Result<Option<String>, RegistryError> {
        let links = self.load().await?;
        Ok(links
            .into_iter()
            .find(|l| l.short_code == short_code)
            .map(|l| l.original_url))
    }

    /// Remove every record carrying `short_code` and return how many went.
    pub async fn delete(&self, short_code: &str) -> Result<usize, RegistryError> {
        let _guard = self.write_lock.lock().await;
        let mut links = self.load().await?;

        let before = links.len();
        links.retain(|l| l.short_code != short_code);
        let removed = before - links.len();

        if removed > 0 {
            self.save(&links).await?;
            tracing::info!("Deleted {} record(s) for '{}'", removed, short_code);
        }
        Ok(removed)
    }

    /// All records in insertion order.
    pub async fn list(&self) -> Result<Vec<ShortLink>, RegistryError> {
        self.load().await
    }

    async fn load(&self) -> Result<Vec<ShortLink>, RegistryError> {
        match self.store.get(&self.key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, links: &[ShortLink]) -> Result<(), RegistryError> {
        let raw = serde_json::to_string(links)?;
        self.store.set(&self.key, &raw).await?;
        Ok(())
    }

    fn unused_code(&self, links: &[ShortLink]) -> Result<String, RegistryError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = (self.generate)();
            if !links.iter().any(|l| l.short_code == code) {
                return Ok(code);
            }
            tracing::debug!("Short code '{}' already taken, retrying", code);
        }
        Err(RegistryError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }
}

/// Sort a copy of `links` by creation time, newest first.
pub fn newest_first(mut links: Vec<ShortLink>) -> Vec<ShortLink> {
    links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    links
}
