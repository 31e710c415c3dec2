//! Fragment-based short-link addressing.
//!
//! A short URL is the shortener page's own address with the code in the
//! fragment (`<origin><path>#<code>`). The fragment never reaches a server, so
//! resolution happens when the page loads.

use crate::registry::{Registry, RegistryError};
use url::Url;

/// Build `<origin><path>#<code>` from the page URL, dropping any query or
/// fragment it already carries.
pub fn short_url(page_url: &str, short_code: &str) -> String {
    match Url::parse(page_url) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(Some(short_code));
            url.to_string()
        }
        Err(_) => {
            let base = page_url.split(['?', '#']).next().unwrap_or(page_url);
            format!("{base}#{short_code}")
        }
    }
}

/// The candidate short code carried by a page reference, if any.
pub fn fragment_code(page_url: &str) -> Option<&str> {
    page_url
        .split_once('#')
        .map(|(_, fragment)| fragment.trim())
        .filter(|fragment| !fragment.is_empty())
}

/// Where the page should navigate on load, or `None` to stay put.
///
/// An unknown code is not an error: the page simply does nothing.
pub async fn resolve_page_load(
    registry: &Registry,
    page_url: &str,
) -> Result<Option<String>, RegistryError> {
    let Some(code) = fragment_code(page_url) else {
        return Ok(None);
    };

    let target = registry.resolve(code).await?;
    match &target {
        Some(url) => tracing::debug!("Fragment '{}' resolves to '{}'", code, url),
        None => tracing::debug!("Fragment '{}' does not match any short link", code),
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{registry::DEFAULT_STORAGE_KEY, store::MemoryStore};
    use std::sync::Arc;

    #[test]
    fn short_url_appends_code_as_fragment() {
        assert_eq!(
            short_url("https://tools.example.com/s", "aB3dE9"),
            "https://tools.example.com/s#aB3dE9"
        );
    }

    #[test]
    fn short_url_drops_existing_query_and_fragment() {
        assert_eq!(
            short_url("https://tools.example.com/s?ref=nav#old", "Zz9900"),
            "https://tools.example.com/s#Zz9900"
        );
    }

    #[test]
    fn short_url_falls_back_for_relative_pages() {
        assert_eq!(short_url("/s?x=1", "abc123"), "/s#abc123");
    }

    #[test]
    fn fragment_code_extracts_non_empty_fragment() {
        assert_eq!(fragment_code("https://t.example/s#Q1w2E3"), Some("Q1w2E3"));
        assert_eq!(fragment_code("https://t.example/s#"), None);
        assert_eq!(fragment_code("https://t.example/s"), None);
    }

    #[tokio::test]
    async fn page_load_with_known_fragment_navigates() {
        let registry = Registry::new(Arc::new(MemoryStore::new()), DEFAULT_STORAGE_KEY);
        let code = registry
            .shorten("https://openai.com/very/long/path?x=1")
            .await
            .unwrap()
            .link
            .short_code;

        let page = short_url("https://tools.example.com/s", &code);
        let target = resolve_page_load(&registry, &page).await.unwrap();
        assert_eq!(
            target.as_deref(),
            Some("https://openai.com/very/long/path?x=1")
        );
    }

    #[tokio::test]
    async fn page_load_with_unknown_or_missing_fragment_stays() {
        let registry = Registry::new(Arc::new(MemoryStore::new()), DEFAULT_STORAGE_KEY);
        assert_eq!(
            resolve_page_load(&registry, "https://t.example/s#doesnotexist")
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            resolve_page_load(&registry, "https://t.example/s")
                .await
                .unwrap(),
            None
        );
    }
}
