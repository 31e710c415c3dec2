use crate::shortcode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single short-link record as persisted in the registry.
///
/// Field names are camelCased on the wire so the stored JSON array matches
/// what browser clients wrote under the same storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a shorten call: the record plus whether it was newly created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    pub link: ShortLink,
    pub created: bool,
}

/// A link row prepared for the shortener page.
#[derive(Debug, Clone)]
pub struct LinkView {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub created_at: String,
    /// Only http(s) destinations are rendered as links.
    pub linkable: bool,
}

impl LinkView {
    pub fn new(link: &ShortLink, short_url: String) -> Self {
        Self {
            short_code: link.short_code.clone(),
            original_url: link.original_url.clone(),
            short_url,
            created_at: link.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            linkable: shortcode::is_web_url(&link.original_url),
        }
    }
}
