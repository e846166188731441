//! Bookmarks: shared links. Resubmitting a URL collapses into one entry
//! when results are aggregated.

use palimpsest_view::Resource;
use serde::{Deserialize, Serialize};

use super::require;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Bookmark {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            tags: Vec::new(),
        }
    }

    pub fn tagged<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

/// Lowercased, trimmed, without a trailing slash or fragment.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = url.split('#').next().unwrap_or(url);
    url.trim_end_matches('/').to_ascii_lowercase()
}

impl Resource for Bookmark {
    const TYPE: &'static str = "bookmark";

    fn dedupe_key(&self) -> Option<String> {
        Some(normalize_url(&self.url))
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.url, "url")?;
        if !self.url.contains("://") {
            return Err(format!("not an absolute url: {}", self.url));
        }
        Ok(())
    }

    fn title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url(" HTTPS://Example.org/Path/#top "),
            "https://example.org/path"
        );
        assert_eq!(
            Bookmark::new("https://example.org/", "").dedupe_key(),
            Bookmark::new("https://EXAMPLE.org", "x").dedupe_key()
        );
    }

    #[test]
    fn test_relative_url_is_rejected() {
        assert!(Bookmark::new("example.org", "").validate().is_err());
    }

    #[test]
    fn test_title_falls_back_to_url() {
        assert_eq!(Bookmark::new("https://a.b", "").title(), "https://a.b");
    }
}
