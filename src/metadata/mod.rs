pub mod cleaner;
pub mod model;
pub mod rendered;
pub mod source;

#[cfg(test)]
mod tests;

pub use model::{ArticleMetadata, DateOrigin, parse_date};
pub use rendered::{RenderedHtmlExtractor, extract_rendered};
pub use source::{SourceTextExtractor, scan_source};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::content::ContentSource;
use crate::fetcher::FetchError;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid article url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ExtractError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One way of obtaining an article's metadata.
///
/// `Ok(None)` means the article is reachable but lacks a title or a usable
/// date; callers decide whether that excludes it. `Err` is reserved for
/// failures to reach the article at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(&self, unit: &ContentSource) -> Result<Option<ArticleMetadata>, ExtractError>;
}

/// Public URL of an article: `<site>/articles/<slug>`.
///
/// Each slug segment is percent-encoded, so a directory named `c#-tips`
/// stays a path segment instead of turning into a fragment.
pub fn article_url(site_url: &Url, slug: &str) -> Result<Url, url::ParseError> {
    let mut url = site_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(std::iter::once("articles").chain(slug.split('/').filter(|s| !s.is_empty())));
    Ok(url)
}

#[cfg(test)]
mod url_tests {
    use super::*;

    #[test]
    fn test_nested_slug_url() {
        let site = Url::parse("https://example.com/").unwrap();
        let url = article_url(&site, "2023/my-post").unwrap();
        assert_eq!(url.as_str(), "https://example.com/articles/2023/my-post");
    }

    #[test]
    fn test_url_under_path_prefix() {
        let site = Url::parse("https://example.com/blog/").unwrap();
        let url = article_url(&site, "hello").unwrap();
        assert_eq!(url.as_str(), "https://example.com/blog/articles/hello");
    }

    #[test]
    fn test_reserved_characters_stay_in_the_path() {
        let site = Url::parse("https://example.com/").unwrap();

        let url = article_url(&site, "c#-tips").unwrap();
        assert_eq!(url.as_str(), "https://example.com/articles/c%23-tips");
        assert_eq!(url.path(), "/articles/c%23-tips");
        assert!(url.fragment().is_none());

        let url = article_url(&site, "2024/why?").unwrap();
        assert_eq!(url.as_str(), "https://example.com/articles/2024/why%3F");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_cannot_be_a_base_site_is_rejected() {
        let site = Url::parse("mailto:jo@example.com").unwrap();
        assert!(article_url(&site, "hello").is_err());
    }
}
