//! RSS feed assembly.
//!
//! The catalog says which articles exist; the feed body, however, has to be
//! the markup the site actually serves. Every article page is therefore
//! fetched back over HTTP, all at once, and read with the rendered-HTML
//! strategy. Articles whose page cannot be fetched in time or lacks a title
//! or date are dropped from the feed. Everything else still goes out.

pub mod channel;

pub use channel::build_channel;

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rss::Channel;
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use crate::catalog::{Article, Catalog, CatalogError, sort_newest_first};
use crate::config::{Author, SiteConfig};
use crate::fetcher::{FetchError, PageFetcher};
use crate::metadata::{ExtractError, MetadataExtractor, RenderedHtmlExtractor, article_url};

pub const FEED_PATH: &str = "feed.xml";
pub const FEED_CONTENT_TYPE: &str = "application/xml";
/// Cached for a year at shared caches; a deploy purges it.
pub const FEED_CACHE_CONTROL: &str = "public, s-maxage=31556952";

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("site url is not configured; set SITE_URL to build the feed")]
    MissingSiteUrl,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("failed to set up page fetcher: {0}")]
    Fetcher(#[from] FetchError),

    #[error("invalid feed: {0}")]
    Invalid(String),
}

/// One resolved feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub slug: String,
    pub title: String,
    pub link: Url,
    pub published_at: DateTime<Utc>,
    pub description: Option<String>,
    pub content: String,
}

pub struct FeedAssembler<E = RenderedHtmlExtractor> {
    site_url: Url,
    author: Author,
    fetch_timeout: Duration,
    extractor: E,
}

impl FeedAssembler<RenderedHtmlExtractor> {
    /// Assembler that fetches pages from the configured site.
    pub fn from_config(config: &SiteConfig) -> Result<Self, FeedError> {
        let site_url = config.site_url().cloned().ok_or(FeedError::MissingSiteUrl)?;
        let fetcher = PageFetcher::new(config.fetch_timeout())?;
        let extractor = RenderedHtmlExtractor::new(fetcher, site_url.clone());
        Ok(Self::new(
            site_url,
            config.author().clone(),
            config.fetch_timeout(),
            extractor,
        ))
    }
}

impl<E: MetadataExtractor> FeedAssembler<E> {
    pub fn new(site_url: Url, author: Author, fetch_timeout: Duration, extractor: E) -> Self {
        Self {
            site_url,
            author,
            fetch_timeout,
            extractor,
        }
    }

    /// Resolve every catalog entry concurrently and return the survivors,
    /// newest first.
    #[instrument(skip_all, fields(articles = catalog.len()))]
    pub async fn resolve_items(&self, catalog: &Catalog) -> Vec<FeedItem> {
        let lookups = catalog.articles().iter().map(|article| self.resolve(article));
        let mut items: Vec<FeedItem> = join_all(lookups).await.into_iter().flatten().collect();

        // completion order above is arbitrary
        sort_newest_first(&mut items, |item| (item.published_at, item.slug.as_str()));

        info!(
            resolved = items.len(),
            dropped = catalog.len() - items.len(),
            "feed items resolved"
        );
        items
    }

    /// Build the validated RSS channel for `catalog`.
    pub async fn build(&self, catalog: &Catalog) -> Result<Channel, FeedError> {
        let items = self.resolve_items(catalog).await;
        build_channel(&self.site_url, &self.author, &items, Utc::now())
    }

    /// Build the feed and serialize it.
    pub async fn render(&self, catalog: &Catalog) -> Result<String, FeedError> {
        Ok(self.build(catalog).await?.to_string())
    }

    async fn resolve(&self, article: &Article) -> Option<FeedItem> {
        let slug = article.slug.as_str();
        let link = match article_url(&self.site_url, slug) {
            Ok(link) => link,
            Err(e) => {
                warn!(slug, error = %e, "cannot build article url, skipping");
                return None;
            }
        };

        let source = article.source();
        let lookup = tokio::time::timeout(self.fetch_timeout, self.extractor.extract(&source));
        let metadata = match lookup.await {
            Ok(Ok(Some(metadata))) => metadata,
            Ok(Ok(None)) => {
                warn!(slug, "rendered page has no title or date, skipping");
                return None;
            }
            Ok(Err(e)) => {
                let timed_out = matches!(&e, ExtractError::Fetch(fetch) if fetch.is_timeout());
                warn!(slug, error = %e, timed_out, "failed to resolve article, skipping");
                return None;
            }
            Err(_) => {
                warn!(slug, timeout = ?self.fetch_timeout, "article fetch timed out, skipping");
                return None;
            }
        };

        Some(FeedItem {
            slug: article.slug.clone(),
            title: metadata.title,
            link,
            published_at: metadata.published_at,
            description: article.description.clone().or(metadata.description),
            content: metadata.body_html.unwrap_or_default(),
        })
    }
}

/// Build the catalog from disk and render the feed for `config`.
pub async fn generate(config: &SiteConfig) -> Result<String, FeedError> {
    let assembler = FeedAssembler::from_config(config)?;
    let catalog = crate::catalog::build(config.content_dir()).await?;
    assembler.render(&catalog).await
}
