//! The article catalog: every article with its metadata, newest first.
//!
//! The catalog is rebuilt from disk on every call. Page rendering, the feed
//! and the sitemap all read from the same [`Catalog`] value.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::content::{self, ContentSource, WalkError};
use crate::metadata::{DateOrigin, ExtractError, MetadataExtractor, SourceTextExtractor};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("failed to read metadata for '{slug}': {source}")]
    Extract {
        slug: String,
        #[source]
        source: ExtractError,
    },

    #[error("duplicate article slug '{0}'")]
    DuplicateSlug(String),
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub date_origin: DateOrigin,
    pub description: Option<String>,
    #[serde(skip)]
    pub source_path: PathBuf,
}

impl Article {
    pub fn source(&self) -> ContentSource {
        ContentSource {
            slug: self.slug.clone(),
            source_path: self.source_path.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    articles: Vec<Article>,
}

impl Catalog {
    /// Sort into publication order and reject repeated slugs.
    pub fn from_articles(mut articles: Vec<Article>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(articles.len());
        for article in &articles {
            if !seen.insert(article.slug.as_str()) {
                return Err(CatalogError::DuplicateSlug(article.slug.clone()));
            }
        }

        sort_newest_first(&mut articles, |a| (a.published_at, a.slug.as_str()));
        Ok(Self { articles })
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.slug == slug)
    }
}

/// Newest first; equal instants fall back to slug ascending so the output
/// never depends on discovery order.
pub fn sort_newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (DateTime<Utc>, &str),
{
    items.sort_by(|a, b| {
        let (a_date, a_slug) = key(a);
        let (b_date, b_slug) = key(b);
        b_date.cmp(&a_date).then_with(|| a_slug.cmp(b_slug))
    });
}

/// Build the catalog for the articles under `root` from their source text.
pub async fn build(root: &Path) -> Result<Catalog, CatalogError> {
    build_with(root, &SourceTextExtractor::new()).await
}

#[instrument(skip_all, fields(root = %root.display()))]
pub async fn build_with<E>(root: &Path, extractor: &E) -> Result<Catalog, CatalogError>
where
    E: MetadataExtractor + ?Sized,
{
    let sources = content::discover(root).await?;
    let mut articles = Vec::with_capacity(sources.len());

    for source in sources {
        let metadata = extractor
            .extract(&source)
            .await
            .map_err(|e| CatalogError::Extract {
                slug: source.slug.clone(),
                source: e,
            })?;

        let Some(metadata) = metadata else {
            warn!(slug = %source.slug, "article has no title, leaving it out of the catalog");
            continue;
        };

        articles.push(Article {
            slug: source.slug,
            title: metadata.title,
            published_at: metadata.published_at,
            date_origin: metadata.date_origin,
            description: metadata.description,
            source_path: source.source_path,
        });
    }

    let catalog = Catalog::from_articles(articles)?;
    info!(articles = catalog.len(), "catalog built");
    Ok(catalog)
}
