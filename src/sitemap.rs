//! Sitemap assembly.
//!
//! Built purely from filesystem state: fixed static routes plus one entry
//! per catalog article, dated by the article's declared date (or its file's
//! modification time). No page is rendered or fetched.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2025-01-01T00:00:00+00:00</lastmod>
//!     <changefreq>monthly</changefreq>
//!     <priority>1.0</priority>
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::catalog::{self, Catalog, CatalogError};
use crate::config::SiteConfig;
use crate::metadata::article_url;

pub const SITEMAP_PATH: &str = "sitemap.xml";
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Static routes and their priority, home first.
pub const STATIC_ROUTES: &[(&str, f32)] = &[
    ("", 1.0),
    ("about", 0.8),
    ("projects", 0.8),
    ("articles", 0.8),
];
pub const ARTICLE_PRIORITY: f32 = 0.6;

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("site url is not configured; set SITE_URL to build the sitemap")]
    MissingSiteUrl,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("invalid sitemap url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub url: Url,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// Sitemap entries for `site_url`: static routes first, then articles in
/// catalog order. `now` stamps the static routes.
pub fn assemble(
    site_url: &Url,
    catalog: &Catalog,
    now: DateTime<Utc>,
) -> Result<Vec<SitemapEntry>, SitemapError> {
    let mut entries = Vec::with_capacity(STATIC_ROUTES.len() + catalog.len());

    for (route, priority) in STATIC_ROUTES {
        entries.push(SitemapEntry {
            url: site_url.join(route)?,
            last_modified: now,
            change_frequency: ChangeFrequency::Monthly,
            priority: *priority,
        });
    }

    for article in catalog.articles() {
        entries.push(SitemapEntry {
            url: article_url(site_url, &article.slug)?,
            last_modified: article.published_at,
            change_frequency: ChangeFrequency::Monthly,
            priority: ARTICLE_PRIORITY,
        });
    }

    Ok(entries)
}

/// Build the catalog from disk and assemble the sitemap for `config`.
#[instrument(skip_all)]
pub async fn generate(config: &SiteConfig) -> Result<Vec<SitemapEntry>, SitemapError> {
    let site_url = config.site_url().ok_or(SitemapError::MissingSiteUrl)?;
    let catalog = catalog::build(config.content_dir()).await?;
    let entries = assemble(site_url, &catalog, Utc::now())?;
    debug!(entries = entries.len(), "sitemap assembled");
    Ok(entries)
}

/// Serialize entries in the sitemaps.org 0.9 format.
pub fn to_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::with_capacity(256 + entries.len() * 192);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(entry.url.as_str()));
        xml.push_str("</loc>\n    <lastmod>");
        xml.push_str(&entry.last_modified.to_rfc3339_opts(SecondsFormat::Secs, false));
        xml.push_str("</lastmod>\n    <changefreq>");
        xml.push_str(entry.change_frequency.as_str());
        xml.push_str("</changefreq>\n    <priority>");
        xml.push_str(&format!("{:.1}", entry.priority));
        xml.push_str("</priority>\n  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
