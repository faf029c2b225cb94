use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, instrument};
use url::Url;

use crate::content::ContentSource;
use crate::fetcher::PageFetcher;
use crate::metadata::cleaner::clean_body;
use crate::metadata::model::{ArticleMetadata, DateOrigin, normalize_whitespace, parse_date};
use crate::metadata::{ExtractError, MetadataExtractor, article_url};

static ARTICLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article").unwrap());
static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static TIME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("time").unwrap());
static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-mdx-content]").unwrap());
static DESCRIPTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());

/// Fetches each article's public page and reads metadata off the markup.
#[derive(Debug, Clone)]
pub struct RenderedHtmlExtractor {
    fetcher: PageFetcher,
    site_url: Url,
}

impl RenderedHtmlExtractor {
    pub fn new(fetcher: PageFetcher, site_url: Url) -> Self {
        Self { fetcher, site_url }
    }
}

#[async_trait]
impl MetadataExtractor for RenderedHtmlExtractor {
    #[instrument(skip_all, fields(slug = %unit.slug))]
    async fn extract(&self, unit: &ContentSource) -> Result<Option<ArticleMetadata>, ExtractError> {
        let url = article_url(&self.site_url, &unit.slug)?;
        let page = self.fetcher.fetch(&url).await?;
        debug!(
            status = %page.status,
            fetched_at = %page.fetched_at,
            encoding = page.encoding,
            bytes = page.body_utf8.len(),
            "page fetched"
        );
        Ok(extract_rendered(&page.body_utf8, &page.url_final))
    }
}

/// Read title, date and body from a rendered article page.
///
/// Lookups are scoped to the first `<article>` when there is one. Returns
/// `None` when the page has no non-empty `<h1>`, or when its first `<time>`
/// lacks a `datetime` that parses; later `<time>` elements are never
/// consulted. The body falls back to an empty string.
pub fn extract_rendered(html: &str, page_url: &Url) -> Option<ArticleMetadata> {
    let document = Html::parse_document(html);
    let root = document
        .select(&ARTICLE_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element());

    let title = first_text(root, &TITLE_SELECTOR)?;
    let published_at = root
        .select(&TIME_SELECTOR)
        .next()
        .and_then(|time| time.value().attr("datetime"))
        .and_then(parse_date)?;

    let body = root
        .select(&BODY_SELECTOR)
        .next()
        .map(|el| clean_body(&el.inner_html(), page_url))
        .unwrap_or_default();

    let description = document
        .select(&DESCRIPTION_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(normalize_whitespace)
        .filter(|d| !d.is_empty());

    Some(ArticleMetadata {
        title,
        published_at,
        date_origin: DateOrigin::Rendered,
        description,
        body_html: Some(body),
    })
}

fn first_text(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}
