//! Metadata read straight from an article's MDX source.
//!
//! Articles declare themselves with an object literal near the top of the
//! file:
//!
//! ```text
//! export const article = {
//!   author: "Jo Writer",
//!   date: "2023-05-01",
//!   title: "Shipping a feed",
//!   description: "How the feed gets built.",
//! };
//! ```
//!
//! Only that object is scanned, so prose further down the file mentioning
//! `title:` cannot leak into the metadata. Files without such a block are
//! scanned whole.

use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::content::ContentSource;
use crate::metadata::model::{ArticleMetadata, DateOrigin, parse_date};
use crate::metadata::{ExtractError, MetadataExtractor};

static EXPORT_BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+const\s+(?:article|metadata)\s*(?::\s*[\w<>]+\s*)?=\s*\{").unwrap()
});

/// The date marker: a quoted ISO-8601 value after a `date` key.
static DATE_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bdate\s*:\s*["'`](\d{4}-\d{2}-\d{2}(?:[T ][0-9:.]+(?:Z|[+-]\d{2}:?\d{2})?)?)["'`]"#)
        .unwrap()
});

static DOUBLE_QUOTED_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\b(\w+)\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());

static SINGLE_QUOTED_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\b(\w+)\s*:\s*'((?:[^'\\]|\\.)*)'"#).unwrap());

static BACKTICK_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\w+)\s*:\s*`([^`]*)`").unwrap());

/// Fields scraped from the source text of one article.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceFields {
    pub title: Option<String>,
    pub description: Option<String>,
    /// The quoted value after the date key, as written.
    pub date_marker: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

/// Reads each article's backing file from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceTextExtractor;

impl SourceTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetadataExtractor for SourceTextExtractor {
    #[instrument(skip_all, fields(slug = %unit.slug))]
    async fn extract(&self, unit: &ContentSource) -> Result<Option<ArticleMetadata>, ExtractError> {
        let text = fs::read_to_string(&unit.source_path)
            .await
            .map_err(|e| ExtractError::io(&unit.source_path, e))?;
        let fields = scan_source(&text);

        let Some(title) = fields.title else {
            debug!("no title declared");
            return Ok(None);
        };

        let (published_at, date_origin) = match fields.date {
            Some(date) => (date, DateOrigin::Declared),
            None => {
                if let Some(marker) = &fields.date_marker {
                    warn!(
                        marker = %marker,
                        "declared date is not a valid timestamp, using file modification time"
                    );
                }
                (modified_at(&unit.source_path).await?, DateOrigin::FileModified)
            }
        };

        Ok(Some(ArticleMetadata {
            title,
            published_at,
            date_origin,
            description: fields.description,
            body_html: None,
        }))
    }
}

/// Pull `title`, `description` and the date marker out of MDX source.
pub fn scan_source(text: &str) -> SourceFields {
    let scope = export_block(text).unwrap_or(text);
    let date_marker = DATE_MARKER_REGEX
        .captures(scope)
        .map(|caps| caps[1].to_string());

    SourceFields {
        title: string_field(scope, "title"),
        description: string_field(scope, "description"),
        date: date_marker.as_deref().and_then(parse_date),
        date_marker,
    }
}

/// Last-modified time of `path`, used when no date is declared.
pub async fn modified_at(path: &Path) -> Result<DateTime<Utc>, ExtractError> {
    let modified = fs::metadata(path)
        .await
        .and_then(|meta| meta.modified())
        .map_err(|e| ExtractError::io(path, e))?;
    Ok(DateTime::<Utc>::from(modified))
}

fn export_block(text: &str) -> Option<&str> {
    let start = EXPORT_BLOCK_REGEX.find(text)?.end();
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if let Some(q) = quote {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                c if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset]);
                }
            }
            _ => {}
        }
    }
    // unterminated literal
    None
}

fn string_field(scope: &str, key: &str) -> Option<String> {
    [&*DOUBLE_QUOTED_FIELD, &*SINGLE_QUOTED_FIELD, &*BACKTICK_FIELD]
        .into_iter()
        .filter_map(|regex| {
            regex
                .captures_iter(scope)
                .find(|caps| &caps[1] == key)
                .map(|caps| {
                    let whole = caps.get(0).map(|m| m.start()).unwrap_or(usize::MAX);
                    (whole, unescape(&caps[2]))
                })
        })
        // earliest declaration wins when quoting styles are mixed
        .min_by_key(|(position, _)| *position)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
