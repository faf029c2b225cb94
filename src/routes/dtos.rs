use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::catalog::Article;
use crate::metadata::{DateOrigin, article_url};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An article as listed on the index page.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ArticleSummary {
    pub slug: String,
    /// Absolute when the site URL is known, site-relative otherwise.
    pub url: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub date_origin: DateOrigin,
    pub description: Option<String>,
}

impl ArticleSummary {
    pub fn from_article(article: &Article, site_url: Option<&Url>) -> Self {
        let url = site_url
            .and_then(|site| article_url(site, &article.slug).ok())
            .map(|url| url.to_string())
            .unwrap_or_else(|| format!("/articles/{}", article.slug));

        Self {
            slug: article.slug.clone(),
            url,
            title: article.title.clone(),
            date: article.published_at,
            date_origin: article.date_origin,
            description: article.description.clone(),
        }
    }
}
