use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use url::Url;

/// A rendered page, decoded to UTF-8.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: StatusCode,
    pub body_utf8: String,
    /// Name of the encoding the body was decoded from.
    pub encoding: &'static str,
    pub fetched_at: DateTime<Utc>,
}
