//! Site configuration.
//!
//! A `SiteConfig` is built exactly once when a binary starts and is then
//! handed to every assembler. Nothing below the binaries reads the process
//! environment, so each code path (including a missing site URL) can be
//! exercised in tests by constructing the struct directly.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable names.
pub const ENV_SITE_URL: &str = "SITE_URL";
pub const ENV_CONTENT_DIR: &str = "CONTENT_DIR";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "FETCH_TIMEOUT_SECS";
pub const ENV_AUTHOR_NAME: &str = "SITE_AUTHOR_NAME";
pub const ENV_AUTHOR_EMAIL: &str = "SITE_AUTHOR_EMAIL";

const DEFAULT_CONTENT_DIR: &str = "content/articles";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;
const DEFAULT_AUTHOR_NAME: &str = "Site Author";
const DEFAULT_AUTHOR_EMAIL: &str = "author@example.com";

/// Feed author identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// RSS 2.0 wants `email (Name)`.
    pub fn to_rss(&self) -> String {
        format!("{} ({})", self.email, self.name)
    }
}

impl Default for Author {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR_NAME, DEFAULT_AUTHOR_EMAIL)
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    site_url: Option<Url>,
    content_dir: PathBuf,
    bind_addr: String,
    fetch_timeout: Duration,
    author: Author,
}

impl SiteConfig {
    /// Create a config explicitly, using defaults for everything but the
    /// site URL and content directory.
    pub fn new(site_url: Option<Url>, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            site_url: site_url.map(normalize_site_url),
            content_dir: content_dir.into(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            author: Author::default(),
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.author = author;
        self
    }

    pub fn with_content_dir(mut self, content_dir: impl Into<PathBuf>) -> Self {
        self.content_dir = content_dir.into();
        self
    }

    /// Load from environment variables.
    ///
    /// An absent `SITE_URL` is accepted here; generation of the feed or the
    /// sitemap reports it. A present but malformed value is rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        let site_url = match non_empty_var(ENV_SITE_URL) {
            Some(raw) => Some(parse_site_url(&raw)?),
            None => None,
        };

        let content_dir =
            non_empty_var(ENV_CONTENT_DIR).unwrap_or_else(|| DEFAULT_CONTENT_DIR.to_string());
        let bind_addr =
            non_empty_var(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let fetch_timeout = match non_empty_var(ENV_FETCH_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| ConfigError::InvalidValue {
                        field: ENV_FETCH_TIMEOUT_SECS,
                        reason: format!("expected a positive number of seconds, got '{raw}'"),
                    })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        };

        let author = Author::new(
            non_empty_var(ENV_AUTHOR_NAME).unwrap_or_else(|| DEFAULT_AUTHOR_NAME.to_string()),
            non_empty_var(ENV_AUTHOR_EMAIL).unwrap_or_else(|| DEFAULT_AUTHOR_EMAIL.to_string()),
        );

        Ok(Self {
            site_url,
            content_dir: PathBuf::from(content_dir),
            bind_addr,
            fetch_timeout,
            author,
        })
    }

    /// Public base URL, always ending in `/`.
    pub fn site_url(&self) -> Option<&Url> {
        self.site_url.as_ref()
    }
    /// Root directory holding one sub-directory per article.
    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }
    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }
    /// Upper bound for fetching one rendered article page.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
    pub fn author(&self) -> &Author {
        &self.author
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_site_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field: ENV_SITE_URL,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: ENV_SITE_URL,
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(normalize_site_url(url))
}

// `Url::join` drops the last path segment unless the base ends in '/'.
fn normalize_site_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Ensure environment-variable manipulating tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            ENV_SITE_URL,
            ENV_CONTENT_DIR,
            ENV_BIND_ADDR,
            ENV_FETCH_TIMEOUT_SECS,
            ENV_AUTHOR_NAME,
            ENV_AUTHOR_EMAIL,
        ] {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = SiteConfig::from_env().unwrap();
        assert!(cfg.site_url().is_none());
        assert_eq!(cfg.content_dir(), Path::new(DEFAULT_CONTENT_DIR));
        assert_eq!(cfg.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.author(), &Author::default());
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_SITE_URL, "https://blog.example.org");
            env::set_var(ENV_CONTENT_DIR, "/srv/articles");
            env::set_var(ENV_BIND_ADDR, "0.0.0.0:9000");
            env::set_var(ENV_FETCH_TIMEOUT_SECS, "2");
            env::set_var(ENV_AUTHOR_NAME, "Jo Writer");
        }
        let cfg = SiteConfig::from_env().unwrap();
        assert_eq!(cfg.site_url().unwrap().as_str(), "https://blog.example.org/");
        assert_eq!(cfg.content_dir(), Path::new("/srv/articles"));
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(2));
        assert_eq!(cfg.author().name, "Jo Writer");
        assert_eq!(cfg.author().email, DEFAULT_AUTHOR_EMAIL);
        clear_env();
    }

    #[test]
    fn rejects_malformed_site_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_SITE_URL, "not a url");
        }
        let err = SiteConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field, .. } if field == ENV_SITE_URL));
        clear_env();
    }

    #[test]
    fn rejects_non_http_site_url() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_SITE_URL, "ftp://example.com");
        }
        assert!(SiteConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_FETCH_TIMEOUT_SECS, "soon");
        }
        let err = SiteConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_FETCH_TIMEOUT_SECS));
        clear_env();
    }

    #[test]
    fn rejects_zero_timeout() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_FETCH_TIMEOUT_SECS, "0");
        }
        let err = SiteConfig::from_env().unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { field, .. } if field == ENV_FETCH_TIMEOUT_SECS)
        );
        clear_env();
    }

    #[test]
    fn site_url_keeps_path_prefix() {
        let url = Url::parse("https://example.com/blog").unwrap();
        let cfg = SiteConfig::new(Some(url), "content");
        assert_eq!(cfg.site_url().unwrap().as_str(), "https://example.com/blog/");
    }

    #[test]
    fn author_renders_rss_form() {
        let author = Author::new("Jo Writer", "jo@example.com");
        assert_eq!(author.to_rss(), "jo@example.com (Jo Writer)");
    }
}
