use crate::config::SiteConfig;
use std::sync::Arc;

/// Shared by every handler. Holds configuration only: catalogs, feeds and
/// sitemaps are rebuilt per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
}

impl AppState {
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
