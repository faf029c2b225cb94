use anyhow::Context;
use folio::{app_state::AppState, config::SiteConfig, routes};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    folio::init_tracing();

    let config = SiteConfig::from_env().context("failed to load configuration")?;
    if config.site_url().is_none() {
        warn!("SITE_URL is not set; /feed.xml and /sitemap.xml will fail");
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr()))?;
    info!(addr = config.bind_addr(), content = %config.content_dir().display(), "listening");

    let app = routes::router(AppState::new(config));
    axum::serve(listener, app).await?;
    Ok(())
}
