use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use folio::{config::SiteConfig, feed, sitemap};
use tokio::fs;
use tracing::info;

/// Write feed.xml and sitemap.xml for the configured site.
///
/// Article pages must already be served at SITE_URL: the feed is built from
/// their rendered markup.
#[derive(Debug, Parser)]
#[command(name = "generate", version)]
struct Args {
    /// Directory the files are written to.
    #[arg(long, default_value = "public")]
    out: PathBuf,

    /// Article root; overrides CONTENT_DIR.
    #[arg(long)]
    content_dir: Option<PathBuf>,

    /// Skip the feed and only write the sitemap.
    #[arg(long)]
    sitemap_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    folio::init_tracing();
    let args = Args::parse();

    let mut config = SiteConfig::from_env().context("failed to load configuration")?;
    if let Some(dir) = args.content_dir {
        config = config.with_content_dir(dir);
    }

    fs::create_dir_all(&args.out)
        .await
        .with_context(|| format!("failed to create {}", args.out.display()))?;

    let entries = sitemap::generate(&config).await?;
    let sitemap_path = args.out.join(sitemap::SITEMAP_PATH);
    fs::write(&sitemap_path, sitemap::to_xml(&entries))
        .await
        .with_context(|| format!("failed to write {}", sitemap_path.display()))?;
    info!(path = %sitemap_path.display(), entries = entries.len(), "sitemap written");

    if args.sitemap_only {
        return Ok(());
    }

    let xml = feed::generate(&config).await?;
    let feed_path = args.out.join(feed::FEED_PATH);
    fs::write(&feed_path, xml)
        .await
        .with_context(|| format!("failed to write {}", feed_path.display()))?;
    info!(path = %feed_path.display(), "feed written");

    Ok(())
}
