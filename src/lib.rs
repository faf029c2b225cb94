pub mod app_state;
pub mod catalog;
pub mod config;
pub mod content;
pub mod feed;
pub mod fetcher;
pub mod health;
pub mod metadata;
pub mod middleware;
pub mod routes;
pub mod sitemap;

/// Install the global `tracing` subscriber used by the binaries.
///
/// `RUST_LOG` selects levels (default `info`); `LOG_FORMAT=json` switches to
/// JSON lines.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
