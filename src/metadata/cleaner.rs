use ammonia::{Builder, UrlRelative};
use url::Url;

/// Make rendered article markup safe to embed in a feed.
///
/// Scripts, styles and event handlers are removed, and relative `href`/`src`
/// values are rewritten against `page_url` because feed readers have no
/// notion of the page the markup came from.
pub fn clean_body(html: &str, page_url: &Url) -> String {
    Builder::default()
        .url_relative(UrlRelative::RewriteWithBase(page_url.clone()))
        .add_tag_attributes("code", &["class"])
        .add_tag_attributes("span", &["class"])
        .add_tag_attributes("pre", &["class"])
        .clean(html)
        .to_string()
}
