use chrono::{TimeZone, Utc};
use std::fs;
use url::Url;

use crate::metadata::{DateOrigin, extract_rendered};

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/metadata/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

fn page_url() -> Url {
    Url::parse("https://example.com/articles/2024/shipping").unwrap()
}

#[test]
fn test_extract_article_page() {
    let meta = extract_rendered(&fixture("article.html"), &page_url()).unwrap();

    // the site header's h1 sits outside <article>
    assert_eq!(meta.title, "Shipping a feed");
    assert_eq!(
        meta.published_at,
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(meta.date_origin, DateOrigin::Rendered);
    assert_eq!(meta.description.as_deref(), Some("How the feed gets built."));

    let body = meta.body_html.unwrap();
    assert!(body.contains("The first paragraph"));
    assert!(body.contains(r#"href="https://example.com/articles/2023/older""#));
    assert!(body.contains(r#"src="https://example.com/articles/2024/diagram.png""#));
    assert!(body.contains(r#"<code class="language-rust">"#));
    assert!(!body.contains("<script"));
    assert!(!body.contains("data-mdx-content"));
    assert!(!body.contains("<nav"));
}

#[test]
fn test_extract_without_article_element() {
    let meta = extract_rendered(&fixture("no_article.html"), &page_url()).unwrap();

    assert_eq!(meta.title, "Loose page");
    assert_eq!(
        meta.published_at,
        Utc.with_ymd_and_hms(2023, 3, 4, 3, 6, 7).unwrap()
    );
    assert!(
        meta.body_html
            .unwrap()
            .contains("Body outside an article element.")
    );
}

#[test]
fn test_missing_date_is_missing() {
    assert!(extract_rendered(&fixture("missing_date.html"), &page_url()).is_none());
}

#[test]
fn test_missing_title_is_missing() {
    let html = r#"<html><body><article><h1>   </h1><time datetime="2024-01-01"></time></article></body></html>"#;
    assert!(extract_rendered(html, &page_url()).is_none());
}

#[test]
fn test_malformed_datetime_is_missing() {
    let html = r#"<html><body><article><h1>Title</h1><time datetime="01/02/2024"></time></article></body></html>"#;
    assert!(extract_rendered(html, &page_url()).is_none());
}

#[test]
fn test_only_the_first_time_element_counts() {
    let html = r#"<html><body><article><h1>Title</h1><time>June 1</time><p>Text</p><footer>Updated <time datetime="2024-09-09">later</time></footer></article></body></html>"#;
    assert!(extract_rendered(html, &page_url()).is_none());
}

#[test]
fn test_missing_body_container_yields_empty_body() {
    let html = r#"<html><body><article><h1>Title</h1><time datetime="2024-01-01"></time><p>Loose text</p></article></body></html>"#;
    let meta = extract_rendered(html, &page_url()).unwrap();
    assert_eq!(meta.body_html.as_deref(), Some(""));
    assert!(meta.description.is_none());
}

#[test]
fn test_malformed_html() {
    let html = "<html><body><article><h1>Broken<time datetime=\"2024-05-05\">x<div data-mdx-content><p>Unclosed";

    // must not panic; whatever html5ever recovers has to be well formed
    if let Some(meta) = extract_rendered(html, &page_url()) {
        assert!(meta.title.starts_with("Broken"));
    }
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_extract_never_panics(html in ".*") {
            let _ = extract_rendered(&html, &page_url());
        }

        #[test]
        fn test_titles_are_trimmed(title in "[a-zA-Z ]{1,40}") {
            let html = format!(
                "<article><h1>{title}</h1><time datetime=\"2024-01-01\"></time></article>"
            );
            if let Some(meta) = extract_rendered(&html, &page_url()) {
                prop_assert_eq!(meta.title.trim(), meta.title.as_str());
                prop_assert!(!meta.title.is_empty());
            }
        }
    }
}
