use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use rss::validation::Validate;
use rss::{Channel, ChannelBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};
use url::Url;

use crate::config::Author;
use crate::feed::{FeedError, FeedItem};

const CONTENT_NAMESPACE: &str = "http://purl.org/rss/1.0/modules/content/";
const GENERATOR: &str = concat!("folio ", env!("CARGO_PKG_VERSION"));

/// Assemble and validate the RSS 2.0 channel.
pub fn build_channel(
    site_url: &Url,
    author: &Author,
    items: &[FeedItem],
    now: DateTime<Utc>,
) -> Result<Channel, FeedError> {
    let favicon = site_url
        .join("favicon.ico")
        .map_err(|e| FeedError::Invalid(e.to_string()))?;

    let image = ImageBuilder::default()
        .url(favicon.to_string())
        .title(author.name.clone())
        .link(site_url.to_string())
        .build();

    let mut namespaces = BTreeMap::new();
    namespaces.insert("content".to_string(), CONTENT_NAMESPACE.to_string());

    let channel = ChannelBuilder::default()
        .title(author.name.clone())
        .link(site_url.to_string())
        .description(format!("Personal website of {}", author.name))
        .image(image)
        .copyright(format!("All rights reserved {}", now.year()))
        .generator(GENERATOR.to_string())
        .last_build_date(now.to_rfc2822())
        .namespaces(namespaces)
        .items(items.iter().map(|item| to_rss_item(item, author)).collect::<Vec<_>>())
        .build();

    channel
        .validate()
        .map_err(|e| FeedError::Invalid(e.to_string()))?;
    Ok(channel)
}

fn to_rss_item(item: &FeedItem, author: &Author) -> Item {
    let link = item.link.to_string();
    ItemBuilder::default()
        .title(item.title.clone())
        .link(link.clone())
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .pub_date(item.published_at.to_rfc2822())
        .description(item.description.clone())
        .content(item.content.clone())
        .author(author.to_rss())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn site() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    fn item(slug: &str, day: u32) -> FeedItem {
        FeedItem {
            slug: slug.to_string(),
            title: format!("Post {slug}"),
            link: site().join(&format!("articles/{slug}")).unwrap(),
            published_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            description: Some(format!("About {slug}")),
            content: "<p>Body &amp; more</p>".to_string(),
        }
    }

    #[test]
    fn test_channel_metadata() {
        let author = Author::new("Jo Writer", "jo@example.com");
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let channel = build_channel(&site(), &author, &[], now).unwrap();

        assert_eq!(channel.title(), "Jo Writer");
        assert_eq!(channel.link(), "https://example.com/");
        assert_eq!(channel.description(), "Personal website of Jo Writer");
        assert_eq!(channel.copyright(), Some("All rights reserved 2025"));
        assert_eq!(
            channel.image().map(|i| i.url()),
            Some("https://example.com/favicon.ico")
        );
        assert!(channel.items().is_empty());
    }

    #[test]
    fn test_items_keep_given_order() {
        let author = Author::default();
        let items = vec![item("newer", 9), item("older", 1)];
        let channel = build_channel(&site(), &author, &items, Utc::now()).unwrap();

        let titles: Vec<_> = channel.items().iter().filter_map(|i| i.title()).collect();
        assert_eq!(titles, vec!["Post newer", "Post older"]);

        let first = &channel.items()[0];
        assert_eq!(first.link(), Some("https://example.com/articles/newer"));
        assert_eq!(
            first.guid().map(|g| g.value()),
            Some("https://example.com/articles/newer")
        );
        let pub_date = DateTime::parse_from_rfc2822(first.pub_date().unwrap()).unwrap();
        assert_eq!(pub_date, Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap());
        assert_eq!(first.author(), Some("author@example.com (Site Author)"));
        assert_eq!(first.content(), Some("<p>Body &amp; more</p>"));
    }

    #[test]
    fn test_serializes_content_namespace() {
        let channel =
            build_channel(&site(), &Author::default(), &[item("a", 1)], Utc::now()).unwrap();
        let xml = channel.to_string();

        assert!(xml.contains(r#"xmlns:content="http://purl.org/rss/1.0/modules/content/""#));
        assert!(xml.contains("<content:encoded>"));
        assert!(xml.contains("https://example.com/articles/a</guid>"));
    }
}
