// ABOUTME: Conversions between article titles, URL slugs and canonical article URLs.

use url::Url;

const ARTICLE_BASE: &str = "https://en.wikipedia.org/wiki/";

pub fn title_to_slug(title: &str) -> String {
    title.replace(' ', "_")
}

pub fn slug_to_title(slug: &str) -> String {
    slug.replace('_', " ")
}

/// Canonical article URL with the slug percent-encoded as one path segment.
pub fn article_url(title: &str) -> Option<String> {
    let mut url = Url::parse(ARTICLE_BASE).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(&title_to_slug(title));
    Some(url.to_string())
}
