// ABOUTME: Counts internal article links per section of rendered HTML.
// ABOUTME: Namespaced targets (File:, Help:, Category:, ...) are not counted.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{LinkCount, OutlineEntry, SUMMARY_KEY};
use crate::outline::{chunk_by_headings, html_headings, match_outline_title, HtmlHeading};

static WIKI_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<a\s[^>]*href="/wiki/([^"]+)"[^>]*>"#).unwrap());

/// Returns true when a `/wiki/` target points at an article: no colon before
/// the fragment.
pub fn is_article_target(target: &str) -> bool {
    let path = target.split('#').next().unwrap_or_default();
    !path.is_empty() && !path.contains(':')
}

/// Counts article links in a chunk of HTML.
pub fn count_article_links(html: &str) -> usize {
    WIKI_LINK
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .filter(|target| is_article_target(target.as_str()))
        .count()
}

/// Produces one [`LinkCount`] for the lead (keyed [`SUMMARY_KEY`]) and one per
/// heading whose text matches an outline entry. Headings absent from the
/// outline, such as a table-of-contents title, are skipped.
pub fn extract_link_counts(html: &str, outline: &[OutlineEntry]) -> Vec<LinkCount> {
    let headings = html_headings(html);
    link_counts_for(html, &headings, outline)
}

pub(crate) fn link_counts_for(
    html: &str,
    headings: &[HtmlHeading],
    outline: &[OutlineEntry],
) -> Vec<LinkCount> {
    chunk_by_headings(html, headings)
        .iter()
        .filter_map(|chunk| {
            let title = match chunk.heading {
                None => SUMMARY_KEY.to_string(),
                Some(heading) => match_outline_title(heading, outline)?,
            };
            Some(LinkCount {
                title,
                count: count_article_links(chunk.html),
            })
        })
        .collect()
}
