// ABOUTME: SectionLinkResolver: internal article links of one section, enriched with short descriptions.
// ABOUTME: Resolves section titles via the parse cache, batches description lookups and keeps its own TTL cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use curio_wiki::{normalize_title, LinkedArticle, SUMMARY_KEY};
use tracing::{debug, warn};

use crate::cache::{is_fresh, ParseCache};
use crate::error::Result;
use crate::store::SectionLinksRecord;

/// Maximum number of titles per description lookup.
pub const LINK_BATCH_SIZE: usize = 50;

/// Upstream section index of the lead.
const LEAD_SECTION_INDEX: &str = "0";

/// Cache key for a section: the normalized title, or [`SUMMARY_KEY`] for the lead.
pub fn section_key(section_title: Option<&str>) -> String {
    match section_title {
        Some(title) => normalize_title(title),
        None => SUMMARY_KEY.to_string(),
    }
}

pub struct SectionLinkResolver {
    parse_cache: Arc<ParseCache>,
    ttl: Duration,
}

impl SectionLinkResolver {
    pub fn new(parse_cache: Arc<ParseCache>, ttl: Duration) -> Self {
        Self { parse_cache, ttl }
    }

    /// Sorted, deduplicated links of one section (`None` for the lead).
    ///
    /// A title that matches no entry of the page's section index map yields
    /// an empty list rather than an error.
    pub fn section_links(&self, page_id: &str, section_title: Option<&str>) -> Result<Vec<LinkedArticle>> {
        let key = section_key(section_title);
        let store = self.parse_cache.store();

        match store.get_section_links(page_id, &key) {
            Ok(Some(record)) if is_fresh(record.cached_at, Utc::now(), self.ttl) => {
                debug!(page_id, section = %key, "section links cache hit");
                return Ok(record.links);
            }
            Ok(Some(_)) => debug!(page_id, section = %key, "section links cache stale"),
            Ok(None) => debug!(page_id, section = %key, "section links cache miss"),
            Err(err) => warn!(page_id, section = %key, error = %err, "section links cache read failed"),
        }

        let index = match section_title {
            None => LEAD_SECTION_INDEX.to_string(),
            Some(_) => match self.resolve_index(page_id, &key)? {
                Some(index) => index,
                None => {
                    debug!(page_id, section = %key, "no section index matches title");
                    return Ok(Vec::new());
                }
            },
        };

        let links = self.fetch_links(page_id, &index)?;

        let record = SectionLinksRecord {
            page_id: page_id.to_string(),
            section_key: key,
            links,
            cached_at: Utc::now(),
        };
        if let Err(err) = store.put_section_links(&record) {
            warn!(page_id, section = %record.section_key, error = %err, "section links cache write failed");
        }

        Ok(record.links)
    }

    /// First entry of the section index map whose normalized title equals
    /// `normalized_title`.
    fn resolve_index(&self, page_id: &str, normalized_title: &str) -> Result<Option<String>> {
        let data = self.parse_cache.get_parsed_page_data(page_id)?;
        Ok(data
            .section_index_map
            .into_iter()
            .find(|entry| normalize_title(&entry.title) == normalized_title)
            .map(|entry| entry.index))
    }

    fn fetch_links(&self, page_id: &str, index: &str) -> Result<Vec<LinkedArticle>> {
        let source = self.parse_cache.source();
        let listed = source.fetch_section_links(page_id, index)?;

        let mut seen = HashSet::new();
        let titles: Vec<String> = listed
            .into_iter()
            .filter(|link| link.is_existing_article())
            .map(|link| link.title)
            .filter(|title| seen.insert(title.clone()))
            .collect();

        let mut merged: HashMap<String, LinkedArticle> = HashMap::new();
        for (n, batch) in titles.chunks(LINK_BATCH_SIZE).enumerate() {
            debug!(page_id, batch = n, size = batch.len(), "fetching link descriptions");
            for article in source.fetch_link_descriptions(batch)? {
                merged.entry(article.page_id.clone()).or_insert(article);
            }
        }

        let mut links: Vec<LinkedArticle> = merged.into_values().collect();
        sort_by_title(&mut links);
        Ok(links)
    }
}

/// Case-insensitive alphabetical order with exact title and page id as
/// tie-breakers, so the result does not depend on batch arrival order.
pub fn sort_by_title(links: &mut [LinkedArticle]) {
    links.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.title.cmp(&b.title))
            .then_with(|| a.page_id.cmp(&b.page_id))
    });
}
