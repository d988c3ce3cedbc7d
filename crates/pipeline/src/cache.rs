// ABOUTME: ParseCache: cache-backed access to ParsedPageData with a TTL plus a citation-completeness rule.
// ABOUTME: Misses and invalid entries trigger a full fetch-and-parse whose result replaces the stored record.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use curio_wiki::{
    normalize_title, parse_page_html, Citation, CitationCount, LinkCount, ParsedPageData, SUMMARY_KEY,
};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::source::WikiContentSource;
use crate::store::{CacheStore, ParseCacheRecord};

/// Whether something cached at `cached_at` is still inside `ttl` at `now`.
/// Timestamps in the future count as fresh.
pub fn is_fresh(cached_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    match now.signed_duration_since(cached_at).to_std() {
        Ok(age) => age < ttl,
        Err(_) => true,
    }
}

pub struct ParseCache {
    source: Arc<dyn WikiContentSource>,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ParseCache {
    pub fn new(source: Arc<dyn WikiContentSource>, store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { source, store, ttl }
    }

    pub fn source(&self) -> &Arc<dyn WikiContentSource> {
        &self.source
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// A record is served only while fresh and only if it does not claim
    /// citation counts without carrying citation bodies.
    pub fn is_valid(&self, record: &ParseCacheRecord, now: DateTime<Utc>) -> bool {
        is_fresh(record.cached_at, now, self.ttl) && !record.data.is_missing_citations()
    }

    /// Returns the parsed page, from cache when a valid entry exists,
    /// otherwise by fetching and parsing the rendered HTML.
    pub fn get_parsed_page_data(&self, page_id: &str) -> Result<ParsedPageData> {
        match self.store.get_parsed(page_id) {
            Ok(Some(record)) if self.is_valid(&record, Utc::now()) => {
                debug!(page_id, "parse cache hit");
                return Ok(record.data);
            }
            Ok(Some(record)) => {
                debug!(
                    page_id,
                    cached_at = %record.cached_at,
                    missing_citations = record.data.is_missing_citations(),
                    "parse cache entry invalid"
                );
            }
            Ok(None) => debug!(page_id, "parse cache miss"),
            Err(err) => warn!(page_id, error = %err, "parse cache read failed, re-parsing"),
        }

        self.populate(page_id)
    }

    /// Fetches, parses and upserts one page. A failed fetch leaves any
    /// existing record untouched.
    pub fn populate(&self, page_id: &str) -> Result<ParsedPageData> {
        let rendered = self.source.fetch_rendered_html(page_id)?;
        let data = parse_page_html(&rendered.html, &rendered.section_outline);
        info!(
            page_id,
            citations = data.citations.len(),
            sections = data.section_index_map.len(),
            images = data.images.len(),
            "parsed page"
        );

        let record = ParseCacheRecord {
            page_id: page_id.to_string(),
            data,
            cached_at: Utc::now(),
        };
        if let Err(err) = self.store.put_parsed(&record) {
            warn!(page_id, error = %err, "parse cache write failed");
        }

        Ok(record.data)
    }

    pub fn link_counts(&self, page_id: &str) -> Result<Vec<LinkCount>> {
        Ok(self.get_parsed_page_data(page_id)?.link_counts)
    }

    pub fn citation_counts(&self, page_id: &str) -> Result<Vec<CitationCount>> {
        Ok(self.get_parsed_page_data(page_id)?.citation_counts())
    }

    /// Citations referenced from one section, or from the lead when
    /// `section_title` is `None`, in citation order. Ids without a matching
    /// citation body are skipped; an unknown section yields an empty list.
    pub fn section_citations(&self, page_id: &str, section_title: Option<&str>) -> Result<Vec<Citation>> {
        let data = self.get_parsed_page_data(page_id)?;
        let target = normalize_title(section_title.unwrap_or(SUMMARY_KEY));

        let Some(info) = data
            .section_citations
            .iter()
            .find(|s| normalize_title(&s.title) == target)
        else {
            debug!(page_id, section = %target, "no citation entry for section");
            return Ok(Vec::new());
        };

        Ok(data
            .citations
            .iter()
            .filter(|c| info.citation_ids.contains(&c.id))
            .cloned()
            .collect())
    }
}
