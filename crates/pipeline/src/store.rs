// ABOUTME: Cache persistence seam: record types, the CacheStore trait and an in-memory implementation.
// ABOUTME: Every write is a whole-record upsert keyed by page id (and section key for link lists).

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use curio_wiki::{LinkedArticle, ParsedPageData};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WikiError};

/// One cached parse of a page. Replaced wholesale on every re-parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseCacheRecord {
    pub page_id: String,
    pub data: ParsedPageData,
    pub cached_at: DateTime<Utc>,
}

/// Resolved links of one section of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionLinksRecord {
    pub page_id: String,
    pub section_key: String,
    pub links: Vec<LinkedArticle>,
    pub cached_at: DateTime<Utc>,
}

/// Storage for both caches. A missing entry is `Ok(None)`, never an error.
pub trait CacheStore: Send + Sync {
    fn get_parsed(&self, page_id: &str) -> Result<Option<ParseCacheRecord>>;

    /// Inserts or fully replaces the record for `record.page_id`.
    fn put_parsed(&self, record: &ParseCacheRecord) -> Result<()>;

    fn get_section_links(&self, page_id: &str, section_key: &str) -> Result<Option<SectionLinksRecord>>;

    /// Inserts or fully replaces the record for `(page_id, section_key)`.
    fn put_section_links(&self, record: &SectionLinksRecord) -> Result<()>;
}

/// Process-local store, used by tests and by the CLI when no database path
/// is given.
#[derive(Debug, Default)]
pub struct MemoryStore {
    parsed: RwLock<HashMap<String, ParseCacheRecord>>,
    links: RwLock<HashMap<(String, String), SectionLinksRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(page_id: &str, op: &str) -> WikiError {
    WikiError::cache(page_id, op, Some(anyhow::anyhow!("cache lock poisoned")))
}

impl CacheStore for MemoryStore {
    fn get_parsed(&self, page_id: &str) -> Result<Option<ParseCacheRecord>> {
        let map = self.parsed.read().map_err(|_| poisoned(page_id, "get_parsed"))?;
        Ok(map.get(page_id).cloned())
    }

    fn put_parsed(&self, record: &ParseCacheRecord) -> Result<()> {
        let mut map = self
            .parsed
            .write()
            .map_err(|_| poisoned(&record.page_id, "put_parsed"))?;
        map.insert(record.page_id.clone(), record.clone());
        Ok(())
    }

    fn get_section_links(&self, page_id: &str, section_key: &str) -> Result<Option<SectionLinksRecord>> {
        let map = self
            .links
            .read()
            .map_err(|_| poisoned(page_id, "get_section_links"))?;
        Ok(map
            .get(&(page_id.to_string(), section_key.to_string()))
            .cloned())
    }

    fn put_section_links(&self, record: &SectionLinksRecord) -> Result<()> {
        let mut map = self
            .links
            .write()
            .map_err(|_| poisoned(&record.page_id, "put_section_links"))?;
        map.insert(
            (record.page_id.clone(), record.section_key.clone()),
            record.clone(),
        );
        Ok(())
    }
}
