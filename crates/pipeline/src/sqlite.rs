// ABOUTME: SQLite-backed CacheStore with one table per cache and upsert-on-conflict writes.
// ABOUTME: List columns are stored as JSON text and timestamps as Unix milliseconds.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use curio_wiki::ParsedPageData;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, WikiError};
use crate::store::{CacheStore, ParseCacheRecord, SectionLinksRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS parse_cache (
    page_id           TEXT PRIMARY KEY,
    link_counts       TEXT NOT NULL,
    citations         TEXT NOT NULL,
    section_citations TEXT NOT NULL,
    section_index_map TEXT NOT NULL,
    images            TEXT NOT NULL,
    cached_at         INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS section_links_cache (
    page_id     TEXT NOT NULL,
    section_key TEXT NOT NULL,
    links       TEXT NOT NULL,
    cached_at   INTEGER NOT NULL,
    UNIQUE (page_id, section_key)
);
";

const UPSERT_PARSED: &str = "
INSERT INTO parse_cache
    (page_id, link_counts, citations, section_citations, section_index_map, images, cached_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
ON CONFLICT (page_id) DO UPDATE SET
    link_counts = excluded.link_counts,
    citations = excluded.citations,
    section_citations = excluded.section_citations,
    section_index_map = excluded.section_index_map,
    images = excluded.images,
    cached_at = excluded.cached_at
";

const UPSERT_LINKS: &str = "
INSERT INTO section_links_cache (page_id, section_key, links, cached_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT (page_id, section_key) DO UPDATE SET
    links = excluded.links,
    cached_at = excluded.cached_at
";

/// Persistent store over a single SQLite connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open {:?}", path))
            .map_err(|e| WikiError::cache("", "open", Some(e)))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| WikiError::cache("", "open", Some(e.into())))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| WikiError::cache("", "create tables", Some(e.into())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        page_id: &str,
        op: &str,
        f: impl FnOnce(&Connection) -> anyhow::Result<T>,
    ) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| WikiError::cache(page_id, op, Some(anyhow!("connection lock poisoned"))))?;
        f(&conn).map_err(|e| WikiError::cache(page_id, op, Some(e)))
    }
}

fn from_millis(ms: i64) -> anyhow::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| anyhow!("cached_at out of range: {}", ms))
}

impl CacheStore for SqliteStore {
    fn get_parsed(&self, page_id: &str) -> Result<Option<ParseCacheRecord>> {
        self.with_conn(page_id, "get_parsed", |conn| {
            let row = conn
                .query_row(
                    "SELECT link_counts, citations, section_citations, section_index_map, images, cached_at
                     FROM parse_cache WHERE page_id = ?1",
                    params![page_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                            row.get::<_, i64>(5)?,
                        ))
                    },
                )
                .optional()?;

            let Some((links, citations, section_citations, index_map, images, cached_at)) = row else {
                return Ok(None);
            };

            let data = ParsedPageData {
                link_counts: serde_json::from_str(&links).context("link_counts column")?,
                citations: serde_json::from_str(&citations).context("citations column")?,
                section_citations: serde_json::from_str(&section_citations)
                    .context("section_citations column")?,
                section_index_map: serde_json::from_str(&index_map)
                    .context("section_index_map column")?,
                images: serde_json::from_str(&images).context("images column")?,
            };

            Ok(Some(ParseCacheRecord {
                page_id: page_id.to_string(),
                data,
                cached_at: from_millis(cached_at)?,
            }))
        })
    }

    fn put_parsed(&self, record: &ParseCacheRecord) -> Result<()> {
        self.with_conn(&record.page_id, "put_parsed", |conn| {
            let data = &record.data;
            conn.execute(
                UPSERT_PARSED,
                params![
                    record.page_id,
                    serde_json::to_string(&data.link_counts)?,
                    serde_json::to_string(&data.citations)?,
                    serde_json::to_string(&data.section_citations)?,
                    serde_json::to_string(&data.section_index_map)?,
                    serde_json::to_string(&data.images)?,
                    record.cached_at.timestamp_millis(),
                ],
            )?;
            Ok(())
        })
    }

    fn get_section_links(&self, page_id: &str, section_key: &str) -> Result<Option<SectionLinksRecord>> {
        self.with_conn(page_id, "get_section_links", |conn| {
            let row = conn
                .query_row(
                    "SELECT links, cached_at FROM section_links_cache
                     WHERE page_id = ?1 AND section_key = ?2",
                    params![page_id, section_key],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;

            match row {
                None => Ok(None),
                Some((links, cached_at)) => Ok(Some(SectionLinksRecord {
                    page_id: page_id.to_string(),
                    section_key: section_key.to_string(),
                    links: serde_json::from_str(&links).context("links column")?,
                    cached_at: from_millis(cached_at)?,
                })),
            }
        })
    }

    fn put_section_links(&self, record: &SectionLinksRecord) -> Result<()> {
        self.with_conn(&record.page_id, "put_section_links", |conn| {
            conn.execute(
                UPSERT_LINKS,
                params![
                    record.page_id,
                    record.section_key,
                    serde_json::to_string(&record.links)?,
                    record.cached_at.timestamp_millis(),
                ],
            )?;
            Ok(())
        })
    }
}
