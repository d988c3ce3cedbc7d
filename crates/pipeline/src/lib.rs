// ABOUTME: Stateful side of curio: upstream content source, cache stores, ParseCache and SectionLinkResolver.
// ABOUTME: Re-exports the public API and the Pipeline facade that wires the pieces together.

//! Cache-backed access to parsed Wikipedia articles.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use curio_pipeline::{CacheOptions, MemoryStore, Pipeline, WikiClient, WikiError};
//!
//! fn main() -> Result<(), WikiError> {
//!     let client = WikiClient::builder().build()?;
//!     let pipeline = Pipeline::new(Arc::new(client), Arc::new(MemoryStore::new()), CacheOptions::default());
//!     let links = pipeline.section_links("736", Some("Early life"))?;
//!     println!("{} linked articles", links.len());
//!     Ok(())
//! }
//! ```

pub mod article;
pub mod cache;
pub mod client;
pub mod error;
pub mod options;
pub mod resolver;
pub mod source;
pub mod sqlite;
pub mod store;

use std::sync::Arc;

use curio_wiki::{Citation, CitationCount, LinkCount, LinkedArticle, ParsedPageData};

pub use crate::article::{load_article, Article, UNKNOWN_REVISION};
pub use crate::cache::ParseCache;
pub use crate::client::WikiClient;
pub use crate::error::{ErrorCode, Result, WikiError};
pub use crate::options::{
    CacheOptions, ClientBuilder, Options, DEFAULT_API_URL, DEFAULT_CACHE_TTL, DEFAULT_USER_AGENT,
};
pub use crate::resolver::{SectionLinkResolver, LINK_BATCH_SIZE};
pub use crate::source::{
    ArticleKey, PlainExtract, RenderedHtml, SectionLink, Thumbnail, WikiContentSource,
};
pub use crate::sqlite::SqliteStore;
pub use crate::store::{CacheStore, MemoryStore, ParseCacheRecord, SectionLinksRecord};

/// One source and one store shared by a ParseCache and a SectionLinkResolver.
pub struct Pipeline {
    parse_cache: Arc<ParseCache>,
    resolver: SectionLinkResolver,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn WikiContentSource>,
        store: Arc<dyn CacheStore>,
        opts: CacheOptions,
    ) -> Self {
        let parse_cache = Arc::new(ParseCache::new(source, store, opts.parse_ttl));
        let resolver = SectionLinkResolver::new(Arc::clone(&parse_cache), opts.links_ttl);
        Self {
            parse_cache,
            resolver,
        }
    }

    pub fn load_article(&self, key: &ArticleKey) -> Result<Article> {
        load_article(self.parse_cache.source().as_ref(), key)
    }

    pub fn parsed_page_data(&self, page_id: &str) -> Result<ParsedPageData> {
        self.parse_cache.get_parsed_page_data(page_id)
    }

    pub fn link_counts(&self, page_id: &str) -> Result<Vec<LinkCount>> {
        self.parse_cache.link_counts(page_id)
    }

    pub fn citation_counts(&self, page_id: &str) -> Result<Vec<CitationCount>> {
        self.parse_cache.citation_counts(page_id)
    }

    pub fn section_citations(&self, page_id: &str, section_title: Option<&str>) -> Result<Vec<Citation>> {
        self.parse_cache.section_citations(page_id, section_title)
    }

    pub fn section_links(&self, page_id: &str, section_title: Option<&str>) -> Result<Vec<LinkedArticle>> {
        self.resolver.section_links(page_id, section_title)
    }
}
