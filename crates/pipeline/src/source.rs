// ABOUTME: The WikiContentSource seam between the pipeline and the upstream article service.
// ABOUTME: Defines the request key and the raw payload types every source implementation returns.

use std::fmt;

use chrono::{DateTime, Utc};
use curio_wiki::{LinkedArticle, OutlineEntry};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identifies an article either by its stable page id or by its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleKey {
    PageId(String),
    Title(String),
}

impl ArticleKey {
    pub fn page_id(id: impl Into<String>) -> Self {
        ArticleKey::PageId(id.into())
    }

    pub fn title(title: impl Into<String>) -> Self {
        ArticleKey::Title(title.into())
    }

    /// The raw id or title, used for error context.
    pub fn as_str(&self) -> &str {
        match self {
            ArticleKey::PageId(id) => id,
            ArticleKey::Title(title) => title,
        }
    }
}

impl fmt::Display for ArticleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleKey::PageId(id) => write!(f, "page {}", id),
            ArticleKey::Title(title) => write!(f, "\"{}\"", title),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Plaintext rendering of an article with its revision metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainExtract {
    pub page_id: String,
    pub title: String,
    pub revision_id: Option<String>,
    pub last_edited_at: Option<DateTime<Utc>>,
    pub plain_text: String,
    pub thumbnail: Option<Thumbnail>,
}

/// Rendered article HTML and the upstream section outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedHtml {
    pub html: String,
    pub section_outline: Vec<OutlineEntry>,
}

/// One outgoing link of a section as listed upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLink {
    pub namespace: i64,
    pub title: String,
    pub exists: bool,
}

impl SectionLink {
    /// Main-namespace link to a page that exists.
    pub fn is_existing_article(&self) -> bool {
        self.namespace == 0 && self.exists
    }
}

/// Upstream article service.
///
/// Implementations are blocking and must be shareable across threads; the
/// pipeline holds them behind an `Arc`.
pub trait WikiContentSource: Send + Sync {
    /// Plaintext extract of one article.
    fn fetch_plain_extract(&self, key: &ArticleKey) -> Result<PlainExtract>;

    /// Rendered HTML of one article together with its section outline.
    fn fetch_rendered_html(&self, page_id: &str) -> Result<RenderedHtml>;

    /// Links of a single section, selected by its opaque index. Index `"0"`
    /// is the lead.
    fn fetch_section_links(&self, page_id: &str, section_index: &str) -> Result<Vec<SectionLink>>;

    /// Page ids and short descriptions for up to
    /// [`LINK_BATCH_SIZE`](crate::resolver::LINK_BATCH_SIZE) titles. Missing
    /// targets are left out of the result.
    fn fetch_link_descriptions(&self, titles: &[String]) -> Result<Vec<LinkedArticle>>;
}
