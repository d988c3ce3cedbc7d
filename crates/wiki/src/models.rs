// ABOUTME: Domain models produced by the plaintext and HTML extraction passes.
// ABOUTME: Sections, citations, link counts, section index entries, gallery images and the parsed-page aggregate.

use serde::{Deserialize, Serialize};

/// Reserved section key for the lead (the content before the first heading).
pub const SUMMARY_KEY: &str = "__summary__";

/// One narratable section of a plaintext extract, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub level: u8,
    pub content: String,
}

/// A plaintext extract split into its lead summary and ordered sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSections {
    pub summary: String,
    pub sections: Vec<Section>,
}

/// One bibliographic footnote. `index` is 1-based document order; `id` is the
/// `cite_note-*` anchor and is only a correlation key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub id: String,
    pub index: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Footnote ids referenced from one section. `count == citation_ids.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCitationInfo {
    pub title: String,
    pub count: usize,
    pub citation_ids: Vec<String>,
}

impl SectionCitationInfo {
    pub fn new(title: impl Into<String>, citation_ids: Vec<String>) -> Self {
        Self {
            title: title.into(),
            count: citation_ids.len(),
            citation_ids,
        }
    }
}

/// Number of internal article links in one section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCount {
    pub title: String,
    pub count: usize,
}

/// Per-section citation count without the id list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationCount {
    pub title: String,
    pub count: usize,
}

/// Maps a section title to the opaque upstream section index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionIndexEntry {
    pub title: String,
    pub index: String,
}

/// One entry of the upstream section outline that accompanies rendered HTML.
/// `title` may still carry inline markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub title: String,
    pub level: u8,
    pub index: String,
}

/// A displayable gallery image. Video figures use their poster as `src`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleImage {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_src: Option<String>,
    pub alt: String,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_src: Option<String>,
}

/// Everything the HTML passes produce for one page. Always cached and served
/// as a single unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPageData {
    pub link_counts: Vec<LinkCount>,
    pub citations: Vec<Citation>,
    pub section_citations: Vec<SectionCitationInfo>,
    pub section_index_map: Vec<SectionIndexEntry>,
    pub images: Vec<ArticleImage>,
}

impl ParsedPageData {
    /// True when some section references citations but no citation bodies
    /// were captured.
    pub fn is_missing_citations(&self) -> bool {
        self.citations.is_empty() && self.section_citations.iter().any(|s| s.count > 0)
    }

    pub fn citation_counts(&self) -> Vec<CitationCount> {
        self.section_citations
            .iter()
            .map(|s| CitationCount {
                title: s.title.clone(),
                count: s.count,
            })
            .collect()
    }
}

/// An internal article linked from a section, enriched with its short
/// description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedArticle {
    pub page_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
