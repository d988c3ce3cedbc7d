// ABOUTME: Core extraction library for curio: plaintext section splitting and rendered-HTML passes.
// ABOUTME: Pure functions over strings; malformed input degrades to empty output instead of errors.

//! Structured data from the two upstream renderings of a Wikipedia article.
//!
//! The plaintext extract is split into a lead summary and ordered sections.
//! Rendered HTML goes through four passes (link counts, citations,
//! section/citation correlation and the image gallery) that are assembled
//! into a single [`ParsedPageData`].
//!
//! # Example
//!
//! ```
//! use curio_wiki::split_sections;
//!
//! let split = split_sections("Lead.\n\n== History ==\nOld times.\n\n== References ==\nx");
//! assert_eq!(split.summary, "Lead.");
//! assert_eq!(split.sections.len(), 1);
//! assert_eq!(split.sections[0].title, "History");
//! ```

pub mod citations;
pub mod html_utils;
pub mod image_utils;
pub mod links;
pub mod models;
pub mod outline;
pub mod parser;
pub mod sections;
pub mod slug;

pub use citations::{extract_citations, extract_section_citations, MIN_CITATION_CHARS};
pub use html_utils::{decode_html_entities, normalize_title, strip_html, strip_tags};
pub use image_utils::{
    extract_images, to_original_url, upscale_thumb_url, MAX_ASPECT_RATIO, MIN_IMAGE_DIMENSION,
};
pub use links::extract_link_counts;
pub use models::{
    ArticleImage, Citation, CitationCount, LinkCount, LinkedArticle, OutlineEntry, ParsedPageData,
    Section, SectionCitationInfo, SectionIndexEntry, SplitSections, SUMMARY_KEY,
};
pub use parser::parse_page_html;
pub use sections::{clean_section_content, split_sections, NOISE_SECTIONS};
pub use slug::{article_url, slug_to_title, title_to_slug};
