// ABOUTME: Runs every HTML extraction pass over one rendered page and assembles ParsedPageData.
// ABOUTME: Headings are located once and shared by the link-count and section-citation passes.

use crate::citations::{extract_citations, section_citations_for};
use crate::image_utils::extract_images;
use crate::links::link_counts_for;
use crate::models::{OutlineEntry, ParsedPageData};
use crate::outline::{html_headings, section_index_map};

/// Parses rendered article HTML together with its upstream section outline.
///
/// Total over its input: malformed or empty markup produces empty
/// collections, never an error.
pub fn parse_page_html(html: &str, outline: &[OutlineEntry]) -> ParsedPageData {
    let headings = html_headings(html);

    ParsedPageData {
        link_counts: link_counts_for(html, &headings, outline),
        citations: extract_citations(html),
        section_citations: section_citations_for(html, &headings, outline),
        section_index_map: section_index_map(outline),
        images: extract_images(html),
    }
}
