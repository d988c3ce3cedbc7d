// ABOUTME: Locates h2-h6 heading elements in rendered HTML and chunks the document between them.
// ABOUTME: Chunking is flat: each heading's chunk runs to the next heading of any level.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::html_utils::{clean_title, normalize_title};
use crate::models::{OutlineEntry, SectionIndexEntry, SUMMARY_KEY};

static HEADING_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<h([2-6])\b[^>]*>").unwrap());

/// One `<hN>...</hN>` element located in the HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlHeading {
    /// Byte offset of the opening tag.
    pub start: usize,
    /// Byte offset just past the closing tag.
    pub end: usize,
    pub level: u8,
    /// Inner markup of the heading.
    pub inner: String,
}

impl HtmlHeading {
    /// Heading text with tags stripped and entities decoded.
    pub fn text(&self) -> String {
        clean_title(&self.inner)
    }
}

/// A slice of the document attributed to one heading, or to the lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// `None` for the lead chunk.
    pub heading: Option<&'a HtmlHeading>,
    pub html: &'a str,
}

impl Chunk<'_> {
    pub fn is_lead(&self) -> bool {
        self.heading.is_none()
    }
}

/// Finds every h2-h6 element in document order. An opening tag without its
/// matching close is ignored.
pub fn html_headings(html: &str) -> Vec<HtmlHeading> {
    let mut headings = Vec::new();
    let mut pos = 0;

    while let Some(caps) = HEADING_OPEN.captures_at(html, pos) {
        let (Some(open), Some(level)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let close_tag = format!("</h{}>", level.as_str());
        let inner_start = open.end();

        match find_ignore_ascii_case(&html[inner_start..], &close_tag) {
            Some(rel) => {
                let inner_end = inner_start + rel;
                headings.push(HtmlHeading {
                    start: open.start(),
                    end: inner_end + close_tag.len(),
                    level: level.as_str().parse().unwrap_or(2),
                    inner: html[inner_start..inner_end].to_string(),
                });
                pos = inner_end + close_tag.len();
            }
            None => pos = inner_start,
        }
    }

    headings
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Slices the document into the lead chunk followed by one chunk per
/// heading. Heading chunks start after the closing tag and end at the next
/// heading's opening tag (or the end of the document).
pub fn chunk_by_headings<'a>(html: &'a str, headings: &'a [HtmlHeading]) -> Vec<Chunk<'a>> {
    let lead_end = headings.first().map_or(html.len(), |h| h.start);
    let mut chunks = vec![Chunk {
        heading: None,
        html: &html[..lead_end],
    }];

    for (i, heading) in headings.iter().enumerate() {
        let end = headings.get(i + 1).map_or(html.len(), |next| next.start);
        chunks.push(Chunk {
            heading: Some(heading),
            html: &html[heading.end..end],
        });
    }

    chunks
}

/// Finds the outline entry whose normalized title equals the heading's
/// normalized text and returns its display title.
pub fn match_outline_title(heading: &HtmlHeading, outline: &[OutlineEntry]) -> Option<String> {
    let target = normalize_title(&heading.inner);
    outline
        .iter()
        .find(|entry| normalize_title(&entry.title) == target)
        .map(|entry| clean_title(&entry.title))
}

/// Key used for a chunk in per-section outputs: the matched outline title,
/// the heading text when nothing matches, or [`SUMMARY_KEY`] for the lead.
pub fn chunk_title(chunk: &Chunk<'_>, outline: &[OutlineEntry]) -> String {
    match chunk.heading {
        None => SUMMARY_KEY.to_string(),
        Some(h) => match_outline_title(h, outline).unwrap_or_else(|| h.text()),
    }
}

/// Builds the title → section index map from the upstream outline.
pub fn section_index_map(outline: &[OutlineEntry]) -> Vec<SectionIndexEntry> {
    outline
        .iter()
        .map(|entry| SectionIndexEntry {
            title: clean_title(&entry.title),
            index: entry.index.clone(),
        })
        .collect()
}
