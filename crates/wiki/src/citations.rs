// ABOUTME: Extracts footnote bodies from the reference list and correlates sections with footnote ids.
// ABOUTME: Citation bodies are sliced between consecutive cite_note list items, then cleaned.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::html_utils::{attr_value, collapse_whitespace, decode_html_entities, decode_numeric_entities};
use crate::models::{Citation, OutlineEntry, SectionCitationInfo};
use crate::outline::{chunk_by_headings, chunk_title, html_headings, HtmlHeading};

/// Cleaned citation bodies shorter than this many characters are dropped.
pub const MIN_CITATION_CHARS: usize = 5;

static CITE_NOTE_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<li\b[^>]*\bid="(cite(?:_|&#95;)note(?:_|&#95;|-)[^"]+)"[^>]*>"#).unwrap()
});
static BACKLINK_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<span\b[^>]*class="mw-cite-backlink"[^>]*>.*?</span>"#).unwrap()
});
static SUPERSCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<sup\b[^>]*>.*?</sup>").unwrap());
static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static ANCHOR_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<a\b[^>]*>").unwrap());
static LIST_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</ol>").unwrap());
static CITE_REF_HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r##"href="#(cite_note-[^"]+)""##).unwrap());

/// Extracts every footnote with a usable body, numbered 1..N in document
/// order.
pub fn extract_citations(html: &str) -> Vec<Citation> {
    let items: Vec<_> = CITE_NOTE_ITEM.captures_iter(html).collect();
    let mut citations = Vec::new();

    for (i, caps) in items.iter().enumerate() {
        let (Some(tag), Some(raw_id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let start = tag.end();
        let next_item = items
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(html.len(), |m| m.start());
        // An item ends at the next item or at the close of its own list.
        let end = LIST_CLOSE
            .find_at(html, start)
            .map_or(next_item, |m| m.start().min(next_item));
        let body = &html[start..end];

        let text = clean_citation_body(body);
        if text.chars().count() < MIN_CITATION_CHARS {
            continue;
        }

        citations.push(Citation {
            id: decode_numeric_entities(raw_id.as_str()),
            index: citations.len() as u32 + 1,
            text,
            url: external_link(body),
        });
    }

    citations
}

/// Removes backlinks, superscripts, style blocks and remaining tags, decodes
/// entities and collapses whitespace.
pub fn clean_citation_body(body: &str) -> String {
    let text = BACKLINK_SPAN.replace_all(body, "");
    let text = SUPERSCRIPT.replace_all(&text, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = ANY_TAG.replace_all(&text, "");
    collapse_whitespace(&decode_html_entities(&text))
}

/// First href of an anchor whose class mentions "external".
fn external_link(body: &str) -> Option<String> {
    ANCHOR_TAG.find_iter(body).find_map(|m| {
        let tag = m.as_str();
        let class = attr_value(tag, "class")?;
        if !class.contains("external") {
            return None;
        }
        attr_value(tag, "href")
            .filter(|href| !href.is_empty())
            .map(decode_html_entities)
    })
}

/// Distinct `cite_note-*` ids referenced by inline links, in first-seen order.
pub fn referenced_citation_ids(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    CITE_REF_HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// One [`SectionCitationInfo`] per chunk: the lead first, then every heading
/// in document order. Ids are not checked against the citation list.
pub fn extract_section_citations(html: &str, outline: &[OutlineEntry]) -> Vec<SectionCitationInfo> {
    let headings = html_headings(html);
    section_citations_for(html, &headings, outline)
}

pub(crate) fn section_citations_for(
    html: &str,
    headings: &[HtmlHeading],
    outline: &[OutlineEntry],
) -> Vec<SectionCitationInfo> {
    chunk_by_headings(html, headings)
        .iter()
        .map(|chunk| SectionCitationInfo::new(chunk_title(chunk, outline), referenced_citation_ids(chunk.html)))
        .collect()
}
