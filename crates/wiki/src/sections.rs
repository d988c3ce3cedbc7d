// ABOUTME: Splits a plaintext extract into a lead summary and ordered sections.
// ABOUTME: Heading spans are computed first, then content is sliced between consecutive spans.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Section, SplitSections};

/// Conventional metadata headings that never become sections (compared
/// lower-cased).
pub const NOISE_SECTIONS: &[&str] = &[
    "see also",
    "references",
    "external links",
    "notes",
    "further reading",
    "bibliography",
    "sources",
    "citations",
    "footnotes",
];

static SUB_HEADING_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^={2,}[ \t]*.+?[ \t]*={2,}[ \t]*\r?$").unwrap());
static FOOTNOTE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());
static CITATION_NEEDED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[citation needed\]").unwrap());
static EDIT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[edit\]").unwrap());
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// A heading line located in a plaintext extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingSpan {
    /// Byte offset of the first `=`.
    pub start: usize,
    /// Byte offset just past the last `=` (before the line break).
    pub end: usize,
    pub level: u8,
    pub title: String,
}

/// Returns true when the title names a reference/metadata section.
pub fn is_noise_section(title: &str) -> bool {
    let lower = title.trim().to_lowercase();
    NOISE_SECTIONS.iter().any(|n| *n == lower)
}

/// Locates every `== Title ==` heading line, in document order.
pub fn heading_spans(text: &str) -> Vec<HeadingSpan> {
    let mut spans = Vec::new();
    let mut offset = 0;

    for raw in text.split_inclusive('\n') {
        let line = raw.trim_end_matches('\n').trim_end_matches('\r');
        if let Some((level, title)) = parse_heading_line(line) {
            spans.push(HeadingSpan {
                start: offset,
                end: offset + line.len(),
                level,
                title,
            });
        }
        offset += raw.len();
    }

    spans
}

/// Parses one line as a heading: N equal signs, a title, then the same N
/// equal signs with nothing after them. N ranges over 2..=6, longest first,
/// so `=== A ==` is read as level 2 titled `= A`.
fn parse_heading_line(line: &str) -> Option<(u8, String)> {
    let leading = line.bytes().take_while(|b| *b == b'=').count();
    if leading < 2 {
        return None;
    }

    for level in (2..=leading.min(6)).rev() {
        let marker = &line[..level];
        if line.len() <= level * 2 || !line.ends_with(marker) {
            continue;
        }
        let title = line[level..line.len() - level].trim();
        if !title.is_empty() {
            return Some((level as u8, title.to_string()));
        }
    }

    None
}

/// Splits a plaintext extract into summary and sections. Never fails.
pub fn split_sections(text: &str) -> SplitSections {
    let spans = heading_spans(text);
    let Some(first) = spans.first() else {
        return SplitSections {
            summary: text.trim().to_string(),
            sections: Vec::new(),
        };
    };

    let summary = text[..first.start].trim().to_string();
    let mut sections = Vec::new();

    for (i, span) in spans.iter().enumerate() {
        if is_noise_section(&span.title) {
            continue;
        }
        let content_end = spans.get(i + 1).map_or(text.len(), |next| next.start);
        let content = clean_section_content(&text[span.end..content_end]);

        sections.push(Section {
            title: span.title.clone(),
            level: span.level,
            content,
        });
    }

    SplitSections { summary, sections }
}

/// Removes embedded heading lines and footnote/edit markers, collapses runs
/// of three or more newlines to two, and trims.
pub fn clean_section_content(text: &str) -> String {
    let text = SUB_HEADING_LINE.replace_all(text, "");
    let text = FOOTNOTE_MARKER.replace_all(&text, "");
    let text = CITATION_NEEDED.replace_all(&text, "");
    let text = EDIT_MARKER.replace_all(&text, "");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}
