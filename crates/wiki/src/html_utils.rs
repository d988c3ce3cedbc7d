// ABOUTME: HTML utility functions shared by every extraction pass.
// ABOUTME: Provides tag stripping, entity decoding, whitespace collapsing and heading normalization.

/// Named entities decoded by [`decode_html_entities`]. Anything outside this
/// set is left untouched.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&nbsp;", ' '),
    ("&ndash;", '\u{2013}'),
    ("&mdash;", '\u{2014}'),
];

/// Removes everything between `<` and `>`, leaving entities encoded.
pub fn strip_tags(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Strips tags, decodes entities and collapses whitespace in one call.
pub fn strip_html(s: &str) -> String {
    collapse_whitespace(&decode_html_entities(&strip_tags(s)))
}

/// Decodes numeric (`&#N;`, `&#xHEX;`) entities and the fixed named set.
///
/// Decoding is a single left-to-right pass, so `&amp;lt;` becomes `&lt;`
/// rather than `<`.
pub fn decode_html_entities(s: &str) -> String {
    decode(s, true)
}

/// Decodes only numeric entities. Cite note ids use `&#95;` for `_`.
pub fn decode_numeric_entities(s: &str) -> String {
    decode(s, false)
}

fn decode(s: &str, named: bool) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some((ch, len)) = numeric_entity(tail) {
            result.push(ch);
            rest = &tail[len..];
            continue;
        }

        if named {
            if let Some((entity, ch)) = NAMED_ENTITIES.iter().find(|(e, _)| tail.starts_with(e)) {
                result.push(*ch);
                rest = &tail[entity.len()..];
                continue;
            }
        }

        result.push('&');
        rest = &tail[1..];
    }

    result.push_str(rest);
    result
}

/// Parses a numeric entity at the start of `s`, returning the decoded char
/// and the number of bytes consumed.
fn numeric_entity(s: &str) -> Option<(char, usize)> {
    let body = s.strip_prefix("&#")?;
    let (digits, radix, prefix_len) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16, 3),
        None => (body, 10, 2),
    };

    let end = digits.find(';')?;
    let num = &digits[..end];
    if num.is_empty() || !num.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let code = u32::from_str_radix(num, radix).ok()?;
    let ch = char::from_u32(code)?;
    Some((ch, prefix_len + end + 1))
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes a heading or section title for comparison: tags stripped,
/// entities decoded, trimmed, lower-cased.
pub fn normalize_title(s: &str) -> String {
    decode_html_entities(&strip_tags(s)).trim().to_lowercase()
}

/// Display form of a heading or outline title: tags stripped, entities
/// decoded, trimmed.
pub fn clean_title(s: &str) -> String {
    decode_html_entities(&strip_tags(s)).trim().to_string()
}

/// Returns the value of a double-quoted attribute inside a single tag.
pub fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let lower = tag.to_ascii_lowercase();
    let needle = format!("{}=\"", name.to_ascii_lowercase());
    let mut search_from = 0;

    while let Some(found) = lower[search_from..].find(&needle) {
        let start = search_from + found;
        let boundary_ok = start == 0
            || lower[..start]
                .chars()
                .next_back()
                .map_or(true, |c| c.is_whitespace());
        let value_start = start + needle.len();
        if boundary_ok {
            let value_len = tag[value_start..].find('"')?;
            return Some(&tag[value_start..value_start + value_len]);
        }
        search_from = value_start;
    }

    None
}
