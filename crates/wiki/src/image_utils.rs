// ABOUTME: Gallery extraction from <figure> elements and thumbnail URL helpers.
// ABOUTME: Filters vector/formula glyphs, tiny or strip-shaped images and size variants of the same file.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::html_utils::collapse_whitespace;
use crate::models::ArticleImage;

/// Declared widths or heights below this many pixels are decorations.
pub const MIN_IMAGE_DIMENSION: u32 = 100;

/// Images whose sides differ by more than this factor are banners or strips.
pub const MAX_ASPECT_RATIO: u32 = 3;

static THUMB_SIZE_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+px-").unwrap());
static THUMB_ORIGINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"/thumb/(.+)/\d+px-[^/]+$").unwrap());
static THUMB_UPSCALE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(/thumb/.*/)\d+(px-[^/]+)$").unwrap());

static FIGURE: Lazy<Selector> = Lazy::new(|| Selector::parse("figure").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static VIDEO: Lazy<Selector> = Lazy::new(|| Selector::parse("video").unwrap());
static SOURCE: Lazy<Selector> = Lazy::new(|| Selector::parse("source[src]").unwrap());
static FIGCAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("figcaption").unwrap());

/// Extracts the article gallery from rendered HTML, in document order.
pub fn extract_images(html: &str) -> Vec<ArticleImage> {
    if html.trim().is_empty() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let mut images = Vec::new();
    let mut seen = HashSet::new();

    for figure in document.select(&FIGURE) {
        let type_of = figure.value().attr("typeof").unwrap_or_default();
        if type_of.contains("mw:Error") {
            continue;
        }

        let image = match figure.select(&IMG).next() {
            Some(img) => image_from_img(figure, img),
            None => image_from_video(figure),
        };
        let Some(image) = image else {
            continue;
        };

        if seen.insert(dedup_key(&image.src)) {
            images.push(image);
        }
    }

    images
}

fn image_from_img(figure: ElementRef<'_>, img: ElementRef<'_>) -> Option<ArticleImage> {
    let attrs = img.value();
    let raw_src = attrs.attr("src").unwrap_or_default().trim();
    if raw_src.is_empty() || is_glyph_src(raw_src) {
        return None;
    }

    let width = attrs.attr("width").and_then(parse_dimension);
    let height = attrs.attr("height").and_then(parse_dimension);
    if !has_usable_dimensions(width, height) {
        return None;
    }

    let src = absolutize(raw_src);
    let original = to_original_url(&src);

    Some(ArticleImage {
        original_src: (original != src).then_some(original),
        src,
        alt: attrs.attr("alt").map(collapse_whitespace).unwrap_or_default(),
        caption: caption_text(figure),
        width,
        height,
        video_src: None,
    })
}

/// Video figures display their poster; a figure without one is skipped.
/// Posters are not subject to the glyph or dimension filters.
fn image_from_video(figure: ElementRef<'_>) -> Option<ArticleImage> {
    let video = figure.select(&VIDEO).next()?;
    let poster = video.value().attr("poster").unwrap_or_default().trim();
    if poster.is_empty() {
        return None;
    }

    let video_src = figure
        .select(&SOURCE)
        .next()
        .and_then(|s| s.value().attr("src"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(absolutize);
    let caption = caption_text(figure);

    Some(ArticleImage {
        src: absolutize(poster),
        original_src: None,
        alt: caption.clone(),
        caption,
        width: None,
        height: None,
        video_src,
    })
}

fn caption_text(figure: ElementRef<'_>) -> String {
    figure
        .select(&FIGCAPTION)
        .next()
        .map(|c| collapse_whitespace(&c.text().collect::<String>()))
        .unwrap_or_default()
}

/// Rendered formulas and vector icons are not gallery content.
fn is_glyph_src(src: &str) -> bool {
    src.ends_with(".svg") || src.contains("/math/")
}

/// Applies the minimum-size and aspect-ratio rules to declared dimensions.
/// Missing dimensions are not held against an image.
pub fn has_usable_dimensions(width: Option<u32>, height: Option<u32>) -> bool {
    if width.is_some_and(|w| w < MIN_IMAGE_DIMENSION) || height.is_some_and(|h| h < MIN_IMAGE_DIMENSION) {
        return false;
    }
    match (width, height) {
        (Some(w), Some(h)) => {
            let (long, short) = if w >= h { (w, h) } else { (h, w) };
            // long / short > MAX_ASPECT_RATIO without float rounding
            u64::from(long) <= u64::from(short) * u64::from(MAX_ASPECT_RATIO)
        }
        _ => true,
    }
}

/// Reads the leading digits of a dimension attribute; zero counts as absent.
fn parse_dimension(value: &str) -> Option<u32> {
    let digits: String = value.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|v| *v > 0)
}

fn absolutize(src: &str) -> String {
    if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        src.to_string()
    }
}

/// Source URL with the `/<N>px-` size segment normalized out, so size
/// variants of one file compare equal.
pub fn dedup_key(src: &str) -> String {
    THUMB_SIZE_SEGMENT.replace(src, "/SIZE-").into_owned()
}

/// Converts a thumbnail URL to the full-size original:
/// `.../thumb/5/53/File.jpg/250px-File.jpg` becomes `.../5/53/File.jpg`.
/// Other URLs are returned unchanged.
pub fn to_original_url(url: &str) -> String {
    match THUMB_ORIGINAL.captures(url) {
        Some(caps) => match (caps.get(0), caps.get(1)) {
            (Some(whole), Some(path)) => format!("{}/{}", &url[..whole.start()], path.as_str()),
            _ => url.to_string(),
        },
        None => url.to_string(),
    }
}

/// Rewrites the size prefix of a thumbnail URL to `width` pixels. Other URLs
/// are returned unchanged.
pub fn upscale_thumb_url(url: &str, width: u32) -> String {
    THUMB_UPSCALE
        .replace(url, format!("${{1}}{}${{2}}", width).as_str())
        .into_owned()
}
