// ABOUTME: Integration tests for the wiki utility modules.
// ABOUTME: Tests entity decoding, slugs and gallery extraction from <figure> markup.

use curio_wiki::{
    article_url, decode_html_entities, extract_images, normalize_title, slug_to_title, strip_html,
    title_to_slug, to_original_url, ArticleImage,
};
use pretty_assertions::assert_eq;

mod html_utils_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_fixed_named_set() {
        assert_eq!(
            decode_html_entities("a &amp; b &lt;c&gt; &quot;d&quot; 1&ndash;2 x&mdash;y"),
            "a & b <c> \"d\" 1\u{2013}2 x\u{2014}y"
        );
    }

    #[test]
    fn test_decode_numeric_and_hex() {
        assert_eq!(decode_html_entities("&#169; &#x41;&#X42;"), "\u{a9} AB");
    }

    #[test]
    fn test_decode_single_pass() {
        assert_eq!(decode_html_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_unknown_entities_left_alone() {
        assert_eq!(decode_html_entities("&copy; &bogus;"), "&copy; &bogus;");
        assert_eq!(decode_html_entities("AT&T"), "AT&T");
    }

    #[test]
    fn test_strip_html_collapses() {
        assert_eq!(strip_html("<p>Hello\n\n<b>World</b>&nbsp;!</p>"), "Hello World !");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Ancient <i>Egypt</i> "), "ancient egypt");
        assert_eq!(normalize_title("Arts &amp; Crafts"), "arts & crafts");
    }
}

mod slug_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slug_conversions() {
        assert_eq!(title_to_slug("New York City"), "New_York_City");
        assert_eq!(slug_to_title("New_York_City"), "New York City");
    }

    #[test]
    fn test_article_url() {
        assert_eq!(
            article_url("Cat").as_deref(),
            Some("https://en.wikipedia.org/wiki/Cat")
        );
    }
}

mod image_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn figure(img: &str, caption: &str) -> String {
        format!(
            r#"<figure typeof="mw:File/Thumb"><a href="/wiki/File:X"><img {}></a><figcaption>{}</figcaption></figure>"#,
            img, caption
        )
    }

    #[test]
    fn test_empty_html() {
        assert_eq!(extract_images(""), Vec::<ArticleImage>::new());
        assert!(extract_images("<p>No figures here.</p>").is_empty());
    }

    #[test]
    fn test_size_variants_deduplicated_first_wins() {
        let html = format!(
            "{}{}",
            figure(
                r#"src="//upload.wikimedia.org/wikipedia/commons/thumb/a/ab/Cat.jpg/220px-Cat.jpg" width="220" height="165" alt="A cat""#,
                "First caption"
            ),
            figure(
                r#"src="//upload.wikimedia.org/wikipedia/commons/thumb/a/ab/Cat.jpg/300px-Cat.jpg" width="300" height="225" alt="A cat""#,
                "Second caption"
            )
        );
        let images = extract_images(&html);
        assert_eq!(images.len(), 1);
        let cat = &images[0];
        assert_eq!(
            cat.src,
            "https://upload.wikimedia.org/wikipedia/commons/thumb/a/ab/Cat.jpg/220px-Cat.jpg"
        );
        assert_eq!(
            cat.original_src.as_deref(),
            Some("https://upload.wikimedia.org/wikipedia/commons/a/ab/Cat.jpg")
        );
        assert_eq!(cat.caption, "First caption");
        assert_eq!(cat.alt, "A cat");
        assert_eq!(cat.width, Some(220));
        assert_eq!(cat.height, Some(165));
        assert_eq!(cat.video_src, None);
    }

    #[test]
    fn test_dimension_filters() {
        let html = format!(
            "{}{}",
            figure(r#"src="https://example.org/strip.jpg" width="80" height="400""#, "Strip"),
            figure(r#"src="https://example.org/square.jpg" width="250" height="250""#, "Square")
        );
        let images = extract_images(&html);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].caption, "Square");
    }

    #[test]
    fn test_wide_banner_excluded() {
        let html = figure(r#"src="https://example.org/banner.jpg" width="1200" height="150""#, "Banner");
        assert!(extract_images(&html).is_empty());
    }

    #[test]
    fn test_vector_and_formula_glyphs_filtered() {
        let html = format!(
            "{}{}",
            figure(r#"src="https://example.org/icon.svg" width="200" height="200""#, "Icon"),
            figure(
                r#"src="https://wikimedia.org/api/rest_v1/media/math/render/png/abc" width="200" height="200""#,
                "Formula"
            )
        );
        assert!(extract_images(&html).is_empty());
    }

    #[test]
    fn test_error_figures_skipped() {
        let html = r#"<figure typeof="mw:Error mw:File/Thumb"><img src="https://example.org/broken.jpg" width="200" height="200"><figcaption>Broken</figcaption></figure>"#;
        assert!(extract_images(html).is_empty());
    }

    #[test]
    fn test_video_with_poster() {
        let html = r#"<figure typeof="mw:File/Thumb"><video poster="//upload.wikimedia.org/poster.jpg" width="320" height="240"><source src="//upload.wikimedia.org/clip.webm" type="video/webm"></video><figcaption>A   short
            clip</figcaption></figure>"#;
        let images = extract_images(html);
        assert_eq!(
            images,
            vec![ArticleImage {
                src: "https://upload.wikimedia.org/poster.jpg".into(),
                original_src: None,
                alt: "A short clip".into(),
                caption: "A short clip".into(),
                width: None,
                height: None,
                video_src: Some("https://upload.wikimedia.org/clip.webm".into()),
            }]
        );
    }

    #[test]
    fn test_short_wide_video_kept() {
        let html = r#"<figure typeof="mw:File/Thumb"><video poster="//upload.wikimedia.org/strip.jpg" width="220" height="50"><source src="//upload.wikimedia.org/strip.webm"></video><figcaption>clip</figcaption></figure>"#;
        let images = extract_images(html);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].src, "https://upload.wikimedia.org/strip.jpg");
        assert_eq!(images[0].video_src.as_deref(), Some("https://upload.wikimedia.org/strip.webm"));
    }

    #[test]
    fn test_video_without_poster_skipped() {
        let html = r#"<figure><video width="320" height="240"><source src="//upload.wikimedia.org/clip.webm"></video><figcaption>Clip</figcaption></figure>"#;
        assert!(extract_images(html).is_empty());
    }

    #[test]
    fn test_alt_text_decoded() {
        let html = figure(r#"src="https://example.org/pair.jpg" alt="Cat &amp; dog""#, "");
        let images = extract_images(&html);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].alt, "Cat & dog");
        assert_eq!(images[0].caption, "");
    }

    #[test]
    fn test_zero_dimensions_omitted() {
        let html = figure(r#"src="https://example.org/a.jpg" width="0" height="0""#, "Zero");
        let images = extract_images(&html);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].width, None);
        assert_eq!(images[0].height, None);
        assert_eq!(images[0].original_src, None);
    }

    #[test]
    fn test_original_url_passthrough() {
        assert_eq!(to_original_url("https://example.org/a.jpg"), "https://example.org/a.jpg");
    }
}
