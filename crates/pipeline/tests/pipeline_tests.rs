// ABOUTME: Integration tests for ParseCache, SectionLinkResolver and article loading over a scripted source.
// ABOUTME: The fake source counts upstream calls so hit/miss/invalid decisions are observable.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration as ChronoDuration, Utc};
use curio_pipeline::{
    load_article, ArticleKey, CacheOptions, CacheStore, MemoryStore, ParseCacheRecord, Pipeline,
    PlainExtract, RenderedHtml, Result, SectionLink, WikiContentSource, WikiError, LINK_BATCH_SIZE,
    UNKNOWN_REVISION,
};
use curio_wiki::{
    Citation, CitationCount, LinkCount, LinkedArticle, OutlineEntry, ParsedPageData,
    SectionCitationInfo, SUMMARY_KEY,
};
use pretty_assertions::assert_eq;

const PAGE_HTML: &str = r##"<p>Lead about <a href="/wiki/Physics">physics</a>.<sup><a href="#cite_note-1">[1]</a></sup></p>
<h2 id="Early_life">Early life</h2><p>Born in <a href="/wiki/Ulm">Ulm</a>.<sup><a href="#cite_note-2">[2]</a></sup></p>
<h2 id="References">References</h2><ol class="references">
<li id="cite_note-1"><span class="reference-text">First source text.</span></li>
<li id="cite_note-2"><span class="reference-text">Second source text.</span></li>
</ol>"##;

fn page_outline() -> Vec<OutlineEntry> {
    vec![
        OutlineEntry { title: "Early life".into(), level: 2, index: "1".into() },
        OutlineEntry { title: "References".into(), level: 2, index: "2".into() },
    ]
}

/// Scripted upstream. Description lookups resolve every title except those
/// starting with "Missing"; "Felis catus" redirects to "Cat".
struct FakeSource {
    rendered: RenderedHtml,
    links: Vec<SectionLink>,
    extract: Option<PlainExtract>,
    fail_rendered: AtomicBool,
    rendered_calls: AtomicUsize,
    section_link_requests: Mutex<Vec<String>>,
    batches: Mutex<Vec<usize>>,
}

impl FakeSource {
    fn new() -> Self {
        Self {
            rendered: RenderedHtml {
                html: PAGE_HTML.to_string(),
                section_outline: page_outline(),
            },
            links: Vec::new(),
            extract: None,
            fail_rendered: AtomicBool::new(false),
            rendered_calls: AtomicUsize::new(0),
            section_link_requests: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
        }
    }

    fn with_links(mut self, links: Vec<SectionLink>) -> Self {
        self.links = links;
        self
    }

    fn rendered_calls(&self) -> usize {
        self.rendered_calls.load(Ordering::SeqCst)
    }

    fn section_link_requests(&self) -> Vec<String> {
        self.section_link_requests.lock().unwrap().clone()
    }

    fn batches(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

impl WikiContentSource for FakeSource {
    fn fetch_plain_extract(&self, key: &ArticleKey) -> Result<PlainExtract> {
        self.extract
            .clone()
            .ok_or_else(|| WikiError::not_found(key.as_str(), "fetch_plain_extract", None))
    }

    fn fetch_rendered_html(&self, page_id: &str) -> Result<RenderedHtml> {
        self.rendered_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_rendered.load(Ordering::SeqCst) {
            return Err(WikiError::content_unavailable(
                page_id,
                "fetch_rendered_html",
                Some(anyhow::anyhow!("HTTP status 503")),
            ));
        }
        Ok(self.rendered.clone())
    }

    fn fetch_section_links(&self, _page_id: &str, section_index: &str) -> Result<Vec<SectionLink>> {
        self.section_link_requests
            .lock()
            .unwrap()
            .push(section_index.to_string());
        Ok(self.links.clone())
    }

    fn fetch_link_descriptions(&self, titles: &[String]) -> Result<Vec<LinkedArticle>> {
        self.batches.lock().unwrap().push(titles.len());
        // Reverse order so callers cannot rely on arrival order.
        Ok(titles
            .iter()
            .rev()
            .filter(|t| !t.starts_with("Missing"))
            .map(|t| {
                let title = if t == "Felis catus" { "Cat" } else { t.as_str() };
                LinkedArticle {
                    page_id: format!("id-{}", title),
                    title: title.to_string(),
                    description: Some(format!("About {}", title)),
                }
            })
            .collect())
    }
}

fn link(namespace: i64, title: &str, exists: bool) -> SectionLink {
    SectionLink {
        namespace,
        title: title.to_string(),
        exists,
    }
}

fn pipeline(source: Arc<FakeSource>, store: Arc<MemoryStore>) -> Pipeline {
    Pipeline::new(source, store, CacheOptions::default())
}

fn stored_record(hours_old: i64, data: ParsedPageData) -> ParseCacheRecord {
    ParseCacheRecord {
        page_id: "736".into(),
        data,
        cached_at: Utc::now() - ChronoDuration::hours(hours_old),
    }
}

fn marker_data() -> ParsedPageData {
    ParsedPageData {
        link_counts: vec![LinkCount { title: "Marker".into(), count: 42 }],
        ..Default::default()
    }
}

mod parse_cache_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_miss_populates_then_hits() {
        let source = Arc::new(FakeSource::new());
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(source.clone(), store.clone());

        let first = pipeline.parsed_page_data("736").unwrap();
        let second = pipeline.parsed_page_data("736").unwrap();

        assert_eq!(source.rendered_calls(), 1);
        assert_eq!(first, second);
        assert_eq!(first.citations.len(), 2);
        assert_eq!(store.get_parsed("736").unwrap().unwrap().data, first);
    }

    #[test]
    fn test_entry_older_than_a_day_is_reparsed() {
        let source = Arc::new(FakeSource::new());
        let store = Arc::new(MemoryStore::new());
        store.put_parsed(&stored_record(25, marker_data())).unwrap();

        let data = pipeline(source.clone(), store.clone())
            .parsed_page_data("736")
            .unwrap();

        assert_eq!(source.rendered_calls(), 1);
        assert_ne!(data, marker_data());
        let record = store.get_parsed("736").unwrap().unwrap();
        assert!(Utc::now() - record.cached_at < ChronoDuration::minutes(1));
    }

    #[test]
    fn test_counts_without_citation_bodies_force_reparse() {
        let source = Arc::new(FakeSource::new());
        let store = Arc::new(MemoryStore::new());
        let incomplete = ParsedPageData {
            section_citations: vec![SectionCitationInfo::new(
                "Early life",
                vec!["cite_note-1".into(), "cite_note-2".into(), "cite_note-3".into()],
            )],
            ..Default::default()
        };
        assert_eq!(incomplete.section_citations[0].count, 3);
        store.put_parsed(&stored_record(1, incomplete)).unwrap();

        let data = pipeline(source.clone(), store).parsed_page_data("736").unwrap();

        assert_eq!(source.rendered_calls(), 1);
        assert_eq!(data.citations.len(), 2);
    }

    #[test]
    fn test_valid_entry_is_served_without_upstream_call() {
        let source = Arc::new(FakeSource::new());
        let store = Arc::new(MemoryStore::new());
        store.put_parsed(&stored_record(1, marker_data())).unwrap();

        let data = pipeline(source.clone(), store).parsed_page_data("736").unwrap();

        assert_eq!(source.rendered_calls(), 0);
        assert_eq!(data, marker_data());
    }

    #[test]
    fn test_failed_fetch_leaves_previous_entry_untouched() {
        let source = Arc::new(FakeSource::new());
        source.fail_rendered.store(true, Ordering::SeqCst);
        let store = Arc::new(MemoryStore::new());
        let stale = stored_record(30, marker_data());
        store.put_parsed(&stale).unwrap();

        let err = pipeline(source.clone(), store.clone())
            .parsed_page_data("736")
            .unwrap_err();

        assert!(err.is_content_unavailable(), "got {}", err);
        assert_eq!(store.get_parsed("736").unwrap(), Some(stale));
    }

    #[test]
    fn test_failed_fetch_on_empty_cache_writes_nothing() {
        let source = Arc::new(FakeSource::new());
        source.fail_rendered.store(true, Ordering::SeqCst);
        let store = Arc::new(MemoryStore::new());

        assert!(pipeline(source, store.clone()).parsed_page_data("736").is_err());
        assert_eq!(store.get_parsed("736").unwrap(), None);
    }

    #[test]
    fn test_count_views() {
        let source = Arc::new(FakeSource::new());
        let pipeline = pipeline(source.clone(), Arc::new(MemoryStore::new()));

        assert_eq!(
            pipeline.link_counts("736").unwrap(),
            vec![
                LinkCount { title: SUMMARY_KEY.into(), count: 1 },
                LinkCount { title: "Early life".into(), count: 1 },
                LinkCount { title: "References".into(), count: 0 },
            ]
        );
        assert_eq!(
            pipeline.citation_counts("736").unwrap(),
            vec![
                CitationCount { title: SUMMARY_KEY.into(), count: 1 },
                CitationCount { title: "Early life".into(), count: 1 },
                CitationCount { title: "References".into(), count: 0 },
            ]
        );
        assert_eq!(source.rendered_calls(), 1);
    }

    #[test]
    fn test_section_citations_by_title_and_lead() {
        let pipeline = pipeline(Arc::new(FakeSource::new()), Arc::new(MemoryStore::new()));

        assert_eq!(
            pipeline.section_citations("736", None).unwrap(),
            vec![Citation {
                id: "cite_note-1".into(),
                index: 1,
                text: "First source text.".into(),
                url: None,
            }]
        );

        let early = pipeline.section_citations("736", Some("  EARLY life ")).unwrap();
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].id, "cite_note-2");
        assert_eq!(early[0].index, 2);

        assert!(pipeline.section_citations("736", Some("Legacy")).unwrap().is_empty());
        assert!(pipeline.section_citations("736", Some("References")).unwrap().is_empty());
    }
}

mod resolver_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lead_uses_index_zero_without_parsing() {
        let source = Arc::new(FakeSource::new().with_links(vec![
            link(0, "Physics", true),
            link(0, "Relativity", true),
        ]));
        let pipeline = pipeline(source.clone(), Arc::new(MemoryStore::new()));

        let links = pipeline.section_links("736", None).unwrap();

        assert_eq!(source.section_link_requests(), vec!["0"]);
        assert_eq!(source.rendered_calls(), 0);
        let titles: Vec<&str> = links.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Physics", "Relativity"]);
        assert_eq!(links[0].description.as_deref(), Some("About Physics"));
    }

    #[test]
    fn test_title_resolves_through_section_index_map() {
        let source = Arc::new(FakeSource::new().with_links(vec![link(0, "Ulm", true)]));
        let pipeline = pipeline(source.clone(), Arc::new(MemoryStore::new()));

        let links = pipeline.section_links("736", Some("early <b>Life</b>")).unwrap();

        assert_eq!(source.section_link_requests(), vec!["1"]);
        assert_eq!(source.rendered_calls(), 1);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].page_id, "id-Ulm");
    }

    #[test]
    fn test_unknown_title_yields_empty_list() {
        let source = Arc::new(FakeSource::new().with_links(vec![link(0, "Ulm", true)]));
        let pipeline = pipeline(source.clone(), Arc::new(MemoryStore::new()));

        assert!(pipeline.section_links("736", Some("Legacy")).unwrap().is_empty());
        assert!(source.section_link_requests().is_empty());
    }

    #[test]
    fn test_filters_dedups_batches_and_sorts() {
        let mut listed = vec![
            link(14, "Category:Physicists", true),
            link(0, "Red link", false),
            link(0, "Missing target", true),
        ];
        for i in (0..120).rev() {
            listed.push(link(0, &format!("Topic {:03}", i), true));
        }
        listed.push(link(0, "Topic 007", true));
        let source = Arc::new(FakeSource::new().with_links(listed));
        let pipeline = pipeline(source.clone(), Arc::new(MemoryStore::new()));

        let links = pipeline.section_links("736", None).unwrap();

        // 120 distinct topics plus the missing target: 121 titles.
        assert_eq!(source.batches(), vec![LINK_BATCH_SIZE, LINK_BATCH_SIZE, 21]);
        assert_eq!(links.len(), 120);
        assert_eq!(links[0].title, "Topic 000");
        assert_eq!(links[119].title, "Topic 119");
        assert!(links.windows(2).all(|w| w[0].title < w[1].title));
    }

    #[test]
    fn test_merges_by_target_identity() {
        let source = Arc::new(FakeSource::new().with_links(vec![
            link(0, "Felis catus", true),
            link(0, "Cat", true),
            link(0, "Abyssinian cat", true),
        ]));
        let pipeline = pipeline(source, Arc::new(MemoryStore::new()));

        let links = pipeline.section_links("736", None).unwrap();
        let ids: Vec<&str> = links.iter().map(|l| l.page_id.as_str()).collect();
        assert_eq!(ids, vec!["id-Abyssinian cat", "id-Cat"]);
    }

    #[test]
    fn test_results_cached_per_section() {
        let source = Arc::new(FakeSource::new().with_links(vec![link(0, "Ulm", true)]));
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline(source.clone(), store.clone());

        let first = pipeline.section_links("736", Some("Early life")).unwrap();
        let second = pipeline.section_links("736", Some("early life")).unwrap();
        pipeline.section_links("736", None).unwrap();

        assert_eq!(first, second);
        assert_eq!(source.section_link_requests(), vec!["1", "0"]);
        assert!(store.get_section_links("736", "early life").unwrap().is_some());
        assert!(store.get_section_links("736", SUMMARY_KEY).unwrap().is_some());
    }

    #[test]
    fn test_stale_links_are_refetched() {
        let source = Arc::new(FakeSource::new().with_links(vec![link(0, "Ulm", true)]));
        let store = Arc::new(MemoryStore::new());
        store
            .put_section_links(&curio_pipeline::SectionLinksRecord {
                page_id: "736".into(),
                section_key: SUMMARY_KEY.into(),
                links: vec![],
                cached_at: Utc::now() - ChronoDuration::hours(25),
            })
            .unwrap();

        let links = pipeline(source.clone(), store).section_links("736", None).unwrap();

        assert_eq!(source.section_link_requests(), vec!["0"]);
        assert_eq!(links.len(), 1);
    }
}

mod article_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_article_splits_sections() {
        let mut source = FakeSource::new();
        source.extract = Some(PlainExtract {
            page_id: "736".into(),
            title: "Albert Einstein".into(),
            revision_id: Some("99".into()),
            last_edited_at: None,
            plain_text: "Lead text.\n\n== Early life ==\nBorn in Ulm.\n\n== See also ==\nOther.".into(),
            thumbnail: None,
        });

        let before = Utc::now();
        let article = load_article(&source, &ArticleKey::title("Albert Einstein")).unwrap();

        assert_eq!(article.page_id, "736");
        assert_eq!(article.revision_id, "99");
        assert!(article.last_edited_at >= before);
        assert_eq!(article.summary, "Lead text.");
        assert_eq!(article.sections.len(), 1);
        assert_eq!(article.sections[0].title, "Early life");
        assert_eq!(
            article.url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Albert_Einstein")
        );
    }

    #[test]
    fn test_missing_revision_is_unknown() {
        let mut source = FakeSource::new();
        source.extract = Some(PlainExtract {
            page_id: "1".into(),
            title: "Stub".into(),
            revision_id: None,
            last_edited_at: None,
            plain_text: String::new(),
            thumbnail: None,
        });

        let article = load_article(&source, &ArticleKey::page_id("1")).unwrap();
        assert_eq!(article.revision_id, UNKNOWN_REVISION);
        assert_eq!(article.summary, "");
        assert!(article.sections.is_empty());
    }

    #[test]
    fn test_not_found_propagates() {
        let err = load_article(&FakeSource::new(), &ArticleKey::page_id("404")).unwrap_err();
        assert!(err.is_not_found());
    }
}
