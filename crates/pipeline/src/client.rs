// ABOUTME: WikiClient, the blocking MediaWiki action API implementation of WikiContentSource.
// ABOUTME: Issues query/parse requests and maps raw JSON responses onto the pipeline payload types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use curio_wiki::{LinkedArticle, OutlineEntry};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Result, WikiError};
use crate::options::{ClientBuilder, Options};
use crate::source::{
    ArticleKey, PlainExtract, RenderedHtml, SectionLink, Thumbnail, WikiContentSource,
};

/// Thumbnail width requested alongside plaintext extracts.
const THUMBNAIL_SIZE: &str = "800";

/// Upstream error codes that mean the page does not exist.
const MISSING_PAGE_CODES: &[&str] = &["missingtitle", "nosuchpageid", "invalidtitle"];

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: HashMap<String, QueryPage>,
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(default)]
    pageid: Option<u64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: Option<serde_json::Value>,
    #[serde(default)]
    invalid: Option<serde_json::Value>,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    revisions: Vec<Revision>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

impl QueryPage {
    fn is_missing(&self) -> bool {
        self.missing.is_some() || self.invalid.is_some() || self.pageid.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct Revision {
    #[serde(default)]
    revid: Option<u64>,
    #[serde(default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default)]
    parse: Option<ParseBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ParseBody {
    #[serde(default)]
    text: Option<ParseText>,
    #[serde(default)]
    sections: Vec<ApiSection>,
    #[serde(default)]
    links: Vec<ApiLink>,
}

#[derive(Debug, Deserialize)]
struct ParseText {
    #[serde(rename = "*", default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiSection {
    line: String,
    level: String,
    index: String,
}

#[derive(Debug, Deserialize)]
struct ApiLink {
    ns: i64,
    #[serde(rename = "*")]
    title: String,
    #[serde(default)]
    exists: Option<serde_json::Value>,
}

/// Blocking client for the MediaWiki action API.
#[derive(Debug, Clone)]
pub struct WikiClient {
    api_url: Url,
    headers: HeaderMap,
    http: reqwest::blocking::Client,
}

impl WikiClient {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new WikiClient with the given options.
    pub fn new(opts: Options) -> Result<Self> {
        let api_url = Url::parse(&opts.api_url).map_err(|e| {
            WikiError::config(
                "build client",
                Some(anyhow::anyhow!("invalid API URL {}: {}", opts.api_url, e)),
            )
        })?;

        let mut headers = HeaderMap::new();
        for (key, value) in &opts.headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                WikiError::config("build client", Some(anyhow::anyhow!("header {}: {}", key, e)))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                WikiError::config("build client", Some(anyhow::anyhow!("header {}: {}", key, e)))
            })?;
            headers.insert(name, value);
        }

        let http = match opts.http_client {
            Some(client) => client,
            None => reqwest::blocking::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .map_err(|e| WikiError::config("build client", Some(e.into())))?,
        };

        Ok(Self {
            api_url,
            headers,
            http,
        })
    }

    /// Sends one GET against the action API and decodes the JSON body.
    fn get_json<T: DeserializeOwned>(
        &self,
        op: &str,
        page_id: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        debug!(op, page_id, "upstream request");

        let response = self
            .http
            .get(self.api_url.clone())
            .headers(self.headers.clone())
            .query(&[("format", "json")])
            .query(params)
            .send()
            .map_err(|e| {
                WikiError::content_unavailable(
                    page_id,
                    op,
                    Some(anyhow::anyhow!("request failed: {}", e)),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikiError::content_unavailable(
                page_id,
                op,
                Some(anyhow::anyhow!("HTTP status {}", status)),
            ));
        }

        let body = response.text().map_err(|e| {
            WikiError::content_unavailable(
                page_id,
                op,
                Some(anyhow::anyhow!("reading body failed: {}", e)),
            )
        })?;

        serde_json::from_str(&body)
            .map_err(|e| WikiError::invalid_response(page_id, op, Some(e.into())))
    }
}

/// Turns an API-level error object into the matching pipeline error.
fn check_api_error(error: Option<ApiError>, page_id: &str, op: &str) -> Result<()> {
    match error {
        None => Ok(()),
        Some(err) => {
            let source = Some(anyhow::anyhow!("{}: {}", err.code, err.info));
            if MISSING_PAGE_CODES.contains(&err.code.as_str()) {
                Err(WikiError::not_found(page_id, op, source))
            } else {
                Err(WikiError::content_unavailable(page_id, op, source))
            }
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl WikiContentSource for WikiClient {
    fn fetch_plain_extract(&self, key: &ArticleKey) -> Result<PlainExtract> {
        let op = "fetch_plain_extract";
        let mut params = vec![
            ("action", "query"),
            ("prop", "extracts|revisions|info|pageimages"),
            ("explaintext", "1"),
            ("exsectionformat", "wiki"),
            ("rvprop", "ids|timestamp"),
            ("inprop", "url"),
            ("piprop", "thumbnail"),
            ("pithumbsize", THUMBNAIL_SIZE),
        ];
        match key {
            ArticleKey::PageId(id) => params.push(("pageids", id.as_str())),
            ArticleKey::Title(title) => {
                params.push(("titles", title.as_str()));
                params.push(("redirects", "1"));
            }
        }

        let response: QueryResponse = self.get_json(op, key.as_str(), &params)?;
        check_api_error(response.error, key.as_str(), op)?;

        let mut pages = response.query.unwrap_or_default().pages;
        let page = match key {
            ArticleKey::PageId(id) => pages.remove(id.as_str()),
            ArticleKey::Title(_) => pages.into_values().next(),
        };
        let page = match page {
            Some(page) if !page.is_missing() => page,
            _ => {
                return Err(WikiError::not_found(
                    key.as_str(),
                    op,
                    Some(anyhow::anyhow!("article not found: {}", key)),
                ))
            }
        };

        let revision = page.revisions.first();
        Ok(PlainExtract {
            page_id: page.pageid.map(|id| id.to_string()).unwrap_or_default(),
            title: page.title,
            revision_id: revision.and_then(|r| r.revid).map(|id| id.to_string()),
            last_edited_at: revision
                .and_then(|r| r.timestamp.as_deref())
                .and_then(parse_timestamp),
            plain_text: page.extract.unwrap_or_default(),
            thumbnail: page.thumbnail,
        })
    }

    fn fetch_rendered_html(&self, page_id: &str) -> Result<RenderedHtml> {
        let op = "fetch_rendered_html";
        let response: ParseResponse = self.get_json(
            op,
            page_id,
            &[("action", "parse"), ("pageid", page_id), ("prop", "text|sections")],
        )?;
        check_api_error(response.error, page_id, op)?;

        let parse = response.parse.unwrap_or_default();
        let section_outline = parse
            .sections
            .into_iter()
            .map(|s| OutlineEntry {
                level: s.level.trim().parse().unwrap_or(2),
                title: s.line,
                index: s.index,
            })
            .collect();

        Ok(RenderedHtml {
            html: parse.text.map(|t| t.content).unwrap_or_default(),
            section_outline,
        })
    }

    fn fetch_section_links(&self, page_id: &str, section_index: &str) -> Result<Vec<SectionLink>> {
        let op = "fetch_section_links";
        let response: ParseResponse = self.get_json(
            op,
            page_id,
            &[
                ("action", "parse"),
                ("pageid", page_id),
                ("prop", "links"),
                ("section", section_index),
            ],
        )?;
        check_api_error(response.error, page_id, op)?;

        Ok(response
            .parse
            .unwrap_or_default()
            .links
            .into_iter()
            .map(|l| SectionLink {
                namespace: l.ns,
                title: l.title,
                exists: l.exists.is_some(),
            })
            .collect())
    }

    fn fetch_link_descriptions(&self, titles: &[String]) -> Result<Vec<LinkedArticle>> {
        let op = "fetch_link_descriptions";
        if titles.is_empty() {
            return Ok(Vec::new());
        }

        let joined = titles.join("|");
        let response: QueryResponse = self.get_json(
            op,
            "",
            &[
                ("action", "query"),
                ("titles", joined.as_str()),
                ("prop", "description"),
                ("redirects", "1"),
            ],
        )?;
        check_api_error(response.error, "", op)?;

        Ok(response
            .query
            .unwrap_or_default()
            .pages
            .into_values()
            .filter(|p| !p.is_missing())
            .filter_map(|p| {
                Some(LinkedArticle {
                    page_id: p.pageid?.to_string(),
                    title: p.title,
                    description: p.description.filter(|d| !d.is_empty()),
                })
            })
            .collect())
    }
}
