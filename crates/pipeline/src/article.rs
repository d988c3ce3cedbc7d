// ABOUTME: Loads a whole article from its plaintext extract: metadata, lead summary and ordered sections.

use chrono::{DateTime, Utc};
use curio_wiki::{article_url, split_sections, Section};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::source::{ArticleKey, Thumbnail, WikiContentSource};

/// Revision id reported when upstream returns no revision data.
pub const UNKNOWN_REVISION: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Article {
    pub page_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub revision_id: String,
    pub last_edited_at: DateTime<Utc>,
    pub summary: String,
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
}

/// Fetches the plaintext extract for `key` and splits it into sections.
pub fn load_article(source: &dyn WikiContentSource, key: &ArticleKey) -> Result<Article> {
    let extract = source.fetch_plain_extract(key)?;
    let split = split_sections(&extract.plain_text);
    debug!(
        page_id = %extract.page_id,
        sections = split.sections.len(),
        "loaded article"
    );

    Ok(Article {
        url: article_url(&extract.title),
        page_id: extract.page_id,
        title: extract.title,
        revision_id: extract
            .revision_id
            .unwrap_or_else(|| UNKNOWN_REVISION.to_string()),
        last_edited_at: extract.last_edited_at.unwrap_or_else(Utc::now),
        summary: split.summary,
        sections: split.sections,
        thumbnail: extract.thumbnail,
    })
}
