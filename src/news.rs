//! News search client with a per-query result cache.
//!
//! Headlines come from the NewsAPI `v2/everything` endpoint. Every topic shares
//! the same base query; the topic's fragment is appended with `AND`:
//!
//! ```text
//! artificial intelligence OR machine learning AND natural language processing
//! ```
//!
//! Results are cached by that effective query string. Failed fetches are never
//! cached, so the next render tries the API again.

use crate::cache::TtlCache;
use crate::error::FetchError;
use crate::models::{Article, SearchResponse, Topic};
use crate::utils::{join_endpoint, truncate_for_log};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Query shared by every topic.
pub const BASE_QUERY: &str = "artificial intelligence OR machine learning";

/// Build the effective search query for `topic`.
pub fn build_query(topic: Topic) -> String {
    let fragment = topic.query_fragment();
    if fragment.is_empty() {
        BASE_QUERY.to_string()
    } else {
        format!("{BASE_QUERY} AND {fragment}")
    }
}

pub struct NewsFetcher {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    page_size: usize,
    ttl: Duration,
    cache: TtlCache<String, Vec<Article>>,
}

impl fmt::Debug for NewsFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsFetcher")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("page_size", &self.page_size)
            .field("ttl", &self.ttl)
            .field("cached_queries", &self.cache.len())
            .finish()
    }
}

impl NewsFetcher {
    pub fn new(
        client: Client,
        base_url: &str,
        api_key: Option<String>,
        page_size: usize,
        ttl: Duration,
    ) -> Result<Self, FetchError> {
        let endpoint = join_endpoint(base_url, "v2/everything")?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            page_size,
            ttl,
            cache: TtlCache::new("news"),
        })
    }

    /// Fetch the latest articles for `topic`, newest first, at most one page.
    #[instrument(level = "info", skip(self), fields(%topic))]
    pub async fn fetch(&self, topic: Topic) -> Result<Vec<Article>, FetchError> {
        let query = build_query(topic);
        self.cache
            .get_or_compute(query.clone(), self.ttl, || self.fetch_uncached(&query))
            .await
    }

    /// Drop every cached search result.
    pub fn clear_cache(&self) {
        info!(entries = self.cache.len(), "Clearing news cache");
        self.cache.clear();
    }

    async fn fetch_uncached(&self, query: &str) -> Result<Vec<Article>, FetchError> {
        let page_size = self.page_size.to_string();
        let mut request = self.client.get(self.endpoint.clone()).query(&[
            ("q", query),
            ("sortBy", "publishedAt"),
            ("language", "en"),
            ("pageSize", page_size.as_str()),
        ]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("apiKey", key.as_str())]);
        }

        // The request url carries the api key; keep it out of error text
        debug!(%query, "Requesting news search");
        let response = request.send().await.map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let body = response.text().await.map_err(reqwest::Error::without_url)?;

        match serde_json::from_str::<SearchResponse>(&body) {
            Ok(resp) if resp.status.as_deref() == Some("error") => Err(FetchError::Api {
                code: resp.code.unwrap_or_default(),
                message: resp.message.unwrap_or_default(),
            }),
            _ if !status.is_success() => Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            }),
            Ok(resp) => {
                let articles = collect_articles(resp, self.page_size);
                info!(count = articles.len(), "Fetched news articles");
                Ok(articles)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Convert raw records, skipping unusable ones, and keep the newest page.
fn collect_articles(resp: SearchResponse, page_size: usize) -> Vec<Article> {
    let mut articles: Vec<Article> = resp
        .articles
        .into_iter()
        .filter_map(|raw| match Article::try_from(raw) {
            Ok(article) => Some(article),
            Err(reason) => {
                warn!(%reason, "Skipping malformed article");
                None
            }
        })
        .collect();
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles.truncate(page_size);
    articles
}
