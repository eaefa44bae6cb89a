//! Article source adapter for the NewsData.io search API.
//!
//! Failures never escape [`ArticleSource::fetch`]: they come back as an empty
//! article list plus a diagnostic string meant for the end user.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::NewsError;
use crate::types::{ArticleRecord, Language};

const DEFAULT_BASE_URL: &str = "https://newsdata.io";
const NEWS_PATH: &str = "api/1/news";

/// Outcome of one fetch: the articles, or nothing plus a reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFetch {
    pub articles: Vec<ArticleRecord>,
    pub diagnostic: Option<String>,
}

impl SourceFetch {
    #[must_use]
    pub fn ok(articles: Vec<ArticleRecord>) -> Self {
        Self {
            articles,
            diagnostic: None,
        }
    }

    #[must_use]
    pub fn unavailable(diagnostic: impl Into<String>) -> Self {
        Self {
            articles: Vec::new(),
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// A searchable news source.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Returns at most `max_results` articles matching `query`.
    async fn fetch(&self, query: &str, language: Language, max_results: u32) -> SourceFetch;
}

#[derive(Debug, Deserialize)]
struct NewsDataResponse {
    #[serde(default)]
    results: Option<Vec<NewsDataArticle>>,
}

#[derive(Debug, Deserialize)]
struct NewsDataArticle {
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source_id: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

impl From<NewsDataArticle> for ArticleRecord {
    fn from(item: NewsDataArticle) -> Self {
        Self {
            published_at: item.pub_date.unwrap_or_default(),
            title: item.title.unwrap_or_default(),
            content: item.description.unwrap_or_default(),
            source_name: item.source_id.unwrap_or_default(),
            url: item.link.as_deref().map(web_link).unwrap_or_default(),
        }
    }
}

/// Keeps `link` only when it is an absolute `http`/`https` URL; anything else
/// (`javascript:`, `data:`, relative paths) becomes `""`.
fn web_link(link: &str) -> String {
    let link = link.trim();
    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => link.to_owned(),
        _ => String::new(),
    }
}

/// Client for the NewsData.io `news` endpoint.
///
/// Use [`NewsDataClient::new`] for production or
/// [`NewsDataClient::with_base_url`] to point at a mock server in tests.
pub struct NewsDataClient {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl std::fmt::Debug for NewsDataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsDataClient")
            .field("api_key", &"[redacted]")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl NewsDataClient {
    /// Creates a client pointed at the production NewsData.io API.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, NewsError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`NewsError::InvalidParams`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, NewsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let raw = format!("{}/{NEWS_PATH}", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&raw)
            .map_err(|e| NewsError::InvalidParams(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
        })
    }

    /// Fetches page 1 of results and truncates it to `max_results`.
    ///
    /// # Errors
    ///
    /// - [`NewsError::Http`] on network failure or timeout.
    /// - [`NewsError::UnexpectedStatus`] on a non-2xx response.
    /// - [`NewsError::Deserialize`] if the body does not match the expected shape.
    pub async fn try_fetch(
        &self,
        query: &str,
        language: Language,
        max_results: u32,
    ) -> Result<Vec<ArticleRecord>, NewsError> {
        let url = self.build_url(query, language);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: NewsDataResponse =
            serde_json::from_str(&body).map_err(|e| NewsError::Deserialize {
                context: format!("news(q={query})"),
                source: e,
            })?;

        let limit = usize::try_from(max_results).unwrap_or(usize::MAX);
        Ok(parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .map(ArticleRecord::from)
            .collect())
    }

    /// Builds the request URL. The API key is included, so never log the result.
    fn build_url(&self, query: &str, language: Language) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair("q", query)
            .append_pair("language", language.as_query_param())
            .append_pair("page", "1");
        url
    }
}

#[async_trait]
impl ArticleSource for NewsDataClient {
    async fn fetch(&self, query: &str, language: Language, max_results: u32) -> SourceFetch {
        match self.try_fetch(query, language, max_results).await {
            Ok(articles) => {
                tracing::debug!(
                    query,
                    language = %language,
                    count = articles.len(),
                    "fetched NewsData articles"
                );
                SourceFetch::ok(articles)
            }
            Err(e) => {
                // reqwest errors embed the request URL, which carries the API key.
                let detail = match e {
                    NewsError::Http(inner) => NewsError::Http(inner.without_url()).to_string(),
                    other => other.to_string(),
                };
                tracing::warn!(
                    query,
                    source = "newsdata",
                    error = %detail,
                    "NewsData fetch failed"
                );
                SourceFetch::unavailable(format!("NewsData error: {detail}"))
            }
        }
    }
}
