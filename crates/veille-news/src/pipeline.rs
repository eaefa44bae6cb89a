//! Annotation pipeline orchestration.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use veille_core::AppConfig;

use crate::error::NewsError;
use crate::model::TeiModelLoader;
use crate::scorer::{clip_chars, Classification, SentimentScorer};
use crate::source::{ArticleSource, NewsDataClient};
use crate::types::{
    AnnotatedArticle, ArticleRecord, Language, PipelineOutput, SearchParams, SentimentLabel,
};

/// Characters of content kept in a summary.
pub const SUMMARY_CHARS: usize = 200;

/// Appended to every summary, truncated or not.
pub const ELLIPSIS: &str = "...";

/// Fetch → annotate → sort, over one source and one shared scorer.
///
/// A `Pipeline` holds no per-request state, so one instance can serve
/// concurrent invocations.
pub struct Pipeline {
    source: Arc<dyn ArticleSource>,
    scorer: Arc<SentimentScorer>,
}

impl Pipeline {
    #[must_use]
    pub fn new(source: Arc<dyn ArticleSource>, scorer: Arc<SentimentScorer>) -> Self {
        Self { source, scorer }
    }

    /// Wires the NewsData source and the TEI-backed scorer from config.
    ///
    /// The model is not contacted here; it loads on the first classification.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError`] if the HTTP client cannot be built or the
    /// NewsData base URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, NewsError> {
        let source = NewsDataClient::with_base_url(
            &config.newsdata_api_key,
            config.source_timeout_secs,
            &config.user_agent,
            &config.newsdata_base_url,
        )?;
        let loader = TeiModelLoader::new(&config.tei_url, config.model_timeout_secs);
        let scorer = SentimentScorer::new(
            Box::new(loader),
            Duration::from_secs(config.model_timeout_secs),
        );
        Ok(Self::new(Arc::new(source), Arc::new(scorer)))
    }

    #[must_use]
    pub fn scorer(&self) -> &Arc<SentimentScorer> {
        &self.scorer
    }

    /// Runs one invocation for `base_subject` with the user's filters.
    ///
    /// 1. Build the query from the subject and optional keyword.
    /// 2. Fetch one page of articles (failures become a diagnostic).
    /// 3. Summarize and classify each article; a failed classification only
    ///    affects its own article. The model load is attempted at most once,
    ///    and if it fails every article takes the fallback label.
    /// 4. Sort newest first, undated articles last in source order.
    pub async fn run(&self, base_subject: &str, params: &SearchParams) -> PipelineOutput {
        let query = build_query(base_subject, params.keyword.as_deref());
        self.run_query(&query, params.language, params.max_results)
            .await
    }

    async fn run_query(&self, query: &str, language: Language, max_results: u32) -> PipelineOutput {
        let fetched = self.source.fetch(query, language, max_results).await;

        if fetched.articles.is_empty() {
            tracing::info!(
                query,
                language = %language,
                unavailable = fetched.diagnostic.is_some(),
                "no articles to annotate"
            );
            return PipelineOutput {
                articles: Vec::new(),
                diagnostic: fetched.diagnostic,
            };
        }

        // One load attempt per invocation; a failure labels every article.
        let model = self.scorer.model().await;

        let mut articles = Vec::with_capacity(fetched.articles.len());
        for record in fetched.articles {
            let classification = match &model {
                Ok(model) => {
                    self.scorer
                        .classify_with(model.as_ref(), &record.content)
                        .await
                }
                Err(e) => Classification::Fallback {
                    reason: e.to_string(),
                },
            };
            articles.push(annotate(record, classification.label()));
        }

        sort_newest_first(&mut articles);

        tracing::info!(
            query,
            language = %language,
            count = articles.len(),
            "annotated articles"
        );

        PipelineOutput {
            articles,
            diagnostic: fetched.diagnostic,
        }
    }
}

/// Joins the base subject and a non-blank keyword with one space.
#[must_use]
pub fn build_query(base_subject: &str, keyword: Option<&str>) -> String {
    match keyword.map(str::trim).filter(|k| !k.is_empty()) {
        Some(keyword) => format!("{base_subject} {keyword}"),
        None => base_subject.to_string(),
    }
}

/// First [`SUMMARY_CHARS`] characters of `content` followed by [`ELLIPSIS`].
///
/// The ellipsis is appended even when nothing was cut. Whether short content
/// should keep it is still an open product question.
#[must_use]
pub fn summarize(content: &str) -> String {
    format!("{}{ELLIPSIS}", clip_chars(content, SUMMARY_CHARS))
}

/// Parses a source date string. Unknown formats and blanks yield `None`.
///
/// NewsData sends `YYYY-MM-DD HH:MM:SS` in UTC; RFC 3339, RFC 2822 and bare
/// dates are accepted as well.
#[must_use]
pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn annotate(record: ArticleRecord, label: SentimentLabel) -> AnnotatedArticle {
    AnnotatedArticle {
        date: parse_published_at(&record.published_at),
        summary: summarize(&record.content),
        title: record.title,
        sentiment_label: label,
        source_name: record.source_name,
        url: record.url,
    }
}

/// Stable sort: descending by date, undated rows last in their original order.
fn sort_newest_first(articles: &mut [AnnotatedArticle]) {
    articles.sort_by(|a, b| match (a.date, b.date) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
