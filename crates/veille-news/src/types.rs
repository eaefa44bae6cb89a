use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::NewsError;

/// One article as returned by the news source, before annotation.
///
/// Text fields are never absent: anything the payload omits is `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Raw publication date string, parsed later by the pipeline.
    pub published_at: String,
    pub title: String,
    pub content: String,
    pub source_name: String,
    pub url: String,
}

/// A display-ready row: the article plus its summary and sentiment label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedArticle {
    /// `None` when the source date was missing or unparseable.
    pub date: Option<DateTime<Utc>>,
    pub title: String,
    pub sentiment_label: SentimentLabel,
    pub summary: String,
    pub source_name: String,
    pub url: String,
}

/// Coarse sentiment produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Label substituted whenever classification fails.
    pub const FALLBACK: SentimentLabel = SentimentLabel::Neutral;

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
        }
    }

    /// Maps a raw model label onto the fixed label set.
    ///
    /// Accepts plain names in any case and the `LABEL_0..2` ids used by
    /// `cardiffnlp/twitter-roberta-base-sentiment` (negative, neutral, positive).
    #[must_use]
    pub fn from_model_label(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "POSITIVE" | "POS" | "LABEL_2" => Some(SentimentLabel::Positive),
            "NEGATIVE" | "NEG" | "LABEL_0" => Some(SentimentLabel::Negative),
            "NEUTRAL" | "NEU" | "LABEL_1" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language filter offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Fr,
    En,
    Es,
    /// No language restriction.
    All,
}

impl Language {
    /// Value sent as the `language` query parameter; empty means unfiltered.
    #[must_use]
    pub fn as_query_param(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
            Language::Es => "es",
            Language::All => "",
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::All => "all",
            other => other.as_query_param(),
        }
    }
}

impl FromStr for Language {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fr" => Ok(Language::Fr),
            "en" => Ok(Language::En),
            "es" => Ok(Language::Es),
            "all" | "tous" => Ok(Language::All),
            other => Err(NewsError::InvalidParams(format!(
                "unsupported language '{other}' (expected fr, en, es or all)"
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// User filters for one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub language: Language,
    pub max_results: u32,
}

impl SearchParams {
    pub const MIN_RESULTS: u32 = 5;
    pub const MAX_RESULTS: u32 = 30;
    pub const DEFAULT_RESULTS: u32 = 25;

    /// Builds validated parameters. A blank keyword is treated as none.
    ///
    /// # Errors
    ///
    /// Returns [`NewsError::InvalidParams`] if `max_results` is outside
    /// `[MIN_RESULTS, MAX_RESULTS]`.
    pub fn new(
        keyword: Option<String>,
        language: Language,
        max_results: u32,
    ) -> Result<Self, NewsError> {
        if !(Self::MIN_RESULTS..=Self::MAX_RESULTS).contains(&max_results) {
            return Err(NewsError::InvalidParams(format!(
                "max_results must be between {} and {}, got {max_results}",
                Self::MIN_RESULTS,
                Self::MAX_RESULTS
            )));
        }
        let keyword = keyword
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Ok(Self {
            keyword,
            language,
            max_results,
        })
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            keyword: None,
            language: Language::default(),
            max_results: Self::DEFAULT_RESULTS,
        }
    }
}

/// Result of one pipeline invocation.
///
/// An empty `articles` list is the explicit "no results" state; `diagnostic`
/// is set when the source could not be reached or returned garbage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineOutput {
    pub articles: Vec<AnnotatedArticle>,
    pub diagnostic: Option<String>,
}

impl PipelineOutput {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
