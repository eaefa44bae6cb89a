//! News watch pipeline for Veille.
//!
//! Fetches one page of articles about a subject from NewsData.io, labels each
//! one with a pretrained sentiment classifier served by TEI, and returns the
//! rows newest first for display.

pub mod error;
pub mod model;
pub mod pipeline;
pub mod scorer;
pub mod source;
pub mod types;

pub use error::NewsError;
pub use model::{ModelLoader, SentimentModel, TeiClassifier, TeiModelLoader};
pub use pipeline::{build_query, parse_published_at, summarize, Pipeline};
pub use scorer::{Classification, SentimentScorer};
pub use source::{ArticleSource, NewsDataClient, SourceFetch};
pub use types::{
    AnnotatedArticle, ArticleRecord, Language, PipelineOutput, SearchParams, SentimentLabel,
};
