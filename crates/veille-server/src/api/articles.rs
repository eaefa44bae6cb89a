use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use veille_news::{build_query, AnnotatedArticle, Language, SearchParams};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ArticlesQuery {
    pub keyword: Option<String>,
    pub language: Option<String>,
    /// Kept as text so a non-numeric value gets the JSON validation error.
    pub max_results: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ArticlesData {
    pub query: String,
    pub language: String,
    pub articles: Vec<AnnotatedArticle>,
    /// True when there is nothing to show; the page renders a notice instead
    /// of an empty table.
    pub empty: bool,
    /// User-facing message when the news source was unavailable.
    pub diagnostic: Option<String>,
}

fn parse_params(query: ArticlesQuery) -> Result<SearchParams, veille_news::NewsError> {
    let language = match query.language.as_deref().map(str::trim) {
        None | Some("") => Language::default(),
        Some(raw) => raw.parse()?,
    };
    let max_results = match query.max_results.as_deref().map(str::trim) {
        None | Some("") => SearchParams::DEFAULT_RESULTS,
        Some(raw) => raw.parse().map_err(|_| {
            veille_news::NewsError::InvalidParams(format!(
                "max_results must be a whole number, got '{raw}'"
            ))
        })?,
    };
    SearchParams::new(query.keyword, language, max_results)
}

pub(super) async fn search_articles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<ApiResponse<ArticlesData>>, ApiError> {
    let params = parse_params(query)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let output = state.pipeline.run(&state.subject, &params).await;

    tracing::info!(
        request_id = %req_id.0,
        count = output.articles.len(),
        unavailable = output.diagnostic.is_some(),
        "article search served"
    );

    Ok(Json(ApiResponse {
        data: ArticlesData {
            query: build_query(&state.subject, params.keyword.as_deref()),
            language: params.language.code().to_string(),
            empty: output.is_empty(),
            articles: output.articles,
            diagnostic: output.diagnostic,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
