//! Sentiment model seams and the TEI-backed implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::NewsError;

/// A loaded text-classification model.
#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Returns the raw label of the top prediction for `text`.
    async fn predict(&self, text: &str) -> Result<String, NewsError>;
}

/// Produces the model instance. Called at most once per successful load.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn SentimentModel>, NewsError>;
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a str,
    truncate: bool,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    #[serde(default)]
    model_id: String,
    #[serde(default)]
    model_type: serde_json::Value,
}

/// Loads a [`TeiClassifier`] after checking that the TEI server at `tei_url`
/// serves a sequence-classification model.
pub struct TeiModelLoader {
    tei_url: String,
    timeout_secs: u64,
}

impl TeiModelLoader {
    #[must_use]
    pub fn new(tei_url: &str, timeout_secs: u64) -> Self {
        Self {
            tei_url: tei_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }
}

#[async_trait]
impl ModelLoader for TeiModelLoader {
    async fn load(&self) -> Result<Arc<dyn SentimentModel>, NewsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let info_url = format!("{}/info", self.tei_url);
        let response = client
            .get(&info_url)
            .send()
            .await
            .map_err(|e| NewsError::Model(format!("TEI info request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(NewsError::Model(format!(
                "TEI info returned status {}",
                response.status()
            )));
        }

        let info: InfoResponse = response
            .json()
            .await
            .map_err(|e| NewsError::Model(format!("TEI info parse error: {e}")))?;

        if info.model_type.get("classifier").is_none() {
            return Err(NewsError::Model(format!(
                "TEI model '{}' is not a classifier",
                info.model_id
            )));
        }

        tracing::info!(model = %info.model_id, url = %self.tei_url, "sentiment model loaded");

        Ok(Arc::new(TeiClassifier {
            client,
            url: format!("{}/predict", self.tei_url),
            model_id: info.model_id,
        }))
    }
}

/// TEI `/predict` client for one classification model.
pub struct TeiClassifier {
    client: Client,
    url: String,
    model_id: String,
}

impl TeiClassifier {
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl SentimentModel for TeiClassifier {
    async fn predict(&self, text: &str) -> Result<String, NewsError> {
        let request = PredictRequest {
            inputs: text,
            truncate: true,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| NewsError::Model(format!("TEI request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(NewsError::Model(format!(
                "TEI returned status {}",
                response.status()
            )));
        }

        let predictions: Vec<Prediction> = response
            .json()
            .await
            .map_err(|e| NewsError::Model(format!("TEI response parse error: {e}")))?;

        predictions
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|p| p.label)
            .ok_or_else(|| NewsError::Model("TEI returned no predictions".to_string()))
    }
}
