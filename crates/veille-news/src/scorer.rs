//! Sentiment scorer: lazily loads one shared model and labels article text.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;

use crate::error::NewsError;
use crate::model::{ModelLoader, SentimentModel};
use crate::types::SentimentLabel;

/// Longest prefix of the text, in characters, submitted to the model.
pub const MAX_INPUT_CHARS: usize = 512;

/// Outcome of classifying one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Labeled(SentimentLabel),
    /// Classification failed; the article gets [`SentimentLabel::FALLBACK`].
    Fallback { reason: String },
}

impl Classification {
    #[must_use]
    pub fn label(&self) -> SentimentLabel {
        match self {
            Classification::Labeled(label) => *label,
            Classification::Fallback { .. } => SentimentLabel::FALLBACK,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Classification::Fallback { .. })
    }
}

/// Owns the model loader and the loaded model.
///
/// The model is loaded on first use and shared by every later call, including
/// concurrent ones. A failed load leaves the cell empty so the next call
/// retries it.
pub struct SentimentScorer {
    loader: Box<dyn ModelLoader>,
    model: OnceCell<Arc<dyn SentimentModel>>,
    timeout: Duration,
}

impl SentimentScorer {
    #[must_use]
    pub fn new(loader: Box<dyn ModelLoader>, timeout: Duration) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
            timeout,
        }
    }

    /// Returns the shared model, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if the model cannot be loaded.
    pub async fn model(&self) -> Result<Arc<dyn SentimentModel>, NewsError> {
        self.model
            .get_or_try_init(|| self.loader.load())
            .await
            .map(Arc::clone)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Labels `text`, clipping it to [`MAX_INPUT_CHARS`] characters.
    ///
    /// Never fails: empty input, load errors, inference errors, timeouts and
    /// unknown labels all yield [`Classification::Fallback`].
    pub async fn classify(&self, text: &str) -> Classification {
        let Some(clipped) = model_input(text) else {
            return empty_text();
        };
        match self.model().await {
            Ok(model) => self.predict(model.as_ref(), clipped).await,
            Err(e) => Classification::Fallback {
                reason: e.to_string(),
            },
        }
    }

    /// Same as [`SentimentScorer::classify`] with a model the caller already
    /// resolved through [`SentimentScorer::model`]. Never touches the loader.
    pub async fn classify_with(&self, model: &dyn SentimentModel, text: &str) -> Classification {
        match model_input(text) {
            Some(clipped) => self.predict(model, clipped).await,
            None => empty_text(),
        }
    }

    async fn predict(&self, model: &dyn SentimentModel, clipped: &str) -> Classification {
        match tokio::time::timeout(self.timeout, model.predict(clipped)).await {
            Ok(Ok(raw)) => match SentimentLabel::from_model_label(&raw) {
                Some(label) => Classification::Labeled(label),
                None => Classification::Fallback {
                    reason: format!("unrecognized label '{}'", raw.to_uppercase()),
                },
            },
            Ok(Err(e)) => Classification::Fallback {
                reason: e.to_string(),
            },
            Err(_) => Classification::Fallback {
                reason: format!("inference timed out after {:?}", self.timeout),
            },
        }
    }
}

/// Clipped model input, or `None` when there is nothing to classify.
fn model_input(text: &str) -> Option<&str> {
    let clipped = clip_chars(text, MAX_INPUT_CHARS);
    (!clipped.trim().is_empty()).then_some(clipped)
}

fn empty_text() -> Classification {
    Classification::Fallback {
        reason: "empty text".to_string(),
    }
}

/// Returns the first `max` characters of `text` without splitting a char.
pub(crate) fn clip_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Returns a fixed label and records every input it sees.
    struct FixedModel {
        label: &'static str,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SentimentModel for FixedModel {
        async fn predict(&self, text: &str) -> Result<String, NewsError> {
            self.seen.lock().unwrap().push(text.to_string());
            if text.contains("boom") {
                return Err(NewsError::Model("tokenizer exploded".to_string()));
            }
            Ok(self.label.to_string())
        }
    }

    struct CountingLoader {
        loads: Arc<AtomicUsize>,
        model: Arc<FixedModel>,
    }

    #[async_trait]
    impl ModelLoader for CountingLoader {
        async fn load(&self) -> Result<Arc<dyn SentimentModel>, NewsError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::clone(&self.model) as Arc<dyn SentimentModel>)
        }
    }

    struct FailingLoader;

    #[async_trait]
    impl ModelLoader for FailingLoader {
        async fn load(&self) -> Result<Arc<dyn SentimentModel>, NewsError> {
            Err(NewsError::Model("weights missing".to_string()))
        }
    }

    struct SlowModel;

    #[async_trait]
    impl SentimentModel for SlowModel {
        async fn predict(&self, _text: &str) -> Result<String, NewsError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("positive".to_string())
        }
    }

    struct SlowLoader;

    #[async_trait]
    impl ModelLoader for SlowLoader {
        async fn load(&self) -> Result<Arc<dyn SentimentModel>, NewsError> {
            Ok(Arc::new(SlowModel))
        }
    }

    fn scorer_with(label: &'static str) -> (SentimentScorer, Arc<AtomicUsize>, Arc<FixedModel>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let model = Arc::new(FixedModel {
            label,
            seen: Mutex::new(Vec::new()),
        });
        let loader = CountingLoader {
            loads: Arc::clone(&loads),
            model: Arc::clone(&model),
        };
        let scorer = SentimentScorer::new(Box::new(loader), Duration::from_secs(5));
        (scorer, loads, model)
    }

    #[tokio::test]
    async fn model_is_loaded_once_and_shared() {
        let (scorer, loads, _) = scorer_with("positive");
        assert!(!scorer.is_loaded());

        let first = scorer.model().await.expect("first load");
        let second = scorer.model().await.expect("second load");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(scorer.is_loaded());
    }

    #[tokio::test]
    async fn concurrent_first_calls_load_once() {
        let (scorer, loads, _) = scorer_with("negative");
        let scorer = Arc::new(scorer);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let scorer = Arc::clone(&scorer);
                tokio::spawn(async move { scorer.classify("bad news").await })
            })
            .collect();
        for handle in handles {
            assert_eq!(
                handle.await.expect("task").label(),
                SentimentLabel::Negative
            );
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn classify_uppercases_model_label() {
        let (scorer, _, _) = scorer_with("positive");
        assert_eq!(
            scorer.classify("great launch").await,
            Classification::Labeled(SentimentLabel::Positive)
        );
    }

    #[tokio::test]
    async fn classify_clips_input_to_512_chars() {
        let (scorer, _, model) = scorer_with("neutral");
        let text = "é".repeat(600);
        scorer.classify(&text).await;

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].chars().count(), MAX_INPUT_CHARS);
    }

    #[tokio::test]
    async fn empty_text_falls_back_without_calling_model() {
        let (scorer, loads, model) = scorer_with("positive");
        let result = scorer.classify("   ").await;

        assert!(result.is_fallback());
        assert_eq!(result.label(), SentimentLabel::Neutral);
        assert!(model.seen.lock().unwrap().is_empty());
        assert_eq!(loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn inference_error_falls_back_to_neutral() {
        let (scorer, _, _) = scorer_with("positive");
        let result = scorer.classify("boom").await;
        assert!(matches!(
            result,
            Classification::Fallback { ref reason } if reason.contains("tokenizer exploded")
        ));
        assert_eq!(result.label(), SentimentLabel::Neutral);
    }

    #[tokio::test]
    async fn unknown_label_falls_back() {
        let (scorer, _, _) = scorer_with("LABEL_9");
        let result = scorer.classify("anything").await;
        assert!(result.is_fallback());
    }

    #[tokio::test]
    async fn load_failure_falls_back_and_stays_unloaded() {
        let scorer = SentimentScorer::new(Box::new(FailingLoader), Duration::from_secs(5));
        let result = scorer.classify("some text").await;
        assert!(result.is_fallback());
        assert!(!scorer.is_loaded());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_inference_times_out() {
        let scorer = SentimentScorer::new(Box::new(SlowLoader), Duration::from_secs(2));
        let result = scorer.classify("some text").await;
        assert!(matches!(
            result,
            Classification::Fallback { ref reason } if reason.contains("timed out")
        ));
    }

    #[tokio::test]
    async fn classify_with_uses_given_model_without_loading() {
        let (scorer, loads, model) = scorer_with("negative");
        let result = scorer.classify_with(model.as_ref(), "recall").await;

        assert_eq!(result, Classification::Labeled(SentimentLabel::Negative));
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert!(scorer.classify_with(model.as_ref(), "").await.is_fallback());
    }

    #[test]
    fn clip_chars_respects_char_boundaries() {
        assert_eq!(clip_chars("héllo", 2), "hé");
        assert_eq!(clip_chars("abc", 10), "abc");
        assert_eq!(clip_chars("", 3), "");
    }
}
