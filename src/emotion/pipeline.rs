use super::catalog::SuggestionCatalog;
use super::classifier::{ConfidenceRange, EmotionClassifier, WeightTable, WeightedClassifier};
use super::entropy::{EntropySource, SeededEntropy, ThreadEntropy};
use super::event::EmotionEvent;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, ConfigError};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Per-frame acceptance rules applied before classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePolicy {
    /// Largest accepted frame in bytes
    pub max_frame_bytes: usize,
}

impl FramePolicy {
    pub fn check(&self, audio: &[u8]) -> Result<(), AnalysisError> {
        if audio.is_empty() {
            return Err(AnalysisError::InvalidInput("empty audio frame".to_string()));
        }
        if audio.len() > self.max_frame_bytes {
            return Err(AnalysisError::InvalidInput(format!(
                "audio frame of {} bytes exceeds limit of {} bytes",
                audio.len(),
                self.max_frame_bytes
            )));
        }
        Ok(())
    }
}

impl Default for FramePolicy {
    fn default() -> Self {
        Self {
            max_frame_bytes: 1024 * 1024,
        }
    }
}

/// Audio chunk in, emotion event with suggestions out
pub struct AnalysisPipeline {
    classifier: Arc<dyn EmotionClassifier>,
    catalog: SuggestionCatalog,
    policy: FramePolicy,
}

impl AnalysisPipeline {
    pub fn new(classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self {
            classifier,
            catalog: SuggestionCatalog::new(),
            policy: FramePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FramePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the placeholder pipeline from settings, validating the weight
    /// table and confidence range
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        let weights = match &config.weights {
            Some(weights) => {
                WeightTable::from_names(weights.iter().map(|(name, w)| (name.as_str(), *w)))?
            }
            None => WeightTable::from_profiles()?,
        };
        let confidence = ConfidenceRange::new(config.min_confidence, config.max_confidence)?;

        let entropy: Arc<dyn EntropySource> = match config.seed {
            Some(seed) => {
                info!("Using seeded entropy (seed={})", seed);
                Arc::new(SeededEntropy::new(seed))
            }
            None => Arc::new(ThreadEntropy),
        };

        let classifier = WeightedClassifier::new(weights, confidence, entropy)
            .with_processing_delay(Duration::from_millis(config.processing_delay_ms));

        Ok(Self::new(Arc::new(classifier)).with_policy(FramePolicy {
            max_frame_bytes: config.max_frame_bytes,
        }))
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub async fn analyze(&self, audio: &[u8]) -> Result<EmotionEvent, AnalysisError> {
        self.policy.check(audio)?;

        let classification = self.classifier.classify(audio).await?;
        let suggestion = self.catalog.lookup(classification.label);

        Ok(EmotionEvent::new(classification, suggestion))
    }
}
