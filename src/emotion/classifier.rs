use super::entropy::EntropySource;
use super::label::{EmotionLabel, LabelProfile, PROFILES};
use crate::error::{AnalysisError, ConfigError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Tolerance for the weight table summing to 1.0
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Classifier output, before suggestions are attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: EmotionLabel,
    pub confidence: f64,
    /// Seconds on the service's monotonic clock
    pub timestamp: f64,
}

/// Emotion classification backend
///
/// The weighted placeholder below does not look at the audio; a real
/// acoustic model slots in behind this trait.
#[async_trait::async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Classify one chunk of audio
    async fn classify(&self, audio: &[u8]) -> Result<Classification, AnalysisError>;

    /// Get classifier name for logging
    fn name(&self) -> &str;
}

/// Monotonic seconds since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    pub fn now_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Inclusive bounds for generated confidence scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceRange {
    min: f64,
    max: f64,
}

impl ConfidenceRange {
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        let valid = min.is_finite() && max.is_finite() && 0.0 <= min && min <= max && max <= 1.0;
        if !valid {
            return Err(ConfigError::InvalidConfidenceRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Map a uniform draw in `[0, 1)` onto the range
    pub fn sample(&self, draw: f64) -> f64 {
        (self.min + draw * (self.max - self.min)).clamp(self.min, self.max)
    }
}

impl Default for ConfidenceRange {
    fn default() -> Self {
        Self {
            min: 0.70,
            max: 0.95,
        }
    }
}

/// Validated label weights, one entry per label in `EmotionLabel::ALL` order
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    entries: Vec<(EmotionLabel, f64)>,
}

impl WeightTable {
    /// Build a table, failing unless every label appears exactly once with
    /// a finite non-negative weight and the weights sum to 1.0
    pub fn new(
        weights: impl IntoIterator<Item = (EmotionLabel, f64)>,
    ) -> Result<Self, ConfigError> {
        let mut by_label: HashMap<EmotionLabel, f64> = HashMap::new();

        for (label, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::WeightTableInvalid(format!(
                    "weight for {} must be a finite non-negative number, got {}",
                    label, weight
                )));
            }
            if by_label.insert(label, weight).is_some() {
                return Err(ConfigError::WeightTableInvalid(format!(
                    "duplicate weight for {}",
                    label
                )));
            }
        }

        let mut entries = Vec::with_capacity(EmotionLabel::ALL.len());
        for label in EmotionLabel::ALL {
            match by_label.get(&label) {
                Some(weight) => entries.push((label, *weight)),
                None => {
                    return Err(ConfigError::WeightTableInvalid(format!(
                        "missing weight for {}",
                        label
                    )))
                }
            }
        }

        let sum: f64 = entries.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(ConfigError::WeightTableInvalid(format!(
                "weights sum to {}, expected 1.0",
                sum
            )));
        }

        Ok(Self { entries })
    }

    /// Build from label names as they appear in configuration files
    pub fn from_names<'a>(
        weights: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<Self, ConfigError> {
        let parsed = weights
            .into_iter()
            .map(|(name, weight)| {
                name.parse::<EmotionLabel>()
                    .map(|label| (label, weight))
                    .map_err(ConfigError::WeightTableInvalid)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(parsed)
    }

    pub fn weight(&self, label: EmotionLabel) -> f64 {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    pub fn entries(&self) -> &[(EmotionLabel, f64)] {
        &self.entries
    }

    /// Weighted selection for a uniform draw in `[0, 1)`
    pub fn pick(&self, draw: f64) -> EmotionLabel {
        let mut cumulative = 0.0;
        for (label, weight) in &self.entries {
            cumulative += weight;
            if draw < cumulative {
                return *label;
            }
        }

        // Rounding can leave the cumulative sum just below 1.0
        self.entries
            .iter()
            .rev()
            .find(|(_, w)| *w > 0.0)
            .map(|(label, _)| *label)
            .unwrap_or(EmotionLabel::Neutral)
    }
}

impl WeightTable {
    /// The built-in weights from the label profiles, validated like any
    /// configured table
    pub fn from_profiles() -> Result<Self, ConfigError> {
        Self::from_profile_rows(&PROFILES)
    }

    fn from_profile_rows(rows: &[LabelProfile]) -> Result<Self, ConfigError> {
        Self::new(rows.iter().map(|row| (row.label, row.default_weight)))
    }
}

/// Placeholder classifier drawing labels from a weight table
pub struct WeightedClassifier {
    weights: WeightTable,
    confidence: ConfidenceRange,
    entropy: Arc<dyn EntropySource>,
    processing_delay: Duration,
    clock: MonotonicClock,
}

impl WeightedClassifier {
    pub fn new(
        weights: WeightTable,
        confidence: ConfidenceRange,
        entropy: Arc<dyn EntropySource>,
    ) -> Self {
        Self {
            weights,
            confidence,
            entropy,
            processing_delay: Duration::from_millis(100),
            clock: MonotonicClock::new(),
        }
    }

    /// Simulated per-chunk processing cost
    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Synchronous draw, without the simulated delay
    pub fn draw(&self) -> Classification {
        let label = self.weights.pick(self.entropy.draw());
        let confidence = self.confidence.sample(self.entropy.draw());

        Classification {
            label,
            confidence,
            timestamp: self.clock.now_secs(),
        }
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for WeightedClassifier {
    async fn classify(&self, _audio: &[u8]) -> Result<Classification, AnalysisError> {
        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        Ok(self.draw())
    }

    fn name(&self) -> &str {
        "weighted-random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_walks_cumulative_weights() {
        let table = WeightTable::from_profiles().unwrap();
        assert_eq!(table.pick(0.0), EmotionLabel::Happy);
        assert_eq!(table.pick(0.19), EmotionLabel::Happy);
        assert_eq!(table.pick(0.20), EmotionLabel::Neutral);
        assert_eq!(table.pick(0.59), EmotionLabel::Neutral);
        assert_eq!(table.pick(0.61), EmotionLabel::Sad);
        assert_eq!(table.pick(0.76), EmotionLabel::Angry);
        assert_eq!(table.pick(0.91), EmotionLabel::Frustrated);
        assert_eq!(table.pick(0.999_999_9), EmotionLabel::Frustrated);
    }

    #[test]
    fn pick_skips_zero_weight_tail() {
        let table = WeightTable::new([
            (EmotionLabel::Happy, 0.5),
            (EmotionLabel::Neutral, 0.5),
            (EmotionLabel::Sad, 0.0),
            (EmotionLabel::Angry, 0.0),
            (EmotionLabel::Frustrated, 0.0),
        ])
        .unwrap();

        assert_eq!(table.pick(1.0), EmotionLabel::Neutral);
    }

    #[test]
    fn profile_weights_are_validated() {
        let table = WeightTable::from_profiles().unwrap();
        for label in EmotionLabel::ALL {
            assert_eq!(table.weight(label), label.profile().default_weight);
        }

        let mut rows = PROFILES;
        rows[0].default_weight = 0.5;
        match WeightTable::from_profile_rows(&rows) {
            Err(ConfigError::WeightTableInvalid(msg)) => assert!(msg.contains("sum")),
            other => panic!("unexpected result: {:?}", other),
        }

        match WeightTable::from_profile_rows(&rows[..4]) {
            Err(ConfigError::WeightTableInvalid(msg)) => assert!(msg.contains("missing")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn confidence_sample_stays_in_bounds() {
        let range = ConfidenceRange::default();
        assert_eq!(range.sample(0.0), 0.70);
        assert!(range.sample(0.999_999) <= 0.95);
        assert_eq!(range.sample(5.0), 0.95);
    }
}
