//! Emotion analysis
//!
//! - `label`: the closed emotion set and its per-label profile
//! - `catalog`: coaching suggestions per label
//! - `classifier`: pluggable classifier trait and the weighted placeholder
//! - `entropy`: injectable randomness
//! - `pipeline`: frame validation + classification + suggestions

pub mod catalog;
pub mod classifier;
pub mod entropy;
pub mod event;
pub mod label;
pub mod pipeline;

pub use catalog::{SuggestionCatalog, DEFAULT_SUGGESTION};
pub use classifier::{
    Classification, ConfidenceRange, EmotionClassifier, MonotonicClock, WeightTable,
    WeightedClassifier,
};
pub use entropy::{EntropySource, SeededEntropy, SequenceEntropy, ThreadEntropy};
pub use event::EmotionEvent;
pub use label::{EmotionLabel, LabelProfile, SuggestionEntry};
pub use pipeline::{AnalysisPipeline, FramePolicy};
