use super::classifier::Classification;
use super::label::{EmotionLabel, SuggestionEntry};
use serde::Serialize;

/// Event pushed to a client after each analysed audio chunk
///
/// Wire shape:
/// `{"emotion": "Happy", "confidence": 0.81, "timestamp": 12.5,
///   "suggestions": {"message": "...", "actions": ["..."]}}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionEvent {
    #[serde(rename = "emotion")]
    label: EmotionLabel,
    confidence: f64,
    timestamp: f64,
    #[serde(rename = "suggestions")]
    suggestion: SuggestionEntry,
}

impl EmotionEvent {
    pub fn new(classification: Classification, suggestion: SuggestionEntry) -> Self {
        Self {
            label: classification.label,
            confidence: classification.confidence,
            timestamp: classification.timestamp,
            suggestion,
        }
    }

    pub fn label(&self) -> EmotionLabel {
        self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn suggestion(&self) -> &SuggestionEntry {
        &self.suggestion
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
