use super::label::{EmotionLabel, SuggestionEntry};

/// Returned for any name outside the closed label set
pub const DEFAULT_SUGGESTION: SuggestionEntry = SuggestionEntry {
    message: "Focus on understanding customer needs.",
    actions: &["Listen actively", "Ask clarifying questions"],
};

/// Maps emotions to coaching suggestions
#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionCatalog;

impl SuggestionCatalog {
    pub fn new() -> Self {
        Self
    }

    /// Total over the closed set
    pub fn lookup(&self, label: EmotionLabel) -> SuggestionEntry {
        label.profile().suggestion
    }

    /// Lookup by wire name; unknown names resolve to `DEFAULT_SUGGESTION`
    pub fn lookup_name(&self, name: &str) -> SuggestionEntry {
        EmotionLabel::from_wire_name(name)
            .map(|label| self.lookup(label))
            .unwrap_or(DEFAULT_SUGGESTION)
    }
}
