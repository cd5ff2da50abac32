use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Closed set of emotions the classifier can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EmotionLabel {
    Happy,
    Neutral,
    Sad,
    Angry,
    Frustrated,
}

/// Coaching text and ordered follow-up actions for one emotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuggestionEntry {
    pub message: &'static str,
    pub actions: &'static [&'static str],
}

/// Everything the service knows about a label.
///
/// Both the default weight table and the suggestion catalog are derived
/// from `PROFILES`, so adding a label means adding one row here.
#[derive(Debug, Clone, Copy)]
pub struct LabelProfile {
    pub label: EmotionLabel,
    pub default_weight: f64,
    pub suggestion: SuggestionEntry,
}

pub(crate) static PROFILES: [LabelProfile; 5] = [
    LabelProfile {
        label: EmotionLabel::Happy,
        default_weight: 0.20,
        suggestion: SuggestionEntry {
            message: "Customer is satisfied. Maintain positive interaction.",
            actions: &[
                "Acknowledge their positive experience",
                "Ask for feedback or testimonial",
                "Offer additional services if appropriate",
            ],
        },
    },
    LabelProfile {
        label: EmotionLabel::Neutral,
        default_weight: 0.40,
        suggestion: SuggestionEntry {
            message: "Customer is calm. Focus on efficient problem-solving.",
            actions: &[
                "Stay focused on the task",
                "Be clear and concise",
                "Verify understanding at key points",
            ],
        },
    },
    LabelProfile {
        label: EmotionLabel::Sad,
        default_weight: 0.15,
        suggestion: SuggestionEntry {
            message: "Customer may need emotional support.",
            actions: &[
                "Show empathy and understanding",
                "Listen actively",
                "Offer reassurance and clear solutions",
            ],
        },
    },
    LabelProfile {
        label: EmotionLabel::Angry,
        default_weight: 0.15,
        suggestion: SuggestionEntry {
            message: "Customer needs immediate attention.",
            actions: &[
                "Remain calm and professional",
                "Acknowledge their frustration",
                "Focus on quick resolution",
                "Consider escalation if needed",
            ],
        },
    },
    LabelProfile {
        label: EmotionLabel::Frustrated,
        default_weight: 0.10,
        suggestion: SuggestionEntry {
            message: "Customer is experiencing difficulties.",
            actions: &[
                "Acknowledge the challenge",
                "Provide clear step-by-step guidance",
                "Confirm progress frequently",
                "Offer alternative solutions",
            ],
        },
    },
];

impl EmotionLabel {
    /// All labels, in profile order
    pub const ALL: [EmotionLabel; 5] = [
        EmotionLabel::Happy,
        EmotionLabel::Neutral,
        EmotionLabel::Sad,
        EmotionLabel::Angry,
        EmotionLabel::Frustrated,
    ];

    /// Wire name, as emitted in the `emotion` field
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Happy => "Happy",
            EmotionLabel::Neutral => "Neutral",
            EmotionLabel::Sad => "Sad",
            EmotionLabel::Angry => "Angry",
            EmotionLabel::Frustrated => "Frustrated",
        }
    }

    pub fn profile(&self) -> &'static LabelProfile {
        &PROFILES[*self as usize]
    }

    /// Exact wire-name match; unlike `FromStr` this is case-sensitive
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == name)
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown emotion label: {}", s))
    }
}
