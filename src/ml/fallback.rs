use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

use super::client::MlEndpoint;

/// Per-endpoint count of responses served from defaults.
#[derive(Debug, Default)]
pub struct FallbackCounters {
    counts: [AtomicU64; MlEndpoint::COUNT],
}

impl FallbackCounters {
    pub fn record(&self, endpoint: MlEndpoint) -> u64 {
        self.counts[endpoint.index()].fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self, endpoint: MlEndpoint) -> u64 {
        self.counts[endpoint.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        MlEndpoint::ALL
            .iter()
            .map(|endpoint| (endpoint.as_str(), self.get(*endpoint)))
            .collect()
    }
}

pub(super) fn default_payload(endpoint: MlEndpoint) -> Value {
    match endpoint {
        MlEndpoint::RecommendPomodoro => json!({
            "focus_minutes": 25,
            "break_minutes": 5,
            "confidence": 0,
            "explanation": "Using default Pomodoro timing (ML service unavailable)",
        }),
        MlEndpoint::Sentiment => neutral_sentiment(),
        MlEndpoint::Coach => json!({
            "message": "I'm here to help! Based on your activity, try breaking tasks into smaller steps and taking regular breaks. Remember: progress over perfection!",
            "suggested_action": "Start a 25-minute Pomodoro",
        }),
        MlEndpoint::DistractionPredict => json!({
            "distraction_probability": 0.3,
            "top_trigger": "Unknown (ML service unavailable)",
        }),
        MlEndpoint::MoodSuggestions => json!({
            "suggestions": [
                "Take a moment to breathe deeply",
                "Be kind to yourself today",
                "Remember that your feelings are valid",
            ],
            "insights": "Your mood is valid. Remember to be kind to yourself.",
            "recommended_activities": [
                "Take a short break",
                "Do something kind for yourself",
                "Check in with how you're feeling",
            ],
            "affirmation": "You're doing your best, and that's enough. Be kind to yourself today.",
            "sentiment_analysis": neutral_sentiment(),
        }),
    }
}

fn neutral_sentiment() -> Value {
    json!({ "sentiment_score": 0.0, "label": "neutral" })
}
