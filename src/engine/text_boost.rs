// SYNOID Hype Text Booster
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Turns a transcribed utterance into a numeric hype boost: keyword hits,
// laughter tokens, exclamation marks, plus the sentiment classifier's
// confidence when it labelled the span as a hype emotion.

use crate::engine::signals::TextSpan;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextBoostConfig {
    /// Lower-case substrings worth `keyword_boost` each.
    pub keywords: Vec<String>,
    pub keyword_boost: f64,
    pub exclamation_boost: f64,
    /// Counted per occurrence ("jaj" matches "jajaja" once, "jajajaj" twice).
    pub laughter_token: String,
    pub laughter_boost: f64,
    /// Classifier labels that count as hype.
    pub hype_labels: Vec<String>,
    pub label_weight: f64,
}

impl Default for TextBoostConfig {
    fn default() -> Self {
        let keywords = [
            "wow", "increible", "increíble", "hype", "jajaja", "jaja", "lol", "hostia",
            "madre", "epic", "insane", "risas", "vamos", "brutal", "no puede ser", "clutch",
            "let's go",
        ];
        let hype_labels = ["joy", "surprise", "excitement", "positive", "hype"];
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            keyword_boost: 1.0,
            exclamation_boost: 0.2,
            laughter_token: "jaj".to_string(),
            laughter_boost: 0.5,
            hype_labels: hype_labels.iter().map(|l| l.to_string()).collect(),
            label_weight: 1.0,
        }
    }
}

impl TextBoostConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("keyword_boost", self.keyword_boost),
            ("exclamation_boost", self.exclamation_boost),
            ("laughter_boost", self.laughter_boost),
            ("label_weight", self.label_weight),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                bail!("text.{} must be finite and non-negative, got {}", name, value);
            }
        }
        Ok(())
    }
}

pub struct TextBooster<'a> {
    config: &'a TextBoostConfig,
}

impl<'a> TextBooster<'a> {
    pub fn new(config: &'a TextBoostConfig) -> Self {
        Self { config }
    }

    /// Boost for a single span. Always finite and non-negative.
    pub fn boost(&self, span: &TextSpan) -> f64 {
        if let Some(explicit) = span.boost {
            return if explicit.is_finite() { explicit.max(0.0) } else { 0.0 };
        }
        let score = self.text_score(&span.text) + self.label_score(span);
        if score.is_finite() {
            score.max(0.0)
        } else {
            0.0
        }
    }

    pub fn text_score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let mut score = 0.0;

        for keyword in &self.config.keywords {
            if !keyword.is_empty() && lower.contains(&keyword.to_lowercase()) {
                score += self.config.keyword_boost;
            }
        }

        score += lower.matches('!').count() as f64 * self.config.exclamation_boost;

        if !self.config.laughter_token.is_empty() {
            let token = self.config.laughter_token.to_lowercase();
            score += lower.matches(token.as_str()).count() as f64 * self.config.laughter_boost;
        }

        score
    }

    fn label_score(&self, span: &TextSpan) -> f64 {
        let (Some(label), Some(confidence)) = (&span.label, span.confidence) else {
            return 0.0;
        };
        let is_hype = self
            .config
            .hype_labels
            .iter()
            .any(|l| l.eq_ignore_ascii_case(label));
        if is_hype && confidence.is_finite() {
            confidence.clamp(0.0, 1.0) * self.config.label_weight
        } else {
            0.0
        }
    }
}
