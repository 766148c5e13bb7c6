// SYNOID Hype Scorer
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::config::ChannelWeights;
use crate::engine::aligner::{min_max_normalize, AlignedTimeline};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredWindow {
    pub source: usize,
    pub index: usize,
    pub start: f64,
    pub end: f64,
    /// Always finite, in `[0, 1]`.
    pub score: f64,
}

impl ScoredWindow {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Weighted sum of the normalized channels, renormalized over the whole
/// timeline. Pure: same input, same scores.
pub struct HypeScorer {
    weights: ChannelWeights,
}

impl HypeScorer {
    pub fn new(weights: ChannelWeights) -> Self {
        Self { weights }
    }

    pub fn score(&self, aligned: &AlignedTimeline) -> Vec<ScoredWindow> {
        let channels = &aligned.channels;
        let w = &self.weights;

        let mut composite: Vec<f64> = (0..channels.len())
            .map(|i| {
                w.energy * channels.energy[i]
                    + w.text * channels.text[i]
                    + w.motion * channels.motion[i]
                    + w.scene * channels.scene[i]
            })
            .collect();
        min_max_normalize(&mut composite);

        let scored: Vec<ScoredWindow> = aligned
            .windows
            .iter()
            .zip(composite)
            .map(|(window, score)| ScoredWindow {
                source: window.source,
                index: window.index,
                start: window.start,
                end: window.end,
                // A degenerate window carries no content.
                score: if window.width() > 0.0 { score } else { 0.0 },
            })
            .collect();

        let peak = scored.iter().map(|w| w.score).fold(0.0, f64::max);
        let hot = scored.iter().filter(|w| w.score >= 0.8).count();
        info!(
            "[SCORE] Scored {} windows (peak {:.2}, {} above 0.8)",
            scored.len(),
            peak,
            hot
        );
        scored
    }
}
