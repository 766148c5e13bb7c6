// SYNOID Hype Candidate Generator
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Turns scored windows into time intervals proposed for the reel, either
// densely (one per window) or as spread-out peaks.

use crate::config::{CandidateMode, EngineConfig};
use crate::engine::scorer::ScoredWindow;
use crate::engine::timeline::TimelineMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A source-local interval proposed for selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Position of the owning source in the supplied order.
    pub source: usize,
    pub source_id: String,
    pub start: f64,
    pub end: f64,
    pub score: f64,
}

impl Candidate {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Score per second; zero for a degenerate interval.
    pub fn density(&self) -> f64 {
        let duration = self.duration();
        if duration > 0.0 && self.score.is_finite() {
            self.score / duration
        } else {
            0.0
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end > self.start
    }

    /// Open-interval overlap on the same source; touching ends do not count.
    pub fn overlaps(&self, other: &Candidate) -> bool {
        self.source == other.source && !(self.end <= other.start || self.start >= other.end)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateBatch {
    pub candidates: Vec<Candidate>,
    /// Intervals dropped because `end <= start`.
    pub malformed: usize,
}

impl CandidateBatch {
    fn push(&mut self, candidate: Candidate) {
        if candidate.is_well_formed() {
            self.candidates.push(candidate);
        } else {
            self.malformed += 1;
        }
    }
}

pub struct CandidateGenerator<'a> {
    config: &'a EngineConfig,
    timeline: &'a TimelineMap,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(config: &'a EngineConfig, timeline: &'a TimelineMap) -> Self {
        Self { config, timeline }
    }

    pub fn generate(&self, windows: &[ScoredWindow]) -> CandidateBatch {
        let batch = match self.config.candidate_mode {
            CandidateMode::Window => self.window_candidates(windows),
            CandidateMode::Grid => self.grid_candidates(windows),
            CandidateMode::Peaks => self.peak_candidates(windows),
        };
        info!(
            "[CANDIDATES] {:?} mode: {} candidates ({} malformed dropped)",
            self.config.candidate_mode,
            batch.candidates.len(),
            batch.malformed
        );
        batch
    }

    fn source_id(&self, source: usize) -> String {
        self.timeline
            .span(source)
            .map(|s| s.id.clone())
            .unwrap_or_default()
    }

    fn source_duration(&self, source: usize) -> f64 {
        self.timeline.span(source).map(|s| s.duration()).unwrap_or(0.0)
    }

    fn window_candidates(&self, windows: &[ScoredWindow]) -> CandidateBatch {
        let mut batch = CandidateBatch::default();
        for w in windows.iter().filter(|w| w.score > 0.0) {
            batch.push(Candidate {
                source: w.source,
                source_id: self.source_id(w.source),
                start: w.start,
                end: w.end,
                score: w.score,
            });
        }
        batch
    }

    /// Fixed-length clips seeded at each window. Clips that would run past
    /// the source end are pulled back to finish at it; the resulting
    /// duplicates keep the best score.
    fn grid_candidates(&self, windows: &[ScoredWindow]) -> CandidateBatch {
        let mut batch = CandidateBatch::default();
        for w in windows.iter().filter(|w| w.score > 0.0) {
            let duration = self.source_duration(w.source);
            let length = self.config.clip_length_seconds.min(duration);
            let start = w.start.min(duration - length).max(0.0);
            let candidate = Candidate {
                source: w.source,
                source_id: self.source_id(w.source),
                start,
                end: start + length,
                score: w.score,
            };

            if let Some(last) = batch.candidates.last_mut() {
                if last.source == candidate.source
                    && last.start == candidate.start
                    && last.end == candidate.end
                {
                    last.score = last.score.max(candidate.score);
                    continue;
                }
            }
            batch.push(candidate);
        }
        batch
    }

    /// Top-K instants, expanded to clips, thinned by temporal non-max
    /// suppression and returned in chronological order. With a per-source
    /// quota each source is ranked and suppressed on its own.
    fn peak_candidates(&self, windows: &[ScoredWindow]) -> CandidateBatch {
        let peaks: Vec<&ScoredWindow> = windows.iter().filter(|w| w.score > 0.0).collect();
        let mut batch = CandidateBatch::default();

        match self.config.top_k_per_source {
            Some(quota) => {
                for source in 0..self.timeline.spans().len() {
                    let slice: Vec<&ScoredWindow> =
                        peaks.iter().copied().filter(|w| w.source == source).collect();
                    self.keep_peaks(slice, quota, &mut batch);
                }
            }
            None => self.keep_peaks(peaks, self.config.top_k, &mut batch),
        }

        batch.candidates.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| a.start.total_cmp(&b.start))
        });
        batch
    }

    fn keep_peaks(
        &self,
        mut peaks: Vec<&ScoredWindow>,
        limit: usize,
        batch: &mut CandidateBatch,
    ) {
        peaks.sort_by(|a, b| {
            b.score.total_cmp(&a.score).then_with(|| {
                self.timeline
                    .to_virtual(a.source, a.start)
                    .total_cmp(&self.timeline.to_virtual(b.source, b.start))
            })
        });
        peaks.truncate(limit);

        let mut kept_starts: Vec<f64> = Vec::new();
        for peak in peaks {
            let duration = self.source_duration(peak.source);
            let candidate = Candidate {
                source: peak.source,
                source_id: self.source_id(peak.source),
                start: peak.start,
                end: (peak.start + self.config.clip_length_seconds).min(duration),
                score: peak.score,
            };
            if !candidate.is_well_formed() {
                batch.malformed += 1;
                continue;
            }

            let virtual_start = self.timeline.to_virtual(peak.source, peak.start);
            let far_enough = kept_starts
                .iter()
                .all(|&kept| (virtual_start - kept).abs() >= self.config.min_gap_seconds);
            if !far_enough {
                debug!(
                    "[CANDIDATES] Suppressed peak at {:.1}s (score {:.2})",
                    virtual_start, peak.score
                );
                continue;
            }
            kept_starts.push(virtual_start);
            batch.candidates.push(candidate);
        }
    }
}
