// SYNOID Hype Signal Aligner
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Resamples heterogeneous raw signals (per-frame motion, per-utterance text,
// per-half-second energy, scene cuts) onto one fixed-width window grid per
// source, then lays the sources end to end in supplied order.

use crate::config::{EnergyScale, EngineConfig};
use crate::engine::signals::{Sample, SignalKind, SourceSignals};
use crate::engine::text_boost::TextBooster;
use crate::engine::timeline::{window_grid, window_index, GridWindow, TimelineMap};
use rayon::prelude::*;
use std::ops::Range;
use tracing::{debug, info};

/// One value per window for every channel, all the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedChannels {
    pub energy: Vec<f64>,
    pub text: Vec<f64>,
    pub motion: Vec<f64>,
    pub scene: Vec<f64>,
}

impl AlignedChannels {
    fn zeroed(n: usize) -> Self {
        Self {
            energy: vec![0.0; n],
            text: vec![0.0; n],
            motion: vec![0.0; n],
            scene: vec![0.0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.energy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energy.is_empty()
    }

    pub fn channel(&self, kind: SignalKind) -> &[f64] {
        match kind {
            SignalKind::Energy => &self.energy,
            SignalKind::Text => &self.text,
            SignalKind::Motion => &self.motion,
            SignalKind::Scene => &self.scene,
        }
    }

    fn channel_mut(&mut self, kind: SignalKind) -> &mut Vec<f64> {
        match kind {
            SignalKind::Energy => &mut self.energy,
            SignalKind::Text => &mut self.text,
            SignalKind::Motion => &mut self.motion,
            SignalKind::Scene => &mut self.scene,
        }
    }

    fn extend(&mut self, other: AlignedChannels) {
        self.energy.extend(other.energy);
        self.text.extend(other.text);
        self.motion.extend(other.motion);
        self.scene.extend(other.scene);
    }
}

/// The whole scoring space: every source's windows, in source order.
#[derive(Debug, Clone)]
pub struct AlignedTimeline {
    pub timeline: TimelineMap,
    pub windows: Vec<GridWindow>,
    pub channels: AlignedChannels,
    /// Window range owned by each source.
    pub source_ranges: Vec<Range<usize>>,
    /// `(source, kind)` pairs whose producer delivered nothing.
    pub empty_channels: Vec<(usize, SignalKind)>,
    pub degenerate_sources: Vec<usize>,
}

struct SourceAlignment {
    windows: Vec<GridWindow>,
    channels: AlignedChannels,
    empty: Vec<SignalKind>,
    degenerate: bool,
}

pub struct SignalAligner<'a> {
    config: &'a EngineConfig,
}

impl<'a> SignalAligner<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn align(&self, inputs: &[SourceSignals]) -> AlignedTimeline {
        let descriptors: Vec<_> = inputs.iter().map(|i| i.source.clone()).collect();
        let timeline = TimelineMap::new(&descriptors);

        info!(
            "[ALIGN] Aligning {} source(s), {:.1}s total, {:.2}s windows",
            inputs.len(),
            timeline.total_duration(),
            self.config.window_width_seconds
        );

        // Sources are independent; collect keeps the supplied order.
        let per_source: Vec<SourceAlignment> = inputs
            .par_iter()
            .enumerate()
            .map(|(idx, input)| self.align_source(idx, input))
            .collect();

        let mut windows = Vec::new();
        let mut channels = AlignedChannels::default();
        let mut source_ranges = Vec::with_capacity(per_source.len());
        let mut empty_channels = Vec::new();
        let mut degenerate_sources = Vec::new();

        for (idx, aligned) in per_source.into_iter().enumerate() {
            let start = windows.len();
            windows.extend(aligned.windows);
            channels.extend(aligned.channels);
            source_ranges.push(start..windows.len());
            empty_channels.extend(aligned.empty.into_iter().map(|kind| (idx, kind)));
            if aligned.degenerate {
                degenerate_sources.push(idx);
            }
        }

        for kind in SignalKind::ALL {
            let values = channels.channel_mut(kind);
            if self.config.normalize_per_source {
                for range in &source_ranges {
                    min_max_normalize(&mut values[range.clone()]);
                }
            } else {
                min_max_normalize(values);
            }
        }

        AlignedTimeline {
            timeline,
            windows,
            channels,
            source_ranges,
            empty_channels,
            degenerate_sources,
        }
    }

    fn align_source(&self, idx: usize, input: &SourceSignals) -> SourceAlignment {
        let duration = input.source.effective_duration();
        let width = self.config.window_width_seconds;
        let windows = window_grid(idx, duration, width);
        let mut channels = AlignedChannels::zeroed(windows.len());
        let mut empty = Vec::new();

        if duration <= 0.0 {
            debug!("[ALIGN] Source '{}' has zero duration", input.source.id);
            return SourceAlignment {
                windows,
                channels,
                empty: SignalKind::ALL.to_vec(),
                degenerate: true,
            };
        }

        let energy = input.samples(SignalKind::Energy);
        if energy.is_empty() {
            empty.push(SignalKind::Energy);
        }
        let scale = self.config.energy_scale;
        channels.energy = average_per_window(&energy, duration, width, windows.len(), |v| {
            match scale {
                EnergyScale::Linear => v,
                EnergyScale::Decibels => ((v + 60.0) / 60.0).max(0.0),
            }
        });

        let motion = input.samples(SignalKind::Motion);
        if motion.is_empty() {
            empty.push(SignalKind::Motion);
        }
        channels.motion = average_per_window(&motion, duration, width, windows.len(), |v| v);

        let spans = input.text_spans();
        if spans.is_empty() {
            empty.push(SignalKind::Text);
        }
        let booster = TextBooster::new(&self.config.text);
        for span in spans {
            let boost = booster.boost(span);
            if boost <= 0.0 {
                continue;
            }
            let range = span_windows(span.start, span.end, duration, width, windows.len());
            if let Some(range) = range {
                for value in &mut channels.text[range] {
                    *value = value.max(boost);
                }
            }
        }

        let cuts = input.scene_cuts();
        if cuts.is_empty() {
            empty.push(SignalKind::Scene);
        }
        for cut in cuts {
            let Some(center) = window_index(cut.midpoint(), duration, width) else {
                continue;
            };
            let lo = center.saturating_sub(1);
            let hi = (center + 1).min(windows.len() - 1);
            for value in &mut channels.scene[lo..=hi] {
                *value += self.config.scene_bonus;
            }
        }

        SourceAlignment {
            windows,
            channels,
            empty,
            degenerate: false,
        }
    }
}

/// Mean of the samples falling in each window; empty windows stay at zero.
fn average_per_window(
    samples: &[Sample],
    duration: f64,
    width: f64,
    n: usize,
    map: impl Fn(f64) -> f64,
) -> Vec<f64> {
    let mut sums = vec![0.0; n];
    let mut counts = vec![0usize; n];
    for sample in samples {
        if !sample.value.is_finite() {
            continue;
        }
        if let Some(idx) = window_index(sample.time, duration, width) {
            sums[idx] += map(sample.value);
            counts[idx] += 1;
        }
    }
    sums.iter()
        .zip(&counts)
        .map(|(sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect()
}

/// Windows a text span touches, after clipping the span to the source.
fn span_windows(
    start: f64,
    end: f64,
    duration: f64,
    width: f64,
    n: usize,
) -> Option<Range<usize>> {
    if !(start.is_finite() && end.is_finite()) || end < start {
        return None;
    }
    let start = start.max(0.0);
    let end = end.min(duration);
    if end < start {
        return None;
    }
    let first = window_index(start, duration, width)?;
    if end == start {
        // Instantaneous utterance.
        return Some(first..first + 1);
    }
    let last = ((end / width).ceil() as usize).saturating_sub(1).clamp(first, n - 1);
    Some(first..last + 1)
}

/// Min-max scale into `[0, 1]`; a flat or empty slice becomes all zeros.
pub fn min_max_normalize(values: &mut [f64]) {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if !(max > min) || !(max - min).is_finite() {
        values.iter_mut().for_each(|v| *v = 0.0);
        return;
    }

    let range = max - min;
    for v in values.iter_mut() {
        *v = if v.is_finite() {
            ((*v - min) / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
}
