// SYNOID Hype Timeline
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Places every source on one virtual timeline (sources laid end to end in
// the order supplied) and owns the fixed-width window grid of each source.

use crate::engine::signals::SourceDescriptor;
use serde::{Deserialize, Serialize};

/// The slice of the virtual timeline owned by one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub id: String,
    pub order: usize,
    pub offset_start: f64,
    pub offset_end: f64,
}

impl SourceSpan {
    pub fn duration(&self) -> f64 {
        self.offset_end - self.offset_start
    }
}

/// A source-local interval produced by [`TimelineMap::localize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalInterval {
    pub source: usize,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineMap {
    spans: Vec<SourceSpan>,
}

impl TimelineMap {
    pub fn new(sources: &[SourceDescriptor]) -> Self {
        let mut offset = 0.0;
        let spans = sources
            .iter()
            .enumerate()
            .map(|(order, source)| {
                let duration = source.effective_duration();
                let span = SourceSpan {
                    id: source.id.clone(),
                    order,
                    offset_start: offset,
                    offset_end: offset + duration,
                };
                offset += duration;
                span
            })
            .collect();
        Self { spans }
    }

    pub fn spans(&self) -> &[SourceSpan] {
        &self.spans
    }

    pub fn span(&self, source: usize) -> Option<&SourceSpan> {
        self.spans.get(source)
    }

    pub fn total_duration(&self) -> f64 {
        self.spans.last().map(|s| s.offset_end).unwrap_or(0.0)
    }

    /// Virtual time of a source-local instant.
    pub fn to_virtual(&self, source: usize, local: f64) -> f64 {
        self.spans
            .get(source)
            .map(|s| s.offset_start + local)
            .unwrap_or(local)
    }

    /// The source owning a virtual instant. Zero-length sources own nothing.
    pub fn locate(&self, virtual_time: f64) -> Option<usize> {
        if !virtual_time.is_finite() {
            return None;
        }
        // First span whose end lies beyond the instant.
        let idx = self.spans.partition_point(|s| s.offset_end <= virtual_time);
        let span = self.spans.get(idx)?;
        (virtual_time >= span.offset_start).then_some(idx)
    }

    /// Translate a virtual interval into the local time of the source owning
    /// its start, clipped to that source's `[0, duration)`.
    pub fn localize(&self, virtual_start: f64, virtual_end: f64) -> Option<LocalInterval> {
        let source = self.locate(virtual_start)?;
        let span = &self.spans[source];
        let start = (virtual_start - span.offset_start).clamp(0.0, span.duration());
        let end = (virtual_end - span.offset_start).clamp(0.0, span.duration());
        Some(LocalInterval { source, start, end })
    }
}

/// One cell of a source's window grid, in source-local seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridWindow {
    pub source: usize,
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

impl GridWindow {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// `N = ceil(duration / width)` windows, at least one. The last window is
/// clipped to the source end; a zero-length source gets a single `[0, 0)`.
pub fn window_grid(source: usize, duration: f64, width: f64) -> Vec<GridWindow> {
    let n = window_count(duration, width);
    (0..n)
        .map(|index| {
            let start = (index as f64 * width).min(duration);
            let end = ((index + 1) as f64 * width).min(duration);
            GridWindow {
                source,
                index,
                start,
                end,
            }
        })
        .collect()
}

pub fn window_count(duration: f64, width: f64) -> usize {
    if !(duration > 0.0 && width > 0.0) {
        return 1;
    }
    ((duration / width).ceil() as usize).max(1)
}

/// Grid index of a local instant, or `None` outside `[0, duration)`.
pub fn window_index(time: f64, duration: f64, width: f64) -> Option<usize> {
    if !(time.is_finite() && time >= 0.0 && time < duration && width > 0.0) {
        return None;
    }
    let idx = (time / width).floor() as usize;
    Some(idx.min(window_count(duration, width) - 1))
}
