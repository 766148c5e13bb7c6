// SYNOID Hype Cut Plan
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// The only artifact that leaves the engine: ordered, source-local cut points
// for the renderer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedSegment {
    pub source_id: String,
    /// Position of the source in the supplied order.
    #[serde(default)]
    pub source_order: usize,
    pub start: f64,
    pub end: f64,
    pub score: f64,
}

impl SelectedSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutPlan {
    pub segments: Vec<SelectedSegment>,
}

impl CutPlan {
    /// Builds a plan, ordering segments by `(source order, start)`.
    pub fn from_segments(mut segments: Vec<SelectedSegment>) -> Self {
        segments.sort_by(|a, b| {
            a.source_order
                .cmp(&b.source_order)
                .then_with(|| a.start.total_cmp(&b.start))
        });
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedSegment> {
        self.segments.iter()
    }

    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration()).sum()
    }

    pub fn is_chronological(&self) -> bool {
        self.segments.windows(2).all(|pair| {
            (pair[0].source_order, pair[0].start) <= (pair[1].source_order, pair[1].start)
        })
    }

    /// True when two segments of the same source overlap.
    pub fn has_overlaps(&self) -> bool {
        self.segments.iter().enumerate().any(|(i, a)| {
            self.segments[i + 1..].iter().any(|b| {
                a.source_order == b.source_order && !(a.end <= b.start || a.start >= b.end)
            })
        })
    }

    /// Segments grouped per source id, in plan order.
    pub fn source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if ids.last() != Some(&segment.source_id.as_str()) {
                ids.push(&segment.source_id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(source_order: usize, start: f64, end: f64) -> SelectedSegment {
        SelectedSegment {
            source_id: format!("vod-{}", source_order),
            source_order,
            start,
            end,
            score: 1.0,
        }
    }

    #[test]
    fn test_from_segments_orders_by_source_then_start() {
        let plan = CutPlan::from_segments(vec![
            seg(1, 5.0, 10.0),
            seg(0, 50.0, 60.0),
            seg(0, 0.0, 5.0),
        ]);
        assert!(plan.is_chronological());
        assert_eq!(plan.source_ids(), vec!["vod-0", "vod-1"]);
        assert_eq!(plan.total_duration(), 20.0);
    }

    #[test]
    fn test_overlap_detection_is_per_source() {
        let plan = CutPlan::from_segments(vec![seg(0, 0.0, 10.0), seg(1, 5.0, 15.0)]);
        assert!(!plan.has_overlaps());
        let plan = CutPlan::from_segments(vec![seg(0, 0.0, 10.0), seg(0, 5.0, 15.0)]);
        assert!(plan.has_overlaps());
    }

    #[test]
    fn test_json_shape() {
        let plan = CutPlan::from_segments(vec![seg(0, 1.0, 3.0)]);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["segments"][0]["source_id"], "vod-0");
        assert_eq!(json["segments"][0]["end"], 3.0);
    }
}
