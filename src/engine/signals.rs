// SYNOID Hype Signals
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Raw, already-computed signals handed to the engine by the external
// producers (energy extractor, transcriber, motion / scene-cut detector).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One input video as the engine sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDescriptor {
    pub id: String,
    pub duration_seconds: f64,
    /// Local media file, only needed by the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_path: Option<PathBuf>,
}

impl SourceDescriptor {
    pub fn new(id: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            id: id.into(),
            duration_seconds,
            media_path: None,
        }
    }

    /// Duration with NaN / negative values collapsed to zero.
    pub fn effective_duration(&self) -> f64 {
        if self.duration_seconds.is_finite() && self.duration_seconds > 0.0 {
            self.duration_seconds
        } else {
            0.0
        }
    }
}

/// A timestamped numeric sample (energy or motion).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    #[serde(alias = "t")]
    pub time: f64,
    pub value: f64,
}

/// A transcribed utterance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TextSpan {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub text: String,
    /// Classifier label, e.g. "joy" or "surprise".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Precomputed boost; replaces the text-derived one when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f64>,
}

impl TextSpan {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            ..Default::default()
        }
    }
}

/// A detected scene cut, reported as the interval the transition spans.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SceneCut {
    pub start: f64,
    pub end: f64,
}

impl SceneCut {
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// A raw signal stream for one source timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "samples", rename_all = "lowercase")]
pub enum RawSignal {
    Energy(Vec<Sample>),
    Text(Vec<TextSpan>),
    Motion(Vec<Sample>),
    Scene(Vec<SceneCut>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Energy,
    Text,
    Motion,
    Scene,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Energy,
        SignalKind::Text,
        SignalKind::Motion,
        SignalKind::Scene,
    ];
}

impl RawSignal {
    pub fn kind(&self) -> SignalKind {
        match self {
            RawSignal::Energy(_) => SignalKind::Energy,
            RawSignal::Text(_) => SignalKind::Text,
            RawSignal::Motion(_) => SignalKind::Motion,
            RawSignal::Scene(_) => SignalKind::Scene,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawSignal::Energy(s) | RawSignal::Motion(s) => s.is_empty(),
            RawSignal::Text(s) => s.is_empty(),
            RawSignal::Scene(s) => s.is_empty(),
        }
    }
}

/// A source together with every signal produced for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSignals {
    #[serde(flatten)]
    pub source: SourceDescriptor,
    #[serde(default)]
    pub signals: Vec<RawSignal>,
}

impl SourceSignals {
    pub fn new(source: SourceDescriptor, signals: Vec<RawSignal>) -> Self {
        Self { source, signals }
    }

    /// All energy (or motion) samples of this source, merged and time-sorted.
    pub fn samples(&self, kind: SignalKind) -> Vec<Sample> {
        let mut merged: Vec<Sample> = self
            .signals
            .iter()
            .filter_map(|s| match (s, kind) {
                (RawSignal::Energy(v), SignalKind::Energy) => Some(v.as_slice()),
                (RawSignal::Motion(v), SignalKind::Motion) => Some(v.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect();
        merged.sort_by(|a, b| a.time.total_cmp(&b.time));
        merged
    }

    pub fn text_spans(&self) -> Vec<&TextSpan> {
        self.signals
            .iter()
            .filter_map(|s| match s {
                RawSignal::Text(v) => Some(v.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn scene_cuts(&self) -> Vec<SceneCut> {
        self.signals
            .iter()
            .filter_map(|s| match s {
                RawSignal::Scene(v) => Some(v.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

/// Session file consumed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Session {
    pub sources: Vec<SourceSignals>,
}
