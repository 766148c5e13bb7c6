// SYNOID Hype Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod config;
pub mod engine;
pub mod render;

pub use config::EngineConfig;
pub use engine::cut_plan::{CutPlan, SelectedSegment};
pub use engine::signals::{RawSignal, SourceDescriptor, SourceSignals};
pub use engine::{build_cut_plan, select_intervals, PlanIssue, PlanOutcome};
