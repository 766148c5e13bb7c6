// SYNOID Hype Engine
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Hype scoring and highlight selection. A pure function of
// (sources, raw signals, config) -> CutPlan: no I/O, no clocks, no
// randomness. Degraded inputs come back as `PlanIssue`s, never as errors.

pub mod aligner;
pub mod candidates;
pub mod cut_plan;
pub mod scorer;
pub mod selector;
pub mod signals;
pub mod text_boost;
pub mod timeline;

use crate::config::EngineConfig;
use aligner::SignalAligner;
use candidates::{Candidate, CandidateGenerator};
use cut_plan::CutPlan;
use scorer::{HypeScorer, ScoredWindow};
use selector::{HighlightSelector, SelectionReport};
use serde::{Deserialize, Serialize};
use signals::{SignalKind, SourceDescriptor, SourceSignals};
use timeline::TimelineMap;
use tracing::{info, warn};

/// A degraded path the engine recovered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum PlanIssue {
    /// A channel producer returned nothing; the channel was zero-filled.
    EmptySignal { source_id: String, kind: SignalKind },
    /// Zero-duration source: one empty window, no candidates.
    DegenerateTimeline { source_id: String },
    /// Budget <= 0, or nothing fit after trimming.
    InfeasibleBudget { budget_seconds: f64 },
    /// Intervals with `end <= start`, dropped during generation.
    MalformedCandidate { count: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub windows: usize,
    pub candidates: usize,
    pub issues: Vec<PlanIssue>,
    pub selection: SelectionReport,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub plan: CutPlan,
    pub diagnostics: Diagnostics,
}

/// Aligned and scored windows, exposed for inspection and tests.
pub fn score_windows(
    inputs: &[SourceSignals],
    config: &EngineConfig,
) -> (TimelineMap, Vec<ScoredWindow>) {
    let aligned = SignalAligner::new(config).align(inputs);
    let scored = HypeScorer::new(config.channel_weights).score(&aligned);
    (aligned.timeline, scored)
}

/// Full pipeline: align, score, generate candidates, select.
pub fn build_cut_plan(inputs: &[SourceSignals], config: &EngineConfig) -> PlanOutcome {
    let aligned = SignalAligner::new(config).align(inputs);
    let mut issues = Vec::new();

    for &(source, kind) in &aligned.empty_channels {
        if aligned.degenerate_sources.contains(&source) {
            continue;
        }
        issues.push(PlanIssue::EmptySignal {
            source_id: inputs[source].source.id.clone(),
            kind,
        });
    }
    for &source in &aligned.degenerate_sources {
        warn!("[HYPE] Source '{}' has no duration; skipping", inputs[source].source.id);
        issues.push(PlanIssue::DegenerateTimeline {
            source_id: inputs[source].source.id.clone(),
        });
    }

    let scored = HypeScorer::new(config.channel_weights).score(&aligned);
    let batch = CandidateGenerator::new(config, &aligned.timeline).generate(&scored);
    if batch.malformed > 0 {
        issues.push(PlanIssue::MalformedCandidate {
            count: batch.malformed,
        });
    }

    let selection = HighlightSelector::from_config(config).select(&batch.candidates);
    if selection.plan.is_empty() {
        if selection.report.infeasible_budget || !(config.budget_seconds > 0.0) {
            issues.push(PlanIssue::InfeasibleBudget {
                budget_seconds: config.budget_seconds,
            });
        }
        info!("[HYPE] No highlights selected");
    }

    PlanOutcome {
        plan: selection.plan,
        diagnostics: Diagnostics {
            windows: scored.len(),
            candidates: batch.candidates.len(),
            issues,
            selection: selection.report,
        },
    }
}

/// A pre-scored interval on the virtual (concatenated) timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirtualInterval {
    pub start: f64,
    pub end: f64,
    pub score: f64,
}

/// Select from flat intervals expressed on the virtual timeline. Each one is
/// moved into the source owning its start and clipped to that source.
pub fn select_intervals(
    sources: &[SourceDescriptor],
    intervals: &[VirtualInterval],
    config: &EngineConfig,
) -> PlanOutcome {
    let timeline = TimelineMap::new(sources);
    let mut malformed = 0;

    let candidates: Vec<Candidate> = intervals
        .iter()
        .filter_map(|interval| {
            let local = timeline.localize(interval.start, interval.end);
            let candidate = local.map(|l| Candidate {
                source: l.source,
                source_id: sources[l.source].id.clone(),
                start: l.start,
                end: l.end,
                score: interval.score,
            });
            match candidate {
                Some(c) if c.is_well_formed() => Some(c),
                _ => {
                    malformed += 1;
                    None
                }
            }
        })
        .collect();

    let mut issues = Vec::new();
    if malformed > 0 {
        issues.push(PlanIssue::MalformedCandidate { count: malformed });
    }

    let selection = HighlightSelector::from_config(config).select(&candidates);
    if selection.plan.is_empty() && selection.report.infeasible_budget {
        issues.push(PlanIssue::InfeasibleBudget {
            budget_seconds: config.budget_seconds,
        });
    }

    PlanOutcome {
        plan: selection.plan,
        diagnostics: Diagnostics {
            windows: 0,
            candidates: candidates.len(),
            issues,
            selection: selection.report,
        },
    }
}
