// SYNOID Hype Highlight Selector
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Greedy, density-first interval scheduling under a time budget.
//
// Picking the best non-overlapping subset under a budget is a weighted
// interval scheduling / knapsack problem. Taking candidates by score per
// second is an approximation of that optimum, not an exact solution.

use crate::config::EngineConfig;
use crate::engine::candidates::Candidate;
use crate::engine::cut_plan::{CutPlan, SelectedSegment};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionReport {
    pub used_seconds: f64,
    pub accepted: usize,
    pub trimmed: usize,
    /// Discarded for being shorter than the minimum segment (after trimming).
    pub below_minimum: usize,
    pub overlap_rejected: usize,
    /// Zero, negative or NaN scores, or malformed intervals.
    pub skipped: usize,
    pub infeasible_budget: bool,
    pub stopped_early: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub plan: CutPlan,
    pub report: SelectionReport,
}

#[derive(Debug, Clone, Copy)]
pub struct HighlightSelector {
    budget_seconds: f64,
    min_segment_seconds: f64,
    early_stop_slack_seconds: f64,
}

impl HighlightSelector {
    pub fn new(budget_seconds: f64, min_segment_seconds: f64) -> Self {
        Self {
            budget_seconds,
            min_segment_seconds,
            early_stop_slack_seconds: 1.0,
        }
    }

    pub fn with_slack(mut self, slack_seconds: f64) -> Self {
        self.early_stop_slack_seconds = slack_seconds;
        self
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.budget_seconds, config.min_segment_seconds)
            .with_slack(config.early_stop_slack_seconds)
    }

    pub fn select(&self, candidates: &[Candidate]) -> Selection {
        let mut report = SelectionReport::default();
        let budget = self.budget_seconds;

        if !(budget > 0.0) {
            info!("[SELECT] Budget {:.1}s leaves nothing to select", budget);
            report.infeasible_budget = true;
            return Selection {
                plan: CutPlan::default(),
                report,
            };
        }

        let mut ranked: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| {
                let usable = c.is_well_formed() && c.score.is_finite() && c.score > 0.0;
                if !usable {
                    report.skipped += 1;
                }
                usable
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.density()
                .total_cmp(&a.density())
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.start.total_cmp(&b.start))
                .then_with(|| a.end.total_cmp(&b.end))
        });

        let usable = ranked.len();
        let mut accepted: Vec<Candidate> = Vec::new();
        let mut used = 0.0;

        for candidate in ranked {
            let mut pick = candidate.clone();
            let mut duration = pick.duration();
            let remaining = budget - used;
            let trimmed = duration > remaining;

            if trimmed {
                pick.end = trimmed_end(pick.start, remaining);
                duration = pick.duration();
            }
            if duration < self.min_segment_seconds {
                report.below_minimum += 1;
                continue;
            }

            if accepted.iter().any(|a| a.overlaps(&pick)) {
                debug!(
                    "[SELECT] {} {:.1}-{:.1}s overlaps an accepted clip",
                    pick.source_id, pick.start, pick.end
                );
                report.overlap_rejected += 1;
                continue;
            }

            if trimmed {
                report.trimmed += 1;
            }
            used += duration;
            accepted.push(pick);

            if used >= budget - self.early_stop_slack_seconds {
                report.stopped_early = true;
                break;
            }
        }

        report.accepted = accepted.len();
        report.infeasible_budget = accepted.is_empty() && usable > 0;

        let last = accepted.last().map(|c| (c.source, c.start));
        let segments = accepted
            .into_iter()
            .map(|c| SelectedSegment {
                source_id: c.source_id,
                source_order: c.source,
                start: c.start,
                end: c.end,
                score: c.score,
            })
            .collect();
        let mut plan = CutPlan::from_segments(segments);
        if let Some((source, start)) = last {
            fit_to_budget(&mut plan, budget, source, start);
        }
        report.used_seconds = plan.total_duration();

        info!(
            "[SELECT] Accepted {} clip(s), {:.1}s of {:.1}s budget ({} overlaps, {} too short)",
            report.accepted,
            report.used_seconds,
            budget,
            report.overlap_rejected,
            report.below_minimum
        );

        Selection { plan, report }
    }
}

/// Largest end such that `end - start` does not exceed `length`.
fn trimmed_end(start: f64, length: f64) -> f64 {
    let mut end = start + length;
    while end > start && end - start > length {
        end = next_down(end);
    }
    end
}

/// The plan sums its durations in chronological order, which can round a
/// few ulps above the acceptance-order total. Shave the last accepted
/// segment until the plan fits.
fn fit_to_budget(plan: &mut CutPlan, budget: f64, source: usize, start: f64) {
    while plan.total_duration() > budget {
        let excess = plan.total_duration() - budget;
        let segment = match plan
            .segments
            .iter_mut()
            .find(|s| s.source_order == source && s.start == start)
        {
            Some(segment) => segment,
            None => break,
        };
        let end = (segment.end - excess).min(next_down(segment.end));
        if end <= segment.start {
            break;
        }
        segment.end = end;
    }
}

fn next_down(x: f64) -> f64 {
    if x.is_nan() || x == f64::NEG_INFINITY {
        x
    } else if x == 0.0 {
        -f64::from_bits(1)
    } else if x > 0.0 {
        f64::from_bits(x.to_bits() - 1)
    } else {
        f64::from_bits(x.to_bits() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(start: f64, end: f64, score: f64) -> Candidate {
        Candidate {
            source: 0,
            source_id: "vod".to_string(),
            start,
            end,
            score,
        }
    }

    #[test]
    fn test_overlapping_lower_density_is_rejected() {
        let selection = HighlightSelector::new(120.0, 2.0)
            .select(&[cand(0.0, 60.0, 1.0), cand(30.0, 90.0, 0.9)]);
        assert_eq!(selection.plan.len(), 1);
        assert_eq!(selection.plan.segments[0].start, 0.0);
        assert_eq!(selection.plan.segments[0].end, 60.0);
        assert_eq!(selection.report.used_seconds, 60.0);
        assert_eq!(selection.report.overlap_rejected, 1);
    }

    #[test]
    fn test_trailing_candidate_is_trimmed_to_budget() {
        let selection = HighlightSelector::new(50.0, 2.0).select(&[cand(0.0, 100.0, 1.0)]);
        assert_eq!(selection.plan.len(), 1);
        assert_eq!(selection.plan.segments[0].end, 50.0);
        assert_eq!(selection.plan.segments[0].score, 1.0);
        assert_eq!(selection.report.used_seconds, 50.0);
        assert_eq!(selection.report.trimmed, 1);
    }

    #[test]
    fn test_short_candidate_is_discarded() {
        let selection = HighlightSelector::new(1000.0, 2.0).select(&[cand(0.0, 1.0, 1.0)]);
        assert!(selection.plan.is_empty());
        assert_eq!(selection.report.below_minimum, 1);
    }

    #[test]
    fn test_tiny_remainder_does_not_stop_the_scan() {
        // After the 9s clip only 1s remains for the 20s clip (dropped), but
        // the scan continues and never exceeds the budget.
        let selection = HighlightSelector::new(10.0, 2.0)
            .with_slack(0.0)
            .select(&[cand(0.0, 9.0, 9.0), cand(20.0, 40.0, 2.0)]);
        assert_eq!(selection.plan.len(), 1);
        assert_eq!(selection.report.below_minimum, 1);
        assert!(selection.plan.total_duration() <= 10.0);
    }

    #[test]
    fn test_later_shorter_candidate_still_fits() {
        let selection = HighlightSelector::new(30.0, 2.0).with_slack(0.0).select(&[
            cand(0.0, 25.0, 25.0),
            cand(100.0, 200.0, 10.0),
            cand(300.0, 305.0, 0.5),
        ]);
        // 25s accepted; the 100s clip trims to 5s and is accepted second.
        assert_eq!(selection.plan.len(), 2);
        assert_eq!(selection.plan.segments[1].start, 100.0);
        assert_eq!(selection.plan.segments[1].end, 105.0);
        assert_eq!(selection.report.used_seconds, 30.0);
    }

    #[test]
    fn test_non_positive_budget_is_infeasible() {
        let selection = HighlightSelector::new(0.0, 2.0).select(&[cand(0.0, 10.0, 1.0)]);
        assert!(selection.plan.is_empty());
        assert!(selection.report.infeasible_budget);
    }

    #[test]
    fn test_zero_score_candidates_are_skipped() {
        let selection = HighlightSelector::new(100.0, 2.0)
            .select(&[cand(0.0, 10.0, 0.0), cand(10.0, 20.0, f64::NAN), cand(30.0, 30.0, 1.0)]);
        assert!(selection.plan.is_empty());
        assert_eq!(selection.report.skipped, 3);
    }

    #[test]
    fn test_output_is_chronological_not_density_order() {
        let selection = HighlightSelector::new(100.0, 2.0).select(&[
            cand(50.0, 60.0, 0.2),
            cand(0.0, 10.0, 1.0),
            cand(20.0, 30.0, 0.5),
        ]);
        let starts: Vec<f64> = selection.plan.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0.0, 20.0, 50.0]);
    }

    #[test]
    fn test_same_interval_on_other_source_is_not_a_conflict() {
        let mut other = cand(0.0, 10.0, 1.0);
        other.source = 1;
        other.source_id = "vod-2".to_string();
        let selection = HighlightSelector::new(100.0, 2.0).select(&[cand(0.0, 10.0, 1.0), other]);
        assert_eq!(selection.plan.len(), 2);
        assert_eq!(selection.plan.source_ids(), vec!["vod", "vod-2"]);
    }

    #[test]
    fn test_trim_at_fractional_start_never_exceeds_budget() {
        for i in 0..20_000 {
            let start = 1234.567 + i as f64 * 0.1;
            let budget = 2.0 + (i % 997) as f64 * 0.013;
            let selection =
                HighlightSelector::new(budget, 0.0).select(&[cand(start, start + 500.0, 1.0)]);
            let total = selection.plan.total_duration();
            assert!(total <= budget, "start {} budget {} total {}", start, budget, total);
            assert!(budget - total < 1e-9);
        }
    }

    #[test]
    fn test_plan_total_fits_after_several_fractional_picks() {
        let candidates: Vec<Candidate> = (0..50)
            .map(|i| {
                let start = i as f64 * 37.3 + 0.1;
                cand(start, start + 7.7 + i as f64 * 0.01, 1.0 + i as f64 * 0.003)
            })
            .collect();
        for step in 0..200 {
            let budget = 33.3 + step as f64 * 1.7;
            let selection = HighlightSelector::new(budget, 0.5)
                .with_slack(0.0)
                .select(&candidates);
            assert!(selection.plan.total_duration() <= budget, "budget {}", budget);
            assert_eq!(selection.report.used_seconds, selection.plan.total_duration());
        }
    }

    #[test]
    fn test_trimmed_then_overlapping_counts_only_as_overlap() {
        // The 40s clip trims to 20s at 10-30s and collides with 0-20s.
        let selection = HighlightSelector::new(40.0, 2.0)
            .with_slack(0.0)
            .select(&[cand(0.0, 20.0, 20.0), cand(10.0, 50.0, 1.0)]);
        assert_eq!(selection.plan.len(), 1);
        assert_eq!(selection.report.overlap_rejected, 1);
        assert_eq!(selection.report.trimmed, 0);
    }

    #[test]
    fn test_all_unusable_scores_are_not_a_budget_problem() {
        let selection = HighlightSelector::new(100.0, 2.0)
            .select(&[cand(0.0, 10.0, 0.0), cand(20.0, 30.0, f64::NAN)]);
        assert!(selection.plan.is_empty());
        assert!(!selection.report.infeasible_budget);

        let selection = HighlightSelector::new(100.0, 2.0).select(&[cand(0.0, 1.0, 1.0)]);
        assert!(selection.report.infeasible_budget);
    }
}
