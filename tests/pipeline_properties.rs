use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use synoid_hype::config::{CandidateMode, EngineConfig};
use synoid_hype::engine::build_cut_plan;
use synoid_hype::engine::candidates::{Candidate, CandidateGenerator};
use synoid_hype::engine::score_windows;
use synoid_hype::engine::selector::HighlightSelector;
use synoid_hype::engine::signals::{
    RawSignal, Sample, SceneCut, SourceDescriptor, SourceSignals, TextSpan,
};

const TOLERANCE: f64 = 1e-6;

fn random_samples(rng: &mut StdRng, duration: f64, step: f64) -> Vec<Sample> {
    let mut samples = Vec::new();
    let mut time = rng.gen_range(0.0..step);
    while time < duration {
        samples.push(Sample {
            time,
            value: rng.gen_range(0.0..1.0),
        });
        time += step;
    }
    samples
}

fn random_session(seed: u64) -> Vec<SourceSignals> {
    let mut rng = StdRng::seed_from_u64(seed);
    let sources = rng.gen_range(1..4);
    (0..sources)
        .map(|i| {
            let duration = if rng.gen_bool(0.1) {
                0.0
            } else {
                rng.gen_range(30.0..1500.0)
            };
            let mut signals = Vec::new();
            if rng.gen_bool(0.8) {
                signals.push(RawSignal::Energy(random_samples(&mut rng, duration, 0.5)));
            }
            if rng.gen_bool(0.6) {
                // Per-frame motion at an awkward rate.
                signals.push(RawSignal::Motion(random_samples(&mut rng, duration, 4.0 / 29.97)));
            }
            if rng.gen_bool(0.6) && duration > 0.0 {
                let spans = (0..rng.gen_range(0..20))
                    .map(|_| {
                        let start = rng.gen_range(0.0..duration);
                        let text = if rng.gen_bool(0.5) { "WOW jajaja!!" } else { "ok" };
                        TextSpan::new(start, start + rng.gen_range(0.0..8.0), text)
                    })
                    .collect();
                signals.push(RawSignal::Text(spans));
            }
            if rng.gen_bool(0.5) && duration > 0.0 {
                let cuts = (0..rng.gen_range(0..15))
                    .map(|_| {
                        let start = rng.gen_range(0.0..duration);
                        SceneCut {
                            start,
                            end: start + 0.1,
                        }
                    })
                    .collect();
                signals.push(RawSignal::Scene(cuts));
            }
            SourceSignals::new(SourceDescriptor::new(format!("vod-{}", i), duration), signals)
        })
        .collect()
}

fn random_config(seed: u64) -> EngineConfig {
    let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
    let mode = match rng.gen_range(0..3) {
        0 => CandidateMode::Window,
        1 => CandidateMode::Grid,
        _ => CandidateMode::Peaks,
    };
    EngineConfig {
        window_width_seconds: rng.gen_range(0.5..30.0),
        clip_length_seconds: rng.gen_range(5.0..90.0),
        min_gap_seconds: rng.gen_range(0.0..120.0),
        budget_seconds: rng.gen_range(-10.0..900.0),
        min_segment_seconds: rng.gen_range(0.0..5.0),
        candidate_mode: mode,
        top_k: rng.gen_range(1..40),
        normalize_per_source: rng.gen_bool(0.5),
        ..EngineConfig::default()
    }
}

#[test]
fn test_plan_invariants_hold_for_random_sessions() {
    for seed in 0..60 {
        let inputs = random_session(seed);
        let config = random_config(seed);
        let outcome = build_cut_plan(&inputs, &config);
        let plan = &outcome.plan;

        assert!(
            plan.total_duration() <= config.budget_seconds.max(0.0),
            "seed {}: {:.3}s over budget {:.3}s",
            seed,
            plan.total_duration(),
            config.budget_seconds
        );
        assert!(!plan.has_overlaps(), "seed {}: overlapping segments", seed);
        assert!(plan.is_chronological(), "seed {}: out of order", seed);

        for segment in plan.iter() {
            let source = &inputs[segment.source_order].source;
            assert_eq!(segment.source_id, source.id);
            assert!(segment.start >= 0.0);
            assert!(segment.end <= source.duration_seconds + TOLERANCE);
            assert!(segment.duration() + TOLERANCE >= config.min_segment_seconds);
            assert!((0.0..=1.0).contains(&segment.score));
        }
    }
}

#[test]
fn test_scores_are_bounded_for_random_sessions() {
    for seed in 100..130 {
        let inputs = random_session(seed);
        let config = random_config(seed);
        let (_, scored) = score_windows(&inputs, &config);
        assert!(!scored.is_empty());
        assert!(scored
            .iter()
            .all(|w| w.score.is_finite() && (0.0..=1.0).contains(&w.score)));
    }
}

#[test]
fn test_identical_inputs_give_identical_plans() {
    for seed in 200..220 {
        let config = random_config(seed);
        let first = build_cut_plan(&random_session(seed), &config);
        let second = build_cut_plan(&random_session(seed), &config);
        assert_eq!(first, second, "seed {}", seed);
    }
}

#[test]
fn test_peak_mode_keeps_min_gap() {
    for seed in 300..330 {
        let inputs = random_session(seed);
        let mut config = random_config(seed);
        config.candidate_mode = CandidateMode::Peaks;
        config.min_gap_seconds = 45.0;

        let (timeline, scored) = score_windows(&inputs, &config);
        let batch = CandidateGenerator::new(&config, &timeline).generate(&scored);
        let starts: Vec<f64> = batch
            .candidates
            .iter()
            .map(|c| timeline.to_virtual(c.source, c.start))
            .collect();
        assert!(starts.len() <= config.top_k);
        for (i, a) in starts.iter().enumerate() {
            for b in &starts[i + 1..] {
                assert!((a - b).abs() >= 45.0, "seed {}: peaks {} and {}", seed, a, b);
            }
        }
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn test_selector_tie_break_is_stable_under_shuffling() {
    let mut rng = StdRng::seed_from_u64(7);
    let base: Vec<Candidate> = (0..40)
        .map(|i| Candidate {
            source: i % 2,
            source_id: format!("vod-{}", i % 2),
            start: (i / 2) as f64 * 10.0,
            end: (i / 2) as f64 * 10.0 + 15.0,
            // Plenty of exact ties.
            score: [0.5, 1.0][i % 2 * (i / 7 % 2)],
        })
        .collect();
    let selector = HighlightSelector::new(120.0, 2.0);
    let expected = selector.select(&base).plan;

    for _ in 0..10 {
        let mut shuffled = base.clone();
        for i in (1..shuffled.len()).rev() {
            let j = rng.gen_range(0..=i);
            shuffled.swap(i, j);
        }
        assert_eq!(selector.select(&shuffled).plan, expected);
    }
}
