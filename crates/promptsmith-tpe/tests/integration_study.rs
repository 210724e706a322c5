// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Integration tests for the ask/tell study

use promptsmith_tpe::*;

/// Objective with a single peak at (3, 1, 2).
fn objective(params: &Assignment) -> f64 {
    let target = [3usize, 1, 2];
    let misses = params
        .iter()
        .zip(target.iter())
        .filter(|(a, b)| a != b)
        .count();
    100.0 - misses as f64 * 30.0
}

#[test]
fn test_seeded_studies_are_reproducible() {
    let run = || {
        let config = TpeConfig::new().with_seed(11).with_n_startup_trials(4);
        let mut study = Study::new(&[5, 5, 3], Direction::Maximize, config).unwrap();
        for _ in 0..20 {
            let p = study.ask();
            let v = objective(&p);
            study.tell(p, v).unwrap();
        }
        study
            .trials()
            .iter()
            .map(|t| t.params.to_vec())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_guided_phase_beats_startup_phase() {
    let config = TpeConfig::new()
        .with_seed(2024)
        .with_n_startup_trials(10)
        .with_multivariate(true);
    let mut study = Study::new(&[5, 5, 3], Direction::Maximize, config).unwrap();
    for _ in 0..60 {
        let p = study.ask();
        let v = objective(&p);
        study.tell(p, v).unwrap();
    }

    let mean = |trials: &[Trial]| trials.iter().map(|t| t.value).sum::<f64>() / trials.len() as f64;
    let startup = mean(&study.trials()[..10]);
    let guided = mean(&study.trials()[30..]);
    assert!(guided > startup, "guided {guided} <= startup {startup}");
}

#[test]
fn test_best_trial_matches_history_max() {
    let config = TpeConfig::new().with_seed(8).with_n_startup_trials(3);
    let mut study = Study::new(&[4, 4], Direction::Maximize, config).unwrap();
    for _ in 0..12 {
        let p = study.ask();
        let v = (p[0] * 10 + p[1]) as f64;
        study.tell(p, v).unwrap();
    }
    let max = study
        .trials()
        .iter()
        .map(|t| t.value)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(study.best_trial().unwrap().value, max);
}
