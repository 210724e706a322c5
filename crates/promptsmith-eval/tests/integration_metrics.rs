// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Integration tests for the scoring adapter

use promptsmith_eval::*;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_accuracy_exact_chinese_label() {
    let score = accuracy(&["积极"], &["积极"]).unwrap();
    assert_eq!(score, 100.0);
}

#[test]
fn test_accuracy_cross_language_label() {
    let score = accuracy(&["Positive"], &["积极"]).unwrap();
    assert_eq!(score, 0.0);
}

#[test]
fn test_accuracy_empty_batch() {
    let empty: [&str; 0] = [];
    assert_eq!(accuracy(&empty, &empty).unwrap(), 0.0);
}

#[test]
fn test_bleu_short_hypothesis_smoothed() {
    let score = bleu("I love AI", "I love AI very much", Language::English);
    assert!(score > 0.0 && score < 100.0);
    assert!((score - 28.87).abs() < 0.05, "score = {score}");
}

#[test]
fn test_bleu_chinese_partial() {
    let score = bleu("我喜欢人工智能", "我非常喜欢人工智能", Language::Chinese);
    assert!(score > 0.0 && score < 100.0, "score = {score}");
}

#[test]
fn test_rouge_ordering() {
    let reference = "the model summarizes long documents into short notes";
    let close = rouge(
        "the model summarizes documents into notes",
        reference,
        Language::Auto,
    );
    let far = rouge("cats enjoy sleeping", reference, Language::Auto);
    assert!(close.rouge_l > far.rouge_l);
    assert_eq!(far.rouge_l, 0.0);
}

#[test]
fn test_task_metric_dispatch() {
    let preds = owned(&["positive", "negative"]);
    let refs = owned(&["Positive", "positive"]);
    let score = TaskMetric::Accuracy.aggregate(&preds, &refs).unwrap();
    assert_eq!(score, 50.0);

    let preds = owned(&["I love AI very much"]);
    let refs = owned(&["I love AI very much"]);
    let score = TaskMetric::Bleu(Language::English)
        .aggregate(&preds, &refs)
        .unwrap();
    assert_eq!(score, 100.0);
}

#[test]
fn test_metric_trait_object() {
    let metrics: Vec<Box<dyn Metric>> = vec![
        Box::new(ExactMatch),
        Box::new(RougeL::default()),
        Box::new(Bleu::default()),
    ];
    for m in &metrics {
        let s = m.score("same text here ok", "same text here ok");
        assert_eq!(s, 100.0, "{} did not give 100 on identical input", m.name());
    }
}

#[test]
fn test_aggregate_mismatch_errors() {
    let preds = owned(&["a"]);
    let refs = owned(&["a", "b"]);
    assert!(RougeL::default().aggregate(&preds, &refs).is_err());
}

#[test]
fn test_interpret_bands() {
    assert_eq!(interpret("accuracy", 92.0).level, Level::Excellent);
    assert_eq!(interpret("accuracy", 45.0).level, Level::Pass);
    assert_eq!(interpret("bleu", 12.0).level, Level::NeedsWork);
}
