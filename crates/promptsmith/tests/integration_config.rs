// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Configuration documents, dataset files and search space parsing.

use promptsmith::{
    load_dataset, AnyStrategy, LabelMatching, PromptLocale, SearchConfig, SearchSpace,
    SearchStrategy, TestSample,
};
use std::path::PathBuf;
use std::time::Duration;

fn temp_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("promptsmith-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_yaml_selects_genetic_with_budget() {
    let yaml = r#"
strategy:
  kind: genetic
  generations: 4
  population_size: 6
  elite_ratio: 0.5
  mutation_rate: 0.1
eval:
  call_delay_ms: 250
  base_delay_ms: 1000
  locale: chinese
"#;
    let config = SearchConfig::from_yaml_str(yaml).unwrap();
    let strategy = config.build().unwrap();
    assert_eq!(strategy.name(), "genetic");

    let AnyStrategy::Genetic(ga) = strategy else {
        panic!("expected genetic strategy");
    };
    assert_eq!(ga.config().generations, 4);
    assert_eq!(ga.config().population_size, 6);
    assert_eq!(ga.config().elite_ratio, 0.5);
    assert_eq!(ga.config().mutation_rate, 0.1);
    assert_eq!(ga.eval_config().call_delay, Duration::from_millis(250));
    assert_eq!(ga.eval_config().retry.base_delay, Duration::from_secs(1));
    // Untouched fields keep the genetic defaults.
    assert_eq!(ga.eval_config().retry.max_attempts, 5);
    assert_eq!(ga.eval_config().locale, PromptLocale::Chinese);
}

#[test]
fn test_config_from_path_by_extension() {
    let json = temp_file(
        "random.json",
        r#"{"strategy": {"kind": "random_search", "iterations": 3, "seed": 1},
            "eval": {"label_matching": "exact"}}"#,
    );
    let config = SearchConfig::from_path(&json).unwrap();
    let AnyStrategy::RandomSearch(random) = config.build().unwrap() else {
        panic!("expected random search");
    };
    assert_eq!(random.config().iterations, 3);
    assert_eq!(random.eval_config().label_matching, LabelMatching::Exact);
    assert_eq!(random.eval_config().call_delay, Duration::from_millis(300));

    let yml = temp_file("bayes.yml", "strategy:\n  kind: bayesian\n  n_trials: 6\n  trial_cooldown_ms: 0\n");
    let config = SearchConfig::from_path(&yml).unwrap();
    let AnyStrategy::Bayesian(bayes) = config.build().unwrap() else {
        panic!("expected bayesian");
    };
    assert_eq!(bayes.config().n_trials, 6);
    assert_eq!(bayes.config().trial_cooldown, Duration::ZERO);

    let toml = temp_file("run.toml", "strategy = 1");
    assert!(SearchConfig::from_path(&toml).unwrap_err().is_config_error());
}

#[test]
fn test_invalid_settings_are_config_errors() {
    let bad_rate = "strategy:\n  kind: genetic\n  mutation_rate: 2.0\n";
    let err = SearchConfig::from_yaml_str(bad_rate).unwrap().build().unwrap_err();
    assert!(err.is_config_error());

    let bad_retry = "strategy:\n  kind: random_search\neval:\n  max_attempts: 0\n";
    let err = SearchConfig::from_yaml_str(bad_retry).unwrap().build().unwrap_err();
    assert!(err.is_config_error());

    let unknown_field = "strategy:\n  kind: random_search\neval:\n  delay: 5\n";
    assert!(SearchConfig::from_yaml_str(unknown_field).is_err());
}

#[test]
fn test_load_dataset_file() {
    let path = temp_file(
        "dataset.json",
        r#"[
            {"input": "这个产品真的很好用", "ground_truth": "积极"},
            {"input": "价格太贵了", "ground_truth": "消极"}
        ]"#,
    );
    let data = load_dataset(&path).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[1], TestSample::new("价格太贵了", "消极"));

    let missing = std::env::temp_dir().join("promptsmith-no-such-dataset.json");
    assert_eq!(load_dataset(missing).unwrap_err().category(), "io");
}

#[test]
fn test_space_from_llm_response() {
    let response = r#"Here are the options:
```json
{
  "roles": [{"name": "数据分析师"}, {"name": "产品经理"}],
  "styles": ["简洁", "专业"],
  "techniques": ["Chain-of-Thought"]
}
```"#;
    let space = SearchSpace::from_llm_response(response).unwrap();
    assert_eq!(space.roles(), ["数据分析师", "产品经理"]);
    assert_eq!(space.styles(), ["简洁", "专业"]);
    assert_eq!(space.len(), 4);

    let empty_axis = r#"{"roles": ["a"], "styles": [], "techniques": ["t"]}"#;
    assert!(SearchSpace::from_llm_response(empty_axis)
        .unwrap_err()
        .is_config_error());
}
