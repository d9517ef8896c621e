//! Integration tests for the analyzer → output → compute pipeline.

use evalkit::prelude::*;
use evalkit_core::testing::capture_logs;
use ndarray::array;
use tracing::Level;

fn binary_data() -> Columns {
    Columns::from_json_str(r#"{"target": [1, 0, 0, 1, 1, 0], "pred": [1, 0, 1, 0, 1, 0]}"#)
        .unwrap()
}

#[test]
fn test_lazy_output_round_trip() {
    let state = EvaluationState::new(
        array![3.0, -0.5, 2.0, 7.0].into_dyn(),
        array![2.5, 0.0, 2.0, 8.0].into_dyn(),
        "target",
        "pred",
        NanPolicy::Propagate,
    )
    .unwrap();
    let evaluator = StateEvaluator::new(MetricKind::RegressionErrors, state);
    let output = Output::new(evaluator.clone(), TextContent::new("errors"));

    let computed = output.compute().unwrap();
    let lazy = computed.get_evaluator(true).unwrap();
    assert!(objects_are_equal(
        lazy.as_comparable(),
        &evaluator.compute().unwrap(),
        false
    ));

    let metrics = lazy.evaluate("", "").unwrap();
    assert_eq!(metrics.scalar("mean_absolute_error"), Some(0.5));
    assert_eq!(metrics.scalar("median_absolute_error"), Some(0.5));
    assert_eq!(metrics.scalar("mean_squared_error"), Some(0.375));
    assert_eq!(metrics.count("count"), Some(4));
}

#[test]
fn test_compute_is_idempotent() {
    let analyzer = MetricAnalyzer::new(MetricKind::Recall, "target", "pred");
    let output = analyzer.analyze(&binary_data(), true).unwrap();
    let once = output.compute().unwrap();
    let twice = once.compute().unwrap();
    assert!(objects_are_equal(&once, &twice, false));

    let evaluator = output.get_evaluator(false).unwrap();
    let again = evaluator.compute().unwrap().compute().unwrap();
    assert!(objects_are_equal(&again, evaluator.as_comparable(), false));
}

#[test]
fn test_repeated_evaluation_has_no_side_effects() {
    let analyzer = MetricAnalyzer::new(MetricKind::Accuracy, "target", "pred");
    let output = analyzer.analyze(&binary_data(), true).unwrap();
    let first = output.evaluator().evaluate("", "").unwrap();
    let decorated = output.evaluator().evaluate("val_", "_1").unwrap();
    let second = output.evaluator().evaluate("", "").unwrap();
    assert_eq!(first, second);
    assert_eq!(decorated.scalar("val_accuracy_1"), first.scalar("accuracy"));
    assert_eq!(decorated.len(), first.len());
}

#[test]
fn test_missing_key_warns_once_and_returns_empty_output() {
    let data = Columns::from_json_str(r#"{"pred": [1, 0, 1]}"#).unwrap();
    let analyzer = MetricAnalyzer::new(MetricKind::Accuracy, "target", "pred")
        .with_missing_policy(MissingPolicy::Warn);

    let (output, logs) = capture_logs(|| analyzer.analyze(&data, true));
    let warnings = logs.at(Level::WARN);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("'target'"));
    assert!(!warnings[0].contains("'pred'"));

    let output = output.unwrap();
    assert!(objects_are_equal(&output, &Output::empty(), false));
    assert!(output.evaluator().evaluate("", "").unwrap().is_empty());
}

#[test]
fn test_missing_key_raise_does_not_build_state() {
    let data = Columns::from_json_str(r#"{"pred": [1, 0, 1]}"#).unwrap();
    let analyzer = MetricAnalyzer::new(MetricKind::Accuracy, "target", "pred");
    let err = analyzer.analyze(&data, true).unwrap_err();
    assert_eq!(err.to_string(), "1 key is missing in the data: ['target']");
    assert!(!err.is_config_error());
}

#[test]
fn test_nan_raise_fails_when_computed() {
    let data = Columns::from_json_str(r#"{"target": [1, null, 0], "pred": [1, 0, 0]}"#).unwrap();
    let analyzer = MetricAnalyzer::new(MetricKind::Accuracy, "target", "pred")
        .with_nan_policy(NanPolicy::Raise);

    let lazy = analyzer.analyze(&data, true).unwrap();
    let err = lazy.evaluator().evaluate("", "").unwrap_err();
    assert!(matches!(err.as_core(), Some(CoreError::NanFound { name }) if name == "y_true"));

    let err = analyzer.analyze(&data, false).unwrap_err();
    assert!(err.as_core().map_or(false, CoreError::is_data_error));
}

#[test]
fn test_registry_builds_from_json_config() {
    let registry = AnalyzerRegistry::with_builtins();
    let configs = AnalyzerConfig::list_from_json_str(
        r#"[
            {"analyzer": "precision", "y_true": "target", "y_pred": "pred", "label_type": "binary"},
            {"analyzer": "fbeta_score", "y_true": "target", "y_pred": "pred", "betas": [1, 2]},
            {"analyzer": "accuracy", "y_true": "label", "y_pred": "pred", "missing_policy": "ignore"},
            {"analyzer": "content", "text": "binary classification"}
        ]"#,
    )
    .unwrap();
    let analyzers = registry.build_all(&configs).unwrap();
    let outputs = analyze_many(&analyzers, &binary_data(), false).unwrap();

    let precision = outputs[0].evaluator().evaluate("", "").unwrap();
    assert_eq!(precision.scalar("precision"), Some(2.0 / 3.0));
    let fbeta = outputs[1].evaluator().evaluate("", "").unwrap();
    assert!(fbeta.contains_key("f1") && fbeta.contains_key("f2"));
    assert!(objects_are_equal(&outputs[2], &Output::empty(), false));
    assert_eq!(
        outputs[3].content().generate_content().unwrap(),
        "binary classification"
    );
}

#[test]
fn test_capability_must_be_provided() {
    let mut registry = AnalyzerRegistry::new();
    registry.register_builtins();
    let config = AnalyzerConfig::new("wasserstein_distance").with_keys("target", "pred");
    let err = registry.build(&config).unwrap_err();
    assert!(matches!(err.as_core(), Some(CoreError::MissingDependency(_))));

    registry.provide(Capability::Distribution);
    let analyzer = registry.build(&config).unwrap();
    let metrics = analyzer
        .analyze(&binary_data(), false)
        .unwrap()
        .evaluator()
        .evaluate("", "")
        .unwrap();
    assert_eq!(metrics.scalar("wasserstein_distance"), Some(0.0));
}

#[test]
fn test_state_clone_with_revalidates() {
    let state = EvaluationState::new(
        array![1.0, 0.0].into_dyn(),
        array![1.0, 1.0].into_dyn(),
        "target",
        "pred",
        NanPolicy::Omit,
    )
    .unwrap();
    let renamed = state.clone_with().y_pred_name("score").build().unwrap();
    assert_eq!(renamed.y_pred_name(), "score");
    assert!(!objects_are_equal(&renamed, &state, false));
    assert!(state
        .clone_with()
        .y_pred(array![1.0].into_dyn())
        .build()
        .is_err());
}
