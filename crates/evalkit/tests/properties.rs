//! Behavioural properties of the metric functions and the evaluation protocol.

use approx::assert_abs_diff_eq;
use evalkit::prelude::*;
use evalkit_metrics::{balanced_accuracy, jensen_shannon_divergence, ndcg, regression_errors};
use ndarray::{array, ArrayD};
use proptest::prelude::*;

fn arr(values: &[f64]) -> ArrayD<f64> {
    ArrayD::from_shape_vec(vec![values.len()], values.to_vec()).unwrap()
}

fn args(nan_policy: NanPolicy) -> MetricArgs {
    MetricArgs::new().with_nan_policy(nan_policy)
}

#[test]
fn test_accuracy_disjoint() {
    let metrics = accuracy(
        &array![1.0, 0.0, 0.0, 1.0].into_dyn(),
        &array![0.0, 1.0, 1.0, 0.0].into_dyn(),
        &MetricArgs::new(),
    )
    .unwrap();
    assert_eq!(metrics.scalar("accuracy"), Some(0.0));
    assert_eq!(metrics.count("count_correct"), Some(0));
    assert_eq!(metrics.count("count_incorrect"), Some(4));
    assert_eq!(metrics.scalar("error"), Some(1.0));
}

#[test]
fn test_binary_precision() {
    let metrics = precision(
        &array![1.0, 0.0, 0.0, 1.0].into_dyn(),
        &array![1.0, 0.0, 1.0, 0.0].into_dyn(),
        LabelType::Binary,
        &MetricArgs::new(),
    )
    .unwrap();
    let mut expected = Metrics::new();
    expected.insert("count", 4_usize);
    expected.insert("precision", 0.5);
    assert_eq!(metrics, expected);
}

/// Count under `count`, or `size` for divergences, is zero and every other
/// value is NaN (arrays may be empty).
fn assert_empty_result(label: &str, metrics: &Metrics) {
    let size_key = if metrics.contains_key("size") { "size" } else { "count" };
    assert_eq!(metrics.count(size_key), Some(0), "{label}: {metrics}");
    for (key, value) in metrics.iter() {
        if key == size_key {
            continue;
        }
        let all_nan = match value {
            MetricValue::Scalar(v) => v.is_nan(),
            MetricValue::Array(a) => a.iter().all(|v| v.is_nan()),
            MetricValue::Count(_) => false,
        };
        assert!(all_nan, "{label}: {key} = {value}");
    }
}

#[test]
fn test_empty_inputs_never_raise() {
    let empty = arr(&[]);
    let options = MetricOptions {
        betas: vec![0.5, 1.0],
        k: vec![1, 2],
        powers: vec![0.0, 1.5],
        ..MetricOptions::default()
    };
    for kind in MetricKind::ALL {
        for nan_policy in [NanPolicy::Omit, NanPolicy::Propagate, NanPolicy::Raise] {
            let metrics = kind
                .compute(&empty, &empty, &options, &args(nan_policy))
                .unwrap_or_else(|e| panic!("{kind} ({nan_policy}) failed: {e}"));
            assert_empty_result(kind.tag(), &metrics);
        }
    }
}

#[test]
fn test_empty_inputs_with_explicit_label_types() {
    let empty = arr(&[]);
    let kinds = [
        MetricKind::Precision,
        MetricKind::Recall,
        MetricKind::FbetaScore,
        MetricKind::Jaccard,
        MetricKind::ConfusionMatrix,
    ];
    for label_type in [LabelType::Binary, LabelType::Multiclass] {
        let options = MetricOptions {
            label_type,
            ..MetricOptions::default()
        };
        for kind in kinds {
            let metrics = kind
                .compute(&empty, &empty, &options, &MetricArgs::new())
                .unwrap();
            assert_empty_result(&format!("{kind} ({label_type})"), &metrics);
        }
    }
    let flat = balanced_accuracy(&empty, &empty, &MetricArgs::new()).unwrap();
    assert_empty_result("balanced_accuracy", &flat);
    let matrix = ArrayD::<f64>::zeros(ndarray::IxDyn(&[0, 3]));
    let scores = ndcg(&matrix, &matrix, Some(2), &MetricArgs::new()).unwrap();
    assert_empty_result("ndcg", &scores);
}

#[test]
fn test_empty_multiclass_is_empty_vector() {
    let empty = arr(&[]);
    let metrics = precision(&empty, &empty, LabelType::Multiclass, &MetricArgs::new()).unwrap();
    assert_eq!(metrics.array("precision").map(|a| a.len()), Some(0));
    assert!(metrics.scalar("macro_precision").unwrap().is_nan());
}

#[test]
fn test_propagate_reports_unfiltered_count() {
    let y_true = arr(&[1.0, f64::NAN, 0.0, 1.0]);
    let y_pred = arr(&[1.0, 0.0, 0.0, 1.0]);
    let metrics = accuracy(&y_true, &y_pred, &args(NanPolicy::Propagate)).unwrap();
    assert_eq!(metrics.count("count"), Some(4));
    assert!(metrics.scalar("accuracy").unwrap().is_nan());

    let omitted = accuracy(&y_true, &y_pred, &args(NanPolicy::Omit)).unwrap();
    assert_eq!(omitted.count("count"), Some(3));
    assert_eq!(omitted.scalar("accuracy"), Some(1.0));
}

#[test]
fn test_raise_names_first_nan_array() {
    let err = mean_absolute_error(
        &arr(&[1.0, 2.0]),
        &arr(&[f64::NAN, 2.0]),
        &args(NanPolicy::Raise),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "'y_pred' contains at least one NaN value");
}

#[test]
fn test_equality_with_nan() {
    let y = arr(&[1.0, f64::NAN]);
    let a = accuracy(&y, &y, &MetricArgs::new()).unwrap();
    let b = accuracy(&y, &y, &MetricArgs::new()).unwrap();
    assert!(!objects_are_equal(&a, &b, false));
    assert!(objects_are_equal(&a, &b, true));
    assert!(!objects_are_equal(&a, &1.0_f64, true));
}

fn labels() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0u8..2, 1..40).prop_map(|v| v.into_iter().map(f64::from).collect())
}

fn clean_pair() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1usize..40).prop_flat_map(|n| {
        (
            prop::collection::vec(-100.0f64..100.0, n),
            prop::collection::vec(-100.0f64..100.0, n),
        )
    })
}

fn pair_with_nan() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (clean_pair(), any::<prop::sample::Index>()).prop_map(|((mut a, b), index)| {
        let i = index.index(a.len());
        a[i] = f64::NAN;
        (a, b)
    })
}

fn distribution() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..1.0, 4)
}

proptest! {
    /// Accuracy of an array against itself is perfect.
    #[test]
    fn accuracy_is_reflexive(y in labels()) {
        let y = arr(&y);
        let metrics = accuracy(&y, &y, &MetricArgs::new()).unwrap();
        prop_assert_eq!(metrics.scalar("accuracy"), Some(1.0));
        prop_assert_eq!(metrics.count("count"), Some(y.len()));
        prop_assert_eq!(metrics.count("count_correct"), Some(y.len()));
        prop_assert_eq!(metrics.count("count_incorrect"), Some(0));
        prop_assert_eq!(metrics.scalar("error"), Some(0.0));
    }

    /// Omitting NaN is a no-op on clean data.
    #[test]
    fn omit_matches_raise_on_clean_data((a, b) in clean_pair()) {
        let (a, b) = (arr(&a), arr(&b));
        let omit = regression_errors(&a, &b, &args(NanPolicy::Omit)).unwrap();
        let raise = regression_errors(&a, &b, &args(NanPolicy::Raise)).unwrap();
        prop_assert_eq!(omit, raise);
    }

    /// Raise fails on any NaN; propagate never fails and keeps the count.
    #[test]
    fn nan_policies_on_dirty_data((a, b) in pair_with_nan()) {
        let n = a.len();
        let (a, b) = (arr(&a), arr(&b));
        prop_assert!(mean_squared_error(&a, &b, &args(NanPolicy::Raise)).is_err());
        let metrics = mean_squared_error(&a, &b, &args(NanPolicy::Propagate)).unwrap();
        prop_assert_eq!(metrics.count("count"), Some(n));
        prop_assert!(metrics.scalar("mean_squared_error").unwrap().is_nan());
    }

    /// Jensen-Shannon divergence is symmetric.
    #[test]
    fn jensen_shannon_is_symmetric(p in distribution(), q in distribution()) {
        let (p, q) = (arr(&p), arr(&q));
        let pq = jensen_shannon_divergence(&p, &q, &MetricArgs::new()).unwrap();
        let qp = jensen_shannon_divergence(&q, &p, &MetricArgs::new()).unwrap();
        let (pq, qp) = (
            pq.scalar("jensen_shannon_divergence").unwrap(),
            qp.scalar("jensen_shannon_divergence").unwrap(),
        );
        assert_abs_diff_eq!(pq, qp, epsilon = 1e-12);
        prop_assert!(pq >= -1e-12);
    }

    /// Computing an evaluator twice changes nothing.
    #[test]
    fn compute_is_idempotent((a, b) in clean_pair()) {
        let state = EvaluationState::new(arr(&a), arr(&b), "target", "pred", NanPolicy::Propagate)
            .unwrap();
        let evaluator = StateEvaluator::new(MetricKind::R2Score, state);
        let once = evaluator.compute().unwrap();
        let twice = once.compute().unwrap();
        prop_assert!(objects_are_equal(&once, &twice, true));
    }
}
