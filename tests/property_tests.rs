//! Property-based tests for the data preparation and evaluation layers.

use abandono::metrics::{threshold_scores, ConfusionCounts};
use abandono::model_selection::train_valid_test_split;
use abandono::preprocessing::{dedup_rows, OneHotEncoder};
use abandono::primitives::Vector;
use abandono::data::{DataFrame, RawDataset};
use proptest::prelude::*;
use std::collections::HashSet;

/// Small string tables with plenty of duplicate rows.
fn raw_table_strategy() -> impl Strategy<Value = RawDataset> {
    prop::collection::vec(prop::collection::vec(0u8..3, 2), 1..40).prop_map(|rows| {
        let header = vec!["a".to_string(), "b".to_string()];
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.to_string()).collect())
            .collect();
        RawDataset::from_rows(header, rows).expect("well-formed table")
    })
}

fn frame_with_labels(n: usize) -> (DataFrame, Vec<usize>) {
    let values: Vec<f32> = (0..n).map(|i| i as f32).collect();
    let frame = DataFrame::new(vec![("x".to_string(), Vector::from_vec(values))])
        .expect("valid frame");
    let labels = (0..n).map(|i| i % 2).collect();
    (frame, labels)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_dedup_is_idempotent(ds in raw_table_strategy()) {
        let once = dedup_rows(&ds);
        let twice = dedup_rows(&once);
        prop_assert_eq!(once.rows(), twice.rows());
    }

    #[test]
    fn prop_dedup_keeps_first_occurrence_order(ds in raw_table_strategy()) {
        let deduped = dedup_rows(&ds);
        // Every kept row appears in the input, and kept rows preserve
        // the relative order of their first occurrences.
        let mut expected = Vec::new();
        let mut seen = HashSet::new();
        for row in ds.rows() {
            if seen.insert(row.clone()) {
                expected.push(row.clone());
            }
        }
        prop_assert_eq!(deduped.rows(), expected.as_slice());
    }

    #[test]
    fn prop_split_is_disjoint_and_total(
        n in 10usize..200,
        seed in 0u64..1000,
    ) {
        let (frame, labels) = frame_with_labels(n);
        let split = train_valid_test_split(&frame, &labels, 0.7, 0.2, seed)
            .expect("valid split");

        let total = split.train.n_rows() + split.validation.n_rows() + split.test.n_rows();
        prop_assert_eq!(total, n);

        // Feature values are unique by construction, so overlap between
        // partitions would show up as a repeated value.
        let mut seen = HashSet::new();
        for part in [&split.train, &split.validation, &split.test] {
            for &v in part.features.column("x").expect("column").iter() {
                prop_assert!(seen.insert(v.to_bits()), "row appears in two partitions");
            }
        }
    }

    #[test]
    fn prop_split_is_reproducible(
        n in 10usize..100,
        seed in 0u64..1000,
    ) {
        let (frame, labels) = frame_with_labels(n);
        let a = train_valid_test_split(&frame, &labels, 0.7, 0.2, seed).expect("split");
        let b = train_valid_test_split(&frame, &labels, 0.7, 0.2, seed).expect("split");
        prop_assert_eq!(a.train.labels, b.train.labels);
        prop_assert_eq!(
            a.train.features.column("x").expect("column").as_slice(),
            b.train.features.column("x").expect("column").as_slice()
        );
    }

    #[test]
    fn prop_one_hot_rows_sum_to_one(ds in raw_table_strategy()) {
        let mut encoder = OneHotEncoder::new(vec!["a".to_string(), "b".to_string()]);
        encoder.fit(&ds).expect("fit");
        let encoded = encoder.transform(&ds).expect("transform");

        // Each source column contributes exactly one active indicator
        // per row, so every row sums to the number of encoded columns.
        let matrix = encoded.to_matrix();
        for i in 0..matrix.n_rows() {
            let row_sum: f32 = matrix.row(i).iter().sum();
            prop_assert!((row_sum - 2.0).abs() < 1e-6, "row {} sums to {}", i, row_sum);
        }
    }

    #[test]
    fn prop_threshold_is_monotone(scores in prop::collection::vec(0.0f32..=1.0, 1..50)) {
        let labels = threshold_scores(&scores);
        for (score, label) in scores.iter().zip(&labels) {
            prop_assert_eq!(*label, usize::from(*score >= 0.5));
        }
    }

    #[test]
    fn prop_confusion_counts_total(
        y_pred in prop::collection::vec(0usize..2, 1..100),
        flips in prop::collection::vec(any::<bool>(), 1..100),
    ) {
        let n = y_pred.len().min(flips.len());
        let y_pred = &y_pred[..n];
        let y_true: Vec<usize> = y_pred
            .iter()
            .zip(&flips)
            .map(|(&p, &flip)| if flip { 1 - p } else { p })
            .collect();

        let counts = ConfusionCounts::from_labels(y_pred, &y_true).expect("counts");
        prop_assert_eq!(counts.tp + counts.fp + counts.tn + counts.fn_, n);

        let accuracy = counts.accuracy();
        prop_assert!((0.0..=1.0).contains(&accuracy));
    }
}
