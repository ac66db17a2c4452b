use crate::{Bitmap, Bsi, MinMax, Operation};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Largest row ID generated. Kept small so rows collide often.
const MAX_ROW: u64 = 512;

/// Strategy: a value that is usually small but sometimes spans the full
/// signed domain.
fn arb_value() -> impl Strategy<Value = i64> {
    prop_oneof![
        4 => 0i64..1000,
        2 => -1000i64..0,
        1 => any::<i64>(),
    ]
}

/// Strategy: a sequence of (row, value) assignments, later ones winning.
fn arb_assignments(signed: bool) -> impl Strategy<Value = Vec<(u64, i64)>> {
    let value = if signed {
        arb_value().boxed()
    } else {
        (0i64..100_000).boxed()
    };
    proptest::collection::vec((0..MAX_ROW, value), 0..200)
}

fn arb_filter() -> impl Strategy<Value = Option<Vec<u64>>> {
    proptest::option::of(proptest::collection::vec(0..MAX_ROW + 16, 0..100))
}

/// Build both a Bsi and a reference map from the same assignments.
fn make_pair(assignments: &[(u64, i64)]) -> (Bsi, BTreeMap<u64, i64>) {
    let mut bsi = Bsi::new_default();
    let mut model = BTreeMap::new();
    for &(row, value) in assignments {
        bsi.set_value(row, value);
        model.insert(row, value);
    }
    (bsi, model)
}

fn model_rows<F: Fn(i64) -> bool>(model: &BTreeMap<u64, i64>, keep: F) -> Bitmap {
    model
        .iter()
        .filter(|&(_, &value)| keep(value))
        .map(|(&row, _)| row)
        .collect()
}

// ===== Value access =====

proptest! {
    #[test]
    fn get_matches_model(assignments in arb_assignments(true)) {
        let (bsi, model) = make_pair(&assignments);

        prop_assert_eq!(bsi.get_cardinality(), model.len() as u64);
        for row in 0..MAX_ROW {
            prop_assert_eq!(bsi.get_value(row), model.get(&row).copied(), "row {}", row);
        }
    }

    #[test]
    fn clear_matches_model(
        assignments in arb_assignments(true),
        cleared in proptest::collection::vec(0..MAX_ROW, 0..100),
    ) {
        let (mut bsi, mut model) = make_pair(&assignments);

        bsi.clear_values(&Bitmap::of(&cleared));
        for row in &cleared {
            model.remove(row);
        }

        prop_assert_eq!(bsi.get_cardinality(), model.len() as u64);
        prop_assert!(bsi.iter().eq(model.iter().map(|(&r, &v)| (r, v))));
    }
}

// ===== Comparison =====

proptest! {
    #[test]
    fn partition_law(assignments in arb_assignments(true), target in arb_value()) {
        let (bsi, _) = make_pair(&assignments);

        let eq = bsi.compare_value(0, Operation::Eq, target, 0, None);
        let lt = bsi.compare_value(0, Operation::Lt, target, 0, None);
        let gt = bsi.compare_value(0, Operation::Gt, target, 0, None);

        prop_assert!((&eq & &lt).is_empty());
        prop_assert!((&eq & &gt).is_empty());
        prop_assert!((&lt & &gt).is_empty());
        prop_assert_eq!(&(&eq | &lt) | &gt, bsi.get_existence_bitmap().clone());
    }

    #[test]
    fn compare_matches_model(
        assignments in arb_assignments(true),
        target in arb_value(),
        parallelism in 0usize..6,
    ) {
        let (bsi, model) = make_pair(&assignments);

        let cases: [(Operation, fn(i64, i64) -> bool); 6] = [
            (Operation::Eq, |v, t| v == t),
            (Operation::Ne, |v, t| v != t),
            (Operation::Lt, |v, t| v < t),
            (Operation::Le, |v, t| v <= t),
            (Operation::Gt, |v, t| v > t),
            (Operation::Ge, |v, t| v >= t),
        ];
        for (op, predicate) in cases {
            let expected = model_rows(&model, |v| predicate(v, target));
            let actual = bsi.compare_value(parallelism, op, target, 0, None);
            prop_assert_eq!(actual, expected, "{:?} {}", op, target);
        }
    }

    #[test]
    fn range_is_ge_and_le(
        assignments in arb_assignments(true),
        a in arb_value(),
        b in arb_value(),
        filter in arb_filter(),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (bsi, _) = make_pair(&assignments);
        let filter = filter.map(|rows| Bitmap::of(&rows));

        let range = bsi.compare_value(0, Operation::Range, lo, hi, filter.as_ref());
        let ge = bsi.compare_value(0, Operation::Ge, lo, 0, filter.as_ref());
        let le = bsi.compare_value(0, Operation::Le, hi, 0, filter.as_ref());
        prop_assert_eq!(range, &ge & &le);
    }

    #[test]
    fn batch_equal_is_union_of_eq(
        assignments in arb_assignments(true),
        targets in proptest::collection::vec(arb_value(), 0..8),
        parallelism in 0usize..4,
    ) {
        let (bsi, _) = make_pair(&assignments);

        let mut expected = Bitmap::new();
        for &target in &targets {
            expected |= bsi.compare_value(0, Operation::Eq, target, 0, None);
        }
        prop_assert_eq!(bsi.batch_equal(parallelism, &targets), expected);
    }

    #[test]
    fn min_max_matches_model(
        assignments in arb_assignments(true),
        filter in arb_filter(),
        parallelism in 0usize..4,
    ) {
        let (bsi, model) = make_pair(&assignments);
        let filter = filter.map(|rows| Bitmap::of(&rows));

        let values: Vec<i64> = model
            .iter()
            .filter(|&(row, _)| filter.as_ref().is_none_or(|f| f.contains(*row)))
            .map(|(_, &value)| value)
            .collect();

        prop_assert_eq!(
            bsi.min_max(parallelism, MinMax::Min, filter.as_ref()),
            values.iter().copied().min()
        );
        prop_assert_eq!(
            bsi.min_max(parallelism, MinMax::Max, filter.as_ref()),
            values.iter().copied().max()
        );
    }
}

// ===== Aggregation =====

proptest! {
    #[test]
    fn sum_matches_naive_sum(assignments in arb_assignments(true), filter in arb_filter()) {
        let (bsi, model) = make_pair(&assignments);
        let filter = filter.map(|rows| Bitmap::of(&rows));

        let (sum, count) = bsi.sum(filter.as_ref());
        let selected: Vec<i64> = model
            .iter()
            .filter(|&(row, _)| filter.as_ref().is_none_or(|f| f.contains(*row)))
            .map(|(_, &value)| value)
            .collect();

        prop_assert_eq!(count, selected.len() as u64);
        prop_assert_eq!(sum, selected.iter().fold(0i64, |acc, &v| acc.wrapping_add(v)));
    }

    #[test]
    fn histogram_matches_model(
        assignments in arb_assignments(false),
        parallelism in 0usize..5,
    ) {
        let (bsi, model) = make_pair(&assignments);

        let mut counts: BTreeMap<u64, i64> = BTreeMap::new();
        for &value in model.values() {
            *counts.entry(value as u64).or_default() += 1;
        }

        let histogram = bsi.transpose_with_counts(parallelism, None);
        prop_assert!(histogram.iter().eq(counts.into_iter()));
        prop_assert_eq!(histogram.sum(None).0, model.len() as i64);
        prop_assert_eq!(histogram.get_existence_bitmap(), &bsi.transpose());
    }
}

// ===== Arithmetic & merge =====

proptest! {
    #[test]
    fn add_matches_scalar_add(a in arb_assignments(true), b in arb_assignments(true)) {
        let (mut left, left_model) = make_pair(&a);
        let (right, right_model) = make_pair(&b);

        let mut right_plus_left = right.clone();
        right_plus_left.add(&left);
        left.add(&right);

        for row in 0..MAX_ROW {
            let expected = match (left_model.get(&row), right_model.get(&row)) {
                (None, None) => None,
                (x, y) => Some(x.copied().unwrap_or(0).wrapping_add(y.copied().unwrap_or(0))),
            };
            prop_assert_eq!(left.get_value(row), expected, "row {}", row);
            prop_assert_eq!(right_plus_left.get_value(row), expected, "row {}", row);
        }
    }

    #[test]
    fn increment_matches_model(
        assignments in arb_assignments(true),
        rows in proptest::collection::vec(0..MAX_ROW, 0..50),
    ) {
        let (mut bsi, mut model) = make_pair(&assignments);

        let filter = Bitmap::of(&rows);
        bsi.increment(&filter);
        for row in &filter {
            let value = model.entry(row).or_insert(0);
            *value = value.wrapping_add(1);
        }

        prop_assert!(bsi.iter().eq(model.into_iter()));
    }

    #[test]
    fn par_or_of_disjoint_halves(
        assignments in arb_assignments(true),
        parallelism in 0usize..5,
    ) {
        let (bsi, model) = make_pair(&assignments);

        let even: Bitmap = (0..MAX_ROW).filter(|row| row % 2 == 0).collect();
        let odd: Bitmap = (0..MAX_ROW).filter(|row| row % 2 == 1).collect();

        let mut merged = bsi.new_bsi_retain_set(&even);
        merged.par_or(parallelism, &bsi.new_bsi_retain_set(&odd));

        prop_assert!(merged.iter().eq(model.into_iter()));
    }
}

// ===== Serialization =====

proptest! {
    #[test]
    fn marshal_round_trip(assignments in arb_assignments(true)) {
        let (bsi, _) = make_pair(&assignments);

        let decoded = Bsi::from_buffers(&bsi.marshal_binary().unwrap()).unwrap();
        prop_assert_eq!(decoded.bit_count(), bsi.bit_count());
        prop_assert_eq!(decoded.get_existence_bitmap(), bsi.get_existence_bitmap());
        prop_assert!(decoded.iter().eq(bsi.iter()));
    }
}
