//! Linear rescaling of raw measurements onto the 0–100 sub-score scale.

use crate::scoring::ranges::Range;
use crate::scoring::utility::round_to;

/// Decimal places kept on every sub-score.
pub const SUB_SCORE_PRECISION: i32 = 3;

/// Score given to every present value when the range is degenerate.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Converts one raw column into sub-scores.
///
/// When `range` is `None` it is derived from the present values (see
/// [`Range::observed`]). Missing inputs stay missing; present inputs outside
/// the range are clamped to [0, 100]. The output keeps the input order.
pub fn normalize(
    values: &[Option<f64>],
    higher_is_better: bool,
    range: Option<Range>,
) -> Vec<Option<f64>> {
    let range = range.unwrap_or_else(|| Range::observed(values));
    values
        .iter()
        .map(|v| v.map(|v| normalize_value(v, higher_is_better, range)))
        .collect()
}

/// Sub-score for a single present value against a fixed range.
pub fn normalize_value(value: f64, higher_is_better: bool, range: Range) -> f64 {
    if range.is_degenerate() {
        return NEUTRAL_SCORE;
    }
    let span = range.max - range.min;
    let fraction = if higher_is_better {
        (value - range.min) / span
    } else {
        (range.max - value) / span
    };
    round_to((fraction * 100.0).clamp(0.0, 100.0), SUB_SCORE_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lower_is_better_endpoints() {
        let scores = normalize(&[Some(18.0), Some(50.0), Some(34.0)], false, None);
        assert_eq!(scores, vec![Some(100.0), Some(0.0), Some(50.0)]);
    }

    #[test]
    fn test_flood_example() {
        let range = Range::new(2.0, 80.0);
        assert_eq!(normalize_value(12.0, false, range), 87.179);
    }

    #[test]
    fn test_higher_is_better() {
        let scores = normalize(&[Some(0.0), Some(0.15), Some(0.6)], true, Some(Range::new(0.0, 0.6)));
        assert_eq!(scores, vec![Some(0.0), Some(25.0), Some(100.0)]);
    }

    #[test]
    fn test_missing_positions_preserved() {
        let scores = normalize(&[None, Some(1.0), None, Some(3.0)], true, None);
        assert_eq!(scores, vec![None, Some(0.0), None, Some(100.0)]);
    }

    #[test]
    fn test_degenerate_range_is_neutral() {
        let scores = normalize(&[Some(7.0), None, Some(7.0)], false, None);
        assert_eq!(scores, vec![Some(50.0), None, Some(50.0)]);

        let supplied = normalize(&[Some(1.0), Some(99.0)], true, Some(Range::new(5.0, 5.0)));
        assert_eq!(supplied, vec![Some(50.0), Some(50.0)]);
    }

    #[test]
    fn test_all_missing_column() {
        let scores = normalize(&[None, None, None], true, None);
        assert_eq!(scores, vec![None, None, None]);
    }

    #[test]
    fn test_empty_column() {
        assert!(normalize(&[], false, None).is_empty());
    }

    #[test]
    fn test_values_outside_supplied_range_are_clamped() {
        let range = Range::new(10.0, 20.0);
        let scores = normalize(&[Some(5.0), Some(25.0)], true, Some(range));
        assert_eq!(scores, vec![Some(0.0), Some(100.0)]);
        let scores = normalize(&[Some(5.0), Some(25.0)], false, Some(range));
        assert_eq!(scores, vec![Some(100.0), Some(0.0)]);
    }

    #[test]
    fn test_reversed_range_runs_backwards() {
        // min > max flips the slope; values are still clamped.
        let range = Range::new(20.0, 10.0);
        assert_eq!(normalize_value(12.0, true, range), 80.0);
        assert_eq!(normalize_value(30.0, true, range), 0.0);
    }

    proptest! {
        #[test]
        fn prop_scores_stay_in_bounds(
            values in prop::collection::vec(prop::option::of(-1.0e6f64..1.0e6), 0..64),
            higher_is_better in any::<bool>(),
        ) {
            let scores = normalize(&values, higher_is_better, None);
            prop_assert_eq!(scores.len(), values.len());
            for (raw, score) in values.iter().zip(&scores) {
                prop_assert_eq!(raw.is_some(), score.is_some());
                if let Some(s) = score {
                    prop_assert!((0.0..=100.0).contains(s));
                }
            }
        }

        #[test]
        fn prop_direction_is_monotone(
            a in -2.0e3f64..2.0e3,
            b in -2.0e3f64..2.0e3,
            lo in -1.0e3f64..0.0,
            hi in 1.0f64..1.0e3,
        ) {
            let (x, y) = (a.min(b), a.max(b));
            let range = Range::new(lo, hi);
            prop_assert!(normalize_value(x, true, range) <= normalize_value(y, true, range));
            prop_assert!(normalize_value(x, false, range) >= normalize_value(y, false, range));
        }
    }
}
