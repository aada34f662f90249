use crate::columns::Field;
use crate::scoring::utility::round_to;
use crate::scoring::weights::WeightSet;

/// Decimal places kept on the composite score.
pub const COMPOSITE_PRECISION: i32 = 2;

/// The five sub-scores of one record, indexed by [`Field::index`].
///
/// `None` marks a sub-score whose raw value was missing.
pub type SubScores = [Option<f64>; 5];

/// Combines one record's sub-scores into the composite score.
///
/// A missing sub-score contributes 0 instead of making the composite missing,
/// so every record gets a composite.
pub fn aggregate(scores: &SubScores, weights: &WeightSet) -> f64 {
    let total = Field::ALL
        .into_iter()
        .map(|f| weights.get(f) * scores[f.index()].unwrap_or(0.0))
        .sum::<f64>();
    round_to(total, COMPOSITE_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_present_default_weights() {
        let scores = [Some(100.0), Some(87.179), Some(100.0), Some(100.0), Some(100.0)];
        assert_eq!(aggregate(&scores, &WeightSet::default()), 96.79);
    }

    #[test]
    fn test_missing_contributes_zero() {
        let scores = [Some(100.0), None, None, None, None];
        assert_eq!(aggregate(&scores, &WeightSet::default()), 25.0);
    }

    #[test]
    fn test_all_missing_is_zero_not_absent() {
        assert_eq!(aggregate(&[None; 5], &WeightSet::default()), 0.0);
    }

    #[test]
    fn test_extremes_stay_in_bounds() {
        let w = WeightSet::default();
        assert_eq!(aggregate(&[Some(100.0); 5], &w), 100.0);
        assert_eq!(aggregate(&[Some(0.0); 5], &w), 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let w = WeightSet::with_overrides([
            ("commute_score", 0.0),
            ("flood_score", 0.0),
            ("pollution_score", 0.0),
            ("density_score", 0.0),
            ("green_score", 1.0),
        ])
        .unwrap();
        let scores = [Some(10.0), Some(20.0), Some(30.0), Some(40.0), Some(57.143)];
        assert_eq!(aggregate(&scores, &w), 57.14);
    }

    #[test]
    fn test_all_zero_weights_give_zero() {
        let w = WeightSet::with_overrides([
            ("commute_score", 0.0),
            ("flood_score", 0.0),
            ("pollution_score", 0.0),
            ("density_score", 0.0),
            ("green_score", 0.0),
        ])
        .unwrap();
        assert_eq!(aggregate(&[Some(80.0); 5], &w), 0.0);
    }

    #[test]
    fn test_is_repeatable() {
        let scores = [Some(62.5), Some(100.0), Some(50.0), None, Some(57.143)];
        let w = WeightSet::default();
        let first = aggregate(&scores, &w);
        assert_eq!(first, 59.2);
        assert_eq!(aggregate(&scores, &w), first);
    }
}
