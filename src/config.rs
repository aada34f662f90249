//! Scoring configuration: range and weight overrides from a JSON file and the
//! command line, validated up front.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::columns::Field;
use crate::error::RaterError;
use crate::scoring::ranges::{Range, parse_range_override, range_override};
use crate::scoring::weights::{WeightSet, parse_weight_override};

/// Overrides stored as a JSON object on disk:
/// ```json
/// {
///   "ranges": { "aod": [0.02, 0.6], "commute_minutes": [10, 70] },
///   "weights": { "green_score": 0.3 }
/// }
/// ```
/// Both keys are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    ranges: BTreeMap<String, Vec<f64>>,
    #[serde(default)]
    weights: BTreeMap<String, f64>,
}

impl ConfigFile {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, RaterError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RaterError::config(format!("config file {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
            .map_err(|e| RaterError::config(format!("config file {}: {e}", path.display())))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    fn range_overrides(&self) -> Result<Vec<(Field, Range)>, RaterError> {
        self.ranges
            .iter()
            .map(|(name, bounds)| match bounds.as_slice() {
                [min, max] => range_override(name, *min, *max),
                _ => Err(RaterError::config(format!(
                    "range for '{name}' must be [min, max], got {} value(s)",
                    bounds.len()
                ))),
            })
            .collect()
    }
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone, Default)]
pub struct ScoringConfig {
    /// Supplied ranges; fields not listed here derive theirs from the data.
    pub ranges: BTreeMap<Field, Range>,
    pub weights: WeightSet,
}

impl ScoringConfig {
    /// Merges an optional config file with `FIELD:MIN:MAX` and `NAME=VALUE`
    /// arguments. Arguments are applied after the file, so they win per key.
    ///
    /// # Errors
    ///
    /// Returns [`RaterError::InvalidConfiguration`] on the first malformed or
    /// unknown override.
    pub fn resolve(
        file: Option<&ConfigFile>,
        range_args: &[String],
        weight_args: &[String],
    ) -> Result<Self, RaterError> {
        let mut ranges = BTreeMap::new();
        if let Some(file) = file {
            ranges.extend(file.range_overrides()?);
        }
        for arg in range_args {
            let (field, range) = parse_range_override(arg)?;
            ranges.insert(field, range);
        }

        let mut weight_overrides: Vec<(String, f64)> = file
            .map(|f| f.weights.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();
        for arg in weight_args {
            weight_overrides.push(parse_weight_override(arg)?);
        }
        let weights =
            WeightSet::with_overrides(weight_overrides.iter().map(|(n, w)| (n.as_str(), *w)))?;

        debug!(supplied_ranges = ranges.len(), weights = ?weights, "Configuration resolved");
        Ok(Self { ranges, weights })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_defaults() {
        let config = ScoringConfig::resolve(None, &[], &[]).unwrap();
        assert!(config.ranges.is_empty());
        assert_eq!(config.weights, WeightSet::default());
    }

    #[test]
    fn test_resolve_cli_overrides() {
        let config = ScoringConfig::resolve(
            None,
            &args(&["aod:0.02:0.6", "ndvi:0:0.6"]),
            &args(&["green_score=0.15"]),
        )
        .unwrap();
        assert_eq!(config.ranges[&Field::Pollution], Range::new(0.02, 0.6));
        assert_eq!(config.ranges[&Field::Green], Range::new(0.0, 0.6));
    }

    #[test]
    fn test_cli_wins_over_file() {
        let file = ConfigFile::from_json(
            r#"{"ranges": {"aod": [0.0, 1.0]}, "weights": {"commute_score": 0.0}}"#,
        )
        .unwrap();
        let config = ScoringConfig::resolve(
            Some(&file),
            &args(&["aod:0.1:0.5"]),
            &args(&["commute_score=0.25"]),
        )
        .unwrap();
        assert_eq!(config.ranges[&Field::Pollution], Range::new(0.1, 0.5));
        assert_eq!(config.weights, WeightSet::default());
    }

    #[test]
    fn test_file_only() {
        let file = ConfigFile::from_json(r#"{"ranges": {"pop_density": [0, 40000]}}"#).unwrap();
        let config = ScoringConfig::resolve(Some(&file), &[], &[]).unwrap();
        assert_eq!(config.ranges[&Field::Density], Range::new(0.0, 40000.0));
    }

    #[test]
    fn test_file_range_wrong_arity() {
        let file = ConfigFile::from_json(r#"{"ranges": {"aod": [0.1]}}"#).unwrap();
        let err = ScoringConfig::resolve(Some(&file), &[], &[]).unwrap_err();
        assert!(matches!(err, RaterError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_file_rejects_unknown_keys_and_non_numbers() {
        assert!(ConfigFile::from_json(r#"{"colour": "blue"}"#).is_err());
        assert!(ConfigFile::from_json(r#"{"ranges": {"aod": ["low", 1]}}"#).is_err());
    }

    #[test]
    fn test_unknown_weight_in_file() {
        let file = ConfigFile::from_json(r#"{"weights": {"noise_score": 1.0}}"#).unwrap();
        let err = ScoringConfig::resolve(Some(&file), &[], &[]).unwrap_err();
        assert!(matches!(err, RaterError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_malformed_cli_args() {
        assert!(ScoringConfig::resolve(None, &args(&["aod:0.1"]), &[]).is_err());
        assert!(ScoringConfig::resolve(None, &[], &args(&["green_score"])).is_err());
    }

    #[test]
    fn test_weights_overflowing_when_summed() {
        let err = ScoringConfig::resolve(
            None,
            &[],
            &args(&["commute_score=1e308", "flood_score=1e308"]),
        )
        .unwrap_err();
        assert!(matches!(err, RaterError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_load_missing_file_is_invalid_configuration() {
        let err = ConfigFile::load(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, RaterError::InvalidConfiguration(_)));
    }
}
