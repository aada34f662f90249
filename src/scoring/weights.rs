//! Weight table for combining sub-scores, and parsing of weight overrides.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, warn};

use crate::columns::Field;
use crate::error::RaterError;

/// Weights closer than this to summing to 1 are used without rescaling.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Default contribution of each sub-score to the composite, in [`Field`] order.
static DEFAULT_WEIGHTS: [(Field, f64); 5] = [
    (Field::Commute, 0.25),
    (Field::Flood, 0.25),
    (Field::Pollution, 0.20),
    (Field::Density, 0.15),
    (Field::Green, 0.15),
];

/// Per-run weights, one per sub-score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightSet {
    weights: [f64; 5],
}

impl Default for WeightSet {
    fn default() -> Self {
        let mut weights = [0.0; 5];
        for (field, w) in DEFAULT_WEIGHTS {
            weights[field.index()] = w;
        }
        Self { weights }
    }
}

impl WeightSet {
    /// Merges overrides into the default table and rescales the result.
    ///
    /// Overrides are `(sub-score name, weight)` pairs applied in order, so a
    /// later pair for the same name wins. The merged weights are rescaled to
    /// sum to 1 unless they already do within [`WEIGHT_TOLERANCE`]. An all-zero
    /// table is left as it is.
    pub fn with_overrides<'a, I>(overrides: I) -> Result<Self, RaterError>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut set = Self::default();
        for (name, weight) in overrides {
            let field = Field::from_score_column(name).ok_or_else(|| {
                RaterError::config(format!(
                    "unknown sub-score '{name}' in weight override (expected one of {})",
                    score_names().join(", ")
                ))
            })?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(RaterError::config(format!(
                    "weight for '{name}' must be a non-negative number, got {weight}"
                )));
            }
            set.weights[field.index()] = weight;
        }
        let total = set.total();
        if !total.is_finite() {
            return Err(RaterError::config(format!(
                "weights sum to {total}; use smaller values"
            )));
        }
        set.rescale();
        Ok(set)
    }

    fn rescale(&mut self) {
        let total = self.total();
        if total == 0.0 {
            warn!("All weights are zero; every composite score will be 0");
            return;
        }
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            debug!(total, "Rescaling weights to sum to 1");
            for w in &mut self.weights {
                *w /= total;
            }
        }
    }

    pub fn get(&self, field: Field) -> f64 {
        self.weights[field.index()]
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL.into_iter().map(|f| (f, self.get(f)))
    }
}

impl Serialize for WeightSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.weights.len()))?;
        for (field, w) in self.iter() {
            map.serialize_entry(field.spec().score_column, &w)?;
        }
        map.end()
    }
}

/// Parses a `NAME=VALUE` weight override, e.g. `green_score=0.3`.
///
/// The name is checked later, when the overrides are merged.
pub fn parse_weight_override(arg: &str) -> Result<(String, f64), RaterError> {
    let parts: Vec<&str> = arg.split('=').collect();
    let [name, value] = parts.as_slice() else {
        return Err(RaterError::config(format!(
            "weight override '{arg}' must have the form NAME=VALUE"
        )));
    };
    let value = value.trim().parse::<f64>().map_err(|_| {
        RaterError::config(format!(
            "weight override '{arg}' has a non-numeric value '{value}'"
        ))
    })?;
    Ok((name.trim().to_string(), value))
}

fn score_names() -> Vec<&'static str> {
    Field::ALL.iter().map(|f| f.spec().score_column).collect()
}
