//! Value ranges used to rescale raw measurements, and parsing of range overrides.

use serde::Serialize;
use tracing::warn;

use crate::columns::Field;
use crate::error::RaterError;
use crate::scoring::utility::present_bounds;

/// The (min, max) bounds a raw column is rescaled against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

/// Where the range used for a column came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeSource {
    /// Given as an override.
    Supplied,
    /// Scanned from the present values of the column.
    Derived,
    /// The column had no present values.
    Fallback,
}

impl Range {
    /// Used when a column has no present values at all.
    pub const FALLBACK: Range = Range { min: 0.0, max: 1.0 };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range spanned by the present values, or [`Range::FALLBACK`].
    pub fn observed(values: &[Option<f64>]) -> Self {
        Self::observed_with_source(values).0
    }

    pub(crate) fn observed_with_source(values: &[Option<f64>]) -> (Self, RangeSource) {
        match present_bounds(values) {
            Some((min, max)) => (Range { min, max }, RangeSource::Derived),
            None => (Self::FALLBACK, RangeSource::Fallback),
        }
    }

    /// Resolves the range for a column: the supplied one if any, otherwise derived.
    pub fn resolve(values: &[Option<f64>], supplied: Option<Range>) -> (Self, RangeSource) {
        match supplied {
            Some(range) => (range, RangeSource::Supplied),
            None => Self::observed_with_source(values),
        }
    }

    /// True when the range cannot discriminate between values.
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn is_reversed(&self) -> bool {
        self.min > self.max
    }
}

/// Parses a `FIELD:MIN:MAX` range override.
///
/// `FIELD` is a raw column name such as `aod`. Reversed bounds are accepted
/// unchanged.
pub fn parse_range_override(arg: &str) -> Result<(Field, Range), RaterError> {
    let parts: Vec<&str> = arg.split(':').collect();
    let [name, min, max] = parts.as_slice() else {
        return Err(RaterError::config(format!(
            "range override '{arg}' must have the form FIELD:MIN:MAX"
        )));
    };
    let min = parse_bound(arg, min)?;
    let max = parse_bound(arg, max)?;
    range_override(name.trim(), min, max)
}

/// Validates a single override triple once its bounds are numbers.
pub fn range_override(name: &str, min: f64, max: f64) -> Result<(Field, Range), RaterError> {
    let field = Field::from_raw_column(name).ok_or_else(|| {
        RaterError::config(format!("range override names unknown column '{name}'"))
    })?;
    if !min.is_finite() || !max.is_finite() {
        return Err(RaterError::config(format!(
            "range override for '{name}' must have finite bounds"
        )));
    }
    let range = Range::new(min, max);
    if range.is_reversed() {
        warn!(
            column = name,
            min, max, "Range override has min > max; scores for this column run backwards"
        );
    }
    Ok((field, range))
}

fn parse_bound(arg: &str, raw: &str) -> Result<f64, RaterError> {
    raw.trim().parse::<f64>().map_err(|_| {
        RaterError::config(format!(
            "range override '{arg}' has a non-numeric bound '{raw}'"
        ))
    })
}
