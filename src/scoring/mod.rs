//! Normalization and aggregation engine.
//!
//! Raw measurements are rescaled column by column onto a 0–100 sub-score
//! scale, then each record's sub-scores are combined with a weight table
//! into a single composite score.

pub mod aggregate;
pub mod normalize;
pub mod ranges;
pub mod utility;
pub mod weights;

pub use aggregate::{SubScores, aggregate};
pub use normalize::normalize;
pub use ranges::{Range, RangeSource};
pub use weights::WeightSet;
