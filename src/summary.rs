//! Run summary: the ranges, weights, and composite spread of one scoring run.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::output::persist;
use crate::pipeline::ScoredTable;
use crate::scoring::utility::{mean, stddev};
use crate::scoring::{RangeSource, WeightSet};

/// The range and coverage of one raw column in a run.
#[derive(Debug, Serialize)]
pub struct ColumnSummary {
    pub min: f64,
    pub max: f64,
    pub source: RangeSource,
    pub present: usize,
    pub unparseable: usize,
    pub reused: usize,
    pub scored: usize,
}

/// Spread of the composite score over all rows.
#[derive(Debug, Default, Serialize)]
pub struct CompositeStats {
    pub mean: f64,
    pub stddev: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// What a scoring run used and produced.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub input: String,
    pub rows: usize,
    pub columns: BTreeMap<&'static str, ColumnSummary>,
    pub weights: WeightSet,
    pub composite: CompositeStats,
}

impl RunSummary {
    pub fn from_scored(input: &str, table: &ScoredTable) -> Self {
        let columns = table
            .columns
            .iter()
            .map(|(field, report)| {
                (
                    field.spec().raw_column,
                    ColumnSummary {
                        min: report.range.min,
                        max: report.range.max,
                        source: report.source,
                        present: report.present,
                        unparseable: report.unparseable,
                        reused: report.reused,
                        scored: report.scored,
                    },
                )
            })
            .collect();

        let composites: Vec<f64> = table.records.iter().map(|r| r.composite).collect();
        let avg = mean(&composites);
        let composite = CompositeStats {
            mean: avg,
            stddev: stddev(&composites, avg),
            min: composites.iter().copied().reduce(f64::min),
            max: composites.iter().copied().reduce(f64::max),
        };

        RunSummary {
            generated_at: Utc::now(),
            input: input.to_string(),
            rows: table.records.len(),
            columns,
            weights: table.weights,
            composite,
        }
    }

    /// Writes the summary as pretty-printed JSON.
    pub fn write(&self, path: &Path, gzip: bool) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        persist(path, bytes, gzip)?;
        Ok(())
    }
}
