//! Scores a whole table: normalize each column, aggregate each row, and lay
//! out the output columns.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::columns::{COMPOSITE_COLUMN, Field, position};
use crate::config::ScoringConfig;
use crate::scoring::normalize::{SUB_SCORE_PRECISION, normalize};
use crate::scoring::utility::round_to;
use crate::scoring::{Range, RangeSource, SubScores, WeightSet, aggregate};
use crate::table::{RawColumn, Record, Table, parse_cell};

/// Everything that controls a scoring run besides the input table.
#[derive(Debug, Clone)]
pub struct ScoreOptions {
    pub config: ScoringConfig,
    /// Reuse present values from sub-score columns already in the input.
    pub keep_existing_scores: bool,
    pub id_column: String,
    pub label_column: String,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            config: ScoringConfig::default(),
            keep_existing_scores: false,
            id_column: "id".to_string(),
            label_column: "label".to_string(),
        }
    }
}

/// One output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Passed through from the input.
    Text(String),
    Number(f64),
    Missing,
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Missing, Cell::Number)
    }
}

/// How one raw column was rescaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnReport {
    pub range: Range,
    pub source: RangeSource,
    pub present: usize,
    pub unparseable: usize,
    /// Sub-scores taken from an existing column instead of computed.
    pub reused: usize,
    /// Rows that ended up with a sub-score, computed or reused.
    pub scored: usize,
}

/// A scored record.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: Record,
    pub scores: SubScores,
    pub composite: f64,
}

/// The input table with sub-score and composite columns in place.
#[derive(Debug, Clone)]
pub struct ScoredTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub records: Vec<ScoredRecord>,
    pub columns: BTreeMap<Field, ColumnReport>,
    pub weights: WeightSet,
}

/// Scores every row of `table`.
///
/// Sub-score and composite columns already present in the input are
/// overwritten where they stand; the rest are appended in the order
/// `commute_score`, `flood_score`, `pollution_score`, `density_score`,
/// `green_score`, `livability_score`.
#[tracing::instrument(skip_all, fields(rows = table.rows.len()))]
pub fn score_table(table: &Table, options: &ScoreOptions) -> ScoredTable {
    let raw: [RawColumn; 5] = Field::ALL.map(|f| table.raw_column(f));

    let mut columns = BTreeMap::new();
    let mut sub_scores: [Vec<Option<f64>>; 5] = Default::default();
    for field in Field::ALL {
        let spec = field.spec();
        let values = &raw[field.index()].values;
        let (range, source) = Range::resolve(values, options.config.ranges.get(&field).copied());
        debug!(
            column = spec.raw_column,
            min = range.min,
            max = range.max,
            source = ?source,
            "Range resolved"
        );

        let mut scores = normalize(values, spec.higher_is_better, Some(range));
        let reused = if options.keep_existing_scores {
            reuse_existing(table, spec.score_column, &mut scores)
        } else {
            0
        };

        columns.insert(
            field,
            ColumnReport {
                range,
                source,
                present: values.iter().flatten().count(),
                unparseable: raw[field.index()].unparseable,
                reused,
                scored: scores.iter().flatten().count(),
            },
        );
        sub_scores[field.index()] = scores;
    }

    let weights = options.config.weights;
    let records: Vec<ScoredRecord> = table
        .records(&options.id_column, &options.label_column, &raw)
        .into_iter()
        .enumerate()
        .map(|(row, record)| {
            let scores: SubScores = std::array::from_fn(|i| sub_scores[i][row]);
            ScoredRecord {
                composite: aggregate(&scores, &weights),
                scores,
                record,
            }
        })
        .collect();

    let (headers, rows) = lay_out(table, &records);
    info!(rows = records.len(), "Table scored");

    ScoredTable {
        headers,
        rows,
        records,
        columns,
        weights,
    }
}

/// Replaces computed scores with present values from an existing column.
///
/// Reused values are clamped to [0, 100] like computed ones.
fn reuse_existing(table: &Table, score_column: &str, scores: &mut [Option<f64>]) -> usize {
    let Some(col) = position(&table.headers, score_column) else {
        return 0;
    };
    let mut reused = 0;
    for (row, score) in scores.iter_mut().enumerate() {
        if let Ok(Some(existing)) = parse_cell(table.cell(row, col)) {
            *score = Some(round_to(existing.clamp(0.0, 100.0), SUB_SCORE_PRECISION));
            reused += 1;
        }
    }
    debug!(column = score_column, reused, "Existing sub-scores kept");
    reused
}

fn lay_out(table: &Table, records: &[ScoredRecord]) -> (Vec<String>, Vec<Vec<Cell>>) {
    let mut headers = table.headers.clone();
    let mut slot = |name: &str| match position(&headers, name) {
        Some(col) => col,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    };
    let score_cols = Field::ALL.map(|f| slot(f.spec().score_column));
    let composite_col = slot(COMPOSITE_COLUMN);

    let rows = table
        .rows
        .iter()
        .zip(records)
        .map(|(input, scored)| {
            let mut row: Vec<Cell> = input.iter().cloned().map(Cell::Text).collect();
            row.resize(headers.len(), Cell::Missing);
            for field in Field::ALL {
                row[score_cols[field.index()]] = scored.scores[field.index()].into();
            }
            row[composite_col] = Cell::Number(scored.composite);
            row
        })
        .collect();

    (headers, rows)
}
