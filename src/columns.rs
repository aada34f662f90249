//! The fixed table of recognized measurement columns.
//!
//! Each raw measurement maps to exactly one sub-score column. The table is
//! process-wide and never changes at runtime.

use serde::Serialize;

/// Name of the appended composite column.
pub const COMPOSITE_COLUMN: &str = "livability_score";

/// One of the five recognized measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Commute,
    Flood,
    Pollution,
    Density,
    Green,
}

/// Static scoring metadata for one raw column.
#[derive(Debug)]
pub struct ColumnSpec {
    pub field: Field,
    pub raw_column: &'static str,
    pub score_column: &'static str,
    pub label: &'static str,
    /// Whether a larger raw value is a better outcome.
    pub higher_is_better: bool,
    /// Alternate header names accepted for the raw column.
    pub aliases: &'static [&'static str],
}

pub static COLUMNS: [ColumnSpec; 5] = [
    ColumnSpec {
        field: Field::Commute,
        raw_column: "commute_minutes",
        score_column: "commute_score",
        label: "Commute time (minutes)",
        higher_is_better: false,
        aliases: &["commute_mins"],
    },
    ColumnSpec {
        field: Field::Flood,
        raw_column: "flood_mm_30d",
        score_column: "flood_score",
        label: "Precipitation over the last 30 days (mm)",
        higher_is_better: false,
        aliases: &[],
    },
    ColumnSpec {
        field: Field::Pollution,
        raw_column: "aod",
        score_column: "pollution_score",
        label: "Aerosol optical depth",
        higher_is_better: false,
        aliases: &[],
    },
    ColumnSpec {
        field: Field::Density,
        raw_column: "pop_density",
        score_column: "density_score",
        label: "Population density (per km2)",
        higher_is_better: false,
        aliases: &["density_per_km2"],
    },
    ColumnSpec {
        field: Field::Green,
        raw_column: "ndvi",
        score_column: "green_score",
        label: "Vegetation index (NDVI)",
        higher_is_better: true,
        aliases: &[],
    },
];

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Commute,
        Field::Flood,
        Field::Pollution,
        Field::Density,
        Field::Green,
    ];

    /// Position of this field in per-field arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static ColumnSpec {
        &COLUMNS[self.index()]
    }

    /// Looks up a field by its canonical raw column name.
    pub fn from_raw_column(name: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.spec().raw_column == name)
    }

    /// Looks up a field by its sub-score column name.
    pub fn from_score_column(name: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.spec().score_column == name)
    }

    /// Finds the column holding this field's raw values.
    ///
    /// The canonical name wins over an alias when both are present.
    pub fn locate_raw(self, headers: &[String]) -> Option<usize> {
        let spec = self.spec();
        position(headers, spec.raw_column).or_else(|| {
            spec.aliases
                .iter()
                .find_map(|alias| position(headers, alias))
        })
    }
}

/// Index of the first header equal to `name`.
pub fn position(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}
