//! CSV input: reading the listings table and extracting raw measurements.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::columns::{Field, position};
use crate::error::RaterError;

/// A header row plus string cells, exactly as read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One location's identity and raw measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub label: Option<String>,
    /// Raw values indexed by [`Field::index`].
    pub raw: [Option<f64>; 5],
}

/// Raw values of one field across all records, plus how many cells were unusable.
#[derive(Debug, Clone, Default)]
pub struct RawColumn {
    pub values: Vec<Option<f64>>,
    pub unparseable: usize,
}

/// Reads a CSV file with a header row.
///
/// # Errors
///
/// Returns [`RaterError::MissingRequiredInput`] if the file cannot be opened
/// or is not well-formed CSV.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<Table, RaterError> {
    let file = File::open(path)
        .map_err(|e| RaterError::input(format!("{}: {e}", path.display())))?;
    let table = parse_table(file)
        .map_err(|e| RaterError::input(format!("{}: {e}", path.display())))?;
    debug!(rows = table.rows.len(), columns = table.headers.len(), "Input table read");
    Ok(table)
}

/// Parses CSV from any reader. Every data row must have as many cells as the header.
pub fn parse_table<R: Read>(reader: R) -> Result<Table, csv::Error> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { headers, rows })
}

/// Parses one raw measurement cell.
///
/// Empty cells are missing. Cells that are not finite numbers are also
/// missing, and reported as `Err` so they can be counted.
pub(crate) fn parse_cell(cell: &str) -> Result<Option<f64>, ()> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(()),
    }
}

impl Table {
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map(String::as_str).unwrap_or("")
    }

    /// Raw values of `field`; all-missing when the table has no such column.
    pub fn raw_column(&self, field: Field) -> RawColumn {
        let Some(col) = field.locate_raw(&self.headers) else {
            debug!(column = field.spec().raw_column, "Column absent; treating as missing");
            return RawColumn {
                values: vec![None; self.rows.len()],
                unparseable: 0,
            };
        };

        let mut column = RawColumn::default();
        for row in 0..self.rows.len() {
            let value = parse_cell(self.cell(row, col)).unwrap_or_else(|()| {
                column.unparseable += 1;
                None
            });
            column.values.push(value);
        }

        if column.unparseable > 0 {
            warn!(
                column = %self.headers[col],
                count = column.unparseable,
                "Non-numeric cells treated as missing"
            );
        }
        column
    }

    /// Builds one [`Record`] per row.
    ///
    /// The identifier comes from `id_column`, or the 1-based row number when
    /// the table has no such column. Empty labels are dropped.
    pub fn records(&self, id_column: &str, label_column: &str, raw: &[RawColumn; 5]) -> Vec<Record> {
        let id_col = position(&self.headers, id_column);
        if id_col.is_none() {
            warn!(id_column, "Identifier column not found; using row numbers");
        }
        let label_col = position(&self.headers, label_column);

        (0..self.rows.len())
            .map(|row| Record {
                id: match id_col {
                    Some(col) => self.cell(row, col).to_string(),
                    None => (row + 1).to_string(),
                },
                label: label_col
                    .map(|col| self.cell(row, col).trim())
                    .filter(|l| !l.is_empty())
                    .map(str::to_string),
                raw: std::array::from_fn(|i| raw[i].values[row]),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,label,commute_mins,aod,ndvi
a,North,12,0.1,
b,,n/a,0.3,0.4
";

    #[test]
    fn test_parse_table() {
        let table = parse_table(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["id", "label", "commute_mins", "aod", "ndvi"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(1, 3), "0.3");
    }

    #[test]
    fn test_parse_table_ragged_row_fails() {
        assert!(parse_table("a,b\n1,2,3\n".as_bytes()).is_err());
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell(""), Ok(None));
        assert_eq!(parse_cell("  "), Ok(None));
        assert_eq!(parse_cell(" 4.5 "), Ok(Some(4.5)));
        assert_eq!(parse_cell("-3"), Ok(Some(-3.0)));
        assert_eq!(parse_cell("n/a"), Err(()));
        assert_eq!(parse_cell("NaN"), Err(()));
        assert_eq!(parse_cell("inf"), Err(()));
    }

    #[test]
    fn test_raw_column_via_alias_counts_unparseable() {
        let table = parse_table(SAMPLE.as_bytes()).unwrap();
        let col = table.raw_column(Field::Commute);
        assert_eq!(col.values, vec![Some(12.0), None]);
        assert_eq!(col.unparseable, 1);
    }

    #[test]
    fn test_raw_column_absent() {
        let table = parse_table(SAMPLE.as_bytes()).unwrap();
        let col = table.raw_column(Field::Flood);
        assert_eq!(col.values, vec![None, None]);
        assert_eq!(col.unparseable, 0);
    }

    #[test]
    fn test_records() {
        let table = parse_table(SAMPLE.as_bytes()).unwrap();
        let raw = Field::ALL.map(|f| table.raw_column(f));
        let records = table.records("id", "label", &raw);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].label.as_deref(), Some("North"));
        assert_eq!(records[0].raw, [Some(12.0), None, Some(0.1), None, None]);
        assert_eq!(records[1].label, None);
        assert_eq!(records[1].raw[Field::Green.index()], Some(0.4));
    }

    #[test]
    fn test_records_without_id_column_use_row_numbers() {
        let table = parse_table("aod\n0.2\n0.3\n".as_bytes()).unwrap();
        let raw = Field::ALL.map(|f| table.raw_column(f));
        let ids: Vec<_> = table.records("id", "label", &raw).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_read_table_missing_file() {
        let err = read_table(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, RaterError::MissingRequiredInput(_)));
    }
}
