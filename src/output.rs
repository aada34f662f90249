//! Output serialization for scored tables.
//!
//! Supports CSV (one row per record) and JSON (an array of objects whose keys
//! follow the column order), optionally gzip-compressed.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use tracing::{debug, info};

use crate::pipeline::{Cell, ScoredTable};

impl Cell {
    /// CSV rendering: text as read, numbers in shortest form, missing as empty.
    pub fn to_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => v.to_string(),
            Cell::Missing => String::new(),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(v) => serializer.serialize_f64(*v),
            Cell::Missing => serializer.serialize_none(),
        }
    }
}

/// One row as a JSON object, keys in column order.
struct RowObject<'a> {
    headers: &'a [String],
    cells: &'a [Cell],
}

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, cell) in self.headers.iter().zip(self.cells) {
            map.serialize_entry(header, cell)?;
        }
        map.end()
    }
}

struct Rows<'a>(&'a ScoredTable);

impl Serialize for Rows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.rows.len()))?;
        for cells in &self.0.rows {
            seq.serialize_element(&RowObject {
                headers: &self.0.headers,
                cells,
            })?;
        }
        seq.end()
    }
}

/// Writes the scored table as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, table: &ScoredTable) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::to_field))?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the scored table as a pretty-printed JSON array of objects.
pub fn write_json<W: Write>(writer: W, table: &ScoredTable) -> Result<()> {
    serde_json::to_writer_pretty(writer, &Rows(table))?;
    Ok(())
}

/// Path actually written for `path`: `.gz` is appended when compressing.
pub fn output_path(path: &Path, gzip: bool) -> PathBuf {
    if gzip {
        let mut name = path.as_os_str().to_owned();
        name.push(".gz");
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    }
}

/// Writes `bytes` to `path`, gzip-compressing them first if asked.
///
/// Returns the path written.
pub fn persist(path: &Path, bytes: Vec<u8>, gzip: bool) -> Result<PathBuf> {
    let target = output_path(path, gzip);
    let body = if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&bytes)?;
        encoder.finish()?
    } else {
        bytes
    };

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, &body)
        .with_context(|| format!("failed to write {}", target.display()))?;
    debug!(path = %target.display(), bytes = body.len(), gzip, "Output written");
    Ok(target)
}

/// Renders the table in both formats, then writes the CSV and JSON files.
///
/// Both renderings are finished before anything is written.
#[tracing::instrument(skip(table), fields(csv = %csv_path.display(), json = %json_path.display()))]
pub fn write_outputs(
    table: &ScoredTable,
    csv_path: &Path,
    json_path: &Path,
    gzip: bool,
) -> Result<()> {
    let mut csv_bytes = Vec::new();
    write_csv(&mut csv_bytes, table)?;
    let mut json_bytes = Vec::new();
    write_json(&mut json_bytes, table)?;

    let csv_written = persist(csv_path, csv_bytes, gzip)?;
    let json_written = persist(json_path, json_bytes, gzip)?;

    info!(
        csv = %csv_written.display(),
        json = %json_written.display(),
        rows = table.rows.len(),
        "Wrote scored table"
    );
    Ok(())
}
