use crate::records::RowError;
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Benchmark categories, each backed by its own CSV file in the results directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Container start latency (runtime, value)
    Startup,
    /// Memory overhead per container count (runtime, metric, value)
    Memory,
    /// CPU-bound loop timing (runtime, value)
    Cpu,
    /// Disk write throughput per access mode (runtime, mode, mb_per_sec)
    Io,
    /// Memory and start time while scaling out (runtime, count, memory_mb, time_seconds)
    Scale,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Startup,
            Category::Memory,
            Category::Cpu,
            Category::Io,
            Category::Scale,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Startup => "startup",
            Category::Memory => "memory",
            Category::Cpu => "cpu",
            Category::Io => "io",
            Category::Scale => "scale",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Startup => "startup.csv",
            Category::Memory => "memory.csv",
            Category::Cpu => "cpu.csv",
            Category::Io => "io.csv",
            Category::Scale => "scale.csv",
        }
    }
}

/// Rows of one CSV file, keyed by the column names of its header row
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    /// Raw value of `column` in data row `row`, if both exist
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Deserialize a single data row into a typed record
    pub fn parse_row<T: DeserializeOwned>(&self, row: usize) -> Result<T, RowError> {
        let record = self.rows.get(row).ok_or(RowError::OutOfRange { row })?;
        record
            .deserialize(Some(&self.headers))
            .map_err(|source| RowError::Malformed { row, source })
    }

    /// Deserialize every data row, dropping the ones that don't fit `T`.
    pub fn rows<T: DeserializeOwned>(&self) -> Vec<T> {
        (0..self.rows.len())
            .filter_map(|row| match self.parse_row(row) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    debug!("Dropping {}", err);
                    None
                }
            })
            .collect()
    }
}

/// Parse CSV text with a header row. Fields are trimmed and ragged rows are kept;
/// rows the CSV reader itself rejects are dropped.
pub fn read_table<R: io::Read>(reader: R) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("Failed to read CSV header")?.clone();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        match result {
            Ok(record) => rows.push(record),
            Err(err) => debug!("Skipping unreadable row {}: {}", idx, err),
        }
    }

    Ok(Table { headers, rows })
}

/// Load the CSV file for `category` from the results directory.
///
/// A missing file is reported on stdout and yields an empty table; so does a
/// file that exists but can't be read. Neither is an error for the caller.
pub fn load_table(results_dir: &Path, category: Category) -> Table {
    let path = results_dir.join(category.file_name());
    if !path.exists() {
        println!("  File not found: {}", path.display());
        return Table::default();
    }

    let table = std::fs::File::open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))
        .and_then(read_table);

    match table {
        Ok(table) => {
            debug!(
                category = category.name(),
                rows = table.len(),
                "Loaded {}",
                path.display()
            );
            table
        }
        Err(err) => {
            warn!("Ignoring {}: {:#}", path.display(), err);
            Table::default()
        }
    }
}
