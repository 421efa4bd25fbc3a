//! CSV file operations

use crate::etl::{Extractor, Loader};
use crate::table::{Table, Value};

use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// Parse CSV bytes into a table
///
/// Empty fields become `Null`. With `infer_types`, a column whose non-empty
/// fields all parse as integers becomes `Integer`, one whose fields all parse
/// as numbers becomes `Float`; everything else stays `Text`. With
/// `index_column`, the leading column (a row index written by an earlier
/// export) is discarded.
pub fn parse_csv(content: &[u8], index_column: bool, infer_types: bool) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(false)
        .from_reader(content);

    let skip = usize::from(index_column);
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .skip(skip)
        .map(str::to_string)
        .collect();

    let mut table = Table::new(headers);
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse CSV row {}", line + 1))?;
        let row = record
            .iter()
            .skip(skip)
            .map(|field| match field {
                "" => Value::Null,
                text => Value::Text(text.to_string()),
            })
            .collect();
        table.push_row(row)?;
    }

    if infer_types {
        table = infer_numeric_columns(table)?;
    }
    Ok(table)
}

fn infer_numeric_columns(mut table: Table) -> Result<Table> {
    let names: Vec<String> = table.column_names().iter().map(|s| s.to_string()).collect();
    for name in names {
        let cells = table.column(&name)?;
        let texts: Vec<&str> = cells.iter().filter_map(|v| v.as_str()).collect();
        if texts.is_empty() {
            continue;
        }

        if texts.iter().all(|t| t.parse::<i64>().is_ok()) {
            table = table.map_column(&name, |v| match v {
                Value::Text(t) => t.parse::<i64>().map(Value::Integer).unwrap_or(Value::Text(t)),
                other => other,
            })?;
        } else if texts.iter().all(|t| t.parse::<f64>().is_ok()) {
            table = table.map_column(&name, |v| match v {
                Value::Text(t) => t.parse::<f64>().map(Value::Float).unwrap_or(Value::Text(t)),
                other => other,
            })?;
        }
    }
    Ok(table)
}

/// Read a table from a CSV file
pub struct CsvReader {
    path: PathBuf,
    index_column: bool,
    infer_types: bool,
}

impl CsvReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            index_column: false,
            infer_types: true,
        }
    }

    /// Discard the leading index column
    pub fn with_index_column(mut self, index_column: bool) -> Self {
        self.index_column = index_column;
        self
    }

    /// Keep every field as text instead of inferring numeric columns
    pub fn with_raw_text(mut self) -> Self {
        self.infer_types = false;
        self
    }

    /// Read the whole file
    pub fn read(&self) -> Result<Table> {
        let content = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read CSV file: {}", self.path.display()))?;
        parse_csv(&content, self.index_column, self.infer_types)
            .with_context(|| format!("Failed to parse CSV file: {}", self.path.display()))
    }
}

impl Extractor for CsvReader {
    async fn extract(&self) -> Result<Table> {
        self.read()
    }
}

/// Write a table to a CSV file
pub struct CsvWriter {
    path: PathBuf,
}

impl CsvWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header and every row, replacing any existing file
    pub fn write(&self, table: &Table) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut writer = csv::Writer::from_path(&self.path)
            .with_context(|| format!("Failed to create CSV file: {}", self.path.display()))?;

        writer.write_record(table.column_names())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write CSV file: {}", self.path.display()))?;

        Ok(())
    }
}

impl Loader for CsvWriter {
    async fn load(&self, table: Table) -> Result<usize> {
        self.write(&table)?;
        Ok(table.len())
    }
}
