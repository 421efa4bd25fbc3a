//! In-memory tables
//!
//! A [`Table`] is an ordered list of named, kind-tagged columns and a list of
//! rows. Every transforming operation takes the table by value and hands back
//! a new one, so callers never observe a half-applied change.

mod value;

pub use value::{ColumnKind, Value};

use eyre::{Result, eyre};
use serde_json::Map;

/// A named column with its kind tag
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Any,
        }
    }
}

/// Row-oriented table of [`Value`] cells
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with untagged columns
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names.into_iter().map(Column::new).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table and fill it with rows
    ///
    /// # Errors
    /// Returns an error if a row's width does not match the column count
    pub fn with_rows<I, S>(names: I, rows: Vec<Vec<Value>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(names);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Build a table from JSON records
    ///
    /// Columns appear in first-seen key order across all records; a record
    /// that lacks a key gets `Null` in that column.
    pub fn from_records(records: Vec<Map<String, serde_json::Value>>) -> Self {
        let mut names: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !names.iter().any(|n| n == key) {
                    names.push(key.clone());
                }
            }
        }
        Self::from_records_with_columns(names, records)
    }

    /// Build a table from JSON records with a known column order
    ///
    /// Keys not listed in `names` are ignored.
    pub fn from_records_with_columns(
        names: Vec<String>,
        records: Vec<Map<String, serde_json::Value>>,
    ) -> Self {
        let rows = records
            .into_iter()
            .map(|mut record| {
                names
                    .iter()
                    .map(|name| record.remove(name).map(Value::from_json).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self {
            columns: names.into_iter().map(Column::new).collect(),
            rows,
        }
    }

    /// Append a row
    ///
    /// # Errors
    /// Returns an error if the row's width does not match the column count
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            eyre::bail!(
                "Row has {} value(s) but table has {} column(s)",
                row.len(),
                self.columns.len()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Position of a column
    ///
    /// # Errors
    /// Returns an error naming the column if it is absent
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| eyre!("Column '{}' not found in table", name))
    }

    pub fn kind(&self, name: &str) -> Result<ColumnKind> {
        let idx = self.column_index(name)?;
        Ok(self.columns[idx].kind)
    }

    /// All cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Cell at `row` in column `name`
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name).ok()?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Keep rows for which the predicate holds
    pub fn retain_rows(mut self, mut keep: impl FnMut(&[Value]) -> bool) -> Self {
        self.rows.retain(|row| keep(row));
        self
    }

    /// Keep rows whose cell in column `name` satisfies the predicate
    pub fn filter_by(self, name: &str, mut keep: impl FnMut(&Value) -> bool) -> Result<Self> {
        let idx = self.column_index(name)?;
        Ok(self.retain_rows(|row| keep(&row[idx])))
    }

    /// Drop rows where every cell is null
    pub fn drop_empty_rows(self) -> Self {
        self.retain_rows(|row| !row.iter().all(Value::is_null))
    }

    /// Drop rows whose cell in column `name` is null
    pub fn drop_nulls_in(self, name: &str) -> Result<Self> {
        self.filter_by(name, |v| !v.is_null())
    }

    /// Replace every cell of column `name` with `f(cell)`
    pub fn map_column(mut self, name: &str, mut f: impl FnMut(Value) -> Value) -> Result<Self> {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            let cell = std::mem::replace(&mut row[idx], Value::Null);
            row[idx] = f(cell);
        }
        Ok(self)
    }

    /// Tag a column with a kind
    pub fn set_kind(mut self, name: &str, kind: ColumnKind) -> Result<Self> {
        let idx = self.column_index(name)?;
        self.columns[idx].kind = kind;
        Ok(self)
    }

    /// Tag several columns with the same kind
    pub fn tag(self, names: &[&str], kind: ColumnKind) -> Result<Self> {
        names
            .iter()
            .try_fold(self, |table, name| table.set_kind(name, kind))
    }

    pub fn rename_column(mut self, from: &str, to: &str) -> Result<Self> {
        let idx = self.column_index(from)?;
        if from != to && self.has_column(to) {
            eyre::bail!("Cannot rename '{}' to '{}': column already exists", from, to);
        }
        self.columns[idx].name = to.to_string();
        Ok(self)
    }

    /// Remove one column
    ///
    /// # Errors
    /// Returns an error if the column is absent
    pub fn drop_column(self, name: &str) -> Result<Self> {
        self.drop_columns(&[name])
    }

    /// Remove several columns; every named column must exist
    pub fn drop_columns(mut self, names: &[&str]) -> Result<Self> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !self.has_column(n))
            .collect();
        if !missing.is_empty() {
            eyre::bail!("Cannot drop missing column(s): {}", missing.join(", "));
        }

        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.name.as_str()))
            .collect();

        self.columns = self
            .columns
            .into_iter()
            .zip(&keep)
            .filter_map(|(c, k)| k.then_some(c))
            .collect();
        for row in &mut self.rows {
            let cells = std::mem::take(row);
            *row = cells
                .into_iter()
                .zip(&keep)
                .filter_map(|(v, k)| k.then_some(v))
                .collect();
        }
        Ok(self)
    }

    /// Kind to use when persisting a column
    ///
    /// Tagged columns report their tag. Untagged columns are inferred from
    /// their non-null cells: a single numeric, boolean or date variant wins,
    /// integers mixed with floats become `Float`, anything else is `Text`.
    pub fn storage_kind(&self, idx: usize) -> ColumnKind {
        let tagged = self.columns[idx].kind;
        if tagged != ColumnKind::Any {
            return tagged;
        }

        let mut inferred: Option<ColumnKind> = None;
        for row in &self.rows {
            let kind = match &row[idx] {
                Value::Null => continue,
                Value::Text(_) => return ColumnKind::Text,
                Value::Integer(_) => ColumnKind::Integer,
                Value::Float(_) => ColumnKind::Float,
                Value::Bool(_) => ColumnKind::Bool,
                Value::Date(_) => ColumnKind::Date,
            };
            inferred = match (inferred, kind) {
                (None, k) => Some(k),
                (Some(a), b) if a == b => Some(a),
                (Some(ColumnKind::Integer), ColumnKind::Float)
                | (Some(ColumnKind::Float), ColumnKind::Integer) => Some(ColumnKind::Float),
                _ => return ColumnKind::Text,
            };
        }
        inferred.unwrap_or(ColumnKind::Text)
    }
}
