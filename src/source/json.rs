//! JSON documents (record arrays or column-oriented objects)

use super::Location;
use crate::client::ApiClient;
use crate::etl::Extractor;
use crate::table::Table;
use eyre::{Context, Result};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeSet;

/// Read a JSON document into a table
pub struct JsonExtractor {
    client: ApiClient,
    location: Location,
}

impl JsonExtractor {
    pub fn new(client: ApiClient, location: Location) -> Self {
        Self { client, location }
    }
}

impl Extractor for JsonExtractor {
    async fn extract(&self) -> Result<Table> {
        let bytes = self.location.read(&self.client).await?;
        let document: JsonValue = serde_json::from_slice(&bytes)
            .with_context(|| format!("Invalid JSON document: {}", self.location))?;
        parse_json_table(document)
            .with_context(|| format!("Unsupported JSON layout: {}", self.location))
    }
}

/// Convert a JSON document into a table
///
/// Accepts an array of record objects, or an object mapping each column to
/// `{row_index: value}`. Row indices are ordered numerically.
pub fn parse_json_table(document: JsonValue) -> Result<Table> {
    match document {
        JsonValue::Array(items) => {
            let records = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    JsonValue::Object(record) => Ok(record),
                    other => Err(eyre::eyre!("Item {} is not an object: {}", i, other)),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Table::from_records(records))
        }
        JsonValue::Object(columns) => from_columns(columns),
        other => eyre::bail!("Expected an array or object, found: {}", other),
    }
}

fn from_columns(columns: Map<String, JsonValue>) -> Result<Table> {
    let mut names = Vec::with_capacity(columns.len());
    let mut cells: Vec<(String, Map<String, JsonValue>)> = Vec::with_capacity(columns.len());
    for (name, column) in columns {
        match column {
            JsonValue::Object(values) => {
                names.push(name.clone());
                cells.push((name, values));
            }
            other => eyre::bail!("Column '{}' is not an object of values: {}", name, other),
        }
    }

    let indices: BTreeSet<(u64, String)> = cells
        .iter()
        .flat_map(|(_, values)| values.keys())
        .map(|key| (key.parse().unwrap_or(u64::MAX), key.clone()))
        .collect();

    let records = indices
        .iter()
        .map(|(_, index)| {
            cells
                .iter_mut()
                .filter_map(|(name, values)| values.remove(index).map(|v| (name.clone(), v)))
                .collect::<Map<_, _>>()
        })
        .collect();
    Ok(Table::from_records_with_columns(names, records))
}
