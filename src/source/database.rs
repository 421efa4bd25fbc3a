//! Tables read from the legacy PostgreSQL database

use crate::etl::Extractor;
use crate::table::Table;
use crate::target::quote_ident;
use eyre::{Context, Result};
use serde_json::Map;
use std::sync::Arc;
use tokio_postgres::Client;

/// Read a whole table from the source database
///
/// Each row is fetched as `row_to_json` text so every PostgreSQL type maps
/// onto a JSON value without per-type decoding; columns keep the table's
/// declared order.
pub struct DatabaseExtractor {
    client: Arc<Client>,
    table: String,
}

impl DatabaseExtractor {
    pub fn new(client: Arc<Client>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn column_names(&self) -> Result<Vec<String>> {
        let rows = self
            .client
            .query(
                "SELECT column_name::text FROM information_schema.columns \
                 WHERE table_schema = 'public' AND table_name = $1 \
                 ORDER BY ordinal_position",
                &[&self.table],
            )
            .await
            .with_context(|| format!("Failed to read columns of table '{}'", self.table))?;
        let names: Vec<String> = rows.iter().map(|row| row.get(0)).collect();
        if names.is_empty() {
            eyre::bail!("Table '{}' not found in the source database", self.table);
        }
        Ok(names)
    }
}

impl Extractor for DatabaseExtractor {
    async fn extract(&self) -> Result<Table> {
        let names = self.column_names().await?;
        let sql = format!("SELECT row_to_json(t)::text FROM {} t", quote_ident(&self.table));
        log::debug!("{}", sql);

        let rows = self
            .client
            .query(sql.as_str(), &[])
            .await
            .with_context(|| format!("Failed to read table '{}'", self.table))?;

        let records = rows
            .iter()
            .map(|row| {
                let text: String = row.get(0);
                serde_json::from_str::<Map<String, serde_json::Value>>(&text)
                    .with_context(|| format!("Invalid row from table '{}'", self.table))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Table::from_records_with_columns(names, records))
    }
}

/// Names of the base tables in the `public` schema, sorted
pub async fn list_tables(client: &Client) -> Result<Vec<String>> {
    let rows = client
        .query(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
            &[],
        )
        .await
        .context("Failed to list source tables")?;
    Ok(rows.iter().map(|row| row.get(0)).collect())
}
