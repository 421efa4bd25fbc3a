//! PostgreSQL loader
//!
//! Replaces the destination table on every load: the old table is dropped,
//! a new one is created from the column kinds, and the rows are inserted in
//! batches. All of it happens in one transaction, so a failed load leaves the
//! previous table in place.

use crate::etl::Loader;
use crate::table::{ColumnKind, Table, Value};
use chrono::NaiveDate;
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::Client;
use tokio_postgres::types::ToSql;

/// PostgreSQL caps a statement at 65535 bind parameters
const MAX_PARAMS: usize = 65_535;
const MAX_BATCH_ROWS: usize = 1_000;

type Param = Box<dyn ToSql + Sync + Send>;

/// Quote an identifier for PostgreSQL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column type used for a kind
pub fn pg_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Any | ColumnKind::Text | ColumnKind::Category => "TEXT",
        ColumnKind::Date => "DATE",
        ColumnKind::Float => "DOUBLE PRECISION",
        ColumnKind::Integer => "BIGINT",
        ColumnKind::Bool => "BOOLEAN",
    }
}

/// `CREATE TABLE` statement for a table's columns
pub fn create_table_sql(name: &str, table: &Table) -> String {
    let columns: Vec<String> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            format!(
                "{} {}",
                quote_ident(&column.name),
                pg_type(table.storage_kind(idx))
            )
        })
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(name), columns.join(", "))
}

/// Multi-row `INSERT` with numbered placeholders
pub fn insert_sql(name: &str, columns: &[&str], rows: usize) -> String {
    let width = columns.len();
    let quoted: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let tuples: Vec<String> = (0..rows)
        .map(|row| {
            let placeholders: Vec<String> = (1..=width)
                .map(|col| format!("${}", row * width + col))
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(name),
        quoted.join(", "),
        tuples.join(", ")
    )
}

/// Typed bind parameter for a cell stored in a column of `kind`
fn to_param(value: &Value, kind: ColumnKind) -> Param {
    match kind {
        ColumnKind::Date => Box::new(match value {
            Value::Date(d) => Some(*d),
            Value::Text(t) => NaiveDate::parse_from_str(t, "%Y-%m-%d").ok(),
            _ => None,
        }),
        ColumnKind::Float => Box::new(match value {
            Value::Text(t) => t.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        }),
        ColumnKind::Integer => Box::new(match value {
            Value::Integer(i) => Some(*i),
            Value::Text(t) => t.trim().parse::<i64>().ok(),
            _ => None,
        }),
        ColumnKind::Bool => Box::new(match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }),
        ColumnKind::Any | ColumnKind::Text | ColumnKind::Category => {
            Box::new((!value.is_null()).then(|| value.render().into_owned()))
        }
    }
}

/// Load a table into PostgreSQL, replacing any existing table of that name
pub struct PostgresLoader {
    client: Arc<Mutex<Client>>,
    table: String,
}

impl PostgresLoader {
    pub fn new(client: Arc<Mutex<Client>>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl Loader for PostgresLoader {
    async fn load(&self, table: Table) -> Result<usize> {
        let kinds: Vec<ColumnKind> = (0..table.width()).map(|i| table.storage_kind(i)).collect();
        let create = create_table_sql(&self.table, &table);
        let columns = table.column_names();
        let batch_rows = (MAX_PARAMS / columns.len().max(1)).clamp(1, MAX_BATCH_ROWS);

        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .context("Failed to start transaction")?;

        tx.batch_execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(&self.table)))
            .await
            .with_context(|| format!("Failed to drop table '{}'", self.table))?;
        log::debug!("{}", create);
        tx.batch_execute(&create)
            .await
            .with_context(|| format!("Failed to create table '{}'", self.table))?;

        let mut loaded = 0;
        if !columns.is_empty() {
            for chunk in table.rows().chunks(batch_rows) {
                let params: Vec<Param> = chunk
                    .iter()
                    .flat_map(|row| row.iter().zip(&kinds).map(|(v, k)| to_param(v, *k)))
                    .collect();
                let refs: Vec<&(dyn ToSql + Sync)> = params
                    .iter()
                    .map(|p| p.as_ref() as &(dyn ToSql + Sync))
                    .collect();

                let sql = insert_sql(&self.table, &columns, chunk.len());
                loaded += tx
                    .execute(sql.as_str(), &refs)
                    .await
                    .with_context(|| format!("Failed to insert into '{}'", self.table))?
                    as usize;
            }
        }

        tx.commit().await.context("Failed to commit transaction")?;
        log::info!(
            "Loaded {} rows into {}",
            loaded.green(),
            self.table.bright_black()
        );
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("weight_(kg)"), "\"weight_(kg)\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_create_table_uses_kinds() {
        let table = Table::with_rows(
            ["card_number", "date_payment_confirmed", "weight_(kg)", "n"],
            vec![vec![
                Value::from("4971858637664481"),
                Value::Null,
                Value::Float(1.6),
                Value::Integer(3),
            ]],
        )
        .unwrap()
        .set_kind("date_payment_confirmed", ColumnKind::Date)
        .unwrap();

        assert_eq!(
            create_table_sql("dim_card_details", &table),
            "CREATE TABLE \"dim_card_details\" (\"card_number\" TEXT, \
             \"date_payment_confirmed\" DATE, \"weight_(kg)\" DOUBLE PRECISION, \"n\" BIGINT)"
        );
    }

    #[test]
    fn test_insert_placeholders_numbered_across_rows() {
        assert_eq!(
            insert_sql("t", &["a", "b"], 2),
            "INSERT INTO \"t\" (\"a\", \"b\") VALUES ($1, $2), ($3, $4)"
        );
    }

    #[test]
    fn test_params_follow_column_kind() {
        let p = to_param(&Value::Null, ColumnKind::Text);
        assert_eq!(format!("{:?}", p), "None");
        let p = to_param(&Value::Integer(7), ColumnKind::Text);
        assert_eq!(format!("{:?}", p), "Some(\"7\")");
        let p = to_param(&Value::Integer(7), ColumnKind::Float);
        assert_eq!(format!("{:?}", p), "Some(7.0)");
    }
}
