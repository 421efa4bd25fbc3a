//! User cleaner
//!
//! Cleans the legacy users table pulled from the source database.

use super::parse::{coerce_date, contains_digit};
use crate::etl::Transformer;
use crate::schema::USERS;
use crate::table::{Table, Value};
use eyre::Result;

/// Columns whose text must not contain a digit or the `NULL` sentinel
const NAME_FIELDS: [&str; 3] = ["first_name", "last_name", "country"];

fn is_corrupt_name(value: &Value) -> bool {
    let text = value.render();
    contains_digit(&text) || text.contains("NULL")
}

fn keep_phone_chars(value: Value) -> Value {
    match value {
        Value::Null => Value::Null,
        other => Value::Text(
            other
                .render()
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '(' | ')' | '+'))
                .collect(),
        ),
    }
}

/// Clean the users table
///
/// 1. Drop rows where `first_name`, `last_name` or `country` contains a digit
///    or `NULL`
/// 2. Replace country code `GGB` with `GB`
/// 3. Parse `date_of_birth` and `join_date` (unparseable dates become null)
/// 4. Keep only digits, `(`, `)` and `+` in `phone_number`
/// 5. Tag column kinds
pub fn clean_user_data(table: Table) -> Result<Table> {
    USERS.validate(&table)?;

    let idx: Vec<usize> = NAME_FIELDS
        .iter()
        .map(|name| table.column_index(name))
        .collect::<Result<_>>()?;
    let before = table.len();
    let table = table.retain_rows(|row| !idx.iter().any(|&i| is_corrupt_name(&row[i])));
    log::debug!("users: dropped {} corrupt row(s)", before - table.len());

    let table = table
        .map_column("first_name", Value::into_text)?
        .map_column("last_name", Value::into_text)?
        .map_column("country", Value::into_text)?
        .map_column("country_code", |v| match v {
            Value::Text(code) if code == "GGB" => Value::from("GB"),
            other => other,
        })?
        .map_column("date_of_birth", coerce_date)?
        .map_column("join_date", coerce_date)?
        .map_column("email_address", Value::into_text)?
        .map_column("user_uuid", Value::into_text)?
        .map_column("phone_number", keep_phone_chars)?;

    USERS.apply_kinds(table)
}

/// Transformer form of [`clean_user_data`]
pub struct UserCleaner;

impl Transformer for UserCleaner {
    type Input = Table;
    type Output = Table;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        clean_user_data(input)
    }
}
