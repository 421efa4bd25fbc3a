//! Card details cleaner

use super::parse::{MonthYear, parse_date_lenient, parse_date_strict};
use crate::etl::Transformer;
use crate::schema::CARDS;
use crate::table::{Table, Value};
use eyre::Result;

/// Fallback layout for payment dates the lenient parser leaves alone
const PAYMENT_DATE_PATTERN: &str = "%y-%m-%d";

fn payment_date(value: Value) -> Value {
    match value {
        Value::Date(d) => Value::Date(d),
        Value::Text(text) => parse_date_lenient(&text)
            .or_else(|| parse_date_strict(&text, PAYMENT_DATE_PATTERN))
            .into(),
        _ => Value::Null,
    }
}

fn expiry(value: Value) -> Value {
    match value {
        Value::Null => Value::Null,
        other => MonthYear::parse(&other.render())
            .map(|my| my.to_string())
            .into(),
    }
}

/// Clean the card details table
///
/// 1. Drop rows where every column is null
/// 2. Keep only rows whose `expiry_date` is a valid `MM/YY`, re-rendered as `MM/YY`
/// 3. Parse `date_payment_confirmed` (unparseable dates become null)
/// 4. Strip `?` from `card_number`
/// 5. Tag column kinds
pub fn clean_card_data(table: Table) -> Result<Table> {
    CARDS.validate(&table)?;

    let before = table.len();
    let table = table
        .drop_empty_rows()
        .map_column("expiry_date", expiry)?
        .drop_nulls_in("expiry_date")?;
    log::debug!("cards: dropped {} row(s)", before - table.len());

    let table = table
        .map_column("date_payment_confirmed", payment_date)?
        .map_column("card_number", |v| match v.into_text() {
            Value::Text(number) => Value::Text(number.replace('?', "")),
            other => other,
        })?;

    CARDS.apply_kinds(table)
}

/// Transformer form of [`clean_card_data`]
pub struct CardCleaner;

impl Transformer for CardCleaner {
    type Input = Table;
    type Output = Table;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        clean_card_data(input)
    }
}
