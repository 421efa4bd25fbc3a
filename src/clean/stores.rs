//! Store details cleaner

use super::parse::{coerce_date, contains_digit};
use crate::etl::Transformer;
use crate::schema::STORES;
use crate::table::{Table, Value};
use eyre::Result;

/// Continent spellings corrupted by a stray prefix
const CONTINENT_FIXES: [(&str, &str); 2] = [("eeEurope", "Europe"), ("eeAmerica", "America")];

fn fix_continent(value: Value) -> Value {
    match value {
        Value::Text(text) => CONTINENT_FIXES
            .iter()
            .find(|(bad, _)| *bad == text)
            .map(|(_, good)| Value::from(*good))
            .unwrap_or(Value::Text(text)),
        other => other,
    }
}

/// Clean the store details table
///
/// 1. Drop rows without a `continent`
/// 2. Fix `eeEurope`/`eeAmerica`, then drop rows whose continent has a digit
/// 3. Drop the `lat` column
/// 4. Keep only digits in `staff_numbers`
/// 5. Parse `opening_date` (unparseable dates become null)
/// 6. Drop rows whose `country_code` is the `NULL` sentinel
/// 7. Tag column kinds
pub fn called_clean_store_data(table: Table) -> Result<Table> {
    STORES.validate(&table)?;

    let before = table.len();
    let table = table
        .drop_nulls_in("continent")?
        .map_column("continent", fix_continent)?
        .filter_by("continent", |v| !contains_digit(&v.render()))?
        .drop_column("lat")?
        .map_column("staff_numbers", |v| match v {
            Value::Null => Value::Null,
            other => Value::Text(other.render().chars().filter(char::is_ascii_digit).collect()),
        })?
        .map_column("opening_date", coerce_date)?
        .map_column("country_code", Value::into_text)?
        .filter_by("country_code", |v| v.as_str() != Some("NULL"))?;
    log::debug!("stores: dropped {} row(s)", before - table.len());

    let table = table
        .map_column("store_code", Value::into_text)?
        .map_column("address", Value::into_text)?
        .map_column("locality", Value::into_text)?;

    STORES.apply_kinds(table)
}

/// Transformer form of [`called_clean_store_data`]
pub struct StoreCleaner;

impl Transformer for StoreCleaner {
    type Input = Table;
    type Output = Table;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        called_clean_store_data(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;
    use chrono::NaiveDate;

    const COLUMNS: [&str; 11] = [
        "index",
        "address",
        "longitude",
        "lat",
        "locality",
        "store_code",
        "staff_numbers",
        "opening_date",
        "store_type",
        "country_code",
        "continent",
    ];

    fn store(continent: Value, country: &str, staff: &str, opened: &str) -> Vec<Value> {
        vec![
            Value::Integer(1),
            Value::from("Flat 72W\nSally isle"),
            Value::from("-0.12"),
            Value::Null,
            Value::from("High Wycombe"),
            Value::from("HI-9B97EE4E"),
            Value::from(staff),
            Value::from(opened),
            Value::from("Local"),
            Value::from(country),
            continent,
        ]
    }

    fn stores(rows: Vec<Vec<Value>>) -> Table {
        Table::with_rows(COLUMNS, rows).unwrap()
    }

    #[test]
    fn test_continent_fix_then_digit_filter() {
        let table = stores(vec![
            store(Value::from("eeEurope"), "GB", "34", "2006-03-23"),
            store(Value::from("eeEurope7"), "GB", "34", "2006-03-23"),
            store(Value::from("eeAmerica"), "US", "34", "2006-03-23"),
            store(Value::Null, "US", "34", "2006-03-23"),
            store(Value::from("QMAVR5H3LD"), "US", "34", "2006-03-23"),
        ]);

        let cleaned = called_clean_store_data(table).unwrap();

        assert_eq!(
            cleaned.column("continent").unwrap(),
            vec![&Value::from("Europe"), &Value::from("America")]
        );
        assert_eq!(cleaned.kind("continent").unwrap(), ColumnKind::Category);
    }

    #[test]
    fn test_digit_filter_ignores_other_numerals() {
        let table = stores(vec![
            store(Value::from("Europe²"), "GB", "34", "2006-03-23"),
            store(Value::from("Europe\u{0663}"), "GB", "34", "2006-03-23"),
        ]);

        let cleaned = called_clean_store_data(table).unwrap();

        assert_eq!(cleaned.column("continent").unwrap(), vec![&Value::from("Europe²")]);
    }

    #[test]
    fn test_lat_dropped_and_longitude_kept() {
        let table = stores(vec![store(Value::from("Europe"), "GB", "34", "2006-03-23")]);
        let cleaned = called_clean_store_data(table).unwrap();
        assert!(!cleaned.has_column("lat"));
        assert!(cleaned.has_column("longitude"));
    }

    #[test]
    fn test_staff_dates_and_country_sentinel() {
        let table = stores(vec![
            store(Value::from("Europe"), "GB", "J78", "October 2012 08"),
            store(Value::from("Europe"), "NULL", "34", "2006-03-23"),
            store(Value::from("Europe"), "DE", "061", "not a date"),
        ]);

        let cleaned = called_clean_store_data(table).unwrap();

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.value(0, "staff_numbers"), Some(&Value::from("78")));
        assert_eq!(cleaned.value(1, "staff_numbers"), Some(&Value::from("061")));
        assert_eq!(
            cleaned.value(0, "opening_date"),
            Some(&Value::Date(NaiveDate::from_ymd_opt(2012, 10, 8).unwrap()))
        );
        assert_eq!(cleaned.value(1, "opening_date"), Some(&Value::Null));
    }

    #[test]
    fn test_missing_lat_is_fatal() {
        let table = Table::new(COLUMNS.iter().filter(|c| **c != "lat").copied());
        let err = called_clean_store_data(table).unwrap_err();
        assert!(err.to_string().contains("lat"));
    }
}
