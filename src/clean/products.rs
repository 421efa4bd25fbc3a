//! Product cleaner

use super::parse::{contains_digit, parse_date_lenient, parse_date_strict};
use crate::etl::Transformer;
use crate::schema::PRODUCTS;
use crate::table::{Table, Value};
use eyre::Result;

fn date_added(value: Value) -> Value {
    match value {
        Value::Date(d) => Value::Date(d),
        Value::Null => Value::Null,
        other => {
            let text = other.render();
            parse_date_lenient(&text)
                .or_else(|| parse_date_strict(&text, "%Y %B %d"))
                .into()
        }
    }
}

/// Clean the products table
///
/// 1. Drop rows without a `product_price`
/// 2. Drop rows whose `category` contains a digit
/// 3. Parse `date_added`, falling back to `YYYY Month DD`
/// 4. Correct the `Still_avaliable` typo in `removed`
/// 5. Tag column kinds
///
/// The `weight` column is left as is; run [`super::convert_product_weights`]
/// afterwards to normalise it.
pub fn clean_products_data(table: Table) -> Result<Table> {
    PRODUCTS.validate(&table)?;

    let before = table.len();
    let table = table
        .drop_nulls_in("product_price")?
        .filter_by("category", |v| !contains_digit(&v.render()))?;
    log::debug!("products: dropped {} row(s)", before - table.len());

    let table = table
        .map_column("date_added", date_added)?
        .map_column("removed", |v| match v {
            Value::Text(text) if text == "Still_avaliable" => Value::from("Still_available"),
            other => other,
        })?;

    PRODUCTS.apply_kinds(table)
}

/// Transformer form of [`clean_products_data`]
pub struct ProductCleaner;

impl Transformer for ProductCleaner {
    type Input = Table;
    type Output = Table;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        clean_products_data(input)
    }
}
