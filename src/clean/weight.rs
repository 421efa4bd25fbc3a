//! Product weight normalisation
//!
//! Turns free-text weights such as `100g`, `2.5kg`, `12 x 100g` or `16oz`
//! into kilograms.

use crate::etl::Transformer;
use crate::table::{ColumnKind, Table, Value};
use eyre::Result;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\d.]+)\s*([a-zA-Z]*)").expect("valid weight pattern"));

static MULTIPACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\d.]+)\s*([a-zA-Z]*)\s*x\s*([\d.]+)\s*([a-zA-Z]*)")
        .expect("valid multipack pattern")
});

const OUNCE_IN_KG: f64 = 0.0283495;

/// Units understood by [`parse_weight`]
///
/// Millilitres are weighed like grams (a density of 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightUnit {
    Gram,
    Millilitre,
    Kilogram,
    Ounce,
}

impl WeightUnit {
    /// Convert an amount in this unit to kilograms
    pub fn to_kilograms(self, amount: f64) -> f64 {
        match self {
            WeightUnit::Gram | WeightUnit::Millilitre => amount / 1000.0,
            WeightUnit::Kilogram => amount,
            WeightUnit::Ounce => amount * OUNCE_IN_KG,
        }
    }
}

impl FromStr for WeightUnit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "g" | "gram" | "grams" => Ok(Self::Gram),
            "ml" | "milliliter" | "milliliters" => Ok(Self::Millilitre),
            "kg" | "kilogram" | "kilograms" => Ok(Self::Kilogram),
            "oz" | "ounce" | "ounces" => Ok(Self::Ounce),
            _ => Err(()),
        }
    }
}

/// Parse a free-text weight into kilograms, rounded to 3 decimal places
///
/// Text containing an `x` is read as a multipack (`count x amount unit`);
/// when the first unit is blank the second one applies. Anything that does
/// not match, has a malformed number, or names an unknown unit yields `None`.
///
/// # Example
/// ```
/// use retail_data_centraliser::clean::parse_weight;
///
/// assert_eq!(parse_weight("100g"), Some(0.1));
/// assert_eq!(parse_weight("2 x 100g"), Some(0.2));
/// assert_eq!(parse_weight("1kg"), Some(1.0));
/// assert_eq!(parse_weight("3 x oz"), None);
/// assert_eq!(parse_weight("5 bananas"), None);
/// ```
pub fn parse_weight(text: &str) -> Option<f64> {
    let (amount, unit) = if text.contains('x') {
        let caps = MULTIPACK.captures(text)?;
        let count: f64 = caps[1].parse().ok()?;
        let each: f64 = caps[3].parse().ok()?;
        let unit = match &caps[2] {
            "" => caps[4].to_string(),
            first => first.to_string(),
        };
        (count * each, unit)
    } else {
        let caps = SINGLE.captures(text)?;
        (caps[1].parse::<f64>().ok()?, caps[2].to_string())
    };

    let unit: WeightUnit = unit.parse().ok()?;
    Some(round3(unit.to_kilograms(amount)))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Replace the free-text `weight` column with a numeric `weight_(kg)` column
pub fn convert_product_weights(table: Table) -> Result<Table> {
    table
        .map_column("weight", |value| match value {
            Value::Text(text) => parse_weight(&text).into(),
            _ => Value::Null,
        })?
        .rename_column("weight", "weight_(kg)")?
        .set_kind("weight_(kg)", ColumnKind::Float)
}

/// Transformer form of [`convert_product_weights`]
pub struct WeightConverter;

impl Transformer for WeightConverter {
    type Input = Table;
    type Output = Table;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        convert_product_weights(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_units() {
        assert_eq!(parse_weight("1.6kg"), Some(1.6));
        assert_eq!(parse_weight("590g"), Some(0.59));
        assert_eq!(parse_weight("500ml"), Some(0.5));
        assert_eq!(parse_weight("16oz"), Some(0.454));
        assert_eq!(parse_weight("1 Kilogram"), Some(1.0));
        assert_eq!(parse_weight("77g ."), Some(0.077));
    }

    #[test]
    fn test_multipacks() {
        assert_eq!(parse_weight("12 x 100g"), Some(1.2));
        assert_eq!(parse_weight("3 x 2kg"), Some(6.0));
        assert_eq!(parse_weight("8 x 150g"), Some(1.2));
    }

    #[test]
    fn test_failures_are_missing() {
        assert_eq!(parse_weight(""), None);
        assert_eq!(parse_weight("kg"), None);
        assert_eq!(parse_weight("1.2.3kg"), None);
        assert_eq!(parse_weight("100"), None);
        assert_eq!(parse_weight("9GO9NZ5JTL"), None);
    }

    #[test]
    fn test_convert_column() {
        let table = Table::with_rows(
            ["product_name", "weight"],
            vec![
                vec![Value::from("Tea"), Value::from("250g")],
                vec![Value::from("Rice"), Value::from("2 x 1kg")],
                vec![Value::from("Gift"), Value::from("a basket")],
                vec![Value::from("Void"), Value::Null],
            ],
        )
        .unwrap();

        let table = WeightConverter.transform(table).unwrap();

        assert!(!table.has_column("weight"));
        assert_eq!(table.kind("weight_(kg)").unwrap(), ColumnKind::Float);
        let weights = table.column("weight_(kg)").unwrap();
        assert_eq!(
            weights,
            vec![
                &Value::Float(0.25),
                &Value::Float(2.0),
                &Value::Null,
                &Value::Null
            ]
        );
    }
}
