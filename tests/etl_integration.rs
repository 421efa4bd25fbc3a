//! Integration tests for per-entity pipelines
//!
//! These tests run whole extract-clean-load pipelines with real file I/O.

use eyre::Result;
use retail_data_centraliser::clean::{CardCleaner, ProductCleaner, WeightConverter};
use retail_data_centraliser::driver::Entity;
use retail_data_centraliser::etl::{Extractor, Pipeline, Transformer};
use retail_data_centraliser::source::parse_card_lines;
use retail_data_centraliser::storage::{CsvReader, CsvWriter};
use retail_data_centraliser::table::{ColumnKind, Table, Value};
use tempfile::TempDir;

/// Extractor that hands out the card table as printed in the PDF
struct PrintedCards(&'static str);

impl Extractor for PrintedCards {
    async fn extract(&self) -> Result<Table> {
        parse_card_lines(self.0.lines())
    }
}

const PRINTED_CARDS: &str = "\
card_number expiry_date card_provider date_payment_confirmed
30060773296197 09/26 Diners Club / Carte Blanche 2015-11-25
??4654492346226715 13/27 JCB 16 digit 2008-02-21
NULL NULL NULL NULL
card_number expiry_date card_provider date_payment_confirmed
4971858637664481 1/23 VISA 16 digit 2001 October 23
";

#[tokio::test]
async fn test_cards_pipeline_to_csv() -> Result<()> {
    let temp = TempDir::new()?;
    let output = temp.path().join("dim_card_details_cleaned.csv");
    let raw = temp.path().join("raw").join("cards_raw.csv");

    let pipeline = Pipeline::new(PrintedCards(PRINTED_CARDS), CardCleaner, CsvWriter::new(&output))
        .with_raw_snapshot(CsvWriter::new(&raw));
    let count = pipeline.run().await?;

    assert_eq!(count, 2);
    assert_eq!(CsvReader::new(&raw).read()?.len(), 4);

    let cleaned = CsvReader::new(&output).with_raw_text().read()?;
    assert_eq!(
        cleaned.column("expiry_date")?,
        vec![&Value::from("09/26"), &Value::from("01/23")]
    );
    assert_eq!(
        cleaned.column("date_payment_confirmed")?,
        vec![&Value::from("2015-11-25"), &Value::from("2001-10-23")]
    );
    assert_eq!(
        cleaned.value(0, "card_provider"),
        Some(&Value::from("Diners Club / Carte Blanche"))
    );
    Ok(())
}

#[tokio::test]
async fn test_products_pipeline_from_index_csv() -> Result<()> {
    let temp = TempDir::new()?;
    let input = temp.path().join("products.csv");
    let output = temp.path().join("dim_products_cleaned.csv");
    std::fs::write(
        &input,
        ",product_name,product_price,weight,category,EAN,date_added,uuid,removed,product_code\n\
         0,Tea,£1.00,40 x 100g,food-and-drink,123,2018-10-22,u1,Still_avaliable,R7-3126933h\n\
         1,Broken,,1kg,food-and-drink,124,2018-10-22,u2,Removed,R7-1\n\
         2,Junk,£2.00,77g .,S1YB74MLMJ,125,2018-10-22,u3,Removed,R7-2\n\
         3,Lamp,£9.99,16oz,homeware,126,2017 September 06,u4,Removed,R7-3\n",
    )?;

    let pipeline = Pipeline::new(
        CsvReader::new(&input).with_index_column(true).with_raw_text(),
        ProductCleaner.then(WeightConverter),
        CsvWriter::new(&output),
    );
    assert_eq!(pipeline.run().await?, 2);

    let cleaned = CsvReader::new(&output).read()?;
    assert!(!cleaned.has_column("weight"));
    assert_eq!(
        cleaned.column("weight_(kg)")?,
        vec![&Value::Float(4.0), &Value::Float(0.454)]
    );
    assert_eq!(cleaned.value(0, "removed"), Some(&Value::from("Still_available")));
    assert_eq!(cleaned.value(1, "date_added"), Some(&Value::from("2017-09-06")));
    Ok(())
}

#[test]
fn test_entity_cleaners_tag_kinds() -> Result<()> {
    let dates = Table::with_rows(
        ["time_period"],
        vec![vec![Value::from("Evening")], vec![Value::from("Night")]],
    )?;
    let cleaned = Entity::Dates.cleaner().transform(dates)?;
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned.kind("time_period")?, ColumnKind::Category);
    Ok(())
}
