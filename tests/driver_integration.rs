//! Integration tests for manifest-driven runs
//!
//! Runs use local files as sources and a dry run so no database is needed.

use retail_data_centraliser::driver::{
    Entity, EntityConfig, PipelineManifest, RunContext, RunOptions, SourceSpec, run,
};
use retail_data_centraliser::storage::CsvReader;
use retail_data_centraliser::table::Value;
use std::path::Path;
use tempfile::TempDir;

fn write_sources(dir: &Path) {
    std::fs::write(
        dir.join("products.csv"),
        ",product_name,product_price,weight,category,date_added,removed\n\
         0,Tea,£1.00,2 x 100g,food-and-drink,2018-10-22,Still_avaliable\n\
         1,Cola,£0.80,330ml,food-and-drink,2019-01-02,Removed\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("date_details.json"),
        r#"{"timestamp": {"0": "22:00:06", "1": "17:24:46"},
            "time_period": {"0": "Evening", "1": "NULL"}}"#,
    )
    .unwrap();
}

fn manifest(dir: &Path) -> PipelineManifest {
    PipelineManifest::new(vec![
        EntityConfig::new(
            Entity::Products,
            SourceSpec::ObjectStore {
                address: dir.join("products.csv").to_string_lossy().into_owned(),
            },
            "dim_products",
        ),
        EntityConfig::new(
            Entity::Dates,
            SourceSpec::Json {
                location: dir.join("date_details.json").to_string_lossy().into_owned(),
            },
            "dim_date_times",
        ),
    ])
}

#[tokio::test]
async fn test_dry_run_writes_raw_and_cleaned_files() {
    let temp = TempDir::new().unwrap();
    write_sources(temp.path());
    let options = RunOptions {
        raw_dir: Some(temp.path().join("raw")),
        output_dir: Some(temp.path().join("cleaned")),
        dry_run: true,
        ..Default::default()
    };

    let summary = run(manifest(temp.path()), &options, &RunContext::offline().unwrap())
        .await
        .unwrap();

    assert_eq!(summary, vec![(Entity::Products, 2), (Entity::Dates, 1)]);
    assert!(temp.path().join("raw/products_raw.csv").exists());
    assert!(temp.path().join("raw/dates_raw.csv").exists());

    let products = CsvReader::new(temp.path().join("cleaned/dim_products_cleaned.csv"))
        .read()
        .unwrap();
    assert_eq!(
        products.column("weight_(kg)").unwrap(),
        vec![&Value::Float(0.2), &Value::Float(0.33)]
    );
}

#[tokio::test]
async fn test_manifest_file_round_trip_drives_run() {
    let temp = TempDir::new().unwrap();
    write_sources(temp.path());
    let path = temp.path().join("pipeline.yml");
    manifest(temp.path()).write(&path).unwrap();

    let loaded = PipelineManifest::read(&path).unwrap();
    let options = RunOptions {
        only: vec![Entity::Dates],
        dry_run: true,
        ..Default::default()
    };
    let summary = run(loaded, &options, &RunContext::offline().unwrap())
        .await
        .unwrap();
    assert_eq!(summary, vec![(Entity::Dates, 1)]);
}

#[tokio::test]
async fn test_missing_source_file_names_entity() {
    let temp = TempDir::new().unwrap();
    let options = RunOptions {
        dry_run: true,
        ..Default::default()
    };

    let err = run(manifest(temp.path()), &options, &RunContext::offline().unwrap())
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to process entity 'products'"));
}
