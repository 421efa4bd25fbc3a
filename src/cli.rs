//! CLI helper functions

use crate::{
    config::DatabaseCredentials,
    driver::{self, Entity, PipelineManifest, RunContext, RunOptions, RunSummary},
    etl::Pipeline,
    source::list_tables,
    storage::{CsvReader, CsvWriter},
};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// Default name of the pipeline manifest
pub const DEFAULT_MANIFEST: &str = "pipeline.yml";

/// Credential file locations
#[derive(Debug, Clone)]
pub struct CredentialPaths {
    /// Database credentials (`db_creds.yaml`)
    pub db: PathBuf,
    /// Stores API credentials (`api_creds.yaml`)
    pub api: PathBuf,
}

/// Load the manifest at `path`, or the built-in retail manifest
pub fn load_manifest(path: Option<&Path>) -> Result<PipelineManifest> {
    match path {
        Some(path) => {
            log::info!("Loading manifest from {}", path.display().bright_black());
            PipelineManifest::read(path)
        }
        None => {
            log::debug!("No manifest given, using the built-in retail pipeline");
            Ok(PipelineManifest::default_retail())
        }
    }
}

/// Run the whole pipeline
///
/// Pipeline per entity: source extractor → entity cleaner → CSV and/or PostgreSQL
pub async fn run_pipeline(
    manifest_path: Option<&Path>,
    options: &RunOptions,
    creds: &CredentialPaths,
) -> Result<RunSummary> {
    let manifest = load_manifest(manifest_path)?.filter(&options.only);
    if options.dry_run {
        log::info!("Dry run: the target database will not be touched");
    }

    let context = RunContext::connect(&manifest, options, &creds.db, &creds.api).await?;
    let summary = driver::run(manifest, options, &context).await?;

    for (entity, count) in &summary {
        log::info!("✓ {}: {} row(s)", entity.cyan(), count);
    }
    Ok(summary)
}

/// List the base tables of the source database
pub async fn list_source_tables(creds_path: impl AsRef<Path>) -> Result<Vec<String>> {
    let creds = DatabaseCredentials::read(creds_path)?;
    let client = creds.source.connect().await?;
    list_tables(&client).await
}

/// Clean a CSV snapshot of one entity offline
///
/// Pipeline: CsvReader (all text) → entity cleaner → CsvWriter
pub async fn clean_csv(
    entity: Entity,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<usize> {
    let input = input.as_ref();
    let output = output.as_ref();
    log::info!(
        "Cleaning {} from {} into {}",
        entity.cyan(),
        input.display().bright_black(),
        output.display().bright_black()
    );

    let pipeline = Pipeline::new(
        CsvReader::new(input).with_raw_text(),
        entity.cleaner(),
        CsvWriter::new(output),
    );
    pipeline
        .run()
        .await
        .with_context(|| format!("Failed to clean {} from {}", entity, input.display()))
}

/// Write the built-in retail manifest, refusing to overwrite an existing file
pub fn write_default_manifest(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        eyre::bail!("Manifest already exists: {}", path.display());
    }
    PipelineManifest::default_retail().write(path)?;
    log::info!("✓ Wrote manifest to {}", path.display().bright_black());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clean_csv_orders() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("orders_raw.csv");
        let output = temp.path().join("out/orders_table_cleaned.csv");
        std::fs::write(
            &input,
            "index,date_uuid,first_name,last_name,user_uuid,1,product_quantity\n\
             0,9476f17e,,,93caf182,,3\n",
        )
        .unwrap();

        let count = clean_csv(Entity::Orders, &input, &output).await.unwrap();

        assert_eq!(count, 1);
        let cleaned = CsvReader::new(&output).with_raw_text().read().unwrap();
        assert_eq!(
            cleaned.column_names(),
            vec!["index", "date_uuid", "user_uuid", "product_quantity"]
        );
        assert_eq!(cleaned.value(0, "product_quantity"), Some(&Value::from("3")));
    }

    #[tokio::test]
    async fn test_clean_csv_missing_column() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("dates.csv");
        std::fs::write(&input, "month,year\n9,2012\n").unwrap();

        let err = clean_csv(Entity::Dates, &input, temp.path().join("out.csv"))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("missing required column(s): time_period"));
    }

    #[test]
    fn test_write_default_manifest_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_MANIFEST);

        write_default_manifest(&path).unwrap();
        assert_eq!(load_manifest(Some(&path)).unwrap(), PipelineManifest::default_retail());
        assert!(write_default_manifest(&path).is_err());
    }

    #[test]
    fn test_load_manifest_default() {
        let manifest = load_manifest(None).unwrap();
        assert_eq!(manifest.entities.len(), 6);
    }
}
