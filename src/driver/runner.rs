//! Run a pipeline manifest entity by entity

use super::{Entity, EntityConfig, PipelineManifest, SourceSpec};
use crate::client::{ApiClient, Auth};
use crate::config::{ApiCredentials, DatabaseCredentials};
use crate::etl::{Extractor, Loader, Pipeline};
use crate::source::{
    ApiExtractor, DatabaseExtractor, JsonExtractor, Location, ObjectStoreExtractor, PdfExtractor,
};
use crate::storage::CsvWriter;
use crate::table::Table;
use crate::target::PostgresLoader;
use eyre::{Context, Result, eyre};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::Client;

/// Knobs of a run that are not part of the manifest
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Process only these entities (all when empty)
    pub only: Vec<Entity>,
    /// Directory for `{entity}_raw.csv` snapshots of the extracted tables
    pub raw_dir: Option<PathBuf>,
    /// Directory for `{destination}_cleaned.csv` copies of the cleaned tables
    pub output_dir: Option<PathBuf>,
    /// Skip the database load
    pub dry_run: bool,
}

/// Connections and credentials shared by every entity of a run
pub struct RunContext {
    http: ApiClient,
    api: Option<(ApiClient, ApiCredentials)>,
    source: Option<Arc<Client>>,
    target: Option<Arc<Mutex<Client>>>,
}

impl RunContext {
    /// Open only the connections the manifest needs
    ///
    /// The source database is connected when an entity reads from it, the
    /// target unless this is a dry run, and the stores API client is built
    /// when an entity reads from the API.
    pub async fn connect(
        manifest: &PipelineManifest,
        options: &RunOptions,
        creds_path: &Path,
        api_creds_path: &Path,
    ) -> Result<Self> {
        let needs_target = !options.dry_run && !manifest.entities.is_empty();
        let db = if manifest.needs_database() || needs_target {
            Some(DatabaseCredentials::read(creds_path)?)
        } else {
            None
        };

        let source = match &db {
            Some(db) if manifest.needs_database() => Some(Arc::new(db.source.connect().await?)),
            _ => None,
        };
        let target = match &db {
            Some(db) if needs_target => Some(Arc::new(Mutex::new(db.target.connect().await?))),
            _ => None,
        };

        let api = if manifest.needs_api() {
            let creds = ApiCredentials::read(api_creds_path)?;
            let client = ApiClient::try_new(Auth::new(creds.api_key.clone()))?;
            Some((client, creds))
        } else {
            None
        };

        Ok(Self {
            http: ApiClient::anonymous()?,
            api,
            source,
            target,
        })
    }

    /// A context with no database connections and no API credentials
    pub fn offline() -> Result<Self> {
        Ok(Self {
            http: ApiClient::anonymous()?,
            api: None,
            source: None,
            target: None,
        })
    }

    fn extractor(&self, source: &SourceSpec) -> Result<SourceExtractor> {
        Ok(match source {
            SourceSpec::Database { table } => {
                let client = self
                    .source
                    .clone()
                    .ok_or_else(|| eyre!("No source database connection"))?;
                SourceExtractor::Database(DatabaseExtractor::new(client, table))
            }
            SourceSpec::Pdf { location } => SourceExtractor::Pdf(PdfExtractor::new(
                self.http.clone(),
                Location::parse(location)?,
            )),
            SourceSpec::Api => {
                let (client, creds) = self
                    .api
                    .clone()
                    .ok_or_else(|| eyre!("No stores API credentials"))?;
                SourceExtractor::Api(ApiExtractor::new(client, creds))
            }
            SourceSpec::ObjectStore { address } => {
                SourceExtractor::ObjectStore(ObjectStoreExtractor::new(self.http.clone(), address)?)
            }
            SourceSpec::Json { location } => SourceExtractor::Json(JsonExtractor::new(
                self.http.clone(),
                Location::parse(location)?,
            )),
        })
    }

    fn loader(&self, config: &EntityConfig, options: &RunOptions) -> EntityLoader {
        EntityLoader {
            csv: options.output_dir.as_ref().map(|dir| {
                CsvWriter::new(dir.join(format!("{}_cleaned.csv", config.destination)))
            }),
            postgres: self
                .target
                .as_ref()
                .filter(|_| !options.dry_run)
                .map(|client| PostgresLoader::new(client.clone(), &config.destination)),
        }
    }
}

/// Extractor for whichever kind of source an entity uses
pub enum SourceExtractor {
    Database(DatabaseExtractor),
    Pdf(PdfExtractor),
    Api(ApiExtractor),
    ObjectStore(ObjectStoreExtractor),
    Json(JsonExtractor),
}

impl Extractor for SourceExtractor {
    async fn extract(&self) -> Result<Table> {
        match self {
            SourceExtractor::Database(e) => e.extract().await,
            SourceExtractor::Pdf(e) => e.extract().await,
            SourceExtractor::Api(e) => e.extract().await,
            SourceExtractor::ObjectStore(e) => e.extract().await,
            SourceExtractor::Json(e) => e.extract().await,
        }
    }
}

/// Writes the cleaned table to a CSV file and/or the target database
///
/// Returns the database row count when loading into PostgreSQL, otherwise
/// the number of rows written (or cleaned, when there is no output at all).
pub struct EntityLoader {
    csv: Option<CsvWriter>,
    postgres: Option<PostgresLoader>,
}

impl Loader for EntityLoader {
    async fn load(&self, table: Table) -> Result<usize> {
        let mut count = table.len();
        if let Some(csv) = &self.csv {
            csv.write(&table)?;
            log::info!("Wrote {}", csv.path().display().bright_black());
        }
        if let Some(postgres) = &self.postgres {
            count = postgres.load(table).await?;
        }
        Ok(count)
    }
}

/// Rows loaded per entity, in run order
pub type RunSummary = Vec<(Entity, usize)>;

/// Run every entity of the manifest (after the `--only` filter) in order
///
/// Each entity is extracted, cleaned and loaded before the next starts. The
/// first failure stops the run.
pub async fn run(
    manifest: PipelineManifest,
    options: &RunOptions,
    context: &RunContext,
) -> Result<RunSummary> {
    let manifest = manifest.filter(&options.only);
    manifest.validate()?;
    if manifest.entities.is_empty() {
        log::warn!("No entities selected");
    }

    let mut summary = Vec::with_capacity(manifest.entities.len());
    for config in &manifest.entities {
        let count = run_entity(config, options, context)
            .await
            .with_context(|| format!("Failed to process entity '{}'", config.entity))?;
        summary.push((config.entity, count));
    }
    Ok(summary)
}

async fn run_entity(
    config: &EntityConfig,
    options: &RunOptions,
    context: &RunContext,
) -> Result<usize> {
    log::info!(
        "Processing {} from {} into {}",
        config.entity.cyan(),
        config.source,
        config.destination.bright_black()
    );

    let mut pipeline = Pipeline::new(
        context.extractor(&config.source)?,
        config.entity.cleaner(),
        context.loader(config, options),
    );
    if let Some(dir) = &options.raw_dir {
        pipeline =
            pipeline.with_raw_snapshot(CsvWriter::new(dir.join(format!("{}_raw.csv", config.entity))));
    }

    pipeline.run().await
}
