//! Pipeline manifest (`pipeline.yml`)
//!
//! Lists the entities to process, in order, with where each comes from and
//! the table it is loaded into.
//!
//! Example format:
//! ```yaml
//! entities:
//!   - entity: users
//!     source:
//!       kind: database
//!       table: legacy_users
//!     destination: dim_users
//!   - entity: stores
//!     source:
//!       kind: api
//!     destination: dim_store_details
//! ```

use super::Entity;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Where an entity's raw table comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    /// A table of the source database
    Database { table: String },
    /// The card table printed in a PDF (URL or path)
    Pdf { location: String },
    /// The stores API named in the API credentials
    Api,
    /// A CSV object (`s3://bucket/key`, URL or path)
    ObjectStore { address: String },
    /// A JSON document (URL or path)
    Json { location: String },
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Database { table } => write!(f, "database table {}", table),
            SourceSpec::Pdf { location } => write!(f, "PDF {}", location),
            SourceSpec::Api => write!(f, "stores API"),
            SourceSpec::ObjectStore { address } => write!(f, "object {}", address),
            SourceSpec::Json { location } => write!(f, "JSON {}", location),
        }
    }
}

/// One entity to extract, clean and load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub entity: Entity,
    pub source: SourceSpec,
    /// Destination table name
    pub destination: String,
}

impl EntityConfig {
    pub fn new(entity: Entity, source: SourceSpec, destination: impl Into<String>) -> Self {
        Self {
            entity,
            source,
            destination: destination.into(),
        }
    }
}

/// Ordered list of entities driving a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineManifest {
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl PipelineManifest {
    pub fn new(entities: Vec<EntityConfig>) -> Self {
        Self { entities }
    }

    /// The retail pipeline: six entities from five kinds of source
    pub fn default_retail() -> Self {
        Self::new(vec![
            EntityConfig::new(
                Entity::Users,
                SourceSpec::Database {
                    table: "legacy_users".to_string(),
                },
                "dim_users",
            ),
            EntityConfig::new(
                Entity::Cards,
                SourceSpec::Pdf {
                    location: "https://data-handling-public.s3.eu-west-1.amazonaws.com/card_details.pdf"
                        .to_string(),
                },
                "dim_card_details",
            ),
            EntityConfig::new(Entity::Stores, SourceSpec::Api, "dim_store_details"),
            EntityConfig::new(
                Entity::Products,
                SourceSpec::ObjectStore {
                    address: "s3://data-handling-public/products.csv".to_string(),
                },
                "dim_products",
            ),
            EntityConfig::new(
                Entity::Orders,
                SourceSpec::Database {
                    table: "orders_table".to_string(),
                },
                "orders_table",
            ),
            EntityConfig::new(
                Entity::Dates,
                SourceSpec::Json {
                    location: "https://data-handling-public.s3.eu-west-1.amazonaws.com/date_details.json"
                        .to_string(),
                },
                "dim_date_times",
            ),
        ])
    }

    /// Keep only the listed entities (all of them when `only` is empty)
    pub fn filter(self, only: &[Entity]) -> Self {
        if only.is_empty() {
            return self;
        }
        Self {
            entities: self
                .entities
                .into_iter()
                .filter(|c| only.contains(&c.entity))
                .collect(),
        }
    }

    /// Whether any entity is read from the source database
    pub fn needs_database(&self) -> bool {
        self.entities
            .iter()
            .any(|c| matches!(c.source, SourceSpec::Database { .. }))
    }

    /// Whether any entity is read from the stores API
    pub fn needs_api(&self) -> bool {
        self.entities
            .iter()
            .any(|c| matches!(c.source, SourceSpec::Api))
    }

    /// Reject manifests that would overwrite one destination twice
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for config in &self.entities {
            if config.destination.trim().is_empty() {
                eyre::bail!("Entity '{}' has an empty destination", config.entity);
            }
            if !seen.insert(config.destination.as_str()) {
                eyre::bail!("Destination '{}' is used more than once", config.destination);
            }
        }
        Ok(())
    }

    /// Read manifest from YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline manifest: {}", path.display()))?;

        let manifest: Self = serde_yaml::from_str(&content)
            .with_context(|| "Failed to parse pipeline manifest YAML")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Write manifest to YAML file
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let yaml =
            serde_yaml::to_string(self).with_context(|| "Failed to serialize pipeline manifest")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write pipeline manifest: {}", path.display()))?;

        log::debug!("Wrote pipeline manifest to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_retail_covers_every_entity_once() {
        let manifest = PipelineManifest::default_retail();
        let entities: Vec<Entity> = manifest.entities.iter().map(|c| c.entity).collect();
        assert_eq!(entities, Entity::ALL.to_vec());
        assert!(manifest.validate().is_ok());
        assert!(manifest.needs_database());
        assert!(manifest.needs_api());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pipeline.yml");

        let manifest = PipelineManifest::default_retail();
        manifest.write(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("kind: object_store"));
        assert!(content.contains("destination: dim_card_details"));

        assert_eq!(PipelineManifest::read(&path).unwrap(), manifest);
    }

    #[test]
    fn test_parse_handwritten_manifest() {
        let yaml = r#"
entities:
  - entity: dates
    source:
      kind: json
      location: data/date_details.json
    destination: dim_date_times
  - entity: stores
    source:
      kind: api
    destination: dim_store_details
"#;
        let manifest: PipelineManifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.entities.len(), 2);
        assert_eq!(manifest.entities[1].source, SourceSpec::Api);
        assert!(!manifest.needs_database());
    }

    #[test]
    fn test_filter_keeps_order() {
        let manifest =
            PipelineManifest::default_retail().filter(&[Entity::Dates, Entity::Users]);
        let entities: Vec<Entity> = manifest.entities.iter().map(|c| c.entity).collect();
        assert_eq!(entities, vec![Entity::Users, Entity::Dates]);
        assert!(!manifest.needs_api());
    }

    #[test]
    fn test_duplicate_destination_rejected() {
        let manifest = PipelineManifest::new(vec![
            EntityConfig::new(Entity::Users, SourceSpec::Api, "t"),
            EntityConfig::new(Entity::Stores, SourceSpec::Api, "t"),
        ]);
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("'t'"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = PipelineManifest::read("/nonexistent/pipeline.yml").unwrap_err();
        assert!(err.to_string().contains("Failed to read pipeline manifest"));
    }
}
