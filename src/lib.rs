//! Multinational Retail Data Centraliser
//!
//! A one-shot ETL tool that pulls retail data from a legacy database, a PDF,
//! a REST API and public object storage, cleans every entity, and loads the
//! results into a PostgreSQL star schema.

pub mod clean;
pub mod cli;
pub mod client;
pub mod config;
pub mod driver;
pub mod etl;
pub mod schema;
pub mod source;
pub mod storage;
pub mod table;
pub mod target;

// Re-exports for convenience
pub use client::{ApiClient, Auth};
pub use driver::{Entity, EntityConfig, PipelineManifest, SourceSpec};
pub use etl::{Extractor, Loader, Pipeline, Transformer};
pub use storage::{CsvReader, CsvWriter};
pub use table::{ColumnKind, Table, Value};
