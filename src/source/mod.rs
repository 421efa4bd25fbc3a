//! Extractors for the raw data sources
//!
//! Each source yields one raw [`Table`](crate::table::Table) through the
//! [`Extractor`](crate::etl::Extractor) trait.

mod api;
mod database;
mod json;
mod location;
mod object_store;
mod pdf;

pub use api::ApiExtractor;
pub use database::{DatabaseExtractor, list_tables};
pub use json::{JsonExtractor, parse_json_table};
pub use location::{DEFAULT_S3_REGION, Location, s3_to_https};
pub use object_store::ObjectStoreExtractor;
pub use pdf::{CARD_COLUMNS, PdfExtractor, extract_pages, parse_card_lines};
