//! Pipeline driver
//!
//! Turns a [`PipelineManifest`] into one extract-clean-load pipeline per
//! entity and runs them in order.

mod entity;
mod manifest;
mod runner;

pub use entity::{Entity, EntityCleaner};
pub use manifest::{EntityConfig, PipelineManifest, SourceSpec};
pub use runner::{EntityLoader, RunContext, RunOptions, RunSummary, SourceExtractor, run};
