//! Core ETL (Extract, Transform, Load) abstractions
//!
//! This module provides trait definitions for building per-entity pipelines
//! that extract a raw table from a source, clean it, and load it to a destination.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::Pipeline;
pub use transform::{Chain, Transformer};
