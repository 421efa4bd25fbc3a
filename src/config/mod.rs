//! Credential files
//!
//! The database and stores-API credentials are kept out of the manifest in
//! their own YAML files so they can be git-ignored separately.

mod api;
mod credentials;

pub use api::{ApiCredentials, STORE_NUMBER_PLACEHOLDER};
pub use credentials::{ConnectionConfig, DatabaseCredentials};
