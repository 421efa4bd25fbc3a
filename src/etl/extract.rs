//! Extractor trait for pulling raw tables from sources

use crate::table::Table;
use eyre::Result;

/// Extractor trait for extracting one raw table from a source
///
/// Implementors define how to fetch data from sources like:
/// - Relational database tables
/// - PDF documents
/// - REST APIs
/// - Object storage and JSON documents
///
/// # Example
/// ```no_run
/// use retail_data_centraliser::etl::Extractor;
/// use retail_data_centraliser::table::Table;
/// use eyre::Result;
///
/// struct FixedExtractor;
///
/// impl Extractor for FixedExtractor {
///     async fn extract(&self) -> Result<Table> {
///         Ok(Table::new(["time_period"]))
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// Extract the raw table from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails (network, I/O, parsing, etc.)
    fn extract(&self) -> impl std::future::Future<Output = Result<Table>> + Send;
}
