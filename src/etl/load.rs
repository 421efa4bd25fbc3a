//! Loader trait for writing cleaned tables to destinations

use crate::table::Table;
use eyre::Result;

/// Loader trait for loading a table to a destination
///
/// Implementors define how to persist a table:
/// - Database tables (replacing existing contents)
/// - CSV files
///
/// # Example
/// ```no_run
/// use retail_data_centraliser::etl::Loader;
/// use retail_data_centraliser::table::Table;
/// use eyre::Result;
///
/// struct CountingLoader;
///
/// impl Loader for CountingLoader {
///     async fn load(&self, table: Table) -> Result<usize> {
///         Ok(table.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// Load the table to the destination
    ///
    /// Returns the number of rows successfully loaded
    ///
    /// # Errors
    /// Returns an error if loading fails (network, I/O, type conversion, etc.)
    fn load(&self, table: Table) -> impl std::future::Future<Output = Result<usize>> + Send;
}
