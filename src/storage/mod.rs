//! File system storage operations
//!
//! CSV snapshots of raw extracts and cleaned tables.

mod csv_file;

pub use csv_file::{CsvReader, CsvWriter, parse_csv};
