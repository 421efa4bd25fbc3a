//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use crate::storage::CsvWriter;
use crate::table::Table;
use eyre::Result;

/// ETL Pipeline that runs Extract, Transform, and Load for one entity
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (table in, table out)
/// - `L`: Loader type
///
/// # Example
/// ```no_run
/// use retail_data_centraliser::etl::Pipeline;
/// use retail_data_centraliser::clean::DateEventCleaner;
/// use retail_data_centraliser::storage::{CsvReader, CsvWriter};
///
/// # async fn example() -> eyre::Result<()> {
/// let pipeline = Pipeline::new(
///     CsvReader::new("date_details.csv"),
///     DateEventCleaner,
///     CsvWriter::new("dim_date_times.csv"),
/// );
///
/// let count = pipeline.run().await?;
/// println!("Loaded {} rows", count);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
    snapshot: Option<CsvWriter>,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = Table, Output = Table>,
    L: Loader,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
            snapshot: None,
        }
    }

    /// Also write the raw extracted table to a CSV file before cleaning
    pub fn with_raw_snapshot(mut self, writer: CsvWriter) -> Self {
        self.snapshot = Some(writer);
        self
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps:
    /// 1. Extract the raw table from the source
    /// 2. Clean it
    /// 3. Load the cleaned table to the destination
    ///
    /// Returns the number of rows successfully loaded
    ///
    /// # Errors
    /// Returns an error if any stage fails
    pub async fn run(&self) -> Result<usize> {
        log::info!("Starting ETL pipeline");

        // Extract
        log::debug!("Extracting from source...");
        let raw = self.extractor.extract().await?;
        log::info!("Extracted {} rows ({} columns)", raw.len(), raw.width());

        if let Some(snapshot) = &self.snapshot {
            snapshot.write(&raw)?;
            log::debug!("Saved raw snapshot to {}", snapshot.path().display());
        }

        // Transform
        log::debug!("Cleaning table...");
        let extracted = raw.len();
        let cleaned = self.transformer.transform(raw)?;
        log::info!(
            "Cleaned table has {} rows ({} dropped)",
            cleaned.len(),
            extracted.saturating_sub(cleaned.len())
        );

        // Load
        log::debug!("Loading to destination...");
        let count = self.loader.load(cleaned).await?;
        log::info!("Loaded {} rows", count);

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;
    use eyre::Result;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct MockExtractor(Table);

    impl Extractor for MockExtractor {
        async fn extract(&self) -> Result<Table> {
            Ok(self.0.clone())
        }
    }

    struct DropOddRows;

    impl Transformer for DropOddRows {
        type Input = Table;
        type Output = Table;
        fn transform(&self, input: Self::Input) -> Result<Self::Output> {
            input.filter_by("n", |v| matches!(v, Value::Integer(i) if i % 2 == 0))
        }
    }

    struct CaptureLoader(Arc<Mutex<Option<Table>>>);

    impl Loader for CaptureLoader {
        async fn load(&self, table: Table) -> Result<usize> {
            let count = table.len();
            *self.0.lock().unwrap() = Some(table);
            Ok(count)
        }
    }

    fn numbers(values: &[i64]) -> Table {
        Table::with_rows(
            ["n"],
            values.iter().map(|i| vec![Value::Integer(*i)]).collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_pipeline() {
        let captured = Arc::new(Mutex::new(None));

        let pipeline = Pipeline::new(
            MockExtractor(numbers(&[1, 2, 3, 4])),
            DropOddRows,
            CaptureLoader(captured.clone()),
        );

        let count = pipeline.run().await.unwrap();
        assert_eq!(count, 2);
        let loaded = captured.lock().unwrap().take().unwrap();
        assert_eq!(loaded, numbers(&[2, 4]));
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        let captured = Arc::new(Mutex::new(None));

        let pipeline = Pipeline::new(
            MockExtractor(numbers(&[])),
            DropOddRows,
            CaptureLoader(captured.clone()),
        );

        let count = pipeline.run().await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_raw_snapshot_keeps_dropped_rows() {
        let temp = TempDir::new().unwrap();
        let snapshot_path = temp.path().join("raw.csv");
        let captured = Arc::new(Mutex::new(None));

        let pipeline = Pipeline::new(
            MockExtractor(numbers(&[1, 2, 3])),
            DropOddRows,
            CaptureLoader(captured),
        )
        .with_raw_snapshot(CsvWriter::new(&snapshot_path));

        pipeline.run().await.unwrap();

        let content = std::fs::read_to_string(snapshot_path).unwrap();
        assert_eq!(content.lines().count(), 4);
    }
}
