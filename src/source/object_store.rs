//! CSV objects in public S3 buckets

use super::Location;
use crate::client::ApiClient;
use crate::etl::Extractor;
use crate::storage::parse_csv;
use crate::table::Table;
use eyre::{Context, Result};

/// Download a CSV object and parse it
///
/// The objects were exported with a leading unnamed index column, which is
/// discarded.
pub struct ObjectStoreExtractor {
    client: ApiClient,
    location: Location,
}

impl ObjectStoreExtractor {
    /// Build from an `s3://bucket/key` address (or an HTTPS URL or path)
    pub fn new(client: ApiClient, address: &str) -> Result<Self> {
        Ok(Self {
            client,
            location: Location::parse(address)?,
        })
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

impl Extractor for ObjectStoreExtractor {
    async fn extract(&self) -> Result<Table> {
        let bytes = self.location.read(&self.client).await?;
        parse_csv(&bytes, true, true)
            .with_context(|| format!("Failed to parse CSV object: {}", self.location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    #[tokio::test]
    async fn test_index_column_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        std::fs::write(
            &path,
            ",product_name,product_price,weight\n0,Soft Toy,£39.99,1.6kg\n1,Tea,£1.00,\n",
        )
        .unwrap();

        let extractor =
            ObjectStoreExtractor::new(ApiClient::anonymous().unwrap(), path.to_str().unwrap())
                .unwrap();
        let table = extractor.extract().await.unwrap();

        assert_eq!(table.column_names(), vec!["product_name", "product_price", "weight"]);
        assert_eq!(table.value(1, "weight"), Some(&Value::Null));
    }

    #[test]
    fn test_s3_address() {
        let extractor =
            ObjectStoreExtractor::new(ApiClient::anonymous().unwrap(), "s3://data-handling-public/products.csv")
                .unwrap();
        assert!(matches!(extractor.location(), Location::Url(_)));
    }
}
