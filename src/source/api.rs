//! Store details served by the stores REST API

use crate::client::ApiClient;
use crate::config::ApiCredentials;
use crate::etl::Extractor;
use crate::table::Table;
use eyre::{Context, Result, eyre};
use owo_colors::OwoColorize;
use reqwest::StatusCode;

/// Fetch every store, one request per store
pub struct ApiExtractor {
    client: ApiClient,
    creds: ApiCredentials,
}

impl ApiExtractor {
    pub fn new(client: ApiClient, creds: ApiCredentials) -> Self {
        Self { client, creds }
    }

    /// Ask the API how many stores there are
    ///
    /// # Errors
    /// Returns an error if the request fails or the response has no
    /// `number_stores` count
    pub async fn number_of_stores(&self) -> Result<usize> {
        let url = self.creds.number_of_stores_url()?;
        let body = self
            .client
            .get_json(&url)
            .await
            .context("Failed to retrieve the number of stores")?;
        read_store_count(&body)
    }
}

fn read_store_count(body: &serde_json::Value) -> Result<usize> {
    body.get("number_stores")
        .and_then(serde_json::Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| eyre!("Response has no numeric 'number_stores' field: {}", body))
}

impl Extractor for ApiExtractor {
    async fn extract(&self) -> Result<Table> {
        let count = self.number_of_stores().await?;
        log::info!("Retrieving {} stores", count.cyan());

        let mut records = Vec::with_capacity(count);
        for store_number in 0..count {
            let url = self.creds.store_url(store_number)?;
            let response = self.client.get(&url).await?;
            let status = response.status();
            if status != StatusCode::OK {
                let body = response.text().await.unwrap_or_default();
                log::warn!(
                    "Request for store {} failed with status {}: {}",
                    store_number,
                    status,
                    body
                );
                continue;
            }

            match response.json::<serde_json::Value>().await {
                Ok(serde_json::Value::Object(store)) => records.push(store),
                Ok(other) => log::warn!("Store {} is not a JSON object: {}", store_number, other),
                Err(e) => log::warn!("Store {} has an invalid body: {}", store_number, e),
            }
        }

        if records.len() < count {
            log::warn!("Retrieved {} of {} stores", records.len(), count);
        }
        Ok(Table::from_records(records))
    }
}
