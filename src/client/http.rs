//! HTTP client module
//!
//! Provides `ApiClient`, the one place the extractors make HTTP requests
//! from. The configured [`Auth`] is attached to every request as a default
//! header.

use super::Auth;
use eyre::{Context, Result, eyre};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use url::Url;

/// Header carrying the stores API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Thin wrapper over a `reqwest` client with default auth headers
///
/// # Example
/// ```no_run
/// use retail_data_centraliser::client::{ApiClient, Auth};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let client = ApiClient::try_new(Auth::ApiKey("key".to_string()))?;
/// let url = Url::parse("https://example.com/prod/number_stores")?;
/// let body = client.get_json(&url).await?;
/// println!("{}", body["number_stores"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    auth: Auth,
}

impl ApiClient {
    /// Build a client that sends `auth` with every request
    ///
    /// # Errors
    /// Returns an error if the key is not a valid header value or the HTTP
    /// client cannot be built
    pub fn try_new(auth: Auth) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Auth::ApiKey(key) = &auth {
            headers.insert(
                API_KEY_HEADER,
                key.parse::<HeaderValue>()
                    .context("API key is not a valid header value")?,
            );
        }
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, auth })
    }

    /// Client for public resources
    pub fn anonymous() -> Result<Self> {
        Self::try_new(Auth::None)
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Send a request and return the raw response, whatever its status
    pub async fn request(&self, method: Method, url: &Url) -> Result<reqwest::Response> {
        log::trace!("{} {}", method, url);
        self.client
            .request(method, url.clone())
            .send()
            .await
            .map_err(|e| eyre!("Failed to send request to {}: {}", url, e))
    }

    /// Helper for GET requests
    pub async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        self.request(Method::GET, url).await
    }

    /// GET a URL and fail unless the status is 200
    async fn get_ok(&self, url: &Url) -> Result<reqwest::Response> {
        let response = self.get(url).await?;
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            eyre::bail!("Request to {} failed with status {}: {}", url, status, body);
        }
        Ok(response)
    }

    /// GET a URL and parse the body as JSON
    pub async fn get_json(&self, url: &Url) -> Result<serde_json::Value> {
        self.get_ok(url)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// GET a URL and return the body bytes
    pub async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let bytes = self
            .get_ok(url)
            .await?
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        Ok(bytes.to_vec())
    }
}

impl std::fmt::Display for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiClient (auth: {})", self.auth)
    }
}
