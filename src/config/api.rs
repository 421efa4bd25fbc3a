//! Stores API credentials (`api_creds.yaml`)

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use url::Url;

/// Placeholder replaced by the store index in the per-store endpoint
pub const STORE_NUMBER_PLACEHOLDER: &str = "{store_number}";

/// API key and endpoints of the stores API
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredentials {
    #[serde(default)]
    pub api_key: Option<String>,
    pub number_of_stores_endpoint: String,
    pub retrieve_a_store_endpoint: String,
}

impl ApiCredentials {
    /// Read credentials from a YAML file
    ///
    /// `API_KEY` in the environment overrides the key in the file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read API credentials file: {}", path.display()))?;
        let mut creds = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse API credentials file: {}", path.display()))?;

        if let Ok(key) = std::env::var("API_KEY") {
            log::debug!("Using API key from the environment");
            creds.api_key = Some(key);
        }
        Ok(creds)
    }

    /// Parse and validate credentials from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let creds: Self = serde_yaml::from_str(yaml)?;
        creds.number_of_stores_url()?;
        if !creds
            .retrieve_a_store_endpoint
            .contains(STORE_NUMBER_PLACEHOLDER)
        {
            eyre::bail!(
                "retrieve_a_store_endpoint must contain {}",
                STORE_NUMBER_PLACEHOLDER
            );
        }
        creds.store_url(0)?;
        Ok(creds)
    }

    pub fn number_of_stores_url(&self) -> Result<Url> {
        Url::parse(&self.number_of_stores_endpoint).with_context(|| {
            format!(
                "Invalid number_of_stores_endpoint: {}",
                self.number_of_stores_endpoint
            )
        })
    }

    /// Endpoint of one store
    pub fn store_url(&self, store_number: usize) -> Result<Url> {
        let endpoint = self
            .retrieve_a_store_endpoint
            .replace(STORE_NUMBER_PLACEHOLDER, &store_number.to_string());
        Url::parse(&endpoint).with_context(|| format!("Invalid store endpoint: {}", endpoint))
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("number_of_stores_endpoint", &self.number_of_stores_endpoint)
            .field("retrieve_a_store_endpoint", &self.retrieve_a_store_endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CREDS: &str = r#"
api_key: file-key
number_of_stores_endpoint: https://aqj7u5id95.execute-api.eu-west-1.amazonaws.com/prod/number_stores
retrieve_a_store_endpoint: https://aqj7u5id95.execute-api.eu-west-1.amazonaws.com/prod/store_details/{store_number}
"#;

    fn creds_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CREDS.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_store_url_substitution() {
        let creds = ApiCredentials::from_yaml(CREDS).unwrap();
        assert_eq!(
            creds.store_url(42).unwrap().as_str(),
            "https://aqj7u5id95.execute-api.eu-west-1.amazonaws.com/prod/store_details/42"
        );
    }

    #[test]
    fn test_placeholder_required() {
        let yaml = CREDS.replace("{store_number}", "0");
        let err = ApiCredentials::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("{store_number}"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let creds = ApiCredentials::from_yaml(CREDS).unwrap();
        assert!(!format!("{:?}", creds).contains("file-key"));
    }

    #[test]
    #[serial]
    fn test_env_key_overrides_file() {
        let file = creds_file();
        unsafe {
            std::env::set_var("API_KEY", "env-key");
        }
        let creds = ApiCredentials::read(file.path()).unwrap();
        unsafe {
            std::env::remove_var("API_KEY");
        }
        assert_eq!(creds.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    #[serial]
    fn test_file_key_without_env() {
        let file = creds_file();
        unsafe {
            std::env::remove_var("API_KEY");
        }
        let creds = ApiCredentials::read(file.path()).unwrap();
        assert_eq!(creds.api_key.as_deref(), Some("file-key"));
    }
}
