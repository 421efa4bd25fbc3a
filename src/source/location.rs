//! Where a document lives: a URL or a local file

use crate::client::ApiClient;
use eyre::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Default region of public S3 buckets
pub const DEFAULT_S3_REGION: &str = "eu-west-1";

/// A readable document location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Url(Url),
    Path(PathBuf),
}

impl Location {
    /// Interpret `text` as an `http(s)` or `s3` URL, or else a file path
    ///
    /// `s3://bucket/key` is mapped to the bucket's public HTTPS address in
    /// [`DEFAULT_S3_REGION`].
    pub fn parse(text: &str) -> Result<Self> {
        match Url::parse(text) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Self::Url(url)),
            Ok(url) if url.scheme() == "s3" => Ok(Self::Url(s3_to_https(&url, DEFAULT_S3_REGION)?)),
            _ => Ok(Self::Path(PathBuf::from(text))),
        }
    }

    /// Read the whole document
    pub async fn read(&self, client: &ApiClient) -> Result<Vec<u8>> {
        match self {
            Self::Url(url) => {
                log::debug!("Downloading {}", url);
                client.get_bytes(url).await
            }
            Self::Path(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read file: {}", path.display())),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Map `s3://bucket/key` to `https://bucket.s3.region.amazonaws.com/key`
pub fn s3_to_https(url: &Url, region: &str) -> Result<Url> {
    if url.scheme() != "s3" {
        eyre::bail!("Not an s3:// address: {}", url);
    }
    let bucket = url
        .host_str()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| eyre::eyre!("s3 address has no bucket: {}", url))?;
    let key = url.path().trim_start_matches('/');
    if key.is_empty() {
        eyre::bail!("s3 address has no object key: {}", url);
    }

    let https = format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key);
    Url::parse(&https).with_context(|| format!("Invalid object URL: {}", https))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s3_address_mapped_to_public_url() {
        let location = Location::parse("s3://data-handling-public/products.csv").unwrap();
        assert_eq!(
            location.to_string(),
            "https://data-handling-public.s3.eu-west-1.amazonaws.com/products.csv"
        );
    }

    #[test]
    fn test_s3_without_key() {
        let url = Url::parse("s3://bucket").unwrap();
        assert!(s3_to_https(&url, "us-east-1").is_err());
    }

    #[test]
    fn test_plain_path() {
        let location = Location::parse("data/card_details.pdf").unwrap();
        assert_eq!(location, Location::Path(PathBuf::from("data/card_details.pdf")));
    }

    #[tokio::test]
    async fn test_read_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, b"[]").unwrap();

        let location = Location::parse(path.to_str().unwrap()).unwrap();
        let client = ApiClient::anonymous().unwrap();
        assert_eq!(location.read(&client).await.unwrap(), b"[]");
    }
}
