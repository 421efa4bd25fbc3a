//! Database credentials (`db_creds.yaml`)

use eyre::{Context, Result};
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

fn default_pg_port() -> u16 {
    5432
}

/// The flat key layout of `db_creds.yaml`
///
/// `RDS_*` keys describe the legacy source database, the unprefixed keys
/// describe the local target. Driver hints such as `RDS_DATABASE_TYPE` or
/// `DBAPI` are accepted and ignored.
#[derive(Clone, Deserialize)]
#[allow(non_snake_case)]
struct CredentialsFile {
    RDS_HOST: String,
    #[serde(default = "default_pg_port")]
    RDS_PORT: u16,
    RDS_DATABASE: String,
    RDS_USER: String,
    RDS_PASSWORD: String,
    HOST: String,
    #[serde(default = "default_pg_port")]
    PORT: u16,
    DATABASE: String,
    USER: String,
    PASSWORD: String,
}

/// One PostgreSQL connection
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl ConnectionConfig {
    /// Build a `tokio_postgres` config
    pub fn pg_config(&self) -> tokio_postgres::Config {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config.host(&self.host);
        pg_config.port(self.port);
        pg_config.dbname(&self.database);
        pg_config.user(&self.user);
        pg_config.password(&self.password);
        pg_config
    }

    /// Open a connection and drive it on a background task
    pub async fn connect(&self) -> Result<tokio_postgres::Client> {
        let (client, connection) = self
            .pg_config()
            .connect(tokio_postgres::NoTls)
            .await
            .with_context(|| format!("Failed to connect to PostgreSQL at {}", self))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("PostgreSQL connection error: {}", e);
            }
        });

        log::info!("Connected to PostgreSQL: {}", self.bright_black());
        Ok(client)
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Source and target database connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    /// Legacy database the raw users and orders tables are read from
    pub source: ConnectionConfig,
    /// Local database the cleaned tables are written to
    pub target: ConnectionConfig,
}

impl DatabaseCredentials {
    /// Read credentials from a YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse credentials file: {}", path.display()))
    }

    /// Parse credentials from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let file: CredentialsFile = serde_yaml::from_str(yaml)?;
        Ok(Self {
            source: ConnectionConfig {
                host: file.RDS_HOST,
                port: file.RDS_PORT,
                database: file.RDS_DATABASE,
                user: file.RDS_USER,
                password: file.RDS_PASSWORD,
            },
            target: ConnectionConfig {
                host: file.HOST,
                port: file.PORT,
                database: file.DATABASE,
                user: file.USER,
                password: file.PASSWORD,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CREDS: &str = r#"
RDS_HOST: data-handling-project.eu-west-1.rds.amazonaws.com
RDS_PASSWORD: hunter2
RDS_USER: aicore_admin
RDS_DATABASE: postgres
RDS_PORT: 5433
RDS_DATABASE_TYPE: postgresql
RDS_DBAPI: psycopg2
HOST: localhost
PASSWORD: s3cret
USER: postgres
DATABASE: sales_data
"#;

    #[test]
    fn test_flat_layout_split_into_source_and_target() {
        let creds = DatabaseCredentials::from_yaml(CREDS).unwrap();
        assert_eq!(creds.source.port, 5433);
        assert_eq!(creds.source.user, "aicore_admin");
        assert_eq!(creds.target.host, "localhost");
        assert_eq!(creds.target.port, 5432);
        assert_eq!(creds.target.database, "sales_data");
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let creds = DatabaseCredentials::from_yaml(CREDS).unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
        assert!(!creds.target.to_string().contains("s3cret"));
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let err = DatabaseCredentials::from_yaml("RDS_HOST: x\n").unwrap_err();
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_read_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CREDS.as_bytes()).unwrap();
        let creds = DatabaseCredentials::read(file.path()).unwrap();
        assert_eq!(creds.source.database, "postgres");

        let err = DatabaseCredentials::read("/nonexistent/db_creds.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read credentials file"));
    }
}
