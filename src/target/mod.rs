//! Destination database

mod postgres;

pub use postgres::{PostgresLoader, create_table_sql, insert_sql, pg_type, quote_ident};
