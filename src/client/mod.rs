//! HTTP client and authentication.
//!
//! This module provides the [`ApiClient`] used by the extractors, along with
//! the [`Auth`] type.

mod auth;
mod http;

pub use auth::Auth;
pub use http::{API_KEY_HEADER, ApiClient};
