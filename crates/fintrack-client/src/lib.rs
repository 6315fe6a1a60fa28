//! HTTP client for the remote store
//!
//! Talks to `{base_url}/transactions`, `{base_url}/budgets` and
//! `{base_url}/categories` with JSON bodies and maps every outcome onto
//! [`fintrack_core::StoreError`].

pub mod http;

pub use http::HttpStore;
