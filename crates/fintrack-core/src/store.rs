//! Remote store seam
//!
//! The `DataManager` talks to the remote collections only through
//! [`RemoteStore`]; the HTTP implementation lives in `fintrack-client`.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::models::{Budget, NewBudget, NewTransaction, Transaction};
use super::types::Category;

/// Remote collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Transactions,
    Budgets,
    Categories,
}

impl Resource {
    /// Collection name, also the path segment under the base URL
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Transactions => "transactions",
            Resource::Budgets => "budgets",
            Resource::Categories => "categories",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transport or protocol failure of a single store call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Non-2xx response; `message` is the body's `error` field when present
    #[error("{resource} request failed with status {status}")]
    Status {
        resource: Resource,
        status: u16,
        message: Option<String>,
    },

    /// No response at all
    #[error("network error: {message}")]
    Network { message: String },

    /// 2xx response whose body is not the expected structure
    #[error("unexpected {resource} payload: {message}")]
    Shape { resource: Resource, message: String },

    /// Request could not be built or encoded
    #[error("invalid request: {message}")]
    Request { message: String },
}

impl StoreError {
    /// Network failure or a 5xx response
    pub fn is_connectivity(&self) -> bool {
        match self {
            StoreError::Network { .. } => true,
            StoreError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Status { status: 404, .. })
    }

    /// Message supplied by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            StoreError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Store reference type
pub type StoreRef = Arc<dyn RemoteStore>;

/// Remote collections of transactions, budgets and categories.
///
/// Each call either succeeds once or fails once; there are no retries.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All transactions, date descending
    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError>;

    /// Create a transaction and return it with its store identifier
    async fn create_transaction(&self, input: &NewTransaction) -> Result<Transaction, StoreError>;

    /// Replace a transaction's fields; returns the store's acknowledgement message
    async fn update_transaction(&self, record: &Transaction) -> Result<String, StoreError>;

    /// Delete a transaction by identifier; returns the acknowledgement message
    async fn delete_transaction(&self, id: &str) -> Result<String, StoreError>;

    /// All budgets
    async fn list_budgets(&self) -> Result<Vec<Budget>, StoreError>;

    /// Create a budget and return it with its store identifier
    async fn create_budget(&self, input: &NewBudget) -> Result<Budget, StoreError>;

    /// The fixed category labels
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_classification() {
        let server = StoreError::Status {
            resource: Resource::Budgets,
            status: 503,
            message: None,
        };
        let client = StoreError::Status {
            resource: Resource::Budgets,
            status: 400,
            message: Some("Missing required fields".to_string()),
        };
        assert!(server.is_connectivity());
        assert!(!client.is_connectivity());
        assert_eq!(client.server_message(), Some("Missing required fields"));
        assert!(StoreError::Network { message: "refused".to_string() }.is_connectivity());
    }

    #[test]
    fn test_not_found() {
        let error = StoreError::Status {
            resource: Resource::Transactions,
            status: 404,
            message: Some("Transaction not found".to_string()),
        };
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "transactions request failed with status 404");
    }
}
