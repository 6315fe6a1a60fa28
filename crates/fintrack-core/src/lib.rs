//! Snapshot reconciliation, data model and analytics

pub mod error;
pub mod filter;
pub mod manager;
pub mod models;
pub mod reports;
pub mod store;
pub mod time;
pub mod types;

pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use filter::TransactionFilter;
pub use manager::{DataManager, FetchOutcome, Snapshot};
pub use models::{Budget, NewBudget, NewTransaction, Transaction};
pub use store::{RemoteStore, Resource, StoreError, StoreRef};
pub use time::YearMonth;
pub use types::{Category, RecordId};
