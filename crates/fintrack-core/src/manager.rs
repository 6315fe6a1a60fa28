//! Reconciling state manager
//!
//! Owns the snapshot of transactions, budgets and categories. Writes are
//! applied to the snapshot before the remote call is issued and reconciled
//! once it resolves: confirmed on success, rolled back on failure. Every
//! change is a single replacement through a `watch` channel, so observers
//! never see a half-applied mutation.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use fintrack_config::Config;
use fintrack_utils::generate_temp_id;

use super::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use super::models::{Budget, NewBudget, NewTransaction, Transaction};
use super::store::{Resource, StoreError, StoreRef};
use super::types::{Category, RecordId, BUDGET_TEMP_PREFIX, TRANSACTION_TEMP_PREFIX};

/// Complete in-memory state at a point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Store order: date descending
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub categories: Vec<Category>,
    pub is_loading: bool,
    /// Last surfaced error message
    pub error: Option<String>,
    pub is_error_modal_open: bool,
    pub has_loaded: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            budgets: Vec::new(),
            categories: Vec::new(),
            is_loading: true,
            error: None,
            is_error_modal_open: false,
            has_loaded: false,
        }
    }
}

impl Snapshot {
    /// Find a transaction by identifier
    pub fn transaction(&self, id: &RecordId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| &t.id == id)
    }
}

/// Result of a fetch-all request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// All three collections were read and the snapshot replaced
    Loaded,
    /// Another fetch was outstanding
    SkippedInFlight,
    /// Data already cached; use `refresh` to force
    SkippedCached,
}

/// Clears the in-flight flag when the fetch ends, however it ends
struct FetchGuard<'a>(&'a AtomicBool);

impl<'a> FetchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FetchGuard(flag))
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owner of the snapshot; callers receive it by reference, there is no global
pub struct DataManager {
    store: StoreRef,
    state: watch::Sender<Snapshot>,
    fetching: AtomicBool,
    refetch_after_update: bool,
    logger: Arc<dyn ErrorLogger>,
}

impl DataManager {
    /// Create a manager over a store
    pub fn new(config: &Config, store: StoreRef) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self {
            store,
            state,
            fetching: AtomicBool::new(false),
            refetch_after_update: config.sync.refetch_after_update,
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    /// Replace the error logger
    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    /// Observe every snapshot replacement
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    // ==================== Reads ====================

    /// Load all collections unless a fetch is outstanding or data is cached
    pub async fn fetch_all(&self) -> CoreResult<FetchOutcome> {
        self.load(false).await
    }

    /// Load all collections even if data is cached
    pub async fn refresh(&self) -> CoreResult<FetchOutcome> {
        self.load(true).await
    }

    async fn load(&self, force: bool) -> CoreResult<FetchOutcome> {
        let Some(_guard) = FetchGuard::acquire(&self.fetching) else {
            log::debug!("fetch already in flight, skipping");
            return Ok(FetchOutcome::SkippedInFlight);
        };

        if !force {
            let cached = {
                let current = self.state.borrow();
                current.has_loaded && !current.transactions.is_empty()
            };
            if cached {
                log::debug!("data already loaded, skipping fetch");
                return Ok(FetchOutcome::SkippedCached);
            }
        }

        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let (transactions, budgets, categories) = tokio::join!(
            self.store.list_transactions(),
            self.store.list_budgets(),
            self.store.list_categories(),
        );

        match classify_fetch(transactions, budgets, categories) {
            Ok((transactions, budgets, categories)) => {
                log::info!(
                    "loaded {} transactions, {} budgets, {} categories",
                    transactions.len(),
                    budgets.len(),
                    categories.len()
                );
                self.state.send_replace(Snapshot {
                    transactions,
                    budgets,
                    categories,
                    is_loading: false,
                    error: None,
                    is_error_modal_open: false,
                    has_loaded: true,
                });
                Ok(FetchOutcome::Loaded)
            }
            Err(error) => {
                let context = ErrorContext::new("fetch_all").with_data("force", serde_json::json!(force));
                self.logger.log_error(&error, &context);
                self.state.send_modify(|s| {
                    s.is_loading = false;
                    s.error = Some(error.to_string());
                    s.is_error_modal_open = true;
                });
                Err(error)
            }
        }
    }

    // ==================== Transactions ====================

    /// Append a provisional transaction, then confirm or remove it
    pub async fn add_transaction(&self, input: NewTransaction) -> CoreResult<Transaction> {
        input.validate()?;

        let provisional = Transaction::provisional(input.clone(), generate_temp_id(TRANSACTION_TEMP_PREFIX));
        let temp_id = provisional.id.clone();
        self.state.send_modify(|s| s.transactions.push(provisional));
        log::debug!("added provisional transaction {}", temp_id);

        let result = self.store.create_transaction(&input).await.and_then(|saved| {
            confirmed(saved.id.clone(), Resource::Transactions).map(|_| saved)
        });

        match result {
            Ok(saved) => {
                self.state.send_modify(|s| {
                    if let Some(slot) = s.transactions.iter_mut().find(|t| t.id == temp_id) {
                        *slot = saved.clone();
                    }
                });
                log::info!("transaction {} confirmed as {}", temp_id, saved.id);
                Ok(saved)
            }
            Err(e) => {
                let error = mutation_error(e, "Failed to save transaction");
                self.state.send_modify(|s| {
                    s.transactions.retain(|t| t.id != temp_id);
                    s.error = Some(error.to_string());
                    s.is_error_modal_open = true;
                });
                self.logger.log_error(
                    &error,
                    &ErrorContext::new("add_transaction").with_record(temp_id.as_str()),
                );
                Err(error)
            }
        }
    }

    /// Replace a confirmed transaction in place, restoring it if the store refuses
    pub async fn update_transaction(&self, record: Transaction) -> CoreResult<()> {
        let context = ErrorContext::new("update_transaction").with_record(record.id.as_str());
        self.check_remote_id(&record.id, "edit", true, &context)?;
        record.fields().validate()?;

        let mut previous = None;
        self.state.send_modify(|s| {
            if let Some(slot) = s.transactions.iter_mut().find(|t| t.id == record.id) {
                previous = Some(std::mem::replace(slot, record.clone()));
            }
        });
        if previous.is_none() {
            self.logger.log_warning("updating a transaction missing from the snapshot", &context);
        }

        match self.store.update_transaction(&record).await {
            Ok(ack) => {
                log::debug!("update of {} acknowledged: {}", record.id, ack);
                if self.refetch_after_update {
                    self.reload_canonical(&record.id).await;
                }
                Ok(())
            }
            Err(e) => {
                let error = mutation_error(e, "Failed to update transaction");
                self.state.send_modify(|s| {
                    if let Some(original) = previous {
                        if let Some(slot) = s.transactions.iter_mut().find(|t| t.id == record.id) {
                            *slot = original;
                        }
                    }
                    s.error = Some(error.to_string());
                    s.is_error_modal_open = true;
                });
                self.logger.log_error(&error, &context);
                Err(error)
            }
        }
    }

    /// Remove a confirmed transaction, re-inserting it if the store refuses
    pub async fn delete_transaction(&self, id: &RecordId) -> CoreResult<()> {
        let context = ErrorContext::new("delete_transaction").with_record(id.as_str());
        self.check_remote_id(id, "delete", false, &context)?;

        let mut captured = None;
        self.state.send_modify(|s| {
            if let Some(pos) = s.transactions.iter().position(|t| &t.id == id) {
                captured = Some((pos, s.transactions.remove(pos)));
            }
        });

        match self.store.delete_transaction(id.as_str()).await {
            Ok(ack) => {
                log::debug!("delete of {} acknowledged: {}", id, ack);
                Ok(())
            }
            Err(e) => {
                let error = mutation_error(e, "Failed to delete transaction");
                self.state.send_modify(|s| {
                    if let Some((pos, original)) = captured {
                        let pos = pos.min(s.transactions.len());
                        s.transactions.insert(pos, original);
                    }
                    s.error = Some(error.to_string());
                    s.is_error_modal_open = true;
                });
                self.logger.log_error(&error, &context);
                Err(error)
            }
        }
    }

    // ==================== Budgets ====================

    /// Append a provisional budget, then confirm or remove it
    pub async fn add_budget(&self, input: NewBudget) -> CoreResult<Budget> {
        input.validate()?;

        let provisional = Budget::provisional(input.clone(), generate_temp_id(BUDGET_TEMP_PREFIX));
        let temp_id = provisional.id.clone();
        self.state.send_modify(|s| s.budgets.push(provisional));

        let result = self
            .store
            .create_budget(&input)
            .await
            .and_then(|saved| confirmed(saved.id.clone(), Resource::Budgets).map(|_| saved));

        match result {
            Ok(saved) => {
                self.state.send_modify(|s| {
                    if let Some(slot) = s.budgets.iter_mut().find(|b| b.id == temp_id) {
                        *slot = saved.clone();
                    }
                });
                log::info!("budget {} confirmed as {}", temp_id, saved.id);
                Ok(saved)
            }
            Err(e) => {
                let error = mutation_error(e, "Failed to save budget");
                self.state.send_modify(|s| {
                    s.budgets.retain(|b| b.id != temp_id);
                    s.error = Some(error.to_string());
                    s.is_error_modal_open = true;
                });
                self.logger.log_error(
                    &error,
                    &ErrorContext::new("add_budget").with_record(temp_id.as_str()),
                );
                Err(error)
            }
        }
    }

    // ==================== Errors ====================

    /// Close the error modal; data and the last message are left as they are
    pub fn dismiss_error(&self) {
        self.state.send_modify(|s| s.is_error_modal_open = false);
    }

    /// Reject a mutation on a provisional identifier, or with `check_format`
    /// on one not shaped like a store identifier, without calling the store
    fn check_remote_id(
        &self,
        id: &RecordId,
        action: &str,
        check_format: bool,
        context: &ErrorContext,
    ) -> CoreResult<()> {
        let rejection = if id.is_provisional() {
            Some(CoreError::UnsavedRecord {
                action: action.to_string(),
            })
        } else if check_format && !id.is_valid_remote() {
            Some(CoreError::InvalidId)
        } else {
            None
        };

        match rejection {
            Some(error) => {
                self.state.send_modify(|s| {
                    s.error = Some(error.to_string());
                    s.is_error_modal_open = true;
                });
                self.logger.log_error(&error, context);
                Err(error)
            }
            None => Ok(()),
        }
    }

    /// Swap the optimistic copy for the store's version of the record
    async fn reload_canonical(&self, id: &RecordId) {
        match self.store.list_transactions().await {
            Ok(list) => match list.into_iter().find(|t| &t.id == id) {
                Some(canonical) => self.state.send_modify(|s| {
                    if let Some(slot) = s.transactions.iter_mut().find(|t| &t.id == id) {
                        *slot = canonical;
                    }
                }),
                None => log::warn!("updated transaction {} missing from store listing", id),
            },
            Err(e) => log::warn!("could not re-read transaction {}: {}", id, e),
        }
    }
}

/// Store-issued records must carry a confirmed identifier
fn confirmed(id: RecordId, resource: Resource) -> Result<RecordId, StoreError> {
    if id.is_provisional() {
        Err(StoreError::Shape {
            resource,
            message: format!("store returned provisional identifier {}", id),
        })
    } else {
        Ok(id)
    }
}

/// Map a failed mutation call to the user-facing taxonomy
fn mutation_error(error: StoreError, fallback: &str) -> CoreError {
    if error.is_connectivity() {
        return CoreError::Connectivity;
    }
    if error.is_not_found() {
        return CoreError::NotFound {
            message: error
                .server_message()
                .unwrap_or("Transaction not found")
                .to_string(),
        };
    }
    match error {
        StoreError::Shape { resource, .. } => CoreError::InvalidShape {
            resource: resource.to_string(),
        },
        other => CoreError::RequestFailed {
            message: other.server_message().unwrap_or(fallback).to_string(),
        },
    }
}

/// Classify the three concurrent reads by severity: connectivity first,
/// then failed statuses, then payload shape
fn classify_fetch(
    transactions: Result<Vec<Transaction>, StoreError>,
    budgets: Result<Vec<Budget>, StoreError>,
    categories: Result<Vec<Category>, StoreError>,
) -> CoreResult<(Vec<Transaction>, Vec<Budget>, Vec<Category>)> {
    let errors = [
        (Resource::Transactions, transactions.as_ref().err()),
        (Resource::Budgets, budgets.as_ref().err()),
        (Resource::Categories, categories.as_ref().err()),
    ];

    if errors.iter().any(|(_, e)| e.map_or(false, |e| e.is_connectivity())) {
        return Err(CoreError::Connectivity);
    }

    let failed: Vec<String> = errors
        .iter()
        .filter(|(_, e)| e.map_or(false, |e| !matches!(e, StoreError::Shape { .. })))
        .map(|(resource, _)| resource.to_string())
        .collect();
    if failed.len() == errors.len() {
        return Err(CoreError::AllUnavailable);
    }
    if !failed.is_empty() {
        return Err(CoreError::PartialFailure { resources: failed });
    }

    if let Some((resource, _)) = errors.iter().find(|(_, e)| e.is_some()) {
        return Err(CoreError::InvalidShape {
            resource: resource.to_string(),
        });
    }

    match (transactions, budgets, categories) {
        (Ok(t), Ok(b), Ok(c)) => Ok((t, b, c)),
        // every error case returned above
        _ => Err(CoreError::AllUnavailable),
    }
}

// ==================== Tests ====================
