//! fintrack main entry point

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fintrack_client::HttpStore;
use fintrack_config::Config;
use fintrack_core::reports::{self, format_amount};
use fintrack_core::{
    Category, CoreError, DataManager, FetchOutcome, NewBudget, NewTransaction, RecordId, Transaction, TransactionFilter,
    YearMonth,
};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "fintrack")]
#[command(version = "0.1.0")]
#[command(about = "Personal finance tracker backed by a remote store", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "fintrack.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Totals, recent transactions and this month's breakdown
    Summary,
    /// List transactions, optionally filtered
    List {
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        min: Option<Decimal>,
        #[arg(long)]
        max: Option<Decimal>,
    },
    /// Record a transaction
    Add {
        #[arg(long)]
        amount: Decimal,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "Other")]
        category: Category,
    },
    /// Change fields of a saved transaction
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<Category>,
    },
    /// Delete a saved transaction
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Set a monthly budget for a category
    Budget {
        #[arg(long)]
        category: Category,
        #[arg(long)]
        amount: Decimal,
        /// YYYY-MM, defaults to the current month
        #[arg(long)]
        month: Option<YearMonth>,
    },
    /// Budget against actual spending
    Budgets {
        #[arg(long)]
        month: Option<YearMonth>,
    },
    /// Spending insights for a month
    Insights {
        #[arg(long)]
        month: Option<YearMonth>,
    },
    /// Show the category list
    Categories,
    /// Write the default configuration file
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(Command::InitConfig) = args.command {
        return init_config(&args.config);
    }

    let config = load_config(&args.config)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();
    log::info!("using store at {}", config.remote.base_url);

    let store = HttpStore::new(&config).context("Invalid remote store URL")?;
    let manager = DataManager::new(&config, Arc::new(store));

    let rt = Runtime::new()?;
    rt.block_on(run(&manager, &config, args.command.unwrap_or(Command::Summary)))
}

fn init_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    std::fs::write(path, Config::generate_default())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

/// A missing file means defaults; anything else wrong with it is fatal
fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    Config::load(path.to_path_buf()).map_err(|e| anyhow!("{}", e.to_details()))
}

async fn run(manager: &DataManager, config: &Config, command: Command) -> anyhow::Result<()> {
    if let Some(notice) = fetch_notice(&manager.fetch_all().await) {
        eprintln!("{}", notice);
        manager.dismiss_error();
    }
    let current = YearMonth::current();

    match command {
        Command::Summary => {
            let summary = reports::dashboard_summary(&manager.snapshot(), current, config);
            println!("Total expenses: {}", format_amount(summary.total_expenses, &config.currency));
            println!("Transactions:   {}", summary.transaction_count);
            println!("\nRecent:");
            print_transactions(&summary.recent, config);
            println!("\n{}:", current.label());
            for row in &summary.breakdown {
                println!(
                    "  {:<15} {:>14} {:>6.1}%",
                    row.category.as_str(),
                    format_amount(row.amount, &config.currency),
                    row.percentage
                );
            }
        }
        Command::List { query, category, from, to, min, max } => {
            let filter = TransactionFilter {
                query,
                category,
                date_from: from,
                date_to: to,
                min_amount: min,
                max_amount: max,
            };
            let matched = filter.apply(&manager.snapshot().transactions);
            print_transactions(&matched, config);
            if filter.is_active() {
                println!("{} matching", matched.len());
            }
        }
        Command::Add { amount, date, description, category } => {
            let input = NewTransaction {
                amount,
                date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
                description,
                category,
            };
            let saved = surface(manager, manager.add_transaction(input).await)?;
            println!("Saved transaction {}", saved.id);
        }
        Command::Edit { id, amount, date, description, category } => {
            let id = RecordId::parse(&id);
            let Some(mut record) = manager.snapshot().transaction(&id).cloned() else {
                bail!("Transaction not found");
            };
            record.amount = amount.unwrap_or(record.amount);
            record.date = date.unwrap_or(record.date);
            record.description = description.unwrap_or(record.description);
            record.category = category.unwrap_or(record.category);
            surface(manager, manager.update_transaction(record).await)?;
            println!("Updated transaction {}", id);
        }
        Command::Delete { id } => {
            let id = RecordId::parse(&id);
            surface(manager, manager.delete_transaction(&id).await)?;
            println!("Deleted transaction {}", id);
        }
        Command::Budget { category, amount, month } => {
            let input = NewBudget {
                category,
                amount,
                month: month.unwrap_or(current),
            };
            let saved = surface(manager, manager.add_budget(input).await)?;
            println!("Saved budget {} for {} in {}", saved.id, saved.category, saved.month);
        }
        Command::Budgets { month } => {
            let month = month.unwrap_or(current);
            let snapshot = manager.snapshot();
            println!("{:<15} {:>14} {:>14}", month.label(), "Budget", "Actual");
            for row in reports::budget_vs_actual(&snapshot.budgets, &snapshot.transactions, month) {
                let flag = if row.overspend().is_some() { " !" } else { "" };
                println!(
                    "{:<15} {:>14} {:>14}{}",
                    row.category.as_str(),
                    format_amount(row.budget, &config.currency),
                    format_amount(row.actual, &config.currency),
                    flag
                );
            }
        }
        Command::Insights { month } => {
            let snapshot = manager.snapshot();
            let lines = reports::insights(
                &snapshot.transactions,
                &snapshot.budgets,
                month.unwrap_or(current),
                config.analytics.top_categories,
                &config.currency,
            );
            if lines.is_empty() {
                println!("No insights available yet. Add more transactions to see insights.");
            }
            for line in lines {
                println!("- {}", line);
            }
        }
        Command::Categories => {
            for category in &manager.snapshot().categories {
                println!("{}", category);
            }
        }
        // handled in main before the store is contacted
        Command::InitConfig => {}
    }

    Ok(())
}

/// Print the error the manager surfaced, then dismiss it
fn surface<T>(manager: &DataManager, result: Result<T, CoreError>) -> anyhow::Result<T> {
    result.map_err(|e| {
        eprintln!("{}", error_report(&e));
        manager.dismiss_error();
        anyhow!(e)
    })
}

/// A failed load is reported but not fatal; the command runs on what was loaded
fn fetch_notice(result: &Result<FetchOutcome, CoreError>) -> Option<String> {
    result.as_ref().err().map(error_report)
}

fn error_report(error: &CoreError) -> String {
    let mut report = error.to_details().to_string();
    if error.is_retryable() {
        report.push_str("\nRe-run the command to retry loading.");
    }
    report
}

fn print_transactions(transactions: &[Transaction], config: &Config) {
    for t in transactions {
        println!(
            "  {}  {:<15} {:>14}  {}  [{}]",
            t.date,
            t.category.as_str(),
            format_amount(t.amount, &config.currency),
            t.description,
            t.id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_load_failure_is_reported_not_fatal() {
        let failed = Err(CoreError::PartialFailure {
            resources: vec!["categories".to_string()],
        });

        let notice = fetch_notice(&failed).unwrap();

        assert!(notice.contains("Failed to load categories. Some data may be unavailable."));
        assert!(notice.ends_with("Re-run the command to retry loading."));
        assert_eq!(fetch_notice(&Ok(FetchOutcome::Loaded)), None);
        assert_eq!(fetch_notice(&Ok(FetchOutcome::SkippedCached)), None);
    }

    #[test]
    fn test_retry_hint_only_for_retryable_errors() {
        let report = error_report(&CoreError::InvalidId);
        assert!(report.starts_with("[INVALID_ID]"));
        assert!(!report.contains("Re-run"));
        assert!(error_report(&CoreError::Connectivity).contains("Re-run the command"));
    }
}
