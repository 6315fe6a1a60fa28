//! Derived views over a snapshot
//!
//! Everything here is a pure function of the transactions and budgets it is
//! given; nothing reads the remote store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use fintrack_config::{Config, CurrencyConfig, SymbolPosition};
use fintrack_utils::format_number;

use super::manager::Snapshot;
use super::models::{amount_format, Budget, Transaction};
use super::time::YearMonth;
use super::types::Category;

// ==================== Report Structures ====================

/// Spending in one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    #[serde(with = "amount_format")]
    pub amount: Decimal,
    pub count: usize,
    /// Share of the overall total, 0-100
    pub percentage: f64,
}

/// Spending in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpense {
    pub month: YearMonth,
    /// Display label such as `May 2024`
    pub label: String,
    #[serde(with = "amount_format")]
    pub total: Decimal,
}

/// Budgeted against spent for one category in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub category: Category,
    #[serde(rename = "Budget", with = "amount_format")]
    pub budget: Decimal,
    #[serde(rename = "Actual", with = "amount_format")]
    pub actual: Decimal,
}

impl BudgetComparison {
    /// Amount spent beyond the budget, if any
    pub fn overspend(&self) -> Option<Decimal> {
        (self.actual > self.budget).then(|| self.actual - self.budget)
    }
}

/// Dashboard figures
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    #[serde(with = "amount_format")]
    pub total_expenses: Decimal,
    pub transaction_count: usize,
    pub recent: Vec<Transaction>,
    pub month: YearMonth,
    pub breakdown: Vec<CategoryTotal>,
}

// ==================== Aggregations ====================

/// Sum of all amounts
pub fn total_expenses(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(|t| t.amount).sum()
}

/// First `n` transactions in snapshot order (newest first)
pub fn recent_transactions(transactions: &[Transaction], n: usize) -> Vec<Transaction> {
    transactions.iter().take(n).cloned().collect()
}

/// Per-category totals, largest first; restricted to `month` when given
pub fn category_breakdown(transactions: &[Transaction], month: Option<YearMonth>) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<Category, (Decimal, usize)> = BTreeMap::new();
    for t in transactions {
        if month.map_or(true, |m| m.contains(&t.date)) {
            let entry = totals.entry(t.category).or_insert((Decimal::ZERO, 0));
            entry.0 += t.amount;
            entry.1 += 1;
        }
    }

    let grand_total: Decimal = totals.values().map(|(amount, _)| *amount).sum();
    let mut rows: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (amount, count))| CategoryTotal {
            category,
            amount,
            count,
            percentage: percentage_of(amount, grand_total),
        })
        .collect();

    // stable sort keeps category order among equal amounts
    rows.sort_by(|a, b| b.amount.cmp(&a.amount));
    rows
}

/// Per-month totals in chronological order
pub fn monthly_expenses(transactions: &[Transaction]) -> Vec<MonthlyExpense> {
    let mut months: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    for t in transactions {
        *months.entry(t.month()).or_insert(Decimal::ZERO) += t.amount;
    }
    months
        .into_iter()
        .map(|(month, total)| MonthlyExpense {
            month,
            label: month.label(),
            total,
        })
        .collect()
}

/// Budget against actual spend for every category budgeted in `month`.
///
/// Several budgets for the same category and month are summed.
pub fn budget_vs_actual(budgets: &[Budget], transactions: &[Transaction], month: YearMonth) -> Vec<BudgetComparison> {
    let mut budgeted: BTreeMap<Category, Decimal> = BTreeMap::new();
    for b in budgets.iter().filter(|b| b.month == month) {
        *budgeted.entry(b.category).or_insert(Decimal::ZERO) += b.amount;
    }

    budgeted
        .into_iter()
        .map(|(category, budget)| BudgetComparison {
            category,
            budget,
            actual: transactions
                .iter()
                .filter(|t| t.category == category && month.contains(&t.date))
                .map(|t| t.amount)
                .sum(),
        })
        .collect()
}

/// Plain-language observations about `month`
pub fn insights(
    transactions: &[Transaction],
    budgets: &[Budget],
    month: YearMonth,
    top_n: usize,
    currency: &CurrencyConfig,
) -> Vec<String> {
    let mut lines = Vec::new();

    let top: Vec<String> = category_breakdown(transactions, Some(month))
        .into_iter()
        .take(top_n)
        .map(|row| format!("{} ({})", row.category, format_amount(row.amount, currency)))
        .collect();
    if !top.is_empty() {
        lines.push(format!(
            "Your top spending categories this month are {}.",
            top.join(" and ")
        ));
    }

    for row in budget_vs_actual(budgets, transactions, month) {
        if let Some(over) = row.overspend() {
            lines.push(format!(
                "You've exceeded your {} budget by {}!",
                row.category,
                format_amount(over, currency)
            ));
        }
    }

    lines
}

/// Dashboard figures for a snapshot
pub fn dashboard_summary(snapshot: &Snapshot, month: YearMonth, config: &Config) -> DashboardSummary {
    DashboardSummary {
        total_expenses: total_expenses(&snapshot.transactions),
        transaction_count: snapshot.transactions.len(),
        recent: recent_transactions(&snapshot.transactions, config.analytics.recent_count),
        month,
        breakdown: category_breakdown(&snapshot.transactions, Some(month)),
    }
}

// ==================== Formatting ====================

/// Render an amount with the configured symbol, grouping and precision
pub fn format_amount(amount: Decimal, currency: &CurrencyConfig) -> String {
    let places = currency.decimal_places;
    let rounded = amount.abs().round_dp(places);
    let digits = format_number(
        &format!("{:.*}", places as usize, rounded),
        &currency.thousands_separator,
    );
    let sign = if amount.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };

    match currency.symbol_position {
        SymbolPosition::Before => format!("{}{}{}", sign, currency.symbol, digits),
        SymbolPosition::After => format!("{}{} {}", sign, digits, currency.symbol),
    }
}

fn percentage_of(part: Decimal, whole: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    if whole.is_zero() {
        return 0.0;
    }
    (part * Decimal::ONE_HUNDRED / whole)
        .round_dp(2)
        .to_f64()
        .unwrap_or_default()
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordId;
    use chrono::NaiveDate;

    fn tx(day: (i32, u32, u32), amount: i64, category: Category) -> Transaction {
        Transaction {
            id: RecordId::Confirmed(format!("{:024x}", amount)),
            amount: Decimal::new(amount, 0),
            date: NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap(),
            description: format!("{} spend", category),
            category,
        }
    }

    fn budget(category: Category, amount: i64, month: &str) -> Budget {
        Budget {
            id: RecordId::Confirmed("b1".to_string()),
            category,
            amount: Decimal::new(amount, 0),
            month: month.parse().unwrap(),
        }
    }

    fn may() -> YearMonth {
        "2024-05".parse().unwrap()
    }

    #[test]
    fn test_budget_vs_actual_sums_duplicate_budgets() {
        let budgets = vec![
            budget(Category::Food, 100, "2024-05"),
            budget(Category::Food, 50, "2024-05"),
            budget(Category::Food, 999, "2024-04"),
        ];
        let transactions = vec![
            tx((2024, 5, 20), 120, Category::Food),
            tx((2024, 5, 2), 80, Category::Food),
            tx((2024, 4, 30), 500, Category::Food),
        ];

        let rows = budget_vs_actual(&budgets, &transactions, may());

        assert_eq!(
            rows,
            vec![BudgetComparison {
                category: Category::Food,
                budget: Decimal::new(150, 0),
                actual: Decimal::new(200, 0),
            }]
        );
        assert_eq!(
            serde_json::to_value(&rows[0]).unwrap(),
            serde_json::json!({"category": "Food", "Budget": 150.0, "Actual": 200.0})
        );
        assert_eq!(rows[0].overspend(), Some(Decimal::new(50, 0)));
    }

    #[test]
    fn test_category_breakdown_orders_by_amount() {
        let transactions = vec![
            tx((2024, 5, 3), 30, Category::Shopping),
            tx((2024, 5, 2), 60, Category::Housing),
            tx((2024, 5, 1), 10, Category::Shopping),
            tx((2024, 4, 1), 400, Category::Utilities),
        ];

        let rows = category_breakdown(&transactions, Some(may()));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category, Category::Housing);
        assert_eq!(rows[1].category, Category::Shopping);
        assert_eq!(rows[1].amount, Decimal::new(40, 0));
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[0].percentage, 60.0);

        assert_eq!(category_breakdown(&transactions, None)[0].category, Category::Utilities);
        assert!(category_breakdown(&[], Some(may())).is_empty());
    }

    #[test]
    fn test_monthly_expenses_are_chronological() {
        let transactions = vec![
            tx((2024, 5, 3), 30, Category::Food),
            tx((2024, 1, 9), 20, Category::Food),
            tx((2024, 5, 1), 5, Category::Other),
        ];

        let months = monthly_expenses(&transactions);

        let labels: Vec<&str> = months.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan 2024", "May 2024"]);
        assert_eq!(months[1].total, Decimal::new(35, 0));
    }

    #[test]
    fn test_totals_and_recent() {
        let transactions = vec![
            tx((2024, 5, 3), 30, Category::Food),
            tx((2024, 5, 2), 20, Category::Food),
            tx((2024, 5, 1), 5, Category::Other),
        ];
        assert_eq!(total_expenses(&transactions), Decimal::new(55, 0));
        let recent = recent_transactions(&transactions, 2);
        assert_eq!(recent, transactions[..2].to_vec());
        assert_eq!(recent_transactions(&transactions, 10).len(), 3);
    }

    #[test]
    fn test_insights_text() {
        let currency = CurrencyConfig::default();
        let transactions = vec![
            tx((2024, 5, 3), 120, Category::Food),
            tx((2024, 5, 2), 80, Category::Housing),
            tx((2024, 5, 1), 15, Category::Other),
        ];
        let budgets = vec![budget(Category::Food, 70, "2024-05")];

        let lines = insights(&transactions, &budgets, may(), 2, &currency);

        assert_eq!(
            lines,
            vec![
                "Your top spending categories this month are Food (₹120.00) and Housing (₹80.00).".to_string(),
                "You've exceeded your Food budget by ₹50.00!".to_string(),
            ]
        );
        assert!(insights(&[], &budgets, may(), 2, &currency).is_empty());
    }

    #[test]
    fn test_format_amount() {
        let mut currency = CurrencyConfig::default();
        assert_eq!(format_amount(Decimal::new(123456789, 2), &currency), "₹1,234,567.89");
        assert_eq!(format_amount(Decimal::new(5, 0), &currency), "₹5.00");
        assert_eq!(format_amount(Decimal::new(-25, 1), &currency), "-₹2.50");

        currency.symbol = "EUR".to_string();
        currency.symbol_position = SymbolPosition::After;
        currency.decimal_places = 0;
        currency.thousands_separator = ".".to_string();
        assert_eq!(format_amount(Decimal::new(12345, 0), &currency), "12.345 EUR");
    }

    #[test]
    fn test_dashboard_summary() {
        let snapshot = Snapshot {
            transactions: (1..=7).map(|d| tx((2024, 5, d), d as i64, Category::Food)).collect(),
            has_loaded: true,
            is_loading: false,
            ..Snapshot::default()
        };

        let summary = dashboard_summary(&snapshot, may(), &Config::default());

        assert_eq!(summary.transaction_count, 7);
        assert_eq!(summary.total_expenses, Decimal::new(28, 0));
        assert_eq!(summary.recent.len(), 5);
        assert_eq!(summary.breakdown[0].percentage, 100.0);
    }
}
