//! Transaction search

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::models::Transaction;
use super::types::Category;

/// Criteria for narrowing the transaction list.
///
/// Every bound is inclusive; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive match on description, category or amount text
    pub query: Option<String>,
    pub category: Option<Category>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl TransactionFilter {
    /// Whether any criterion is set
    pub fn is_active(&self) -> bool {
        self.normalized_query().is_some()
            || self.category.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || self.min_amount.is_some()
            || self.max_amount.is_some()
    }

    /// Check a single transaction
    pub fn matches(&self, t: &Transaction) -> bool {
        if let Some(query) = self.normalized_query() {
            let hit = t.description.to_lowercase().contains(&query)
                || t.category.as_str().to_lowercase().contains(&query)
                || t.amount.normalize().to_string().contains(&query);
            if !hit {
                return false;
            }
        }
        if self.category.is_some_and(|c| c != t.category) {
            return false;
        }
        if self.date_from.is_some_and(|from| t.date < from) || self.date_to.is_some_and(|to| t.date > to) {
            return false;
        }
        if self.min_amount.is_some_and(|min| t.amount < min) || self.max_amount.is_some_and(|max| t.amount > max) {
            return false;
        }
        true
    }

    /// Matching transactions, in their original order
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions.iter().filter(|t| self.matches(t)).cloned().collect()
    }

    fn normalized_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordId;

    fn sample() -> Vec<Transaction> {
        let make = |id: u64, amount: i64, day: u32, description: &str, category: Category| Transaction {
            id: RecordId::Confirmed(format!("{:024x}", id)),
            amount: Decimal::new(amount, 2),
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            description: description.to_string(),
            category,
        };
        vec![
            make(1, 4550, 20, "Weekly groceries", Category::Food),
            make(2, 120000, 15, "Rent", Category::Housing),
            make(3, 899, 10, "Cinema tickets", Category::Entertainment),
            make(4, 1250, 2, "Lunch", Category::Food),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = TransactionFilter {
            query: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&sample()), sample());
    }

    #[test]
    fn test_query_matches_description_category_and_amount() {
        let by_text = TransactionFilter {
            query: Some("CINEMA".to_string()),
            ..Default::default()
        };
        assert_eq!(by_text.apply(&sample()).len(), 1);

        let by_category = TransactionFilter {
            query: Some("food".to_string()),
            ..Default::default()
        };
        assert_eq!(by_category.apply(&sample()).len(), 2);

        let by_amount = TransactionFilter {
            query: Some("45.5".to_string()),
            ..Default::default()
        };
        let hits = by_amount.apply(&sample());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].description, "Weekly groceries");
    }

    #[test]
    fn test_bounds_are_inclusive_and_order_kept() {
        let filter = TransactionFilter {
            category: Some(Category::Food),
            date_from: NaiveDate::from_ymd_opt(2024, 5, 2),
            date_to: NaiveDate::from_ymd_opt(2024, 5, 20),
            ..Default::default()
        };
        assert!(filter.is_active());
        let descriptions: Vec<String> = filter.apply(&sample()).into_iter().map(|t| t.description).collect();
        assert_eq!(descriptions, vec!["Weekly groceries", "Lunch"]);

        let amounts = TransactionFilter {
            min_amount: Some(Decimal::new(899, 2)),
            max_amount: Some(Decimal::new(4550, 2)),
            ..Default::default()
        };
        assert_eq!(amounts.apply(&sample()).len(), 3);
    }
}
