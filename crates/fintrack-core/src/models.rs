//! Core data models for the tracker

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{CoreError, CoreResult};
use super::time::YearMonth;
use super::types::{Category, RecordId};

/// Transaction as held in the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Provisional until the store assigns a real identifier
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Positive amount
    #[serde(with = "amount_format")]
    pub amount: Decimal,
    /// Transaction date
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    /// Free-form description
    pub description: String,
    /// Spending category
    pub category: Category,
}

impl Transaction {
    /// Build the placeholder shown while the create call is outstanding
    pub fn provisional(input: NewTransaction, id: String) -> Self {
        Self {
            id: RecordId::Provisional(id),
            amount: input.amount,
            date: input.date,
            description: input.description,
            category: input.category,
        }
    }

    /// Editable fields of this transaction
    pub fn fields(&self) -> NewTransaction {
        NewTransaction {
            amount: self.amount,
            date: self.date,
            description: self.description.clone(),
            category: self.category,
        }
    }

    /// Month the transaction falls in
    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }
}

/// Transaction input as entered by the user; also the create request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    #[serde(with = "amount_format")]
    pub amount: Decimal,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub description: String,
    pub category: Category,
}

impl NewTransaction {
    /// Form-level validation; failures are reported inline and never sent
    pub fn validate(&self) -> CoreResult<()> {
        if self.amount.is_zero() || self.description.trim().is_empty() {
            return Err(CoreError::Validation {
                message: "All fields are required".to_string(),
            });
        }
        if self.amount.is_sign_negative() {
            return Err(CoreError::Validation {
                message: "Amount must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Monthly budget for a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub category: Category,
    #[serde(with = "amount_format")]
    pub amount: Decimal,
    pub month: YearMonth,
}

impl Budget {
    /// Build the placeholder shown while the create call is outstanding
    pub fn provisional(input: NewBudget, id: String) -> Self {
        Self {
            id: RecordId::Provisional(id),
            category: input.category,
            amount: input.amount,
            month: input.month,
        }
    }
}

/// Budget input; also the create request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBudget {
    pub category: Category,
    #[serde(with = "amount_format")]
    pub amount: Decimal,
    pub month: YearMonth,
}

impl NewBudget {
    /// Form-level validation; failures are reported inline and never sent
    pub fn validate(&self) -> CoreResult<()> {
        if self.amount.is_zero() {
            return Err(CoreError::Validation {
                message: "All fields are required".to_string(),
            });
        }
        if self.amount.is_sign_negative() {
            return Err(CoreError::Validation {
                message: "Amount must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Amounts travel as JSON numbers; strings are accepted on input
pub mod amount_format {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        match amount.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => Err(serde::ser::Error::custom(format!("amount out of range: {}", amount))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(|d| d.normalize())
    }
}

/// Dates are written `YYYY-MM-DD`; RFC 3339 timestamps are accepted on input
pub mod date_format {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }

    /// Parse either a plain date or a timestamp (taken in UTC)
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc().date()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(amount: i64, description: &str) -> NewTransaction {
        NewTransaction {
            amount: Decimal::new(amount, 0),
            date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            description: description.to_string(),
            category: Category::Food,
        }
    }

    #[test]
    fn test_transaction_from_store_json() {
        let json = r#"{
            "_id": "65a1f0c2b3d4e5f6a7b8c9d0",
            "amount": 12.5,
            "date": "2024-05-03T00:00:00.000Z",
            "description": "Lunch",
            "category": "Food",
            "createdAt": "2024-05-03T10:11:12.000Z"
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id, RecordId::Confirmed("65a1f0c2b3d4e5f6a7b8c9d0".to_string()));
        assert_eq!(tx.amount, Decimal::new(125, 1));
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        assert_eq!(tx.month().to_string(), "2024-05");
    }

    #[test]
    fn test_create_body_shape() {
        let body = serde_json::to_value(input(40, "Bus pass")).unwrap();
        assert_eq!(body["amount"], serde_json::json!(40.0));
        assert_eq!(body["date"], "2024-05-03");
        assert_eq!(body["description"], "Bus pass");
        assert_eq!(body["category"], "Food");
        assert!(body.get("_id").is_none());
    }

    #[test]
    fn test_update_body_carries_id() {
        let tx = Transaction::provisional(input(5, "Tea"), "temp-1".to_string());
        let body = serde_json::to_value(&tx).unwrap();
        assert_eq!(body["_id"], "temp-1");
    }

    #[test]
    fn test_amount_accepts_string() {
        let json = r#"{"_id":"b1","category":"Housing","amount":"1200.00","month":"2024-05"}"#;
        let budget: Budget = serde_json::from_str(json).unwrap();
        assert_eq!(budget.amount, Decimal::new(1200, 0));
        assert_eq!(budget.month.to_string(), "2024-05");
    }

    #[test]
    fn test_amount_reads_json_numbers() {
        let amount = |json: &str| -> Decimal {
            let tx: NewTransaction = serde_json::from_str(json).unwrap();
            tx.amount
        };
        let body = |value: &str| {
            format!(r#"{{"amount":{},"date":"2024-05-03","description":"Tea","category":"Food"}}"#, value)
        };
        assert_eq!(amount(&body("3")), Decimal::new(3, 0));
        assert_eq!(amount(&body("3.50")), Decimal::new(35, 1));
        assert_eq!(amount(&body("\"1200.00\"")).to_string(), "1200");
    }

    #[test]
    fn test_transaction_validation() {
        assert!(input(10, "Coffee").validate().is_ok());

        let err = input(0, "Coffee").validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: All fields are required");

        let err = input(10, "   ").validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: All fields are required");

        let err = input(-3, "Refund").validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Amount must be positive");
    }

    #[test]
    fn test_budget_validation() {
        let mut budget = NewBudget {
            category: Category::Food,
            amount: Decimal::new(100, 0),
            month: "2024-05".parse().unwrap(),
        };
        assert!(budget.validate().is_ok());
        budget.amount = Decimal::new(-1, 0);
        assert!(matches!(budget.validate(), Err(CoreError::Validation { .. })));
    }

    #[test]
    fn test_date_parse_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(date_format::parse("2024-01-31"), Some(expected));
        assert_eq!(date_format::parse("2024-01-31T23:00:00+00:00"), Some(expected));
        assert_eq!(date_format::parse("31/01/2024"), None);
    }
}
