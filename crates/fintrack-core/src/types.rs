//! Basic types for the core module

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker every provisional identifier starts with
pub const PROVISIONAL_PREFIX: &str = "temp-";

/// Prefix for provisional transaction identifiers
pub const TRANSACTION_TEMP_PREFIX: &str = "temp-";

/// Prefix for provisional budget identifiers
pub const BUDGET_TEMP_PREFIX: &str = "temp-budget-";

/// Spending category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transportation,
    Housing,
    Entertainment,
    Utilities,
    Shopping,
    Other,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Transportation,
        Category::Housing,
        Category::Entertainment,
        Category::Utilities,
        Category::Shopping,
        Category::Other,
    ];

    /// Label as stored remotely
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::Housing => "Housing",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Shopping => "Shopping",
            Category::Other => "Other",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Invalid category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record identifier: a client-side placeholder until the store confirms it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    /// Assigned locally while the create call is outstanding
    Provisional(String),
    /// Issued by the remote store
    Confirmed(String),
}

impl RecordId {
    /// Classify a raw identifier by its marker
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(PROVISIONAL_PREFIX) {
            RecordId::Provisional(raw.to_string())
        } else {
            RecordId::Confirmed(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecordId::Provisional(id) | RecordId::Confirmed(id) => id,
        }
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, RecordId::Provisional(_))
    }

    /// Confirmed and shaped like a store identifier (24 hex characters)
    pub fn is_valid_remote(&self) -> bool {
        match self {
            RecordId::Confirmed(id) => fintrack_utils::is_object_id(id),
            RecordId::Provisional(_) => false,
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RecordId::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str() {
        assert_eq!("food".parse::<Category>(), Ok(Category::Food));
        assert_eq!(" Utilities ".parse::<Category>(), Ok(Category::Utilities));
        assert!("Travel".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_wire_labels() {
        let labels: Vec<String> = Category::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            labels,
            vec!["Food", "Transportation", "Housing", "Entertainment", "Utilities", "Shopping", "Other"]
        );
        assert_eq!(serde_json::to_string(&Category::Shopping).unwrap(), "\"Shopping\"");
    }

    #[test]
    fn test_record_id_classification() {
        assert!(RecordId::parse("temp-1715000000000-0").is_provisional());
        assert!(RecordId::parse("temp-budget-1715000000000-1").is_provisional());
        let confirmed = RecordId::parse("65a1f0c2b3d4e5f6a7b8c9d0");
        assert!(!confirmed.is_provisional());
        assert!(confirmed.is_valid_remote());
        assert!(!RecordId::parse("42").is_valid_remote());
    }

    #[test]
    fn test_record_id_serde_is_plain_string() {
        let id: RecordId = serde_json::from_str("\"temp-1\"").unwrap();
        assert_eq!(id, RecordId::Provisional("temp-1".to_string()));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"temp-1\"");
    }
}
