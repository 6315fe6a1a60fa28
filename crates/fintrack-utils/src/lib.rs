//! Utility functions and helpers

use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static OBJECT_ID: OnceCell<Regex> = OnceCell::new();

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Group the integer digits of a plain decimal string, e.g.
/// `format_number("-1234567.50", ",")` gives `-1,234,567.50`
pub fn format_number(n: &str, separator: &str) -> String {
    let (sign, unsigned) = match n.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", n),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::new();
    let mut count = 0;
    for c in int_part.chars().rev() {
        if count == 3 {
            grouped.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        grouped.push(c);
        count += 1;
    }
    let int_grouped: String = grouped.chars().rev().collect();

    match frac_part {
        Some(f) => format!("{}{}.{}", sign, int_grouped, f),
        None => format!("{}{}", sign, int_grouped),
    }
}

/// Generate a process-unique temporary identifier such as `temp-1715000000000-3`
pub fn generate_temp_id(prefix: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}{}-{}", prefix, now, seq)
}

/// Check for a 24-character hexadecimal store identifier
pub fn is_object_id(id: &str) -> bool {
    let pattern = OBJECT_ID.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{24}$").unwrap());
    pattern.is_match(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_groups_integer_part() {
        assert_eq!(format_number("1234567", ","), "1,234,567");
        assert_eq!(format_number("1234.50", ","), "1,234.50");
        assert_eq!(format_number("-98765.4", " "), "-98 765.4");
        assert_eq!(format_number("999", ","), "999");
        assert_eq!(format_number("1000", ""), "1000");
    }

    #[test]
    fn test_temp_ids_are_unique_and_prefixed() {
        let a = generate_temp_id("temp-");
        let b = generate_temp_id("temp-");
        assert!(a.starts_with("temp-"));
        assert_ne!(a, b);
        assert!(generate_temp_id("temp-budget-").starts_with("temp-budget-"));
    }

    #[test]
    fn test_is_object_id() {
        assert!(is_object_id("65a1f0c2b3d4e5f6a7b8c9d0"));
        assert!(is_object_id("65A1F0C2B3D4E5F6A7B8C9D0"));
        assert!(!is_object_id("65a1f0c2b3d4e5f6a7b8c9d"));
        assert!(!is_object_id("temp-1715000000000-0"));
        assert!(!is_object_id("zza1f0c2b3d4e5f6a7b8c9d0"));
    }
}
