use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::macros::Macros;

/// A food with its nutrition per 100 g.
///
/// Products are never edited after creation; a changed product is a new id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub macros: Macros,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, macros: Macros) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            macros: macros.finite_or_zero(),
            barcode: None,
            notes: None,
        }
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        let barcode = barcode.into();
        self.barcode = if barcode.trim().is_empty() {
            None
        } else {
            Some(barcode)
        };
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Case-insensitive name match, or barcode substring match.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        let lower = term.to_lowercase();
        self.name.to_lowercase().contains(&lower)
            || self
                .barcode
                .as_deref()
                .map(|code| code.contains(term))
                .unwrap_or(false)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} kcal | P: {} / F: {} / C: {} per 100 g)",
            self.name, self.macros.calories, self.macros.protein, self.macros.fat, self.macros.carbs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken() -> Product {
        Product::new("Chicken breast", Macros::new(165.0, 31.0, 3.6, 0.0)).with_barcode("200000000001")
    }

    #[test]
    fn test_product_new() {
        let product = Product::new("Rice", Macros::new(130.0, 2.7, 0.3, 28.0));
        assert_eq!(product.name, "Rice");
        assert!(product.barcode.is_none());
        assert!(product.notes.is_none());
    }

    #[test]
    fn test_blank_barcode_is_none() {
        let product = Product::new("Apple", Macros::zero()).with_barcode("  ");
        assert!(product.barcode.is_none());
    }

    #[test]
    fn test_matches_name_case_insensitive() {
        assert!(chicken().matches("CHICK"));
        assert!(chicken().matches("breast"));
        assert!(!chicken().matches("rice"));
    }

    #[test]
    fn test_matches_barcode_substring() {
        assert!(chicken().matches("0000001"));
        assert!(!chicken().matches("999"));
        assert!(!chicken().matches("   "));
    }

    #[test]
    fn test_product_json_roundtrip() {
        let product = chicken().with_notes("skinless");
        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains("\"calories\":165.0"));
        let parsed: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, product);
    }
}
