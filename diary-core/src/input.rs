//! Parsing of user-typed weight and macro fields.
//!
//! Nothing here fails: text that does not parse counts as "unset" and the
//! caller falls back to defaults or computed values.

use crate::models::{MacrosOverride, MIN_WEIGHT_GRAMS};

/// Grams from a weight field. Blank or invalid text counts as 0, the value
/// is rounded and then clamped to [`MIN_WEIGHT_GRAMS`].
pub fn parse_weight(text: &str) -> u32 {
    let value = text.trim().parse::<f64>().unwrap_or(0.0);
    if !value.is_finite() || value < f64::from(MIN_WEIGHT_GRAMS) {
        return MIN_WEIGHT_GRAMS;
    }
    let rounded = value.round();
    if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        (rounded as u32).max(MIN_WEIGHT_GRAMS)
    }
}

/// A macro field value. Blank, invalid and non-finite text is `None`.
pub fn parse_macro_field(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Raw text of the four override fields of an edit form.
#[derive(Debug, Clone, Default)]
pub struct OverrideFields<'a> {
    pub calories: Option<&'a str>,
    pub protein: Option<&'a str>,
    pub fat: Option<&'a str>,
    pub carbs: Option<&'a str>,
}

impl OverrideFields<'_> {
    /// Merges the typed fields over `current`.
    ///
    /// A field that was not touched keeps its current value. A touched field
    /// that is blank or unparseable clears it. Returns `None` when no field
    /// remains set.
    pub fn merge_into(&self, current: Option<MacrosOverride>) -> Option<MacrosOverride> {
        let current = current.unwrap_or_default();
        let pick = |typed: Option<&str>, existing: Option<f64>| match typed {
            Some(text) => parse_macro_field(text),
            None => existing,
        };
        MacrosOverride {
            calories: pick(self.calories, current.calories),
            protein: pick(self.protein, current.protein),
            fat: pick(self.fat, current.fat),
            carbs: pick(self.carbs, current.carbs),
        }
        .normalized()
    }
}

/// Whether free text should also be tried as a barcode.
pub fn looks_like_barcode(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("200"), 200);
        assert_eq!(parse_weight(" 150.6 "), 151);
        assert_eq!(parse_weight("150.4"), 150);
        assert_eq!(parse_weight(""), 1);
        assert_eq!(parse_weight("abc"), 1);
        assert_eq!(parse_weight("-50"), 1);
        assert_eq!(parse_weight("0"), 1);
        assert_eq!(parse_weight("NaN"), 1);
        assert_eq!(parse_weight("1e20"), u32::MAX);
    }

    #[test]
    fn test_parse_macro_field() {
        assert_eq!(parse_macro_field("12.5"), Some(12.5));
        assert_eq!(parse_macro_field(" 0 "), Some(0.0));
        assert_eq!(parse_macro_field(""), None);
        assert_eq!(parse_macro_field("   "), None);
        assert_eq!(parse_macro_field("lots"), None);
        assert_eq!(parse_macro_field("inf"), None);
    }

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let current = MacrosOverride::default().with_calories(300.0).with_fat(4.0);
        let fields = OverrideFields {
            protein: Some("20"),
            ..Default::default()
        };
        let merged = fields.merge_into(Some(current)).unwrap();
        assert_eq!(merged.calories, Some(300.0));
        assert_eq!(merged.protein, Some(20.0));
        assert_eq!(merged.fat, Some(4.0));
        assert_eq!(merged.carbs, None);
    }

    #[test]
    fn test_merge_blank_clears_field() {
        let current = MacrosOverride::default().with_calories(300.0);
        let fields = OverrideFields {
            calories: Some(""),
            ..Default::default()
        };
        assert_eq!(fields.merge_into(Some(current)), None);
    }

    #[test]
    fn test_looks_like_barcode() {
        assert!(looks_like_barcode("4600000000017"));
        assert!(looks_like_barcode("milk 3.2"));
        assert!(!looks_like_barcode("oatmeal"));
    }
}
