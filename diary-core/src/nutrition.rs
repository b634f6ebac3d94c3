//! Portion and daily macro arithmetic.
//!
//! Values stay unrounded here. Rounding happens only for display through
//! [`Macros::rounded`].

use crate::input::parse_weight;
use crate::models::{DiaryEntry, Macros, MacrosOverride, Product};

/// Effective macros for `weight_grams` of `product`.
///
/// The product's per-100 g values are scaled by `weight_grams / 100`. Each
/// override field holding a finite number replaces the scaled value as is;
/// it is not scaled by weight.
pub fn portion_macros(
    product: &Product,
    weight_grams: u32,
    macros_override: Option<&MacrosOverride>,
) -> Macros {
    let factor = f64::from(weight_grams) / 100.0;
    let base = product.macros.scaled(factor);
    match macros_override {
        Some(o) => o.apply(base),
        None => base,
    }
}

/// Sum of every entry's portion macros, starting from zero.
pub fn daily_totals(entries: &[DiaryEntry]) -> Macros {
    entries.iter().fold(Macros::zero(), |acc, entry| {
        acc + portion_macros(&entry.product, entry.weight, entry.macros_override.as_ref())
    })
}

/// Preview for a weight still being typed. The text goes through the same
/// parsing rules as a submitted weight.
pub fn preview_macros(
    product: &Product,
    weight_text: &str,
    macros_override: Option<&MacrosOverride>,
) -> Macros {
    portion_macros(product, parse_weight(weight_text), macros_override)
}
