use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::macros::{Macros, MacrosOverride};
use super::product::Product;
use crate::nutrition::portion_macros;

/// Smallest weight an entry can carry, in grams.
pub const MIN_WEIGHT_GRAMS: u32 = 1;

/// One logged portion of a product.
///
/// The product is a snapshot taken when the entry was added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub product: Product,
    /// Grams, at least [`MIN_WEIGHT_GRAMS`]
    pub weight: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macros_override: Option<MacrosOverride>,
}

impl DiaryEntry {
    pub fn new(product: Product, weight: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            product,
            weight: clamp_weight(weight),
            macros_override: None,
        }
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = clamp_weight(weight);
        self
    }

    pub fn with_override(mut self, macros_override: MacrosOverride) -> Self {
        self.macros_override = macros_override.normalized();
        self
    }

    pub fn without_override(mut self) -> Self {
        self.macros_override = None;
        self
    }

    /// Effective macros of this portion.
    pub fn macros(&self) -> Macros {
        portion_macros(&self.product, self.weight, self.macros_override.as_ref())
    }

    /// Re-applies the storage invariants: weight clamp, finite product
    /// macros and override cleanup.
    pub(crate) fn normalize(mut self) -> Self {
        self.weight = clamp_weight(self.weight);
        self.product.macros = self.product.macros.finite_or_zero();
        self.macros_override = self.macros_override.and_then(|o| o.normalized());
        self
    }
}

impl fmt::Display for DiaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.macros().rounded();
        write!(
            f,
            "{} - {} g - {} kcal (P: {}g F: {}g C: {}g)",
            self.product.name, self.weight, rounded.calories, rounded.protein, rounded.fat, rounded.carbs
        )?;
        if self.macros_override.is_some() {
            write!(f, " [edited]")?;
        }
        Ok(())
    }
}

/// An entry that may not have an id yet. The store assigns one on add.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEntry {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub product: Product,
    pub weight: u32,
    #[serde(default)]
    pub macros_override: Option<MacrosOverride>,
}

impl NewEntry {
    pub fn new(product: Product, weight: u32) -> Self {
        Self {
            id: None,
            product,
            weight,
            macros_override: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_override(mut self, macros_override: MacrosOverride) -> Self {
        self.macros_override = Some(macros_override);
        self
    }

    /// Assigns an id if absent and applies the storage invariants.
    pub fn into_entry(self) -> DiaryEntry {
        DiaryEntry {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            product: self.product,
            weight: self.weight,
            macros_override: self.macros_override,
        }
        .normalize()
    }
}

impl From<DiaryEntry> for NewEntry {
    fn from(entry: DiaryEntry) -> Self {
        Self {
            id: Some(entry.id),
            product: entry.product,
            weight: entry.weight,
            macros_override: entry.macros_override,
        }
    }
}

fn clamp_weight(weight: u32) -> u32 {
    weight.max(MIN_WEIGHT_GRAMS)
}
