use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Calories, protein, fat and carbs.
///
/// Attached to a [`Product`](super::Product) the values are per 100 g. Used as
/// a portion result or an override they are absolute amounts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl Macros {
    pub fn new(calories: f64, protein: f64, fat: f64, carbs: f64) -> Self {
        Self {
            calories,
            protein,
            fat,
            carbs,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            fat: self.fat * factor,
            carbs: self.carbs * factor,
        }
    }

    /// Replaces NaN and infinite fields with 0.
    pub fn finite_or_zero(&self) -> Self {
        let clean = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            calories: clean(self.calories),
            protein: clean(self.protein),
            fat: clean(self.fat),
            carbs: clean(self.carbs),
        }
    }

    /// Whole-number values for display. Rounds half away from zero.
    pub fn rounded(&self) -> RoundedMacros {
        RoundedMacros {
            calories: self.calories.round() as i64,
            protein: self.protein.round() as i64,
            fat: self.fat.round() as i64,
            carbs: self.carbs.round() as i64,
        }
    }
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            fat: self.fat + rhs.fat,
            carbs: self.carbs + rhs.carbs,
        }
    }
}

impl AddAssign for Macros {
    fn add_assign(&mut self, rhs: Macros) {
        *self = *self + rhs;
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Macros>>(iter: I) -> Macros {
        iter.fold(Macros::zero(), Add::add)
    }
}

/// Display-only integer macros.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RoundedMacros {
    pub calories: i64,
    pub protein: i64,
    pub fat: i64,
    pub carbs: i64,
}

impl fmt::Display for RoundedMacros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} kcal | P: {}g | F: {}g | C: {}g",
            self.calories, self.protein, self.fat, self.carbs
        )
    }
}

/// Per-field manual replacement of computed portion values.
///
/// A field only counts when it holds a finite number; anything else falls
/// back to the computed value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MacrosOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl MacrosOverride {
    pub fn with_calories(mut self, calories: f64) -> Self {
        self.calories = Some(calories);
        self
    }

    pub fn with_protein(mut self, protein: f64) -> Self {
        self.protein = Some(protein);
        self
    }

    pub fn with_fat(mut self, fat: f64) -> Self {
        self.fat = Some(fat);
        self
    }

    pub fn with_carbs(mut self, carbs: f64) -> Self {
        self.carbs = Some(carbs);
        self
    }

    /// Replaces each field of `base` that this override sets to a finite value.
    pub fn apply(&self, base: Macros) -> Macros {
        Macros {
            calories: finite(self.calories).unwrap_or(base.calories),
            protein: finite(self.protein).unwrap_or(base.protein),
            fat: finite(self.fat).unwrap_or(base.fat),
            carbs: finite(self.carbs).unwrap_or(base.carbs),
        }
    }

    /// Drops non-finite fields. Returns `None` when nothing is left.
    pub fn normalized(&self) -> Option<MacrosOverride> {
        let cleaned = MacrosOverride {
            calories: finite(self.calories),
            protein: finite(self.protein),
            fat: finite(self.fat),
            carbs: finite(self.carbs),
        };
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.calories.is_none() && self.protein.is_none() && self.fat.is_none() && self.carbs.is_none()
    }
}
