mod entry;
mod macros;
mod product;

pub use entry::{DiaryEntry, NewEntry, MIN_WEIGHT_GRAMS};
pub use macros::{Macros, MacrosOverride, RoundedMacros};
pub use product::Product;
