//! Food Diary Core Library
//!
//! Shared types and logic for the food diary: portion macro math, the
//! local-first diary store, and the seams to the hosted backend, the local
//! cache and the barcode scanner.

pub mod cache;
pub mod catalog;
pub mod dates;
pub mod history;
pub mod input;
pub mod models;
pub mod nutrition;
pub mod remote;
pub mod scan;
pub mod store;

pub use cache::{Cache, CacheError, FileCache, MemoryCache};
pub use catalog::{seed_products, ProductCatalog, ProductDraft, SearchOutcome};
pub use history::{SearchHistory, SEARCH_HISTORY_LIMIT};
pub use models::{DiaryEntry, Macros, MacrosOverride, NewEntry, Product, RoundedMacros};
pub use nutrition::{daily_totals, portion_macros};
pub use remote::{MemoryRemote, OfflineRemote, RemoteError, RemoteStore, RestRemote};
pub use scan::{scan_once, BarcodeDecoder, Camera, CaptureStream, ScanError, ScanSession};
pub use store::{DiaryStore, EntriesByDate, Outcome, SyncStatus, UpdateOutcome};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
