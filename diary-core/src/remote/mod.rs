//! Seam to the hosted backend that persists products and diary entries.
//!
//! The diary store talks to a [`RemoteStore`] and treats every failure as
//! non-fatal. Three implementations ship with the crate:
//!
//! - [`RestRemote`]: PostgREST-style HTTP backend
//! - [`MemoryRemote`]: in-memory tables, handy for tests and demos
//! - [`OfflineRemote`]: no backend configured, every call fails fast

mod memory;
mod rest;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{DiaryEntry, Product};

pub use memory::MemoryRemote;
pub use rest::RestRemote;

/// Errors returned by remote store calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("Remote store not configured. Add backend url and api_key to config.")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

/// Table-like access to entries and products, scoped by user.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All entries of `user_id` on `date`, oldest first.
    async fn list_entries(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<DiaryEntry>, RemoteError>;

    /// Inserts or replaces the entry with the same id.
    async fn upsert_entry(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: &DiaryEntry,
    ) -> Result<(), RemoteError>;

    /// Deletes the entry only if it belongs to `user_id`.
    async fn delete_entry(&self, user_id: &str, id: Uuid) -> Result<(), RemoteError>;

    /// Products whose name or barcode match `query`, best match first.
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RemoteError>;

    async fn upsert_product(&self, product: &Product) -> Result<(), RemoteError>;
}

/// Used when no backend is configured. Keeps the diary usable offline.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRemote;

#[async_trait]
impl RemoteStore for OfflineRemote {
    async fn list_entries(&self, _: &str, _: NaiveDate) -> Result<Vec<DiaryEntry>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn upsert_entry(&self, _: &str, _: NaiveDate, _: &DiaryEntry) -> Result<(), RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn delete_entry(&self, _: &str, _: Uuid) -> Result<(), RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn search_products(&self, _: &str) -> Result<Vec<Product>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn upsert_product(&self, _: &Product) -> Result<(), RemoteError> {
        Err(RemoteError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_remote_always_not_configured() {
        let remote = OfflineRemote;
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(
            remote.list_entries("u1", date).await,
            Err(RemoteError::NotConfigured)
        );
        assert_eq!(
            remote.delete_entry("u1", Uuid::new_v4()).await,
            Err(RemoteError::NotConfigured)
        );
        assert_eq!(
            remote.search_products("milk").await,
            Err(RemoteError::NotConfigured)
        );
    }

    #[test]
    fn test_remote_error_display() {
        assert_eq!(RemoteError::Status(401).to_string(), "Server returned status 401");
        assert!(RemoteError::NotConfigured.to_string().contains("not configured"));
    }
}
