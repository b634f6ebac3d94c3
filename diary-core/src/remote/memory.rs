use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::{RemoteError, RemoteStore};
use crate::models::{DiaryEntry, Product};

#[derive(Debug, Clone)]
struct EntryRow {
    user_id: String,
    date: NaiveDate,
    entry: DiaryEntry,
}

#[derive(Debug, Default)]
struct Tables {
    /// Creation order; an upsert of an existing id keeps its slot.
    entries: Vec<EntryRow>,
    products: Vec<Product>,
    failing: bool,
    calls: usize,
}

/// In-memory backend with optional failure injection.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    tables: Mutex<Tables>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.lock().products = products;
        self
    }

    /// Makes every following call fail with [`RemoteError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Number of calls received, failed ones included.
    pub fn calls(&self) -> usize {
        self.lock().calls
    }

    /// Stored entries of `user_id` on `date` without going through the trait.
    pub fn entries_for(&self, user_id: &str, date: NaiveDate) -> Vec<DiaryEntry> {
        self.lock()
            .entries
            .iter()
            .filter(|row| row.user_id == user_id && row.date == date)
            .map(|row| row.entry.clone())
            .collect()
    }

    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<MutexGuard<'_, Tables>, RemoteError> {
        let mut tables = self.lock();
        tables.calls += 1;
        if tables.failing {
            return Err(RemoteError::Unavailable("injected failure".to_string()));
        }
        Ok(tables)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn list_entries(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<DiaryEntry>, RemoteError> {
        let tables = self.begin()?;
        Ok(tables
            .entries
            .iter()
            .filter(|row| row.user_id == user_id && row.date == date)
            .map(|row| row.entry.clone())
            .collect())
    }

    async fn upsert_entry(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: &DiaryEntry,
    ) -> Result<(), RemoteError> {
        let mut tables = self.begin()?;
        let row = EntryRow {
            user_id: user_id.to_string(),
            date,
            entry: entry.clone(),
        };
        match tables.entries.iter_mut().find(|r| r.entry.id == entry.id) {
            Some(existing) => *existing = row,
            None => tables.entries.push(row),
        }
        Ok(())
    }

    async fn delete_entry(&self, user_id: &str, id: Uuid) -> Result<(), RemoteError> {
        let mut tables = self.begin()?;
        tables
            .entries
            .retain(|row| !(row.entry.id == id && row.user_id == user_id));
        Ok(())
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RemoteError> {
        let tables = self.begin()?;
        Ok(tables
            .products
            .iter()
            .filter(|p| p.matches(query))
            .cloned()
            .collect())
    }

    async fn upsert_product(&self, product: &Product) -> Result<(), RemoteError> {
        let mut tables = self.begin()?;
        match tables.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product.clone(),
            None => tables.products.push(product.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Macros;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn entry(name: &str, weight: u32) -> DiaryEntry {
        DiaryEntry::new(Product::new(name, Macros::new(100.0, 1.0, 1.0, 1.0)), weight)
    }

    #[tokio::test]
    async fn test_upsert_keeps_creation_order() {
        let remote = MemoryRemote::new();
        let first = entry("first", 100);
        let second = entry("second", 100);

        remote.upsert_entry("u1", date(), &first).await.unwrap();
        remote.upsert_entry("u1", date(), &second).await.unwrap();
        remote
            .upsert_entry("u1", date(), &first.clone().with_weight(300))
            .await
            .unwrap();

        let listed = remote.list_entries("u1", date()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[0].weight, 300);
        assert_eq!(listed[1].id, second.id);
    }

    #[tokio::test]
    async fn test_list_is_scoped_by_user_and_date() {
        let remote = MemoryRemote::new();
        let other_day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        remote.upsert_entry("u1", date(), &entry("a", 1)).await.unwrap();
        remote.upsert_entry("u2", date(), &entry("b", 1)).await.unwrap();
        remote.upsert_entry("u1", other_day, &entry("c", 1)).await.unwrap();

        let listed = remote.list_entries("u1", date()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].product.name, "a");
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let remote = MemoryRemote::new();
        let e = entry("a", 1);
        remote.upsert_entry("u1", date(), &e).await.unwrap();

        remote.delete_entry("u2", e.id).await.unwrap();
        assert_eq!(remote.entries_for("u1", date()).len(), 1);

        remote.delete_entry("u1", e.id).await.unwrap();
        assert!(remote.entries_for("u1", date()).is_empty());
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let remote = MemoryRemote::new();
        remote.set_failing(true);
        let result = remote.upsert_entry("u1", date(), &entry("a", 1)).await;
        assert!(matches!(result, Err(RemoteError::Unavailable(_))));
        assert!(remote.entries_for("u1", date()).is_empty());
        assert_eq!(remote.calls(), 1);

        remote.set_failing(false);
        assert!(remote.list_entries("u1", date()).await.is_ok());
        assert_eq!(remote.calls(), 2);
    }

    #[tokio::test]
    async fn test_search_products() {
        let remote = MemoryRemote::new().with_products(vec![
            Product::new("Oat milk", Macros::zero()),
            Product::new("Rice", Macros::zero()).with_barcode("4601234"),
        ]);
        assert_eq!(remote.search_products("milk").await.unwrap().len(), 1);
        assert_eq!(remote.search_products("1234").await.unwrap()[0].name, "Rice");
        assert!(remote.search_products("bread").await.unwrap().is_empty());
    }
}
