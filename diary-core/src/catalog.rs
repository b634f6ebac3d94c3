//! Product lookup by text or barcode, and the follow-up choice between
//! picking a found product and creating one by hand.

use std::sync::Arc;

use crate::input::looks_like_barcode;
use crate::models::{Macros, Product};
use crate::remote::RemoteStore;
use crate::store::{Outcome, SyncStatus};

/// Products known before any search has run.
pub fn seed_products() -> Vec<Product> {
    vec![
        Product::new("Chicken breast", Macros::new(165.0, 31.0, 3.6, 0.0))
            .with_barcode("200000000001"),
        Product::new("Boiled rice", Macros::new(130.0, 2.7, 0.3, 28.0)).with_barcode("200000000002"),
        Product::new("Avocado", Macros::new(160.0, 2.0, 15.0, 9.0)).with_barcode("200000000003"),
        Product::new("Apple", Macros::new(52.0, 0.3, 0.2, 14.0)),
    ]
}

/// Prefilled data for creating a product that search did not find.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductDraft {
    pub name: String,
    pub barcode: Option<String>,
}

impl ProductDraft {
    /// Draft from typed search text. Text with digits doubles as a barcode.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim();
        Self {
            name: query.to_string(),
            barcode: looks_like_barcode(query).then(|| query.to_string()),
        }
    }
}

/// What to do after a search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The first result is preselected for weight entry.
    Found {
        selected: Product,
        results: Vec<Product>,
    },
    /// Nothing matched; continue with manual creation.
    Manual(ProductDraft),
}

impl SearchOutcome {
    pub fn resolve(query: &str, results: Vec<Product>) -> Self {
        match results.first() {
            Some(first) => SearchOutcome::Found {
                selected: first.clone(),
                results,
            },
            None => SearchOutcome::Manual(ProductDraft::from_query(query)),
        }
    }
}

/// Remote-backed product search with a local fallback over products seen
/// earlier in the session.
pub struct ProductCatalog {
    remote: Arc<dyn RemoteStore>,
    seen: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            seen: Vec::new(),
        }
    }

    pub fn with_seen(mut self, products: Vec<Product>) -> Self {
        for product in products {
            self.remember(product);
        }
        self
    }

    pub fn seen(&self) -> &[Product] {
        &self.seen
    }

    /// Adds or refreshes a product in the local set.
    pub fn remember(&mut self, product: Product) {
        match self.seen.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.seen.push(product),
        }
    }

    /// Case-insensitive name or barcode substring match over seen products.
    pub fn local_matches(&self, query: &str) -> Vec<Product> {
        self.seen.iter().filter(|p| p.matches(query)).cloned().collect()
    }

    /// Searches the remote store, falling back to the local set when the
    /// remote fails or returns nothing.
    pub async fn search(&mut self, query: &str) -> Vec<Product> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.remote.search_products(query).await {
            Ok(results) if !results.is_empty() => {
                tracing::debug!(query, count = results.len(), "remote product search");
                for product in &results {
                    self.remember(product.clone());
                }
                results
            }
            Ok(_) => self.local_matches(query),
            Err(e) => {
                tracing::warn!(query, error = %e, "product search failed, using local products");
                self.local_matches(query)
            }
        }
    }

    /// Searches and decides between a found product and manual entry.
    pub async fn lookup(&mut self, query: &str) -> SearchOutcome {
        let results = self.search(query).await;
        SearchOutcome::resolve(query, results)
    }

    /// Creates a product from a draft. It is kept locally and saved
    /// remotely on a best-effort basis.
    pub async fn create_product(
        &mut self,
        draft: ProductDraft,
        macros: Macros,
        notes: Option<String>,
    ) -> Outcome<Product> {
        let mut product = Product::new(draft.name.trim(), macros);
        if let Some(barcode) = draft.barcode {
            product = product.with_barcode(barcode);
        }
        if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
            product = product.with_notes(notes);
        }

        let result = self.remote.upsert_product(&product).await;
        let sync = match result {
            Ok(()) => SyncStatus::Synced,
            Err(e) => {
                tracing::warn!(name = %product.name, error = %e, "failed to save product remotely");
                SyncStatus::LocalOnly(e)
            }
        };
        self.remember(product.clone());

        Outcome {
            value: product,
            sync,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryRemote, OfflineRemote};

    #[test]
    fn test_draft_from_text_query() {
        let draft = ProductDraft::from_query("  buckwheat ");
        assert_eq!(draft.name, "buckwheat");
        assert_eq!(draft.barcode, None);
    }

    #[test]
    fn test_draft_from_numeric_query() {
        let draft = ProductDraft::from_query("4607001234567");
        assert_eq!(draft.name, "4607001234567");
        assert_eq!(draft.barcode.as_deref(), Some("4607001234567"));
    }

    #[test]
    fn test_resolve_preselects_first_result() {
        let products = seed_products();
        let outcome = SearchOutcome::resolve("c", products.clone());
        match outcome {
            SearchOutcome::Found { selected, results } => {
                assert_eq!(selected, products[0]);
                assert_eq!(results.len(), products.len());
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_empty_falls_through_to_manual() {
        let outcome = SearchOutcome::resolve("kefir", Vec::new());
        assert_eq!(
            outcome,
            SearchOutcome::Manual(ProductDraft {
                name: "kefir".to_string(),
                barcode: None,
            })
        );
    }

    #[tokio::test]
    async fn test_search_falls_back_to_local_when_offline() {
        let mut catalog = ProductCatalog::new(Arc::new(OfflineRemote)).with_seen(seed_products());
        let results = catalog.search("RICE").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Boiled rice");

        let by_barcode = catalog.search("200000000003").await;
        assert_eq!(by_barcode[0].name, "Avocado");
    }

    #[tokio::test]
    async fn test_search_prefers_remote_and_remembers() {
        let remote = Arc::new(
            MemoryRemote::new().with_products(vec![Product::new("Greek yogurt", Macros::zero())]),
        );
        let mut catalog = ProductCatalog::new(remote.clone());

        let results = catalog.search("yogurt").await;
        assert_eq!(results.len(), 1);
        assert_eq!(catalog.seen().len(), 1);

        remote.set_failing(true);
        let again = catalog.search("greek").await;
        assert_eq!(again[0].name, "Greek yogurt");
    }

    #[tokio::test]
    async fn test_empty_remote_result_uses_local() {
        let remote = Arc::new(MemoryRemote::new());
        let mut catalog = ProductCatalog::new(remote).with_seen(seed_products());
        assert_eq!(catalog.search("apple").await.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_query_returns_nothing() {
        let mut catalog = ProductCatalog::new(Arc::new(OfflineRemote)).with_seen(seed_products());
        assert!(catalog.search("   ").await.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_unknown_goes_manual() {
        let mut catalog = ProductCatalog::new(Arc::new(OfflineRemote)).with_seen(seed_products());
        match catalog.lookup("4600000000099").await {
            SearchOutcome::Manual(draft) => {
                assert_eq!(draft.barcode.as_deref(), Some("4600000000099"))
            }
            other => panic!("expected Manual, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_product_is_remembered_and_synced() {
        let remote = Arc::new(MemoryRemote::new());
        let mut catalog = ProductCatalog::new(remote.clone());
        let draft = ProductDraft::from_query("4600000000099");

        let created = catalog
            .create_product(draft, Macros::new(60.0, 3.0, 2.5, 4.7), Some("kefir".into()))
            .await;

        assert!(created.sync.is_synced());
        assert_eq!(created.value.barcode.as_deref(), Some("4600000000099"));
        assert_eq!(remote.products(), vec![created.value.clone()]);
        assert_eq!(catalog.local_matches("4600000000099"), vec![created.value]);
    }

    #[tokio::test]
    async fn test_create_product_offline_still_remembered() {
        let mut catalog = ProductCatalog::new(Arc::new(OfflineRemote));
        let created = catalog
            .create_product(ProductDraft::from_query("buckwheat"), Macros::zero(), None)
            .await;
        assert!(!created.sync.is_synced());
        assert!(created.value.notes.is_none());
        assert_eq!(catalog.seen().len(), 1);
    }
}
