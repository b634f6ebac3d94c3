//! HTTP client for a PostgREST-style hosted backend.
//!
//! Tables:
//! - `diary_entries`: id, user_id, date, product_id, weight, macros_override
//! - `products`: id, name, calories, protein, fat, carbs, barcode, notes

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RemoteError, RemoteStore};
use crate::models::{DiaryEntry, MacrosOverride, Product};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const SEARCH_LIMIT: usize = 20;
const ENTRY_SELECT: &str = "id,weight,macros_override,product:products(*)";

/// Row written to `diary_entries`. The product is stored by reference.
#[derive(Debug, Serialize)]
struct EntryRecord<'a> {
    id: Uuid,
    user_id: &'a str,
    date: NaiveDate,
    product_id: Uuid,
    weight: u32,
    macros_override: Option<&'a MacrosOverride>,
}

/// Row read back from `diary_entries` with the product joined in. The join
/// is `null` when the product row is missing.
#[derive(Debug, Deserialize)]
struct EntryRow {
    id: Uuid,
    weight: u32,
    #[serde(default)]
    macros_override: Option<MacrosOverride>,
    #[serde(default)]
    product: Option<Product>,
}

impl EntryRow {
    fn into_entry(self) -> Option<DiaryEntry> {
        let Some(product) = self.product else {
            tracing::warn!(id = %self.id, "skipping remote entry without product");
            return None;
        };
        Some(
            DiaryEntry {
                id: self.id,
                product,
                weight: self.weight,
                macros_override: self.macros_override,
            }
            .normalize(),
        )
    }
}

/// Remote store over HTTP.
#[derive(Debug, Clone)]
pub struct RestRemote {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RestRemote {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Builds the REST URL of a table.
    fn table_url(&self, table: &str) -> String {
        let base = if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://")
        {
            format!("https://{}", self.base_url)
        } else {
            self.base_url.clone()
        };
        format!("{}/rest/v1/{}", base.trim_end_matches('/'), table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }
        Ok(response)
    }
}

/// Strips characters that carry meaning in a PostgREST `or=(...)` filter.
fn filter_term(query: &str) -> String {
    query
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '"' | '\\'))
        .collect()
}

fn product_filter(query: &str) -> String {
    let term = filter_term(query);
    format!("(name.ilike.*{}*,barcode.eq.{})", term, term)
}

#[async_trait]
impl RemoteStore for RestRemote {
    async fn list_entries(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<DiaryEntry>, RemoteError> {
        let request = self.client.get(self.table_url("diary_entries")).query(&[
            ("select", ENTRY_SELECT.to_string()),
            ("user_id", format!("eq.{}", user_id)),
            ("date", format!("eq.{}", date)),
            ("order", "created_at.asc".to_string()),
        ]);

        let rows: Vec<EntryRow> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(rows.into_iter().filter_map(EntryRow::into_entry).collect())
    }

    async fn upsert_entry(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: &DiaryEntry,
    ) -> Result<(), RemoteError> {
        let record = EntryRecord {
            id: entry.id,
            user_id,
            date,
            product_id: entry.product.id,
            weight: entry.weight,
            macros_override: entry.macros_override.as_ref(),
        };
        let request = self
            .client
            .post(self.table_url("diary_entries"))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[record]);

        self.send(request).await?;
        Ok(())
    }

    async fn delete_entry(&self, user_id: &str, id: Uuid) -> Result<(), RemoteError> {
        let request = self.client.delete(self.table_url("diary_entries")).query(&[
            ("id", format!("eq.{}", id)),
            ("user_id", format!("eq.{}", user_id)),
        ]);

        self.send(request).await?;
        Ok(())
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RemoteError> {
        if filter_term(query).is_empty() {
            return Ok(Vec::new());
        }
        let request = self.client.get(self.table_url("products")).query(&[
            ("select", "*".to_string()),
            ("or", product_filter(query)),
            ("order", "name.asc".to_string()),
            ("limit", SEARCH_LIMIT.to_string()),
        ]);

        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn upsert_product(&self, product: &Product) -> Result<(), RemoteError> {
        let request = self
            .client
            .post(self.table_url("products"))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[product]);

        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Macros;

    #[test]
    fn test_table_url() {
        let remote = RestRemote::new("https://demo.example.co", "key").unwrap();
        assert_eq!(
            remote.table_url("products"),
            "https://demo.example.co/rest/v1/products"
        );

        let remote = RestRemote::new("http://localhost:54321/", "key").unwrap();
        assert_eq!(
            remote.table_url("diary_entries"),
            "http://localhost:54321/rest/v1/diary_entries"
        );

        let remote = RestRemote::new("demo.example.co", "key").unwrap();
        assert_eq!(
            remote.table_url("products"),
            "https://demo.example.co/rest/v1/products"
        );
    }

    #[test]
    fn test_product_filter_strips_syntax() {
        assert_eq!(
            product_filter(" milk (2.5%) "),
            "(name.ilike.*milk 2.5%*,barcode.eq.milk 2.5%)"
        );
        assert_eq!(filter_term("*,()"), "");
    }

    #[test]
    fn test_entry_row_decodes_joined_product() {
        let json = r#"{
            "id": "6f1c1a52-2f0e-4d4b-9b53-0a4c2d1f7e10",
            "weight": 0,
            "macros_override": {"calories": 300},
            "product": {
                "id": "0b8f5a5e-51a4-4f0e-9d0c-2f7a8f4f1b22",
                "name": "Chicken breast",
                "calories": 165,
                "protein": 31,
                "fat": 3.6,
                "carbs": 0,
                "barcode": null,
                "notes": null
            }
        }"#;
        let row: EntryRow = serde_json::from_str(json).unwrap();
        let entry = row.into_entry().unwrap();
        assert_eq!(entry.weight, 1);
        assert_eq!(entry.product.macros, Macros::new(165.0, 31.0, 3.6, 0.0));
        assert_eq!(entry.macros_override.unwrap().calories, Some(300.0));
        assert!(entry.product.barcode.is_none());
    }

    #[test]
    fn test_rows_without_product_are_skipped() {
        let json = r#"[
            {
                "id": "6f1c1a52-2f0e-4d4b-9b53-0a4c2d1f7e10",
                "weight": 100,
                "macros_override": null,
                "product": null
            },
            {
                "id": "1d2e3f40-5a6b-4c7d-8e9f-0a1b2c3d4e5f",
                "weight": 150,
                "macros_override": null,
                "product": {
                    "id": "0b8f5a5e-51a4-4f0e-9d0c-2f7a8f4f1b22",
                    "name": "Boiled rice",
                    "calories": 130,
                    "protein": 2.7,
                    "fat": 0.3,
                    "carbs": 28
                }
            }
        ]"#;
        let rows: Vec<EntryRow> = serde_json::from_str(json).unwrap();
        let entries: Vec<DiaryEntry> = rows.into_iter().filter_map(EntryRow::into_entry).collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].product.name, "Boiled rice");
        assert_eq!(entries[0].weight, 150);
    }

    #[test]
    fn test_entry_record_serializes_product_reference() {
        let entry = DiaryEntry::new(Product::new("Rice", Macros::zero()), 150);
        let record = EntryRecord {
            id: entry.id,
            user_id: "u1",
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            product_id: entry.product.id,
            weight: entry.weight,
            macros_override: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["date"], "2025-01-01");
        assert_eq!(value["product_id"], entry.product.id.to_string());
        assert!(value["macros_override"].is_null());
        assert!(value.get("product").is_none());
    }
}
