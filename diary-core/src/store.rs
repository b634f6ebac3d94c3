//! Local-first diary state with best-effort remote sync.
//!
//! Every mutating operation first asks the [`RemoteStore`], then reconciles
//! local state no matter how the remote call ended. Remote failures are
//! logged and reported as [`SyncStatus::LocalOnly`]; they never surface as
//! errors. After each local mutation the full entry map is written to the
//! [`Cache`].
//!
//! The state lock is only taken for the synchronous reconciliation step and
//! never held across an `.await`. Two in-flight mutations of the same entry
//! therefore reconcile in completion order, not call order.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::cache::Cache;
use crate::history::SearchHistory;
use crate::models::{DiaryEntry, Macros, NewEntry};
use crate::nutrition::daily_totals;
use crate::remote::{RemoteError, RemoteStore};

/// Cache key of the entry snapshot.
pub const ENTRIES_CACHE_KEY: &str = "diary-entries";

/// Entries per day, in insertion order.
pub type EntriesByDate = BTreeMap<NaiveDate, Vec<DiaryEntry>>;

/// How the remote half of an operation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Synced,
    /// Applied locally only; the remote call failed.
    LocalOnly(RemoteError),
}

impl SyncStatus {
    fn from_result<T>(result: &Result<T, RemoteError>) -> Self {
        match result {
            Ok(_) => SyncStatus::Synced,
            Err(e) => SyncStatus::LocalOnly(e.clone()),
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, SyncStatus::Synced)
    }
}

/// Result value of an operation together with its sync status.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub sync: SyncStatus,
}

/// Local effect of [`DiaryStore::update_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Replaced,
    /// No entry with that id on the selected date; local state untouched.
    NotFound,
}

#[derive(Debug, Clone)]
struct DiaryState {
    selected_date: NaiveDate,
    entries_by_date: EntriesByDate,
    search_history: SearchHistory,
}

/// The diary state container.
///
/// Build one per session and pass it by reference to whatever presents it.
pub struct DiaryStore {
    user_id: String,
    remote: Arc<dyn RemoteStore>,
    cache: Arc<dyn Cache>,
    state: Mutex<DiaryState>,
}

impl DiaryStore {
    /// Creates the store and seeds it synchronously from the cache.
    ///
    /// A missing, unreadable or malformed cache yields an empty diary.
    pub fn open(
        user_id: impl Into<String>,
        selected_date: NaiveDate,
        remote: Arc<dyn RemoteStore>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        let entries_by_date = load_snapshot(cache.as_ref());
        Self {
            user_id: user_id.into(),
            remote,
            cache,
            state: Mutex::new(DiaryState {
                selected_date,
                entries_by_date,
                search_history: SearchHistory::new(),
            }),
        }
    }

    /// Replaces the in-memory search history, e.g. with one kept between runs.
    pub fn with_search_history(self, history: SearchHistory) -> Self {
        self.lock().search_history = history;
        self
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.lock().selected_date
    }

    pub fn set_selected_date(&self, date: NaiveDate) {
        self.lock().selected_date = date;
    }

    pub fn entries_for(&self, date: NaiveDate) -> Vec<DiaryEntry> {
        self.lock()
            .entries_by_date
            .get(&date)
            .cloned()
            .unwrap_or_default()
    }

    pub fn selected_entries(&self) -> Vec<DiaryEntry> {
        let state = self.lock();
        state
            .entries_by_date
            .get(&state.selected_date)
            .cloned()
            .unwrap_or_default()
    }

    pub fn totals_for(&self, date: NaiveDate) -> Macros {
        daily_totals(&self.entries_for(date))
    }

    pub fn search_history(&self) -> SearchHistory {
        self.lock().search_history.clone()
    }

    pub fn record_search(&self, query: &str) {
        self.lock().search_history.record(query);
    }

    /// Copy of the whole entry map.
    pub fn snapshot(&self) -> EntriesByDate {
        self.lock().entries_by_date.clone()
    }

    /// Loads `date` from the remote store.
    ///
    /// On success the local list for `date` is replaced. On failure the
    /// existing list, possibly from the cache, stays as it is.
    pub async fn fetch_entries(&self, date: NaiveDate) -> SyncStatus {
        let result = self.remote.list_entries(&self.user_id, date).await;
        let status = SyncStatus::from_result(&result);

        match result {
            Ok(entries) => {
                tracing::debug!(%date, count = entries.len(), "fetched entries");
                let mut state = self.lock();
                state.entries_by_date.insert(date, entries);
                self.persist(&state);
            }
            Err(e) => {
                tracing::warn!(%date, error = %e, "failed to fetch entries, keeping local copy");
            }
        }
        status
    }

    /// Appends an entry to the selected date, assigning an id if absent.
    pub async fn add_entry(&self, new_entry: NewEntry) -> Outcome<DiaryEntry> {
        let entry = new_entry.into_entry();
        let date = self.selected_date();

        let result = self.push_entry(date, &entry).await;
        if let Err(e) = &result {
            tracing::warn!(id = %entry.id, %date, error = %e, "failed to save entry remotely");
        }

        let mut state = self.lock();
        state
            .entries_by_date
            .entry(date)
            .or_default()
            .push(entry.clone());
        self.persist(&state);

        Outcome {
            value: entry,
            sync: SyncStatus::from_result(&result),
        }
    }

    /// Replaces the entry with the same id on the selected date, keeping
    /// its position.
    ///
    /// The remote upsert is sent regardless. When the id is not present
    /// locally nothing changes here and [`UpdateOutcome::NotFound`] is
    /// returned.
    pub async fn update_entry(&self, entry: DiaryEntry) -> Outcome<UpdateOutcome> {
        let entry = entry.normalize();
        let date = self.selected_date();

        let result = self.push_entry(date, &entry).await;
        if let Err(e) = &result {
            tracing::warn!(id = %entry.id, %date, error = %e, "failed to update entry remotely");
        }

        let mut state = self.lock();
        let slot = state
            .entries_by_date
            .get_mut(&date)
            .and_then(|list| list.iter_mut().find(|item| item.id == entry.id));

        let outcome = match slot {
            Some(existing) => {
                *existing = entry;
                self.persist(&state);
                UpdateOutcome::Replaced
            }
            None => {
                tracing::warn!(id = %entry.id, %date, "update for unknown entry ignored locally");
                UpdateOutcome::NotFound
            }
        };

        Outcome {
            value: outcome,
            sync: SyncStatus::from_result(&result),
        }
    }

    /// Removes the entry from the selected date. Returns whether one was
    /// removed; an unknown id is not an error.
    pub async fn delete_entry(&self, id: Uuid) -> Outcome<bool> {
        let date = self.selected_date();

        let result = self.remote.delete_entry(&self.user_id, id).await;
        if let Err(e) = &result {
            tracing::warn!(%id, error = %e, "failed to delete entry remotely");
        }

        let mut state = self.lock();
        let list = state.entries_by_date.entry(date).or_default();
        let before = list.len();
        list.retain(|item| item.id != id);
        let removed = list.len() != before;
        self.persist(&state);

        Outcome {
            value: removed,
            sync: SyncStatus::from_result(&result),
        }
    }

    /// Writes the entry's product row, then the entry that references it.
    ///
    /// Products are immutable and keyed by id, so re-sending a known one is
    /// a no-op on the backend.
    async fn push_entry(&self, date: NaiveDate, entry: &DiaryEntry) -> Result<(), RemoteError> {
        self.remote.upsert_product(&entry.product).await?;
        self.remote.upsert_entry(&self.user_id, date, entry).await
    }

    fn lock(&self) -> MutexGuard<'_, DiaryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mirrors the entry map into the cache. Failures are logged only.
    fn persist(&self, state: &DiaryState) {
        let bytes = match serde_json::to_vec(&state.entries_by_date) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode diary snapshot");
                return;
            }
        };
        if let Err(e) = self.cache.save(ENTRIES_CACHE_KEY, &bytes) {
            tracing::warn!(error = %e, "failed to write diary cache");
        }
    }
}

fn load_snapshot(cache: &dyn Cache) -> EntriesByDate {
    let bytes = match cache.load(ENTRIES_CACHE_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return EntriesByDate::new(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read diary cache, starting empty");
            return EntriesByDate::new();
        }
    };

    // Decoded entry by entry so one bad row does not cost the whole diary.
    let raw = match serde_json::from_slice::<BTreeMap<NaiveDate, Vec<serde_json::Value>>>(&bytes) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "malformed diary cache, starting empty");
            return EntriesByDate::new();
        }
    };

    raw.into_iter()
        .map(|(date, values)| {
            let entries = values
                .into_iter()
                .filter_map(|value| match serde_json::from_value::<DiaryEntry>(value) {
                    Ok(entry) => Some(entry.normalize()),
                    Err(e) => {
                        tracing::warn!(%date, error = %e, "skipping malformed cached entry");
                        None
                    }
                })
                .collect();
            (date, entries)
        })
        .collect()
}
