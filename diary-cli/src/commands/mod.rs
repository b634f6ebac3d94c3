mod calendar;
mod config_cmd;
mod day;
mod entry;
mod search;

pub use calendar::{CalendarCommand, WeekCommand};
pub use config_cmd::ConfigCommand;
pub use day::DayCommand;
pub use entry::{AddCommand, DeleteCommand, EditCommand};
pub use search::{HistoryCommand, SearchCommand};

use chrono::NaiveDate;
use clap::ValueEnum;
use diary_core::dates;
use diary_core::{RemoteError, SyncStatus};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses an optional `--date` argument, defaulting to today.
pub fn parse_date(date: &Option<String>) -> Result<NaiveDate, String> {
    match date {
        Some(d) => {
            dates::parse_iso(d).ok_or_else(|| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d))
        }
        None => Ok(dates::today()),
    }
}

/// Tells the user when a change only reached the local cache.
///
/// Running without a backend is normal and stays quiet.
pub fn report_sync(sync: &SyncStatus) {
    match sync {
        SyncStatus::Synced | SyncStatus::LocalOnly(RemoteError::NotConfigured) => {}
        SyncStatus::LocalOnly(e) => {
            eprintln!("Saved locally only: {}", e);
        }
    }
}
