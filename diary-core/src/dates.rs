//! Calendar helpers for picking the diary day.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Number of days shown in the day strip.
pub const WEEK_LEN: usize = 7;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses `YYYY-MM-DD`.
pub fn parse_iso(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Seven consecutive days with `center` in the middle.
pub fn week_around(center: NaiveDate) -> Vec<NaiveDate> {
    let start = center - Duration::days(3);
    start.iter_days().take(WEEK_LEN).collect()
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}

/// Monday-first month layout.
///
/// Leading `None` cells pad the first week up to the weekday of the 1st,
/// followed by every day number of the month. Returns an empty grid for an
/// invalid month.
pub fn month_grid(year: i32, month: u32) -> Vec<Option<u32>> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let Some(days) = days_in_month(year, month) else {
        return Vec::new();
    };
    let offset = first.weekday().num_days_from_monday() as usize;

    let mut grid = vec![None; offset];
    grid.extend((1..=days).map(Some));
    grid
}

/// Parses `YYYY-MM` into a year and month.
pub fn parse_month(text: &str) -> Option<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", text.trim()), "%Y-%m-%d").ok()?;
    Some((date.year(), date.month()))
}
