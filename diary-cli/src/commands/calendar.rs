use chrono::{Datelike, NaiveDate};
use clap::Args;
use diary_core::dates;

use super::{parse_date, report_sync};
use crate::session::Session;

#[derive(Args)]
pub struct WeekCommand {
    /// Center date (YYYY-MM-DD), defaults to today
    #[arg(long, short)]
    pub date: Option<String>,
}

impl WeekCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let center = parse_date(&self.date)?;
        session.store.set_selected_date(center);

        for day in dates::week_around(center) {
            let sync = session.store.fetch_entries(day).await;
            if !sync.is_synced() {
                // One notice is enough when the backend is down.
                report_sync(&sync);
                break;
            }
        }

        for day in dates::week_around(center) {
            let marker = if day == center { ">" } else { " " };
            let count = session.store.entries_for(day).len();
            let totals = session.store.totals_for(day).rounded();
            if count == 0 {
                println!("{} {} {}  -", marker, day.format("%a"), day);
            } else {
                println!(
                    "{} {} {}  {} kcal ({} entr{})",
                    marker,
                    day.format("%a"),
                    day,
                    totals.calories,
                    count,
                    if count == 1 { "y" } else { "ies" }
                );
            }
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct CalendarCommand {
    /// Month (YYYY-MM), defaults to the current month
    #[arg(long, short)]
    pub month: Option<String>,
}

impl CalendarCommand {
    pub fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        let today = dates::today();
        let (year, month) = match &self.month {
            Some(m) => dates::parse_month(m)
                .ok_or_else(|| format!("Invalid month format '{}'. Use YYYY-MM.", m))?,
            None => (today.year(), today.month()),
        };

        let snapshot = session.store.snapshot();
        let has_entries = |day: u32| {
            NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|date| snapshot.get(&date))
                .is_some_and(|entries| !entries.is_empty())
        };

        print!("{}", render_month(year, month, has_entries));
        println!("\n* = day with entries (local cache)");
        Ok(())
    }
}

/// Monday-first month view. Marked days get a trailing `*`.
fn render_month(year: i32, month: u32, marked: impl Fn(u32) -> bool) -> String {
    let mut out = String::new();
    if let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) {
        out.push_str(&format!("{}\n", first.format("%B %Y")));
    }
    out.push_str(" Mo  Tu  We  Th  Fr  Sa  Su\n");

    for week in dates::month_grid(year, month).chunks(7) {
        let cells: Vec<String> = week
            .iter()
            .map(|cell| match cell {
                Some(day) if marked(*day) => format!("{:>3}*", day),
                Some(day) => format!("{:>3} ", day),
                None => "    ".to_string(),
            })
            .collect();
        out.push_str(cells.concat().trim_end());
        out.push('\n');
    }
    out
}
