use chrono::NaiveDate;
use clap::Args;
use diary_core::{DiaryEntry, Macros, RoundedMacros};
use serde::Serialize;
use uuid::Uuid;

use super::{parse_date, report_sync, OutputFormat};
use crate::session::Session;

#[derive(Args)]
pub struct DayCommand {
    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long, short)]
    pub date: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct EntryView<'a> {
    id: Uuid,
    product: &'a str,
    weight: u32,
    edited: bool,
    macros: RoundedMacros,
}

#[derive(Serialize)]
struct DayView<'a> {
    date: NaiveDate,
    entries: Vec<EntryView<'a>>,
    totals: RoundedMacros,
}

impl DayCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let date = parse_date(&self.date)?;
        session.store.set_selected_date(date);
        let sync = session.store.fetch_entries(date).await;
        report_sync(&sync);

        let entries = session.store.selected_entries();
        let totals = session.store.totals_for(date);

        match self.format {
            OutputFormat::Json => {
                let view = DayView {
                    date,
                    entries: entries.iter().map(entry_view).collect(),
                    totals: totals.rounded(),
                };
                println!("{}", serde_json::to_string_pretty(&view)?);
            }
            OutputFormat::Text => print_day(date, &entries, totals),
        }
        Ok(())
    }
}

fn entry_view(entry: &DiaryEntry) -> EntryView<'_> {
    EntryView {
        id: entry.id,
        product: &entry.product.name,
        weight: entry.weight,
        edited: entry.macros_override.is_some(),
        macros: entry.macros().rounded(),
    }
}

pub fn print_day(date: NaiveDate, entries: &[DiaryEntry], totals: Macros) {
    println!("{}", date);
    println!("{}", "-".repeat(60));

    if entries.is_empty() {
        println!("  No entries");
        return;
    }

    for entry in entries {
        print_entry(entry);
    }
    println!("  {}", "-".repeat(56));
    println!("  Daily Total: {}", totals.rounded());
}

pub fn print_entry(entry: &DiaryEntry) {
    println!("  {}", entry);
    println!("      id: {}", entry.id);
}
