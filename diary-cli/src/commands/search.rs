use clap::Args;

use super::OutputFormat;
use crate::session::Session;

#[derive(Args)]
pub struct SearchCommand {
    /// Product name or barcode
    pub query: String,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl SearchCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        session.store.record_search(&self.query);
        let results = session.catalog.search(&self.query).await;
        session.save()?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&results)?);
            }
            OutputFormat::Text => {
                if results.is_empty() {
                    println!("No products found for '{}'", self.query.trim());
                    println!("Use 'diary add \"{}\" --calories ...' to create one.", self.query.trim());
                    return Ok(());
                }
                for (i, product) in results.iter().enumerate() {
                    println!("{:>3}. {}", i + 1, product);
                    if let Some(barcode) = &product.barcode {
                        println!("       barcode: {}", barcode);
                    }
                    if let Some(notes) = &product.notes {
                        println!("       notes: {}", notes);
                    }
                }
                println!("\nTotal: {} product(s)", results.len());
            }
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct HistoryCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl HistoryCommand {
    pub fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        let history = session.store.search_history();
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&history)?);
            }
            OutputFormat::Text => {
                if history.is_empty() {
                    println!("No recent searches");
                }
                for query in history.as_slice() {
                    println!("  {}", query);
                }
            }
        }
        Ok(())
    }
}
