use clap::Args;
use diary_core::input::{parse_macro_field, parse_weight, OverrideFields};
use diary_core::nutrition::preview_macros;
use diary_core::{
    scan_once, DiaryEntry, Macros, NewEntry, Product, ProductDraft, SearchOutcome, UpdateOutcome,
};
use uuid::Uuid;

use super::day::print_entry;
use super::{parse_date, report_sync};
use crate::scanner::{KeyboardWedge, LineDecoder};
use crate::session::Session;

#[derive(Args)]
pub struct AddCommand {
    /// Product name or barcode to search for
    #[arg(required_unless_present = "scan")]
    pub query: Option<String>,

    /// Read the barcode from a keyboard-wedge scanner on stdin
    #[arg(long, conflicts_with = "query")]
    pub scan: bool,

    /// Portion weight in grams
    #[arg(long, short, default_value = "100")]
    pub weight: String,

    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long, short)]
    pub date: Option<String>,

    /// Pick the n-th search result instead of the first
    #[arg(long, value_name = "N")]
    pub pick: Option<usize>,

    /// Name for a product created when nothing is found
    #[arg(long)]
    pub name: Option<String>,

    /// Calories per 100 g for a new product
    #[arg(long)]
    pub calories: Option<String>,

    /// Protein per 100 g for a new product
    #[arg(long)]
    pub protein: Option<String>,

    /// Fat per 100 g for a new product
    #[arg(long)]
    pub fat: Option<String>,

    /// Carbohydrates per 100 g for a new product
    #[arg(long)]
    pub carbs: Option<String>,

    /// Notes for a new product
    #[arg(long)]
    pub notes: Option<String>,
}

impl AddCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let date = parse_date(&self.date)?;
        session.store.set_selected_date(date);

        let query = match (&self.query, self.scan) {
            (_, true) => {
                eprintln!("Scan a barcode...");
                let mut camera = KeyboardWedge::stdin();
                scan_once(&mut camera, &mut LineDecoder)
                    .await
                    .map_err(|e| e.user_message())?
            }
            (Some(q), false) => q.clone(),
            (None, false) => return Err("A search query or --scan is required".into()),
        };
        session.store.record_search(&query);

        let product = match session.catalog.lookup(&query).await {
            SearchOutcome::Found { selected, results } => self.pick_result(selected, &results)?,
            SearchOutcome::Manual(draft) => self.create_product(session, draft).await?,
        };

        println!("{}", portion_summary(&product, &self.weight));

        let weight = parse_weight(&self.weight);
        let added = session.store.add_entry(NewEntry::new(product, weight)).await;
        report_sync(&added.sync);

        println!("Added to {}:", date);
        print_entry(&added.value);
        session.save()?;
        Ok(())
    }

    fn pick_result(
        &self,
        selected: Product,
        results: &[Product],
    ) -> Result<Product, Box<dyn std::error::Error>> {
        let Some(n) = self.pick else {
            if results.len() > 1 {
                println!(
                    "Found {} products, using '{}' (use --pick to choose another)",
                    results.len(),
                    selected.name
                );
            }
            return Ok(selected);
        };
        results
            .get(n.saturating_sub(1))
            .cloned()
            .ok_or_else(|| format!("No result #{} ({} found)", n, results.len()).into())
    }

    fn has_macro_fields(&self) -> bool {
        self.calories.is_some() || self.protein.is_some() || self.fat.is_some() || self.carbs.is_some()
    }

    async fn create_product(
        &self,
        session: &mut Session,
        mut draft: ProductDraft,
    ) -> Result<Product, Box<dyn std::error::Error>> {
        if !self.has_macro_fields() {
            return Err(format!(
                "No product found for '{}'. Pass --calories/--protein/--fat/--carbs to create it.",
                draft.name
            )
            .into());
        }
        if let Some(name) = &self.name {
            draft.name = name.clone();
        }
        if draft.name.trim().is_empty() {
            return Err("Product name is required".into());
        }

        let field = |f: &Option<String>| f.as_deref().and_then(parse_macro_field).unwrap_or(0.0);
        let macros = Macros::new(
            field(&self.calories),
            field(&self.protein),
            field(&self.fat),
            field(&self.carbs),
        );

        let created = session
            .catalog
            .create_product(draft, macros, self.notes.clone())
            .await;
        report_sync(&created.sync);
        println!("Created product: {}", created.value);
        Ok(created.value)
    }
}

#[derive(Args)]
pub struct EditCommand {
    /// Entry ID (or a unique prefix of it)
    pub id: String,

    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long, short)]
    pub date: Option<String>,

    /// New portion weight in grams
    #[arg(long, short)]
    pub weight: Option<String>,

    /// Calories for this portion (empty to clear)
    #[arg(long)]
    pub calories: Option<String>,

    /// Protein for this portion (empty to clear)
    #[arg(long)]
    pub protein: Option<String>,

    /// Fat for this portion (empty to clear)
    #[arg(long)]
    pub fat: Option<String>,

    /// Carbohydrates for this portion (empty to clear)
    #[arg(long)]
    pub carbs: Option<String>,

    /// Drop all manual values and use computed ones
    #[arg(long, conflicts_with_all = ["calories", "protein", "fat", "carbs"])]
    pub clear_overrides: bool,
}

impl EditCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let date = parse_date(&self.date)?;
        session.store.set_selected_date(date);
        report_sync(&session.store.fetch_entries(date).await);

        let entries = session.store.selected_entries();
        let entry = find_entry(&entries, &self.id)?;
        let updated = self.apply(entry.clone());

        let outcome = session.store.update_entry(updated).await;
        report_sync(&outcome.sync);
        match outcome.value {
            UpdateOutcome::Replaced => {
                println!("Updated entry:");
                if let Some(saved) = session
                    .store
                    .selected_entries()
                    .into_iter()
                    .find(|e| e.id == entry.id)
                {
                    print_entry(&saved);
                }
            }
            UpdateOutcome::NotFound => {
                println!("Entry {} is no longer on {}", entry.id, date);
            }
        }
        Ok(())
    }

    fn apply(&self, entry: DiaryEntry) -> DiaryEntry {
        let mut entry = match &self.weight {
            Some(w) => entry.with_weight(parse_weight(w)),
            None => entry,
        };
        if self.clear_overrides {
            return entry.without_override();
        }
        let fields = OverrideFields {
            calories: self.calories.as_deref(),
            protein: self.protein.as_deref(),
            fat: self.fat.as_deref(),
            carbs: self.carbs.as_deref(),
        };
        entry.macros_override = fields.merge_into(entry.macros_override);
        entry
    }
}

#[derive(Args)]
pub struct DeleteCommand {
    /// Entry ID (or a unique prefix of it)
    pub id: String,

    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long, short)]
    pub date: Option<String>,
}

impl DeleteCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let date = parse_date(&self.date)?;
        session.store.set_selected_date(date);
        report_sync(&session.store.fetch_entries(date).await);

        let entries = session.store.selected_entries();
        let id = match find_entry(&entries, &self.id) {
            Ok(entry) => entry.id,
            // A full id still goes to the backend even if this day has no such entry.
            Err(e) => Uuid::parse_str(&self.id).map_err(|_| e)?,
        };

        let outcome = session.store.delete_entry(id).await;
        report_sync(&outcome.sync);
        if outcome.value {
            println!("Deleted entry {}", id);
        } else {
            println!("No entry {} on {}", id, date);
        }
        Ok(())
    }
}

/// One-line preview of what a portion of `product` adds to the day.
fn portion_summary(product: &Product, weight_text: &str) -> String {
    let preview = preview_macros(product, weight_text, None);
    format!(
        "Adding {} g of {}: {}",
        parse_weight(weight_text),
        product.name,
        preview.rounded()
    )
}

/// Finds an entry by full id or unique id prefix.
fn find_entry<'a>(entries: &'a [DiaryEntry], id: &str) -> Result<&'a DiaryEntry, String> {
    let id = id.trim().to_lowercase();
    if id.is_empty() {
        return Err("Entry ID is required".to_string());
    }
    let mut matches = entries.iter().filter(|e| e.id.to_string().starts_with(&id));
    match (matches.next(), matches.next()) {
        (Some(entry), None) => Ok(entry),
        (Some(_), Some(_)) => Err(format!("Entry ID '{}' is ambiguous", id)),
        (None, _) => Err(format!("Entry not found: {}", id)),
    }
}
