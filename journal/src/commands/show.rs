//! Print one entry

use crate::commands::{load_journal, palette};
use crate::render;
use anyhow::Result;
use ourjournal::app::AppState;
use ourjournal::models::DateKey;

pub async fn run(state: &AppState, date: DateKey) -> Result<()> {
    let (journal, _subscription) = load_journal(state).await?;
    let palette = palette(state);

    match journal.entries().get(&date) {
        Some(entry) if !entry.is_empty() => println!("{}", render::entry(&date, entry, &palette)),
        _ => println!("{}", palette.dim(&format!("No entry for {}", date))),
    }

    Ok(())
}
