//! Delete one entry

use crate::commands::{load_journal, palette, TerminalPrompt};
use anyhow::Result;
use ourjournal::app::AppState;
use ourjournal::models::DateKey;
use ourjournal::services::DeleteOutcome;

pub async fn run(state: &AppState, date: DateKey, assume_yes: bool) -> Result<()> {
    let (mut journal, _subscription) = load_journal(state).await?;
    let palette = palette(state);

    // Blank records are unmarked on the calendar but still removable
    if journal.entries().get(&date).is_none() {
        println!("{}", palette.dim(&format!("No entry for {}", date)));
        return Ok(());
    }

    journal.open(date);

    match journal.delete(&TerminalPrompt { assume_yes }).await {
        Ok(DeleteOutcome::Deleted) => {
            println!("{}", palette.success(&format!("Deleted entry for {}", date)));
            Ok(())
        }
        Ok(DeleteOutcome::Cancelled) => {
            println!("Cancelled.");
            Ok(())
        }
        Err(e) => {
            println!("{}", palette.error(&format!("Could not delete: {}", e)));
            Err(e.into())
        }
    }
}
