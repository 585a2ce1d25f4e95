//! Memory lane command

use crate::commands::{load_journal, palette};
use crate::render;
use anyhow::Result;
use ourjournal::app::AppState;
use ourjournal::services::memories;

pub async fn run(state: &AppState) -> Result<()> {
    let (journal, _subscription) = load_journal(state).await?;
    let palette = palette(state);

    match memories::pick(journal.entries(), &mut rand::thread_rng()) {
        Some(memory) => println!("{}", render::memory(&memory, &palette)),
        None => println!("{}", palette.dim("No memories yet. Write something first!")),
    }

    Ok(())
}
