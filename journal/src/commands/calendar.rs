//! Month grid command

use crate::commands::{load_journal, navigate, palette};
use crate::render;
use anyhow::Result;
use ourjournal::app::AppState;

pub async fn run(state: &AppState, year: Option<i32>, month: Option<u32>) -> Result<()> {
    let (mut journal, _subscription) = load_journal(state).await?;
    navigate(&mut journal, year, month)?;

    let grid = journal.month_grid();
    println!("{}", render::month_grid(&grid, &palette(state)));

    Ok(())
}
