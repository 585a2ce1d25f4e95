//! Live calendar

use crate::commands::{load_journal, navigate, palette};
use crate::render;
use anyhow::Result;
use ourjournal::app::AppState;

pub async fn run(state: &AppState, year: Option<i32>, month: Option<u32>) -> Result<()> {
    let (mut journal, mut subscription) = load_journal(state).await?;
    navigate(&mut journal, year, month)?;
    let palette = palette(state);

    redraw(&render::month_grid(&journal.month_grid(), &palette));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch");
                break;
            }
            update = journal.next_snapshot(&mut subscription) => match update {
                Some(Ok(outcome)) => {
                    tracing::debug!("Snapshot with {} entries", outcome.entries);
                    redraw(&render::month_grid(&journal.month_grid(), &palette));
                }
                Some(Err(e)) => {
                    eprintln!("{}", palette.error(&format!("Sync error: {}", e)));
                }
                None => {
                    eprintln!("{}", palette.error("The journal feed closed"));
                    break;
                }
            }
        }
    }

    Ok(())
}

fn redraw(grid: &str) {
    // Clear screen, cursor home
    print!("\x1b[2J\x1b[H");
    println!("{}", grid);
    println!();
    println!("Watching for changes. Press Ctrl+C to stop.");
}
