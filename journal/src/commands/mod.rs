//! Terminal commands
//!
//! Each submodule implements one subcommand:
//! - `calendar`: month grid with entry markers
//! - `show`: print one entry
//! - `edit`: change text and images of an entry and save it
//! - `delete`: remove an entry after confirmation
//! - `memory`: a random day from the past
//! - `theme`: light/dark preference
//! - `remote`: database URL and write timeout
//! - `watch`: live calendar that redraws on every change

pub mod calendar;
pub mod delete;
pub mod edit;
pub mod memory;
pub mod remote;
pub mod show;
pub mod theme;
pub mod watch;

use crate::render::Palette;
use anyhow::Result;
use chrono::{Datelike, Local};
use dialoguer::Confirm;
use ourjournal::app::AppState;
use ourjournal::error::AppError;
use ourjournal::models::DateKey;
use ourjournal::services::calendar::year_range;
use ourjournal::services::{ConfirmPrompt, Journal};
use ourjournal::storage::Subscription;

/// Confirmation through an interactive terminal prompt
pub struct TerminalPrompt {
    pub assume_yes: bool,
}

impl ConfirmPrompt for TerminalPrompt {
    fn confirm(&self, prompt: &str) -> ourjournal::error::Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }

        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| AppError::Generic(format!("Prompt failed: {}", e)))
    }
}

/// Journal with the first snapshot applied, plus the live subscription
pub async fn load_journal(state: &AppState) -> Result<(Journal, Subscription)> {
    let mut journal = state.journal();
    let mut subscription = journal.subscribe().await?;

    match journal.next_snapshot(&mut subscription).await {
        Some(Ok(outcome)) => {
            tracing::debug!("Loaded {} entries", outcome.entries);
            Ok((journal, subscription))
        }
        Some(Err(e)) => Err(e.into()),
        None => anyhow::bail!("The journal feed closed before sending any data"),
    }
}

/// Move the calendar to the requested year and month; missing parts keep
/// the current value
pub fn navigate(journal: &mut Journal, year: Option<i32>, month: Option<u32>) -> Result<()> {
    if year.is_none() && month.is_none() {
        return Ok(());
    }

    let calendar = journal.calendar_mut();
    let target_year = year.unwrap_or(calendar.year());
    let target_month = month.unwrap_or(calendar.month());

    let range = year_range(Local::now().year());
    if !range.contains(&target_year) {
        anyhow::bail!("Year {} is outside {}-{}", target_year, range.start(), range.end());
    }

    calendar.jump_to(target_year, target_month)?;
    Ok(())
}

/// Palette for the theme read at startup
pub fn palette(state: &AppState) -> Palette {
    Palette::new(state.settings.theme)
}

/// Parse a `YYYY-MM-DD` argument, or `today`
pub fn parse_date(s: &str) -> std::result::Result<DateKey, String> {
    if s.eq_ignore_ascii_case("today") {
        return Ok(DateKey::today());
    }

    DateKey::parse(s).map_err(|e| e.to_string())
}
