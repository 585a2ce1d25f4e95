//! Memory lane
//!
//! Picks a random past day that has something written on it.

use crate::models::{DateKey, Entry, Person};
use crate::services::EntryStore;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shown when one side of a memory has no text
pub const NO_TEXT_PLACEHOLDER: &str = "- nothing written -";

/// A randomly chosen entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    pub date: DateKey,
    pub entry: Entry,
}

impl Memory {
    /// Text for one side, or the placeholder when it is blank
    pub fn text_for(&self, person: Person) -> &str {
        let text = &self.entry.person(person).text;
        if text.trim().is_empty() {
            NO_TEXT_PLACEHOLDER
        } else {
            text
        }
    }
}

/// Choose uniformly among dates whose entry has content
pub fn pick<R: Rng + ?Sized>(entries: &EntryStore, rng: &mut R) -> Option<Memory> {
    let dates: Vec<&DateKey> = entries.dates_with_entries().collect();

    let date = **dates.choose(rng)?;
    let entry = entries.get(&date)?.clone();

    tracing::debug!("Picked memory from {} of {} days", date, dates.len());

    Some(Memory { date, entry })
}
