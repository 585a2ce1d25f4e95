//! Journal controller
//!
//! Single owner of the entry store, editor and calendar. Every snapshot
//! from the remote store goes through `apply_snapshot`, which replaces
//! the store and reloads the editor when it has no unsaved edits.

use crate::error::Result;
use crate::models::{DateKey, Person};
use crate::services::editor::{BatchReport, ConfirmPrompt, DeleteOutcome};
use crate::services::{CalendarView, EntryEditor, EntryStore, ImageCollector, MonthGrid};
use crate::storage::Subscription;
use serde_json::Value;

/// What a snapshot did besides replacing the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOutcome {
    pub entries: usize,
    pub editor_reloaded: bool,
}

/// Calendar, editor and store wired together
pub struct Journal {
    entries: EntryStore,
    editor: EntryEditor,
    calendar: CalendarView,
    collector: ImageCollector,
}

impl Journal {
    pub fn new(entries: EntryStore, calendar: CalendarView) -> Self {
        Self {
            entries,
            editor: EntryEditor::new(),
            calendar,
            collector: ImageCollector::default(),
        }
    }

    pub fn with_collector(mut self, collector: ImageCollector) -> Self {
        self.collector = collector;
        self
    }

    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    pub fn editor(&self) -> &EntryEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EntryEditor {
        &mut self.editor
    }

    pub fn calendar(&self) -> &CalendarView {
        &self.calendar
    }

    pub fn calendar_mut(&mut self) -> &mut CalendarView {
        &mut self.calendar
    }

    /// Subscribe to the journal tree
    pub async fn subscribe(&self) -> Result<Subscription> {
        self.entries.subscribe().await
    }

    /// Wait for the next snapshot and apply it.
    ///
    /// A read error is logged and the previous state kept. Returns `None`
    /// once the subscription has ended.
    pub async fn next_snapshot(&mut self, subscription: &mut Subscription) -> Option<Result<SnapshotOutcome>> {
        match subscription.next().await? {
            Ok(raw) => Some(Ok(self.apply_snapshot(raw))),
            Err(e) => {
                tracing::warn!("Journal subscription error, keeping last snapshot: {}", e);
                Some(Err(e))
            }
        }
    }

    /// Replace the store and reconcile the open editor
    pub fn apply_snapshot(&mut self, raw: Option<Value>) -> SnapshotOutcome {
        self.entries.apply_snapshot(raw);
        let editor_reloaded = self.editor.refresh(&self.entries);

        if self.editor.is_open() && !editor_reloaded {
            tracing::debug!("Editor has unsaved edits, not reloading from snapshot");
        }

        SnapshotOutcome {
            entries: self.entries.len(),
            editor_reloaded,
        }
    }

    /// Month grid for the calendar's current month
    pub fn month_grid(&self) -> MonthGrid {
        self.calendar.render(&self.entries)
    }

    /// Open the editor on a day of the shown month
    pub fn select_day(&mut self, day: u32) -> Result<DateKey> {
        let date = self.calendar.select(day)?;
        self.editor.open(date, &self.entries);
        Ok(date)
    }

    /// Open the editor on any date
    pub fn open(&mut self, date: DateKey) {
        self.editor.open(date, &self.entries);
    }

    pub fn set_text(&mut self, person: Person, text: impl Into<String>) -> Result<()> {
        self.editor.set_text(person, text)
    }

    pub async fn add_images(&mut self, person: Person, files: Vec<Vec<u8>>) -> Result<BatchReport> {
        self.editor.add_images(person, files, &self.collector).await
    }

    pub fn remove_image(&mut self, person: Person, index: usize) -> bool {
        self.editor.remove_image(person, index)
    }

    pub async fn save(&mut self) -> Result<()> {
        self.editor.save(&self.entries).await
    }

    pub async fn delete(&mut self, prompt: &dyn ConfirmPrompt) -> Result<DeleteOutcome> {
        self.editor.delete(&self.entries, prompt).await
    }

    pub fn close(&mut self) {
        self.editor.close();
    }
}
