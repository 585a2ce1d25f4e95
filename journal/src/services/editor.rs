//! Entry editor
//!
//! Owns the edit buffer for the selected date. The buffer is a copy of
//! the stored entry and only reaches the store through `save`.

use crate::error::{AppError, Result};
use crate::models::{DateKey, Entry, ImageRef, Person};
use crate::services::{EntryStore, ImageCollector};

/// Yes/no question asked before destructive actions
pub trait ConfirmPrompt {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// What happened to a batch of uploaded images
#[derive(Debug, Default)]
pub struct BatchReport {
    pub added: usize,
    /// Position in the batch and the reason it was skipped
    pub skipped: Vec<(usize, AppError)>,
}

#[derive(Debug, Clone)]
struct EditSession {
    date: DateKey,
    buffer: Entry,
    dirty: bool,
    last_error: Option<String>,
}

/// Editor for one date at a time
#[derive(Debug, Default)]
pub struct EntryEditor {
    session: Option<EditSession>,
}

impl EntryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the stored entry for `date` (or an empty one) into the buffer
    pub fn open(&mut self, date: DateKey, entries: &EntryStore) {
        tracing::debug!("Opening editor for {}", date);

        self.session = Some(EditSession {
            date,
            buffer: entries.get(&date).cloned().unwrap_or_default(),
            dirty: false,
            last_error: None,
        });
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_date(&self) -> Option<DateKey> {
        self.session.as_ref().map(|s| s.date)
    }

    pub fn buffer(&self) -> Option<&Entry> {
        self.session.as_ref().map(|s| &s.buffer)
    }

    /// Whether the buffer holds edits not yet saved
    pub fn is_dirty(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.dirty)
    }

    /// Message of the last failed save or delete
    pub fn last_error(&self) -> Option<&str> {
        self.session.as_ref().and_then(|s| s.last_error.as_deref())
    }

    pub fn set_text(&mut self, person: Person, text: impl Into<String>) -> Result<()> {
        let session = self.session_mut()?;
        session.buffer.person_mut(person).text = text.into();
        session.dirty = true;
        Ok(())
    }

    /// Append an already encoded image
    pub fn push_image(&mut self, person: Person, image: ImageRef) -> Result<()> {
        let session = self.session_mut()?;
        session.buffer.person_mut(person).images.push(image);
        session.dirty = true;
        Ok(())
    }

    /// Ingest one file and append it to `person`'s images
    pub async fn add_image(
        &mut self,
        person: Person,
        data: Vec<u8>,
        collector: &ImageCollector,
    ) -> Result<()> {
        self.session_mut()?;
        let image = collector.ingest(data).await?;
        self.push_image(person, image)
    }

    /// Ingest several files; the ones that decode are appended in
    /// submission order and the rest are reported
    pub async fn add_images(
        &mut self,
        person: Person,
        files: Vec<Vec<u8>>,
        collector: &ImageCollector,
    ) -> Result<BatchReport> {
        self.session_mut()?;

        let mut report = BatchReport::default();
        for (index, result) in collector.ingest_batch(files).await.into_iter().enumerate() {
            match result {
                Ok(image) => {
                    self.push_image(person, image)?;
                    report.added += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping image {} for {}: {}", index + 1, person, e);
                    report.skipped.push((index, e));
                }
            }
        }

        Ok(report)
    }

    /// Remove one image by position. Out-of-range positions are a no-op
    /// and return `false`.
    pub fn remove_image(&mut self, person: Person, index: usize) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        let images = &mut session.buffer.person_mut(person).images;
        if index >= images.len() {
            return false;
        }

        images.remove(index);
        session.dirty = true;
        true
    }

    /// At least one side has non-whitespace text or an image
    pub fn can_save(&self) -> bool {
        self.buffer().is_some_and(|buffer| !buffer.is_empty())
    }

    /// Commit the buffer. Closes the editor on success; keeps the buffer
    /// and records the error on failure.
    pub async fn save(&mut self, entries: &EntryStore) -> Result<()> {
        let session = self.session.as_ref().ok_or(AppError::EditorClosed)?;
        if !self.can_save() {
            return Err(AppError::NothingToSave);
        }

        let date = session.date;
        let buffer = session.buffer.clone();

        match entries.commit(date, &buffer).await {
            Ok(()) => {
                self.close();
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to save entry {}: {}", date, e);
                if let Some(session) = self.session.as_mut() {
                    session.last_error = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Delete the whole entry after the user confirms
    pub async fn delete(
        &mut self,
        entries: &EntryStore,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<DeleteOutcome> {
        let date = self.active_date().ok_or(AppError::EditorClosed)?;

        if !prompt.confirm(&format!("Delete the entry for {}? This cannot be undone.", date))? {
            tracing::debug!("Delete of {} cancelled", date);
            return Ok(DeleteOutcome::Cancelled);
        }

        match entries.remove(date).await {
            Ok(()) => {
                self.close();
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                tracing::error!("Failed to delete entry {}: {}", date, e);
                if let Some(session) = self.session.as_mut() {
                    session.last_error = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// Discard the buffer without saving
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!("Closed editor for {}", session.date);
        }
    }

    /// Reload the buffer from a fresh snapshot unless it holds unsaved
    /// edits. Returns whether the buffer was reloaded.
    pub fn refresh(&mut self, entries: &EntryStore) -> bool {
        match &self.session {
            Some(session) if !session.dirty => {
                let date = session.date;
                self.open(date, entries);
                true
            }
            _ => false,
        }
    }

    fn session_mut(&mut self) -> Result<&mut EditSession> {
        self.session.as_mut().ok_or(AppError::EditorClosed)
    }
}
