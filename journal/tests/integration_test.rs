//! Integration tests for OurJournal
//!
//! These tests verify end-to-end functionality including:
//! - Two clients sharing one journal
//! - Persistence of the local journal and settings
//! - Image attachments and deletes through the journal controller

use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat, RgbImage};
use ourjournal::app::setup;
use ourjournal::error::Result;
use ourjournal::models::{DateKey, Person};
use ourjournal::services::{memories, CalendarView, ConfirmPrompt, DeleteOutcome, EntryStore, Journal, Theme};
use ourjournal::storage::{DocumentStore, LocalDocumentStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

struct Answer(bool);

impl ConfirmPrompt for Answer {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(self.0)
    }
}

/// Helper to create a journal on a shared store, showing March 2024
fn create_client(store: &LocalDocumentStore) -> Journal {
    let entries = EntryStore::new(Arc::new(store.clone()));
    Journal::new(entries, CalendarView::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
}

fn date(s: &str) -> DateKey {
    DateKey::parse(s).unwrap()
}

#[tokio::test]
async fn test_two_clients_share_entries() {
    let store = LocalDocumentStore::in_memory();
    let mut alice = create_client(&store);
    let mut bob = create_client(&store);

    let mut alice_feed = alice.subscribe().await.unwrap();
    let mut bob_feed = bob.subscribe().await.unwrap();
    alice.next_snapshot(&mut alice_feed).await.unwrap().unwrap();
    bob.next_snapshot(&mut bob_feed).await.unwrap().unwrap();

    // Bob is reading the day Alice writes to
    bob.select_day(14).unwrap();

    alice.select_day(14).unwrap();
    alice.set_text(Person::A, "Dinner by the river").unwrap();
    alice.save().await.unwrap();

    let outcome = bob.next_snapshot(&mut bob_feed).await.unwrap().unwrap();
    assert_eq!(outcome.entries, 1);
    assert!(outcome.editor_reloaded);
    assert_eq!(bob.editor().buffer().unwrap().person_a.text, "Dinner by the river");

    let marked: Vec<u32> = bob.month_grid().days.iter().filter(|c| c.has_entry).map(|c| c.day).collect();
    assert_eq!(marked, vec![14]);

    // Bob adds his side without losing Alice's
    bob.set_text(Person::B, "Best pasta in town").unwrap();
    bob.save().await.unwrap();

    // Echo of Alice's own save, then Bob's
    alice.next_snapshot(&mut alice_feed).await.unwrap().unwrap();
    alice.next_snapshot(&mut alice_feed).await.unwrap().unwrap();
    let entry = alice.entries().get(&date("2024-03-14")).unwrap();
    assert_eq!(entry.person_a.text, "Dinner by the river");
    assert_eq!(entry.person_b.text, "Best pasta in town");
}

#[tokio::test]
async fn test_unsaved_edits_survive_remote_changes() {
    let store = LocalDocumentStore::in_memory();
    let mut alice = create_client(&store);
    let mut feed = alice.subscribe().await.unwrap();
    alice.next_snapshot(&mut feed).await.unwrap().unwrap();

    alice.select_day(2).unwrap();
    alice.set_text(Person::A, "half a thought").unwrap();

    store
        .set("journal_entries/2024-03-02", &serde_json::json!({ "personB": { "text": "remote" } }))
        .await
        .unwrap();

    let outcome = alice.next_snapshot(&mut feed).await.unwrap().unwrap();
    assert!(!outcome.editor_reloaded);
    assert!(alice.editor().is_dirty());
    assert_eq!(alice.editor().buffer().unwrap().person_a.text, "half a thought");
    assert!(alice.entries().has_entry(&date("2024-03-02")));
}

#[tokio::test]
async fn test_images_and_delete_workflow() {
    let store = LocalDocumentStore::in_memory();
    let mut journal = create_client(&store);
    let mut feed = journal.subscribe().await.unwrap();
    journal.next_snapshot(&mut feed).await.unwrap().unwrap();

    journal.select_day(20).unwrap();
    let report = journal
        .add_images(Person::B, vec![png(1600, 900), b"not an image".to_vec(), png(40, 40)])
        .await
        .unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, 1);

    // Images alone are enough to save
    assert!(journal.editor().can_save());
    journal.save().await.unwrap();
    journal.next_snapshot(&mut feed).await.unwrap().unwrap();

    let entry = journal.entries().get(&date("2024-03-20")).unwrap();
    assert_eq!(entry.person_b.images.len(), 2);
    assert!(entry.person_b.images.iter().all(|i| i.starts_with("data:image/jpeg;base64,")));

    journal.select_day(20).unwrap();
    assert_eq!(journal.delete(&Answer(false)).await.unwrap(), DeleteOutcome::Cancelled);
    assert!(journal.editor().is_open());

    assert_eq!(journal.delete(&Answer(true)).await.unwrap(), DeleteOutcome::Deleted);
    assert!(!journal.editor().is_open());

    journal.next_snapshot(&mut feed).await.unwrap().unwrap();
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn test_local_journal_persists_across_restarts() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");

    {
        let state = setup(Some(data_dir.clone())).await.unwrap();
        let mut journal = state.journal();
        let mut feed = journal.subscribe().await.unwrap();
        journal.next_snapshot(&mut feed).await.unwrap().unwrap();

        journal.open(date("2023-12-31"));
        journal.set_text(Person::A, "New year's eve").unwrap();
        journal.save().await.unwrap();

        state.settings_service.set_theme(Theme::Dark).await.unwrap();
    }

    assert!(data_dir.join("journal.json").exists());

    let state = setup(Some(data_dir)).await.unwrap();
    assert_eq!(state.settings.theme, Theme::Dark);

    let mut journal = state.journal();
    let mut feed = journal.subscribe().await.unwrap();
    journal.next_snapshot(&mut feed).await.unwrap().unwrap();

    let entry = journal.entries().get(&date("2023-12-31")).unwrap();
    assert_eq!(entry.person_a.text, "New year's eve");
    assert!(entry.person_b.text.is_empty());
}

#[tokio::test]
async fn test_legacy_file_is_normalized() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("journal.json");
    let legacy = serde_json::json!({
        "journal_entries": {
            "2022-07-01": {
                "personA": { "text": "old photo", "image": "data:image/jpeg;base64,AAAA" },
                "personB": null
            },
            "not-a-date": { "personA": { "text": "ignored" } },
            "2022-07-02": null
        }
    });
    tokio::fs::write(&file, serde_json::to_vec(&legacy).unwrap()).await.unwrap();

    let store = LocalDocumentStore::open(file).await.unwrap();
    let mut journal = create_client(&store);
    let mut feed = journal.subscribe().await.unwrap();
    let outcome = journal.next_snapshot(&mut feed).await.unwrap().unwrap();

    assert_eq!(outcome.entries, 1);
    let entry = journal.entries().get(&date("2022-07-01")).unwrap();
    assert_eq!(entry.person_a.images, vec!["data:image/jpeg;base64,AAAA".to_string()]);
    assert!(entry.person_b.images.is_empty());

    let memory = memories::pick(journal.entries(), &mut StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(memory.date, date("2022-07-01"));
    assert_eq!(memory.text_for(Person::A), "old photo");
    assert_eq!(memory.text_for(Person::B), memories::NO_TEXT_PLACEHOLDER);
}
