//! Entry store
//!
//! Authoritative local copy of the journal tree, keyed by date.
//! The map is replaced wholesale by every snapshot the remote store
//! pushes; writes go straight to the remote store and only show up
//! locally once the resulting snapshot arrives.

use crate::config::{DEFAULT_WRITE_TIMEOUT_SECS, ENTRIES_ROOT};
use crate::error::{AppError, Result};
use crate::models::{DateKey, Entry};
use crate::storage::{DocumentStore, Subscription};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Date-keyed journal entries backed by a remote document store
#[derive(Clone)]
pub struct EntryStore {
    remote: Arc<dyn DocumentStore>,
    entries: BTreeMap<DateKey, Entry>,
    write_timeout: Duration,
}

impl EntryStore {
    pub fn new(remote: Arc<dyn DocumentStore>) -> Self {
        Self {
            remote,
            entries: BTreeMap::new(),
            write_timeout: Duration::from_secs(DEFAULT_WRITE_TIMEOUT_SECS),
        }
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Subscribe to the journal tree in the remote store
    pub async fn subscribe(&self) -> Result<Subscription> {
        self.remote.subscribe(ENTRIES_ROOT).await
    }

    /// Replace every entry with the contents of a snapshot.
    ///
    /// Children that are null, keyed by something other than a date, or
    /// not shaped like an entry are skipped.
    pub fn apply_snapshot(&mut self, raw: Option<Value>) {
        let mut entries = BTreeMap::new();

        match raw {
            None | Some(Value::Null) => {}
            Some(Value::Object(children)) => {
                for (key, value) in children {
                    if value.is_null() {
                        continue;
                    }

                    let date = match DateKey::parse(&key) {
                        Ok(date) => date,
                        Err(e) => {
                            tracing::warn!("Skipping journal child with bad key: {}", e);
                            continue;
                        }
                    };

                    match serde_json::from_value::<Entry>(value) {
                        Ok(entry) => {
                            entries.insert(date, entry);
                        }
                        Err(e) => {
                            tracing::warn!("Skipping malformed entry for {}: {}", date, e);
                        }
                    }
                }
            }
            Some(other) => {
                tracing::warn!("Ignoring journal snapshot that is not an object: {}", other);
            }
        }

        tracing::debug!("Applied snapshot with {} entries", entries.len());
        self.entries = entries;
    }

    /// Look up the entry for a date
    pub fn get(&self, date: &DateKey) -> Option<&Entry> {
        self.entries.get(date)
    }

    /// Whether a date has an entry with any content
    pub fn has_entry(&self, date: &DateKey) -> bool {
        self.get(date).is_some_and(|entry| !entry.is_empty())
    }

    /// Dates whose entry has content, oldest first
    pub fn dates_with_entries(&self) -> impl Iterator<Item = &DateKey> + '_ {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_empty())
            .map(|(date, _)| date)
    }

    /// Number of entries in the last snapshot
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write an entry to the remote store.
    ///
    /// The local map is left alone; the echoing snapshot updates it.
    pub async fn commit(&self, date: DateKey, entry: &Entry) -> Result<()> {
        tracing::info!("Saving entry: {}", date);

        let value = serde_json::to_value(entry)?;
        let path = entry_path(&date);

        self.bounded(self.remote.set(&path, &value)).await?;

        tracing::info!("Entry saved: {}", date);
        Ok(())
    }

    /// Remove an entry from the remote store
    pub async fn remove(&self, date: DateKey) -> Result<()> {
        tracing::info!("Deleting entry: {}", date);

        let path = entry_path(&date);
        self.bounded(self.remote.remove(&path)).await?;

        tracing::info!("Entry deleted: {}", date);
        Ok(())
    }

    /// Run a remote write under the write timeout, mapping every failure
    /// to a remote write error
    async fn bounded<F>(&self, write: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        match tokio::time::timeout(self.write_timeout, write).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(AppError::RemoteWrite(message))) => Err(AppError::RemoteWrite(message)),
            Ok(Err(other)) => Err(AppError::RemoteWrite(other.to_string())),
            Err(_) => Err(AppError::RemoteWrite(format!(
                "timed out after {} s",
                self.write_timeout.as_secs_f32()
            ))),
        }
    }
}

/// Document path of a date's entry
pub fn entry_path(date: &DateKey) -> String {
    format!("{}/{}", ENTRIES_ROOT, date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonEntry;
    use crate::storage::LocalDocumentStore;
    use async_trait::async_trait;
    use serde_json::json;

    /// Store whose writes never complete
    struct StalledStore;

    #[async_trait]
    impl DocumentStore for StalledStore {
        async fn subscribe(&self, _root: &str) -> Result<Subscription> {
            Err(AppError::RemoteRead("not supported".to_string()))
        }

        async fn set(&self, _path: &str, _value: &Value) -> Result<()> {
            std::future::pending().await
        }

        async fn remove(&self, _path: &str) -> Result<()> {
            std::future::pending().await
        }
    }

    fn key(s: &str) -> DateKey {
        DateKey::parse(s).unwrap()
    }

    fn create_test_store() -> (EntryStore, LocalDocumentStore) {
        let remote = LocalDocumentStore::in_memory();
        (EntryStore::new(Arc::new(remote.clone())), remote)
    }

    #[test]
    fn test_snapshot_replaces_everything() {
        let (mut store, _remote) = create_test_store();

        store.apply_snapshot(Some(json!({
            "2024-03-05": { "personA": { "text": "hi" }, "personB": {} },
            "2024-03-06": { "personB": { "text": "there" } }
        })));
        assert_eq!(store.len(), 2);

        store.apply_snapshot(Some(json!({ "2024-04-01": { "personA": { "text": "new" } } })));
        assert_eq!(store.len(), 1);
        assert!(store.get(&key("2024-03-05")).is_none());
        assert!(store.has_entry(&key("2024-04-01")));
    }

    #[test]
    fn test_absent_snapshot_clears_store() {
        let (mut store, _remote) = create_test_store();
        store.apply_snapshot(Some(json!({ "2024-03-05": { "personA": { "text": "hi" } } })));

        store.apply_snapshot(None);
        assert!(store.is_empty());

        store.apply_snapshot(Some(json!({ "2024-03-05": { "personA": { "text": "hi" } } })));
        store.apply_snapshot(Some(Value::Null));
        assert!(store.is_empty());
    }

    #[test]
    fn test_bad_children_are_skipped() {
        let (mut store, _remote) = create_test_store();

        store.apply_snapshot(Some(json!({
            "not-a-date": { "personA": { "text": "x" } },
            "2024-03-05": { "personA": { "text": 42 } },
            "2024-03-06": null,
            "2024-03-07": { "personA": { "text": "kept" } }
        })));

        assert_eq!(store.len(), 1);
        assert!(store.has_entry(&key("2024-03-07")));
    }

    #[test]
    fn test_has_entry_follows_emptiness_rule() {
        let (mut store, _remote) = create_test_store();

        store.apply_snapshot(Some(json!({
            "2024-03-01": { "personA": { "text": "   " }, "personB": { "images": [] } },
            "2024-03-02": { "personB": { "images": ["data:image/jpeg;base64,AA=="] } },
            "2024-03-03": { "personA": { "text": "hello" } }
        })));

        assert!(!store.has_entry(&key("2024-03-01")));
        assert!(store.get(&key("2024-03-01")).is_some());
        assert!(store.has_entry(&key("2024-03-02")));
        assert!(store.has_entry(&key("2024-03-03")));
        assert!(!store.has_entry(&key("2024-03-04")));

        let dates: Vec<String> = store.dates_with_entries().map(|d| d.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-02", "2024-03-03"]);
    }

    #[tokio::test]
    async fn test_commit_writes_remote_without_touching_local_map() {
        let (store, remote) = create_test_store();
        let date = key("2024-03-05");

        let entry = Entry {
            person_a: PersonEntry {
                text: "hi".to_string(),
                images: vec![],
            },
            person_b: PersonEntry::default(),
        };

        store.commit(date, &entry).await.unwrap();
        assert!(store.get(&date).is_none());

        let mut sub = remote.subscribe(ENTRIES_ROOT).await.unwrap();
        let tree = sub.next().await.unwrap().unwrap().unwrap();
        assert_eq!(
            tree["2024-03-05"],
            json!({ "personA": { "text": "hi", "images": [] }, "personB": { "text": "", "images": [] } })
        );
    }

    #[tokio::test]
    async fn test_remove_deletes_remote_path() {
        let (store, remote) = create_test_store();
        let date = key("2024-03-05");
        remote
            .set(&entry_path(&date), &json!({ "personA": { "text": "bye" } }))
            .await
            .unwrap();

        store.remove(date).await.unwrap();

        let mut sub = remote.subscribe(ENTRIES_ROOT).await.unwrap();
        assert!(sub.next().await.unwrap().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_timeout() {
        let store = EntryStore::new(Arc::new(StalledStore)).with_write_timeout(Duration::from_millis(20));

        let err = store.commit(key("2024-03-05"), &Entry::default()).await.unwrap_err();
        match err {
            AppError::RemoteWrite(message) => assert!(message.contains("timed out")),
            other => panic!("unexpected error: {}", other),
        }

        let err = store.remove(key("2024-03-05")).await.unwrap_err();
        assert!(matches!(err, AppError::RemoteWrite(_)));
    }

    #[test]
    fn test_entry_path() {
        assert_eq!(entry_path(&key("2024-03-05")), "journal_entries/2024-03-05");
    }
}
