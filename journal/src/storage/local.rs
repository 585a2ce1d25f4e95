//! Local document store
//!
//! Keeps the whole tree in memory and optionally mirrors it to a JSON file.
//! Used for offline journals and in tests. Changes are fanned out to
//! subscribers in-process only.

use super::{set_at, value_at, DocumentStore, Subscription, SUBSCRIPTION_BUFFER};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, Mutex};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// In-process document store
#[derive(Clone)]
pub struct LocalDocumentStore {
    inner: Arc<Inner>,
}

struct Inner {
    tree: Mutex<Value>,
    changes: broadcast::Sender<Value>,
    file: Option<PathBuf>,
}

impl LocalDocumentStore {
    /// Create an empty store that lives only in memory
    pub fn in_memory() -> Self {
        Self::with_tree(Value::Null, None)
    }

    /// Open a store backed by a JSON file, loading it if it exists
    pub async fn open(file: PathBuf) -> Result<Self> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tree = if file.exists() {
            let content = fs::read_to_string(&file).await?;
            if content.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Value::Null
        };

        tracing::info!("Local journal store opened at: {:?}", file);

        Ok(Self::with_tree(tree, Some(file)))
    }

    fn with_tree(tree: Value, file: Option<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                tree: Mutex::new(tree),
                changes,
                file,
            }),
        }
    }

    /// Path of the backing file, if any
    pub fn file(&self) -> Option<&Path> {
        self.inner.file.as_deref()
    }

    async fn write(&self, path: &str, value: Value) -> Result<()> {
        let mut tree = self.inner.tree.lock().await;

        let mut updated = tree.clone();
        set_at(&mut updated, path, value);

        // Persist before publishing so memory never runs ahead of disk
        if let Some(file) = &self.inner.file {
            persist(file, &updated).await?;
        }

        *tree = updated;

        // No receivers is fine
        let _ = self.inner.changes.send(tree.clone());

        tracing::debug!("Local store updated at: {}", path);

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn subscribe(&self, root: &str) -> Result<Subscription> {
        // Register for changes while holding the lock so none slip between
        // the initial read and the first broadcast
        let tree = self.inner.tree.lock().await;
        let mut changes = self.inner.changes.subscribe();
        let initial = value_at(&tree, root).cloned();
        drop(tree);

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let root = root.to_string();

        let task = tokio::spawn(async move {
            if tx.send(Ok(initial)).await.is_err() {
                return;
            }

            loop {
                match changes.recv().await {
                    Ok(tree) => {
                        if tx.send(Ok(value_at(&tree, &root).cloned())).await.is_err() {
                            return;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Every item is a full tree, the next one supersedes
                        tracing::debug!("Subscriber lagged, skipped {} snapshots", skipped);
                    }
                    Err(RecvError::Closed) => return,
                }
            }
        });

        Ok(Subscription::new(rx, task))
    }

    async fn set(&self, path: &str, value: &Value) -> Result<()> {
        self.write(path, value.clone()).await
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.write(path, Value::Null).await
    }
}

/// Write the tree to a temp file first, then rename into place
async fn persist(file: &Path, tree: &Value) -> Result<()> {
    let content = serde_json::to_vec_pretty(tree)?;

    let temp_path = file.with_extension("tmp");
    let mut handle = fs::File::create(&temp_path).await?;
    handle.write_all(&content).await?;
    handle.sync_all().await?;

    fs::rename(temp_path, file).await?;

    Ok(())
}
