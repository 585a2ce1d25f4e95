//! Storage module
//!
//! Remote document stores holding the journal tree.
//! A store can be subscribed to (full-tree snapshot on every change),
//! written at a path, and have a path removed.

pub mod firebase;
pub mod local;

pub use firebase::FirebaseStore;
pub use local::LocalDocumentStore;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Buffered snapshots per subscription before the producer waits
pub(crate) const SUBSCRIPTION_BUFFER: usize = 16;

/// A real-time key-value document backend
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Subscribe to the tree under `root`.
    ///
    /// The first item is the current tree, then one item per change.
    /// `None` means nothing is stored under `root`.
    async fn subscribe(&self, root: &str) -> Result<Subscription>;

    /// Replace the document at `path`
    async fn set(&self, path: &str, value: &Value) -> Result<()>;

    /// Remove the document at `path`
    async fn remove(&self, path: &str) -> Result<()>;
}

/// Stream of full-tree snapshots.
///
/// Dropping the subscription stops the task feeding it.
pub struct Subscription {
    rx: mpsc::Receiver<Result<Option<Value>>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn new(rx: mpsc::Receiver<Result<Option<Value>>>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Next snapshot, or `None` once the feed has ended
    pub async fn next(&mut self) -> Option<Result<Option<Value>>> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Split a slash-separated path into its non-empty segments
pub(crate) fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Read the value at `path` inside `tree`
pub(crate) fn value_at<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path_segments(path)
        .into_iter()
        .try_fold(tree, |node, segment| node.get(segment))
        .filter(|v| !v.is_null())
}

/// Write `value` at `path` inside `tree`, creating objects on the way.
///
/// Writing `null` removes the key, and parents left empty are pruned,
/// matching how the realtime database never stores empty objects.
pub(crate) fn set_at(tree: &mut Value, path: &str, value: Value) {
    let segments = path_segments(path);
    set_segments(tree, &segments, value);
}

fn set_segments(node: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(serde_json::Map::new());
    }

    if let Value::Object(map) = node {
        if rest.is_empty() {
            if value.is_null() {
                map.remove(*first);
            } else {
                map.insert(first.to_string(), value);
            }
        } else {
            let child = map.entry(first.to_string()).or_insert(Value::Null);
            set_segments(child, rest, value);
            if child.is_null() || child.as_object().is_some_and(|m| m.is_empty()) {
                map.remove(*first);
            }
        }
    }

    if node.as_object().is_some_and(|m| m.is_empty()) {
        *node = Value::Null;
    }
}
