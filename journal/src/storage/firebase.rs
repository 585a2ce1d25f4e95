//! Firebase Realtime Database client
//!
//! Talks to the database over its REST API:
//! - `PUT <base>/<path>.json` replaces a document
//! - `DELETE <base>/<path>.json` removes it
//! - `GET <base>/<path>.json` with `Accept: text/event-stream` streams changes
//!
//! The stream sends `put` and `patch` events relative to the subscribed
//! path. They are applied to a cached copy of the tree and the full tree
//! is handed to the subscriber after every event. A dropped stream is
//! reported and reopened with exponential backoff; only `cancel` and
//! `auth_revoked` end a subscription.

use super::{set_at, DocumentStore, Subscription, SUBSCRIPTION_BUFFER};
use crate::config::{MAX_RECONNECT_DELAY_SECS, RECONNECT_DELAY_MS};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;

type SnapshotSender = mpsc::Sender<Result<Option<Value>>>;

/// Realtime database reachable over HTTPS
#[derive(Clone)]
pub struct FirebaseStore {
    client: Client,
    base_url: String,
    reconnect_delay: Duration,
}

impl FirebaseStore {
    /// Create a client for a database URL such as
    /// `https://my-journal-default-rtdb.firebaseio.com`
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(AppError::Settings(format!(
                "Database URL must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("ourjournal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            reconnect_delay: Duration::from_millis(RECONNECT_DELAY_MS),
        })
    }

    /// First wait before reopening a dropped event stream
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// REST URL of a document path
    fn url_for(&self, path: &str) -> String {
        let trimmed = path.trim_matches('/');
        format!("{}/{}.json", self.base_url, trimmed)
    }
}

#[async_trait]
impl DocumentStore for FirebaseStore {
    async fn subscribe(&self, root: &str) -> Result<Subscription> {
        let url = self.url_for(root);
        tracing::info!("Subscribing to {}", url);

        let response = open_stream(&self.client, &url).await?;

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let client = self.client.clone();
        let initial_delay = self.reconnect_delay;
        let max_delay = Duration::from_secs(MAX_RECONNECT_DELAY_SECS).max(initial_delay);

        let task = tokio::spawn(async move {
            let mut response = response;
            let mut tree = Value::Null;

            loop {
                let reason = match pump_events(&mut response, &mut tree, &tx).await {
                    StreamEnd::Lost(reason) => reason,
                    StreamEnd::Finished => return,
                };

                tracing::warn!("Event stream lost: {}", reason);
                if tx.send(Err(AppError::RemoteRead(reason))).await.is_err() {
                    return;
                }

                let mut delay = initial_delay;
                response = loop {
                    tracing::debug!("Reopening event stream in {:?}", delay);
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(max_delay);

                    match open_stream(&client, &url).await {
                        Ok(response) => break response,
                        Err(e) => {
                            tracing::warn!("Failed to reopen event stream: {}", e);
                            if tx.send(Err(e)).await.is_err() {
                                return;
                            }
                        }
                    }
                };

                tracing::info!("Event stream reopened: {}", url);
            }
        });

        Ok(Subscription::new(rx, task))
    }

    async fn set(&self, path: &str, value: &Value) -> Result<()> {
        let url = self.url_for(path);
        tracing::debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .json(value)
            .send()
            .await
            .map_err(|e| AppError::RemoteWrite(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::RemoteWrite(failure_message(response).await));
        }

        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let url = self.url_for(path);
        tracing::debug!("DELETE {}", url);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| AppError::RemoteWrite(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::RemoteWrite(failure_message(response).await));
        }

        Ok(())
    }
}

/// Start a `text/event-stream` read of `url`
async fn open_stream(client: &Client, url: &str) -> Result<Response> {
    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(|e| AppError::RemoteRead(e.to_string()))?;

    if !response.status().is_success() {
        return Err(AppError::RemoteRead(failure_message(response).await));
    }

    Ok(response)
}

/// How one connection's stream stopped
enum StreamEnd {
    /// Transport failure or end of body; worth reconnecting
    Lost(String),
    /// Closed by the server or the subscriber went away
    Finished,
}

/// Apply events from one connection until it stops
async fn pump_events(response: &mut Response, tree: &mut Value, tx: &SnapshotSender) -> StreamEnd {
    let mut decoder = EventStreamDecoder::default();

    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => return StreamEnd::Lost("event stream ended".to_string()),
            Err(e) => return StreamEnd::Lost(e.to_string()),
        };

        for event in decoder.push(&chunk) {
            match apply_event(tree, &event) {
                Ok(StreamUpdate::Changed) => {
                    let snapshot = if tree.is_null() { None } else { Some(tree.clone()) };
                    if tx.send(Ok(snapshot)).await.is_err() {
                        return StreamEnd::Finished;
                    }
                }
                Ok(StreamUpdate::Ignored) => {}
                Ok(StreamUpdate::Closed(reason)) => {
                    let _ = tx.send(Err(AppError::RemoteRead(reason))).await;
                    return StreamEnd::Finished;
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed stream event '{}': {}", event.name, e);
                }
            }
        }
    }
}

/// Turn an error response into a readable message.
///
/// The database answers errors with `{"error": "..."}`.
async fn failure_message(response: Response) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => format!("{}: {}", status, parsed.error),
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{}: {}", status, body.trim()),
    }
}

/// One server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StreamEvent {
    pub name: String,
    pub data: String,
}

/// Incremental `text/event-stream` parser.
///
/// Bytes are buffered until a full line is available so multi-byte
/// characters split across chunks decode correctly.
#[derive(Default)]
pub(crate) struct EventStreamDecoder {
    buffer: Vec<u8>,
    name: Option<String>,
    data: Vec<String>,
}

impl EventStreamDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
                continue;
            }

            // Comment line
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "event" => self.name = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }

        events
    }

    fn dispatch(&mut self) -> Option<StreamEvent> {
        let name = self.name.take();
        let data = std::mem::take(&mut self.data);

        if name.is_none() && data.is_empty() {
            return None;
        }

        Some(StreamEvent {
            name: name.unwrap_or_else(|| "message".to_string()),
            data: data.join("\n"),
        })
    }
}

/// Effect of one stream event on the cached tree
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum StreamUpdate {
    Changed,
    Ignored,
    Closed(String),
}

#[derive(Deserialize)]
struct StreamPayload {
    path: String,
    data: Value,
}

pub(crate) fn apply_event(tree: &mut Value, event: &StreamEvent) -> Result<StreamUpdate> {
    match event.name.as_str() {
        "put" => {
            let payload: StreamPayload = serde_json::from_str(&event.data)?;
            set_at(tree, &payload.path, payload.data);
            Ok(StreamUpdate::Changed)
        }
        "patch" => {
            let payload: StreamPayload = serde_json::from_str(&event.data)?;
            let Value::Object(children) = payload.data else {
                return Err(AppError::RemoteRead("patch data is not an object".to_string()));
            };
            let base = payload.path.trim_end_matches('/');
            for (key, value) in children {
                set_at(tree, &format!("{}/{}", base, key), value);
            }
            Ok(StreamUpdate::Changed)
        }
        "keep-alive" => Ok(StreamUpdate::Ignored),
        "cancel" => Ok(StreamUpdate::Closed(format!(
            "subscription cancelled by server: {}",
            event.data
        ))),
        "auth_revoked" => Ok(StreamUpdate::Closed("credential expired".to_string())),
        other => {
            tracing::debug!("Ignoring stream event: {}", other);
            Ok(StreamUpdate::Ignored)
        }
    }
}
