// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Realtime-database REST client.
//!
//! Each location is addressed as `{base}/{path}.json`:
//!
//! - writes are `PUT` requests with a JSON body
//! - one-shot reads are `GET` requests
//! - subscriptions are long-lived `GET` requests with
//!   `Accept: text/event-stream`. The server streams `put` and `patch`
//!   events, and the client folds them into a local copy of the subscribed
//!   subtree.
//!
//! Fire-and-forget writes go through one queue per store (shared by its
//! clones) and are sent one at a time, in the order they were issued. A
//! stream that ends is reported as [`StoreError::StreamClosed`] and is not
//! reopened.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::sse::{SseDecoder, StreamMessage};
use super::tree::set_at;
use super::{RemoteStore, Snapshot, StoreEvent, StorePath, Subscription};
use crate::error::StoreError;

// ============================================================================
// StoreConfig
// ============================================================================

/// Configuration for a [`RestStore`].
///
/// # Examples
///
/// ```
/// use relaysync_lib::store::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::new("https://home-1234.example-rtdb.app/")
///     .with_auth_token("secret")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "https://home-1234.example-rtdb.app");
/// assert_eq!(config.auth_token(), Some("secret"));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    base_url: String,
    auth_token: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
}

impl StoreConfig {
    /// Default timeout for writes and one-shot reads.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default timeout for establishing a connection.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the database at `base_url`.
    ///
    /// A trailing slash is removed. If no scheme is given, `https://` is
    /// assumed.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url
        } else {
            format!("https://{base_url}")
        };
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
            timeout: Self::DEFAULT_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the token passed as the `auth` query parameter.
    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Sets the timeout for writes and one-shot reads.
    ///
    /// Streams are not subject to it, only to the connect timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the auth token if set.
    #[must_use]
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Creates a `RestStore` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP clients cannot be created.
    pub fn into_store(self) -> Result<RestStore, StoreError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()?;
        let stream_client = Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()?;

        Ok(RestStore {
            base_url: self.base_url,
            auth_token: self.auth_token,
            client,
            stream_client,
            writer: Arc::new(Mutex::new(None)),
        })
    }
}

// ============================================================================
// RestStore
// ============================================================================

/// Store backed by the realtime-database REST protocol.
///
/// Subscriptions and writes run as tokio tasks, so both must be started from
/// within a runtime. Writes to the same store are applied in issue order.
///
/// # Examples
///
/// ```no_run
/// use relaysync_lib::store::{RemoteStore, RestStore, StorePath};
/// use serde_json::json;
///
/// # async fn example() -> relaysync_lib::Result<()> {
/// let store = RestStore::new("https://home-1234.example-rtdb.app")?;
///
/// // Awaited write with error reporting
/// store.put(&StorePath::new("relay/relay1")?, &json!(true)).await?;
///
/// // Fire-and-forget write
/// store.write(&StorePath::new("relay/relay2")?, json!(false))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestStore {
    base_url: String,
    auth_token: Option<String>,
    client: Client,
    stream_client: Client,
    /// Queue of the write task, started on the first `write`.
    writer: Arc<Mutex<Option<mpsc::UnboundedSender<QueuedWrite>>>>,
}

/// A fire-and-forget write waiting for its turn.
#[derive(Debug)]
struct QueuedWrite {
    url: String,
    path: StorePath,
    value: Value,
}

impl RestStore {
    /// Creates a store for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP clients cannot be created.
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        StoreConfig::new(base_url).into_store()
    }

    /// Returns the base URL of the database.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL of a location.
    fn build_url(&self, path: &StorePath) -> String {
        let encoded: Vec<String> = path
            .segments()
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        let mut url = format!("{}/{}.json", self.base_url, encoded.join("/"));
        if let Some(token) = &self.auth_token {
            url.push_str("?auth=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }

    /// Writes `value` at `path` and waits for the server to accept it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails or is rejected.
    pub async fn put(&self, path: &StorePath, value: &Value) -> Result<(), StoreError> {
        send_put(&self.client, &self.build_url(path), path, value).await
    }

    /// Reads the value at `path` once.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the request fails or the body is not JSON.
    pub async fn fetch(&self, path: &StorePath) -> Result<Snapshot, StoreError> {
        let url = self.build_url(path);
        tracing::debug!(path = %path, "Fetching store value");

        let response = check_status(self.client.get(&url).send().await?)?;
        let value: Value = response.json().await?;
        Ok(Snapshot::at(path, value))
    }
}

async fn send_put(
    client: &Client,
    url: &str,
    path: &StorePath,
    value: &Value,
) -> Result<(), StoreError> {
    tracing::debug!(path = %path, value = %value, "Sending store write");
    let response = client.put(url).json(value).send().await?;
    check_status(response)?;
    Ok(())
}

fn check_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(StoreError::AuthenticationFailed);
    }
    if !status.is_success() {
        return Err(StoreError::RequestFailed(format!(
            "HTTP {} - {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )));
    }
    Ok(response)
}

impl RemoteStore for RestStore {
    fn subscribe(&self, path: &StorePath) -> Result<Subscription, StoreError> {
        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let (tx, subscription) = Subscription::channel(path.clone());

        let task = runtime.spawn(run_stream(
            self.stream_client.clone(),
            self.build_url(path),
            path.clone(),
            tx,
        ));
        tracing::debug!(path = %path, "Store subscription started");
        Ok(subscription.with_producer(task))
    }

    fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        let mut write = QueuedWrite {
            url: self.build_url(path),
            path: path.clone(),
            value,
        };

        // Held until queued, so the queue order is the issue order.
        let mut writer = self.writer.lock();
        if let Some(queue) = writer.as_ref() {
            match queue.send(write) {
                Ok(()) => return Ok(()),
                // The task died with its runtime; start a new one.
                Err(mpsc::error::SendError(returned)) => write = returned,
            }
        }

        let (queue, pending) = mpsc::unbounded_channel();
        runtime.spawn(run_writer(self.client.clone(), pending));
        tracing::debug!("Store writer started");
        if queue.send(write).is_err() {
            return Err(StoreError::Unavailable("write queue closed".to_string()));
        }
        *writer = Some(queue);
        Ok(())
    }
}

/// Sends queued writes one after another until every store handle is gone.
async fn run_writer(client: Client, mut pending: mpsc::UnboundedReceiver<QueuedWrite>) {
    while let Some(write) = pending.recv().await {
        if let Err(e) = send_put(&client, &write.url, &write.path, &write.value).await {
            tracing::warn!(path = %write.path, error = %e, "Store write failed");
        }
    }
    tracing::debug!("Store writer stopped");
}

// ============================================================================
// Event stream
// ============================================================================

async fn run_stream(
    client: Client,
    url: String,
    path: StorePath,
    events: mpsc::UnboundedSender<StoreEvent>,
) {
    match stream_events(&client, &url, &path, &events).await {
        Ok(()) => tracing::debug!(path = %path, "Store subscription closed by receiver"),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Store subscription ended");
            let _ = events.send(StoreEvent::Failed(e));
        }
    }
}

/// Pumps the event stream until it fails or the receiver goes away.
async fn stream_events(
    client: &Client,
    url: &str,
    path: &StorePath,
    events: &mpsc::UnboundedSender<StoreEvent>,
) -> Result<(), StoreError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await?;
    let mut response = check_status(response)?;

    let mut decoder = SseDecoder::default();
    let mut tree = Value::Null;

    while let Some(chunk) = response.chunk().await? {
        for event in decoder.push(&chunk) {
            match StreamMessage::from_event(&event)? {
                StreamMessage::Put {
                    path: relative,
                    data,
                } => set_at(&mut tree, &relative, data),
                StreamMessage::Patch {
                    path: relative,
                    data,
                } => {
                    if let Value::Object(children) = data {
                        for (key, value) in children {
                            set_at(&mut tree, &relative.join_unchecked(key), value);
                        }
                    }
                }
                StreamMessage::KeepAlive => {
                    tracing::trace!(path = %path, "Stream keep-alive");
                    continue;
                }
                StreamMessage::Cancel => return Err(StoreError::Cancelled),
                StreamMessage::AuthRevoked => return Err(StoreError::AuthenticationFailed),
                StreamMessage::Unknown(name) => {
                    tracing::debug!(path = %path, event = %name, "Ignoring stream event");
                    continue;
                }
            }

            if events
                .send(StoreEvent::Changed(Snapshot::at(path, tree.clone())))
                .is_err()
            {
                return Ok(());
            }
        }
    }

    Err(StoreError::StreamClosed)
}
