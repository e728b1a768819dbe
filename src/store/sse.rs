// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server-sent-event framing for streamed subscriptions.

use serde_json::Value;

use super::StorePath;
use crate::error::StoreError;

/// One dispatched event: its name and its (joined) data lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental decoder; chunks may split lines and even UTF-8 sequences.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Feeds raw bytes and returns every event completed by them.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }
        events
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.event.is_none() && self.data.is_empty() {
            return None;
        }
        let event = SseEvent {
            event: self.event.take().unwrap_or_else(|| "message".to_string()),
            data: self.data.join("\n"),
        };
        self.data.clear();
        Some(event)
    }
}

/// Body of `put` and `patch` events.
#[derive(Debug, serde::Deserialize)]
struct ChangePayload {
    path: String,
    data: Value,
}

/// A decoded realtime-database stream event.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StreamMessage {
    /// Replace the data at `path` (relative to the subscription).
    Put { path: StorePath, data: Value },
    /// Replace each child of `path` listed in `data`.
    Patch { path: StorePath, data: Value },
    KeepAlive,
    /// Read access was revoked for this location.
    Cancel,
    /// The auth token expired or was revoked.
    AuthRevoked,
    /// An event name this client does not know.
    Unknown(String),
}

impl StreamMessage {
    pub fn from_event(event: &SseEvent) -> Result<Self, StoreError> {
        match event.event.as_str() {
            "put" | "patch" => {
                let payload: ChangePayload = serde_json::from_str(&event.data)
                    .map_err(|e| StoreError::MalformedEvent(format!("{}: {e}", event.event)))?;
                let path = StorePath::parse_lenient(&payload.path);
                if event.event == "put" {
                    Ok(Self::Put {
                        path,
                        data: payload.data,
                    })
                } else {
                    Ok(Self::Patch {
                        path,
                        data: payload.data,
                    })
                }
            }
            "keep-alive" => Ok(Self::KeepAlive),
            "cancel" => Ok(Self::Cancel),
            "auth_revoked" => Ok(Self::AuthRevoked),
            other => Ok(Self::Unknown(other.to_string())),
        }
    }
}
