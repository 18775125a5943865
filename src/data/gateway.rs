//! The update endpoint the editor submits to, and how its replies are read.

use crate::data::event::{Event, EventData};
use crate::data::persistence::Persistable;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::PathBuf;
use thiserror::Error;

/// How much of an unparseable reply is echoed back to the user.
const DIAGNOSTIC_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: String,
}

impl GatewayResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        GatewayResponse {
            status,
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Accepts an updated event for the record currently stored under `slug`.
/// `Err` means the request never produced a reply.
pub trait EventSink: Send + Sync {
    fn put_event(&self, slug: &str, token: &str, event: &Event) -> Result<GatewayResponse>;
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SubmitError {
    #[error("{0}")]
    Transport(String),
    #[error("Invalid response from server: {0}...")]
    Malformed(String),
    #[error("{0}")]
    Rejected(String),
}

/// Reads a reply: the body must be JSON, and a non-2xx status surfaces the
/// server's `error` text verbatim.
pub fn interpret_response(response: &GatewayResponse) -> Result<Value, SubmitError> {
    let parsed: Value = serde_json::from_str(&response.body).map_err(|_| {
        SubmitError::Malformed(response.body.chars().take(DIAGNOSTIC_CHARS).collect())
    })?;

    if !response.is_success() {
        let message = parsed
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Failed to update event: {}", response.status));
        return Err(SubmitError::Rejected(message));
    }
    Ok(parsed)
}

pub fn submit(
    sink: &dyn EventSink,
    slug: &str,
    token: &str,
    event: &Event,
) -> Result<(), SubmitError> {
    tracing::info!(slug, "submitting event update");
    let response = sink
        .put_event(slug, token, event)
        .map_err(|err| SubmitError::Transport(format!("{err:#}")))?;
    match interpret_response(&response) {
        Ok(_) => {
            tracing::info!(slug, status = response.status, "event updated");
            Ok(())
        }
        Err(err) => {
            tracing::error!(slug, status = response.status, %err, "event update failed");
            Err(err)
        }
    }
}

/// Serves updates against `events.json` in a data directory, answering the
/// way the web endpoint does.
pub struct DirEventSink {
    dir: PathBuf,
}

impl DirEventSink {
    pub fn new(dir: PathBuf) -> Self {
        DirEventSink { dir }
    }
}

impl EventSink for DirEventSink {
    fn put_event(&self, slug: &str, token: &str, event: &Event) -> Result<GatewayResponse> {
        if token.trim().is_empty() {
            return Ok(GatewayResponse::json(401, &json!({ "error": "Unauthorized" })));
        }
        let mut data = EventData::load_from(&self.dir).context("failed to load events")?;
        if !data.replace(slug, event.clone()) {
            return Ok(GatewayResponse::json(404, &json!({ "error": "Event not found" })));
        }
        data.save_to(&self.dir).context("failed to save events")?;
        let body = serde_json::to_value(event).context("failed to serialize event")?;
        Ok(GatewayResponse::json(200, &body))
    }
}
