//! Conversion session: the single "current result" slot and its transitions.
//!
//! ```text
//! Idle ──begin──▶ Loading ──finish(Ok, non-empty)──▶ Success
//!   ▲               │  └────finish(Err | empty)────▶ Error
//!   └──reset────────┴──────────────────────────────── Success / Error
//! ```
//!
//! Every `begin` hands out a fresh request id. A `finish` carrying an older id
//! is stale and leaves the state untouched.

use log::{debug, info, warn};

use crate::model::JournalRow;

pub const NO_ROWS_MESSAGE: &str =
    "no journal rows were extracted; check that the document is a card settlement statement";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Loading { request_id: u64, source: String },
    Success { source: String, rows: Vec<JournalRow> },
    Error { message: String },
}

/// Outcome of handing a completed request back to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    last_request_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Rows of the current successful result, if any
    pub fn rows(&self) -> Option<&[JournalRow]> {
        match &self.state {
            SessionState::Success { rows, .. } => Some(rows),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading { .. })
    }

    /// Start a new request for `source`, superseding whatever came before.
    pub fn begin(&mut self, source: impl Into<String>) -> u64 {
        self.last_request_id += 1;
        let source = source.into();
        if let SessionState::Loading { request_id, .. } = &self.state {
            debug!("request {request_id} superseded by {}", self.last_request_id);
        }
        info!("request {}: processing {source}", self.last_request_id);
        self.state = SessionState::Loading {
            request_id: self.last_request_id,
            source,
        };
        self.last_request_id
    }

    /// Report a failure that happened before any request was started
    /// (for example an unsupported file type).
    pub fn reject(&mut self, message: impl Into<String>) {
        self.state = SessionState::Error {
            message: message.into(),
        };
    }

    /// Hand back the outcome of request `request_id`.
    pub fn finish(&mut self, request_id: u64, outcome: Result<Vec<JournalRow>, String>) -> Completion {
        let source = match &self.state {
            SessionState::Loading { request_id: current, source } if *current == request_id => {
                source.clone()
            }
            _ => {
                warn!(
                    "discarding result of request {request_id}; latest is {}",
                    self.last_request_id
                );
                return Completion::Stale;
            }
        };

        self.state = match outcome {
            Ok(rows) if rows.is_empty() => SessionState::Error {
                message: NO_ROWS_MESSAGE.to_string(),
            },
            Ok(rows) => SessionState::Success { source, rows },
            Err(message) => SessionState::Error { message },
        };
        Completion::Applied
    }

    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }

    /// One-line status banner for the current state
    pub fn status_line(&self) -> String {
        match &self.state {
            SessionState::Idle => "Ready: select a PDF, PNG or JPEG statement".to_string(),
            SessionState::Loading { source, .. } => format!("Analysing {source}…"),
            SessionState::Success { source, rows } => {
                format!("Extracted {} journal rows from {source}", rows.len())
            }
            SessionState::Error { message } => format!("Error: {message}"),
        }
    }
}
