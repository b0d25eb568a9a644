//! One display session: the latest translation result and the state of the
//! request producing it.
//!
//! Every issued request gets a sequence number larger than any before it.
//! A completion only lands while the session is still loading that exact
//! request; anything else is stale and dropped. Accepted results replace the
//! whole display at once.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alignment::{LinePair, build_line_pairs};
use crate::annotate::{AnnotatedToken, annotate_line};
use crate::error::LyricsError;
use crate::service::{TranslateRequest, TranslationPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Search,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub seq: u64,
    pub kind: RequestKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Loading(RequestTicket),
    Success,
    Error(String),
}

/// Outcome of an accepted completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    Success { generation: u64 },
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub index: usize,
    pub source: Vec<AnnotatedToken>,
    pub target: String,
}

/// Everything rendered for one successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDisplay {
    /// Sequence number of the request that produced this display. Doubles as
    /// the content identity for scroll coupling.
    pub generation: u64,
    pub payload: TranslationPayload,
    pub pairs: Vec<LinePair>,
    pub rows: Vec<DisplayRow>,
}

impl SessionDisplay {
    pub fn build(generation: u64, payload: TranslationPayload) -> Self {
        let pairs = build_line_pairs(
            &payload.source,
            &payload.target,
            payload.line_pairs.as_deref(),
        );
        let rows = pairs
            .iter()
            .map(|pair| DisplayRow {
                index: pair.index,
                source: annotate_line(&pair.source_line, pair.index, &payload.word_translations),
                target: pair.target_line.clone(),
            })
            .collect();
        Self {
            generation,
            payload,
            pairs,
            rows,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    state: RequestState,
    last_issued: u64,
    display: Option<SessionDisplay>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: RequestState::Idle,
            last_issued: 0,
            display: None,
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn display(&self) -> Option<&SessionDisplay> {
        self.display.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RequestState::Loading(_))
    }

    pub fn last_issued(&self) -> u64 {
        self.last_issued
    }

    /// Validates `request` and, if it is well formed, issues it.
    ///
    /// A validation failure consumes no sequence number. It is surfaced as the
    /// session error unless a request is in flight, in which case the error is
    /// only returned.
    pub fn begin(&mut self, request: &TranslateRequest) -> Result<RequestTicket, LyricsError> {
        if let Err(err) = request.validate() {
            if !self.is_loading() {
                self.state = RequestState::Error(err.to_string());
            }
            return Err(err);
        }
        Ok(self.issue(request.kind()))
    }

    /// Moves to `Loading` under a fresh sequence number. Any earlier request
    /// still in flight becomes stale.
    pub fn issue(&mut self, kind: RequestKind) -> RequestTicket {
        self.last_issued = self.last_issued.wrapping_add(1);
        let ticket = RequestTicket {
            seq: self.last_issued,
            kind,
        };
        if let RequestState::Loading(previous) = self.state {
            debug!(
                previous = previous.seq,
                seq = ticket.seq,
                "superseding in-flight request"
            );
        }
        info!(seq = ticket.seq, ?kind, "issued translation request");
        self.state = RequestState::Loading(ticket);
        ticket
    }

    /// Applies the result of the request behind `ticket`.
    ///
    /// Returns `Err(LyricsError::StaleResult)` without touching the session
    /// when the ticket is not the request currently loading.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<TranslationPayload, LyricsError>,
    ) -> Result<Accepted, LyricsError> {
        if self.state != RequestState::Loading(ticket) {
            debug!(
                seq = ticket.seq,
                latest = self.last_issued,
                "ignoring stale translation result"
            );
            return Err(LyricsError::StaleResult {
                seq: ticket.seq,
                latest: self.last_issued,
            });
        }

        match result {
            Ok(mut payload) => {
                if ticket.kind == RequestKind::Text {
                    payload.audio_preview_url = None;
                }
                let next = SessionDisplay::build(ticket.seq, payload);
                let rows = next.rows.len();
                info!(seq = ticket.seq, rows, "translation result accepted");
                self.display = Some(next);
                self.state = RequestState::Success;
                Ok(Accepted::Success {
                    generation: ticket.seq,
                })
            }
            Err(err) => {
                warn!(seq = ticket.seq, "translation request failed: {}", err);
                self.state = RequestState::Error(err.to_string());
                Ok(Accepted::Error)
            }
        }
    }

    /// Drops the display and any error. A request still in flight will be
    /// ignored when it completes.
    pub fn clear(&mut self) {
        debug!(latest = self.last_issued, "clearing session");
        self.display = None;
        self.state = RequestState::Idle;
    }
}
