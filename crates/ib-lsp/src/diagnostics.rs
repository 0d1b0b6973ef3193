//! Diagnostics Adapter
//!
//! Maps compiler diagnostics onto document ranges and decides which
//! responses are still worth publishing.
//!
//! # Ordering
//!
//! Requests run concurrently and can finish in any order. Each request holds
//! a [`Ticket`] with a sequence number taken when the request started; a
//! result is applied only if its ticket is newer than every result already
//! applied for the same document, and the document is still open.
//! Accepting a result and publishing it happen under one lock, so a result
//! that was newest when accepted cannot reach the client after a newer one.
//!
//! ```text
//! edit 1 ──ticket 1──▶ service ─────────────────────▶ result 1  (stale, dropped)
//! edit 2 ──ticket 2──▶ service ──▶ result 2 (applied)
//! ```

use dashmap::DashMap;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_lsp::lsp_types::{self, DiagnosticSeverity, NumberOrString};
use tracing::{debug, warn};

use crate::config::SpanPolicy;
use crate::service::{CompilerDiagnostic, DiagnosticsService, ReportedPosition};
use crate::state::Document;

/// Source tag attached to every diagnostic.
pub const DIAGNOSTIC_SOURCE: &str = "ibc";

/// A compiler diagnostic placed in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// Byte offset where the range starts.
    pub span_start: usize,
    /// Byte offset one past the end of the range.
    pub span_end: usize,
    pub severity: DiagnosticSeverity,
    pub source: &'static str,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span_start: usize, span_end: usize) -> Self {
        Self {
            message: message.into(),
            span_start,
            span_end,
            severity: DiagnosticSeverity::ERROR,
            source: DIAGNOSTIC_SOURCE,
        }
    }

    /// Converts to an LSP diagnostic against `doc`, the text it was computed
    /// for.
    pub fn to_lsp(&self, doc: &Document) -> lsp_types::Diagnostic {
        lsp_types::Diagnostic {
            range: lsp_types::Range {
                start: doc.offset_to_position(self.span_start),
                end: doc.offset_to_position(self.span_end),
            },
            severity: Some(self.severity),
            code: None::<NumberOrString>,
            source: Some(self.source.to_string()),
            message: self.message.clone(),
            ..Default::default()
        }
    }
}

/// Byte offset of a one-based `(line, col)` position.
///
/// Each prior line contributes its length plus one separator byte. Lines
/// past the end of the text contribute nothing.
pub fn line_column_to_offset(text: &str, line: usize, col: usize) -> usize {
    let prior = text
        .split('\n')
        .take(line.saturating_sub(1))
        .fold(0usize, |sum, l| sum.saturating_add(l.len() + 1));
    prior.saturating_add(col.saturating_sub(1))
}

/// Widens a single reported position into a range.
pub fn widen(text: &str, position: usize, policy: SpanPolicy) -> (usize, usize) {
    let end = match policy {
        SpanPolicy::SingleByte => position.saturating_add(1),
        SpanPolicy::Token => {
            let word = text
                .get(position..)
                .unwrap_or("")
                .bytes()
                .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                .count();
            position.saturating_add(word.max(1))
        }
    };
    (position, end)
}

/// Places compiler records in `text`.
pub fn convert(text: &str, records: Vec<CompilerDiagnostic>, policy: SpanPolicy) -> Vec<Diagnostic> {
    records
        .into_iter()
        .map(|record| {
            let (start, end) = match record.position {
                ReportedPosition::Offsets {
                    offset_start,
                    offset_end,
                } => (offset_start, offset_end),
                ReportedPosition::LineColumn { line, col } => {
                    widen(text, line_column_to_offset(text, line, col), policy)
                }
            };
            Diagnostic::error(record.message, start, end)
        })
        .collect()
}

/// Claim on publishing the result of one diagnostics request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub document: String,
}

/// Fetches diagnostics and enforces last-request-wins per document.
pub struct DiagnosticsAdapter {
    service: RwLock<Option<Arc<dyn DiagnosticsService>>>,
    sequence: AtomicU64,
    /// Highest applied sequence number per document.
    applied: DashMap<String, u64>,
    publishing: Mutex<()>,
}

impl DiagnosticsAdapter {
    pub fn new(service: Option<Arc<dyn DiagnosticsService>>) -> Self {
        Self {
            service: RwLock::new(service),
            sequence: AtomicU64::new(0),
            applied: DashMap::new(),
            publishing: Mutex::new(()),
        }
    }

    /// Replaces the compiler service. `None` disables diagnostics.
    pub fn set_service(&self, service: Option<Arc<dyn DiagnosticsService>>) {
        *self.service.write() = service;
    }

    pub fn is_enabled(&self) -> bool {
        self.service.read().is_some()
    }

    /// Starts a request for `document`.
    pub fn ticket(&self, document: &str) -> Ticket {
        Ticket {
            seq: self.sequence.fetch_add(1, Ordering::SeqCst) + 1,
            document: document.to_string(),
        }
    }

    /// Asks the service about `text` and places the results.
    ///
    /// Without a ticket, or without a service, nothing is requested and the
    /// list is empty. Service failures are logged and also yield an empty
    /// list.
    pub async fn fetch(
        &self,
        ticket: Option<&Ticket>,
        text: &str,
        policy: SpanPolicy,
    ) -> Vec<Diagnostic> {
        let Some(ticket) = ticket else {
            return Vec::new();
        };
        let service = self.service.read().clone();
        let Some(service) = service else {
            return Vec::new();
        };

        match service.diagnostics(&ticket.document, text).await {
            Ok(records) => convert(text, records, policy),
            Err(error) => {
                warn!(document = %ticket.document, seq = ticket.seq, %error, "diagnostics request failed");
                Vec::new()
            }
        }
    }

    /// Decides whether the result for `ticket` may be published, and if so
    /// records it as the newest applied result.
    pub fn accept(&self, ticket: &Ticket, still_open: bool) -> bool {
        if !still_open {
            debug!(document = %ticket.document, seq = ticket.seq, "document closed, dropping diagnostics");
            return false;
        }

        let mut applied = self.applied.entry(ticket.document.clone()).or_insert(0);
        if *applied >= ticket.seq {
            debug!(
                document = %ticket.document,
                seq = ticket.seq,
                newest = *applied,
                "dropping stale diagnostics"
            );
            return false;
        }
        *applied = ticket.seq;
        true
    }

    /// Runs `publish` if the result for `ticket` is accepted.
    ///
    /// `still_open` is checked, and `publish` awaited, while holding the
    /// publish lock. Returns whether `publish` ran.
    pub async fn apply<F, Fut>(
        &self,
        ticket: &Ticket,
        still_open: impl FnOnce() -> bool,
        publish: F,
    ) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let _publishing = self.publishing.lock().await;
        if !self.accept(ticket, still_open()) {
            return false;
        }
        publish().await;
        true
    }

    /// Drops ordering state for a closed document.
    pub fn forget(&self, document: &str) {
        self.applied.remove(document);
    }
}
