//! Last-request-wins ordering of compiler diagnostics, driven by an
//! in-process service whose responses can be held back.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ib_lsp::config::SpanPolicy;
use ib_lsp::diagnostics::{Diagnostic, DiagnosticsAdapter};
use ib_lsp::service::{CompilerDiagnostic, DiagnosticsService, ServiceError};
use pretty_assertions::assert_eq;
use tokio::sync::Notify;

const DOC: &str = "file:///main.ib";

/// Reports one diagnostic at line 1 column 1 whose message is the text.
/// Texts with a gate wait for it to open before answering.
#[derive(Default)]
struct GatedService {
    gates: HashMap<String, Arc<Notify>>,
    calls: AtomicUsize,
}

impl GatedService {
    fn gate(mut self, text: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(text.to_string(), gate);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[tower_lsp::async_trait]
impl DiagnosticsService for GatedService {
    async fn diagnostics(
        &self,
        _document: &str,
        text: &str,
    ) -> Result<Vec<CompilerDiagnostic>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(text) {
            gate.notified().await;
        }
        Ok(vec![CompilerDiagnostic::at_line_column(text, 1, 1)])
    }
}

#[tokio::test]
async fn test_newer_request_wins_when_older_finishes_last() {
    let gate = Arc::new(Notify::new());
    let service = Arc::new(GatedService::default().gate("x = 1", Arc::clone(&gate)));
    let adapter = Arc::new(DiagnosticsAdapter::new(Some(service.clone())));

    let older = adapter.ticket(DOC);
    let newer = adapter.ticket(DOC);

    let slow = tokio::spawn({
        let adapter = Arc::clone(&adapter);
        async move {
            let diagnostics = adapter
                .fetch(Some(&older), "x = 1", SpanPolicy::SingleByte)
                .await;
            (adapter.accept(&older, true), diagnostics)
        }
    });

    let fast = adapter
        .fetch(Some(&newer), "x = 12", SpanPolicy::SingleByte)
        .await;
    assert!(adapter.accept(&newer, true));
    assert_eq!(fast, vec![Diagnostic::error("x = 12", 0, 1)]);

    gate.notify_one();
    let (accepted, stale) = slow.await.unwrap();
    assert!(!accepted);
    assert_eq!(stale, vec![Diagnostic::error("x = 1", 0, 1)]);
    assert_eq!(service.calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_accepted_results_publish_in_ticket_order() {
    let adapter = Arc::new(DiagnosticsAdapter::new(None));
    let published = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());

    let older = adapter.ticket(DOC);
    let newer = adapter.ticket(DOC);

    let slow = tokio::spawn({
        let adapter = Arc::clone(&adapter);
        let published = Arc::clone(&published);
        let entered = Arc::clone(&entered);
        let release = Arc::clone(&release);
        async move {
            adapter
                .apply(&older, || true, || async {
                    entered.notify_one();
                    release.notified().await;
                    published.lock().push(older.seq);
                })
                .await
        }
    });
    entered.notified().await;

    let fast = tokio::spawn({
        let adapter = Arc::clone(&adapter);
        let published = Arc::clone(&published);
        async move {
            adapter
                .apply(&newer, || true, || async {
                    published.lock().push(newer.seq);
                })
                .await
        }
    });
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    assert!(published.lock().is_empty());

    release.notify_one();
    assert!(slow.await.unwrap());
    assert!(fast.await.unwrap());
    let published = published.lock().clone();
    assert_eq!(published, vec![1, 2]);
}

#[tokio::test]
async fn test_in_order_responses_all_apply() {
    let adapter = DiagnosticsAdapter::new(Some(Arc::new(GatedService::default())));

    for text in ["a", "ab", "abc"] {
        let ticket = adapter.ticket(DOC);
        let diagnostics = adapter
            .fetch(Some(&ticket), text, SpanPolicy::Token)
            .await;
        assert!(adapter.accept(&ticket, true));
        assert_eq!(diagnostics, vec![Diagnostic::error(text, 0, text.len())]);
    }
}

#[tokio::test]
async fn test_closed_while_in_flight() {
    let gate = Arc::new(Notify::new());
    let service = GatedService::default().gate("output x", Arc::clone(&gate));
    let adapter = Arc::new(DiagnosticsAdapter::new(Some(Arc::new(service))));

    let ticket = adapter.ticket(DOC);
    let pending = tokio::spawn({
        let adapter = Arc::clone(&adapter);
        let ticket = ticket.clone();
        async move {
            adapter
                .fetch(Some(&ticket), "output x", SpanPolicy::SingleByte)
                .await
        }
    });

    adapter.forget(DOC);
    gate.notify_one();
    let diagnostics = pending.await.unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert!(!adapter.accept(&ticket, false));
}

#[tokio::test]
async fn test_without_document_no_request_is_made() {
    let service = Arc::new(GatedService::default());
    let adapter = DiagnosticsAdapter::new(Some(service.clone()));

    let diagnostics = adapter.fetch(None, "x = 1", SpanPolicy::SingleByte).await;

    assert!(diagnostics.is_empty());
    assert_eq!(service.calls(), 0);
}

#[tokio::test]
async fn test_disabled_service() {
    let adapter = DiagnosticsAdapter::new(None);
    assert!(!adapter.is_enabled());

    let ticket = adapter.ticket(DOC);
    assert!(adapter
        .fetch(Some(&ticket), "x = 1", SpanPolicy::SingleByte)
        .await
        .is_empty());
}
