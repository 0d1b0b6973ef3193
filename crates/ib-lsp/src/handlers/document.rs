//! Text Document Synchronization Handlers
//!
//! - `didOpen`: store the document, request diagnostics
//! - `didChange`: apply incremental edits, request diagnostics
//! - `didSave`: resynchronize from the saved text, request diagnostics
//! - `didClose`: drop the document and clear its diagnostics
//!
//! Diagnostics run in a spawned task per request. The ticket is taken
//! before spawning, so tickets follow notification order even when the
//! tasks finish out of order.

use tower_lsp::lsp_types::*;
use tracing::{debug, info, warn};

use crate::IbLanguageServer;

/// Handles the `textDocument/didOpen` notification.
pub async fn handle_did_open(server: &IbLanguageServer, params: DidOpenTextDocumentParams) {
    let uri = params.text_document.uri;
    let version = params.text_document.version;
    let text = params.text_document.text;

    info!("Document opened: {}", uri);
    debug!(
        version,
        language = %params.text_document.language_id,
        bytes = text.len(),
        "storing document"
    );

    server
        .state()
        .open_document(uri.clone(), &text, version, params.text_document.language_id);

    spawn_diagnostics(server, &uri);
}

/// Handles the `textDocument/didChange` notification.
pub async fn handle_did_change(server: &IbLanguageServer, params: DidChangeTextDocumentParams) {
    let uri = params.text_document.uri;
    let version = params.text_document.version;

    debug!("Document changed: {} (version {})", uri, version);

    if !server
        .state()
        .update_document(&uri, params.content_changes, version)
    {
        warn!("Received change for unknown document: {}", uri);
        return;
    }

    spawn_diagnostics(server, &uri);
}

/// Handles the `textDocument/didSave` notification.
pub async fn handle_did_save(server: &IbLanguageServer, params: DidSaveTextDocumentParams) {
    let uri = params.text_document.uri;

    debug!("Document saved: {}", uri);

    let Some(doc) = server.state().get_document(&uri) else {
        warn!("Received save for unknown document: {}", uri);
        return;
    };

    if let Some(text) = params.text {
        if doc.text() != text {
            debug!("Syncing document content from save");
            let changes = vec![TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text,
            }];
            server.state().update_document(&uri, changes, doc.version);
        }
    }

    spawn_diagnostics(server, &uri);
}

/// Handles the `textDocument/didClose` notification.
pub async fn handle_did_close(server: &IbLanguageServer, params: DidCloseTextDocumentParams) {
    let uri = params.text_document.uri;

    info!("Document closed: {}", uri);

    if server.state().close_document(&uri).is_none() {
        warn!("Closed document was not in store: {}", uri);
    }

    server
        .client()
        .publish_diagnostics(uri, Vec::new(), None)
        .await;
}

/// Requests compiler diagnostics for the current text of `uri` and publishes
/// them if they are still the newest when they arrive.
fn spawn_diagnostics(server: &IbLanguageServer, uri: &Url) {
    let state = server.shared_state();
    if !state.diagnostics().is_enabled() {
        return;
    }
    let Some(doc) = state.get_document(uri) else {
        return;
    };

    let ticket = state.diagnostics().ticket(uri.as_str());
    let policy = state.config().diagnostic_span;
    let client = server.client().clone();

    tokio::spawn(async move {
        let text = doc.text();
        let diagnostics = state
            .diagnostics()
            .fetch(Some(&ticket), &text, policy)
            .await;

        state
            .diagnostics()
            .apply(
                &ticket,
                || state.is_open(&doc.uri),
                || async {
                    debug!(
                        uri = %doc.uri,
                        version = doc.version,
                        count = diagnostics.len(),
                        "publishing diagnostics"
                    );
                    let diagnostics = diagnostics.iter().map(|d| d.to_lsp(&doc)).collect();
                    client
                        .publish_diagnostics(doc.uri.clone(), diagnostics, Some(doc.version))
                        .await;
                },
            )
            .await;
    });
}
