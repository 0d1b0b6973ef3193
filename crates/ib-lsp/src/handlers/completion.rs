//! Completion Handler
//!
//! Handles `textDocument/completion`. The document is parsed fresh for each
//! request and handed to [`ib_ide::complete`].
//!
//! A request counts as explicit unless it was fired by a trigger character
//! or as an incomplete-list refresh; only explicit requests complete an
//! empty word.

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tracing::debug;

use crate::completion::to_lsp_items;
use crate::IbLanguageServer;

/// Handles the `textDocument/completion` request.
pub async fn handle_completion(
    server: &IbLanguageServer,
    params: CompletionParams,
) -> Result<Option<CompletionResponse>> {
    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;
    let explicit = params
        .context
        .as_ref()
        .map_or(true, |c| c.trigger_kind == CompletionTriggerKind::INVOKED);

    debug!(
        "Completion request at {}:{}:{} (explicit: {})",
        uri, position.line, position.character, explicit
    );

    let doc = match server.state().get_document(uri) {
        Some(doc) => doc,
        None => {
            debug!("Document not found: {}", uri);
            return Ok(None);
        }
    };

    let Some(offset) = doc.position_to_offset(position) else {
        return Ok(None);
    };

    let tree = doc.parse();
    let indent_unit = server.state().config().indent_unit;
    let Some(list) = ib_ide::complete(&tree, offset, explicit, indent_unit) else {
        return Ok(None);
    };

    let items = to_lsp_items(&list, &doc, position, server.state().snippet_support());
    debug!(count = items.len(), "completion items");

    Ok(Some(CompletionResponse::Array(items)))
}
