//! On-Type Formatting Handler
//!
//! After the user types a newline the new line is re-indented to the
//! structural nesting at its start. The source's existing whitespace plays
//! no part in the result.

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tracing::debug;

use crate::state::Document;
use crate::IbLanguageServer;

/// Handles the `textDocument/onTypeFormatting` request.
pub async fn handle_on_type_formatting(
    server: &IbLanguageServer,
    params: DocumentOnTypeFormattingParams,
) -> Result<Option<Vec<TextEdit>>> {
    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;

    if params.ch != "\n" {
        return Ok(None);
    }

    let Some(doc) = server.state().get_document(uri) else {
        debug!("Document not found: {}", uri);
        return Ok(None);
    };

    let indent_unit = server.state().config().indent_unit;
    Ok(reindent_line(&doc, position.line, indent_unit).map(|edit| vec![edit]))
}

/// Edit replacing the leading whitespace of `line` with its computed
/// indentation, or `None` when it is already right.
pub fn reindent_line(doc: &Document, line: u32, indent_unit: usize) -> Option<TextEdit> {
    let start = doc.line_start(line)?;
    let tree = doc.parse();
    let width = ib_ide::indentation(&tree, start, indent_unit);
    let wanted = ib_ide::indent::pad(width);

    let current: String = doc
        .content
        .line(line as usize)
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();
    if current == wanted {
        return None;
    }

    debug!(line, width, "re-indenting line");
    Some(TextEdit {
        range: Range {
            start: Position::new(line, 0),
            end: Position::new(line, current.chars().count() as u32),
        },
        new_text: wanted,
    })
}
