//! Server Capability Declarations
//!
//! The server advertises document sync, completion, and on-type formatting
//! on newline. Diagnostics are pushed, so no pull provider is declared.

use tower_lsp::lsp_types::*;

/// Creates the server capabilities to advertise to the client.
pub fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Options(
            text_document_sync_options(),
        )),
        completion_provider: Some(completion_options()),
        document_on_type_formatting_provider: Some(on_type_formatting_options()),
        ..Default::default()
    }
}

fn text_document_sync_options() -> TextDocumentSyncOptions {
    TextDocumentSyncOptions {
        open_close: Some(true),
        change: Some(TextDocumentSyncKind::INCREMENTAL),
        // Saved text lets the store resynchronize.
        save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
            include_text: Some(true),
        })),
        will_save: Some(false),
        will_save_wait_until: Some(false),
    }
}

fn completion_options() -> CompletionOptions {
    CompletionOptions {
        // Word characters trigger on their own; no punctuation triggers.
        trigger_characters: None,
        all_commit_characters: None,
        resolve_provider: Some(false),
        work_done_progress_options: WorkDoneProgressOptions {
            work_done_progress: Some(false),
        },
        completion_item: None,
    }
}

fn on_type_formatting_options() -> DocumentOnTypeFormattingOptions {
    DocumentOnTypeFormattingOptions {
        first_trigger_character: "\n".to_string(),
        more_trigger_character: None,
    }
}
