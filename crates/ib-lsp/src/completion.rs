//! Completion item mapping
//!
//! Turns an [`ib_ide::CompletionList`] into LSP completion items. Every item
//! carries a text edit replacing the word being typed; template actions
//! become snippets when the client can expand them.

use ib_ide::{CompletionAction, CompletionCategory, CompletionList};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, InsertTextFormat, InsertTextMode,
    Position, Range, TextEdit,
};

use crate::state::Document;

/// Convert a completion category to an LSP item kind.
pub fn completion_kind(category: CompletionCategory) -> CompletionItemKind {
    match category {
        CompletionCategory::Keyword => CompletionItemKind::KEYWORD,
        CompletionCategory::Type => CompletionItemKind::CLASS,
        CompletionCategory::Variable => CompletionItemKind::VARIABLE,
        CompletionCategory::Function => CompletionItemKind::FUNCTION,
    }
}

/// Maps `list` to LSP items for `doc`, with the cursor at `cursor`.
pub fn to_lsp_items(
    list: &CompletionList,
    doc: &Document,
    cursor: Position,
    snippets: bool,
) -> Vec<CompletionItem> {
    let range = Range {
        start: doc.offset_to_position(list.from),
        end: cursor,
    };

    list.items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let (new_text, format) = match (&item.action, snippets) {
                (
                    CompletionAction::Template {
                        text,
                        cursor_offset,
                    },
                    true,
                ) => (snippet(text, *cursor_offset), InsertTextFormat::SNIPPET),
                _ => (item.insert_text().to_string(), InsertTextFormat::PLAIN_TEXT),
            };

            CompletionItem {
                label: item.label.clone(),
                kind: Some(completion_kind(item.category)),
                // Keep assembly order; the editor only filters.
                sort_text: Some(format!("{index:04}")),
                filter_text: Some(item.label.clone()),
                insert_text_format: Some(format),
                insert_text_mode: Some(InsertTextMode::AS_IS),
                text_edit: Some(CompletionTextEdit::Edit(TextEdit { range, new_text })),
                ..Default::default()
            }
        })
        .collect()
}

/// Template text as a snippet with the final tab stop at `cursor_offset`.
fn snippet(text: &str, cursor_offset: usize) -> String {
    let split = cursor_offset.min(text.len());
    let (head, tail) = if text.is_char_boundary(split) {
        text.split_at(split)
    } else {
        (text, "")
    };
    format!("{}$0{}", escape_snippet(head), escape_snippet(tail))
}

fn escape_snippet(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '$' | '}') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
