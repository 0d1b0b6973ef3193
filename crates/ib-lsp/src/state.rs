//! Server State Management
//!
//! Centralized state shared between request handlers and the background
//! diagnostics tasks.
//!
//! # Architecture
//!
//! The state is designed for concurrent access from multiple async tasks:
//!
//! - **Documents**: `DashMap` of ropes, updated by sync notifications
//! - **Configuration**: read once at initialization, behind a `RwLock`
//! - **Diagnostics**: the adapter that orders compiler responses
//!
//! Syntax trees are never stored. Each request parses the current text.

use dashmap::DashMap;
use ib_syntax::SyntaxTree;
use parking_lot::RwLock;
use ropey::Rope;
use std::sync::atomic::{AtomicBool, Ordering};
use tower_lsp::lsp_types::*;

use crate::config::ServerConfig;
use crate::diagnostics::DiagnosticsAdapter;

/// A stored document with its content and metadata.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,

    /// The document content as a rope for efficient editing.
    pub content: Rope,

    /// The document version from the client.
    pub version: i32,

    pub language_id: String,
}

impl Document {
    pub fn new(uri: Url, content: &str, version: i32, language_id: String) -> Self {
        Self {
            uri,
            content: Rope::from_str(content),
            version,
            language_id,
        }
    }

    pub fn text(&self) -> String {
        self.content.to_string()
    }

    /// Parses the current content.
    pub fn parse(&self) -> SyntaxTree {
        ib_syntax::parse(&self.text())
    }

    /// Converts an LSP position to a byte offset.
    ///
    /// The character is clamped to the line length; a line past the end
    /// yields `None`.
    pub fn position_to_offset(&self, position: Position) -> Option<usize> {
        let line_idx = position.line as usize;
        if line_idx >= self.content.len_lines() {
            return None;
        }

        let line_start = self.content.line_to_char(line_idx);
        let line = self.content.line(line_idx);
        let mut line_len = line.len_chars();
        // The line break is not addressable.
        if line_len > 0 && line.char(line_len - 1) == '\n' {
            line_len -= 1;
        }

        let char_offset = (position.character as usize).min(line_len);
        Some(self.content.char_to_byte(line_start + char_offset))
    }

    /// Converts a byte offset to an LSP position, clamping to the end.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.content.len_bytes());
        let char_idx = self.content.byte_to_char(offset);
        let line_idx = self.content.char_to_line(char_idx);
        let line_start_char = self.content.line_to_char(line_idx);

        Position {
            line: line_idx as u32,
            character: (char_idx - line_start_char) as u32,
        }
    }

    /// Byte offset of the first character of `line`.
    pub fn line_start(&self, line: u32) -> Option<usize> {
        let line = line as usize;
        (line < self.content.len_lines()).then(|| self.content.line_to_byte(line))
    }

    /// Applies incremental text changes to the document.
    pub fn apply_changes(&mut self, changes: Vec<TextDocumentContentChangeEvent>, version: i32) {
        for change in changes {
            match change.range {
                Some(range) => {
                    let start = self.position_to_offset(range.start);
                    let end = self.position_to_offset(range.end);
                    if let (Some(start), Some(end)) = (start, end) {
                        let start_char = self.content.byte_to_char(start);
                        let end_char = self.content.byte_to_char(end.max(start));
                        self.content.remove(start_char..end_char);
                        self.content.insert(start_char, &change.text);
                    }
                }
                None => self.content = Rope::from_str(&change.text),
            }
        }

        self.version = version;
    }
}

/// The server state containing all runtime data.
///
/// Wrapped in an `Arc` and shared with spawned diagnostics tasks.
pub struct ServerState {
    documents: DashMap<Url, Document>,

    config: RwLock<ServerConfig>,

    initialized: AtomicBool,

    /// Whether the client accepts snippet completions.
    snippet_support: AtomicBool,

    diagnostics: DiagnosticsAdapter,
}

impl ServerState {
    pub fn new() -> Self {
        Self::with_diagnostics(DiagnosticsAdapter::new(None))
    }

    pub fn with_diagnostics(diagnostics: DiagnosticsAdapter) -> Self {
        Self {
            documents: DashMap::new(),
            config: RwLock::new(ServerConfig::default()),
            initialized: AtomicBool::new(false),
            snippet_support: AtomicBool::new(false),
            diagnostics,
        }
    }

    pub fn set_initialized(&self, initialized: bool) {
        self.initialized.store(initialized, Ordering::SeqCst);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Records what the client can do with completion items.
    pub fn set_client_capabilities(&self, capabilities: &ClientCapabilities) {
        let snippets = capabilities
            .text_document
            .as_ref()
            .and_then(|td| td.completion.as_ref())
            .and_then(|c| c.completion_item.as_ref())
            .and_then(|item| item.snippet_support)
            .unwrap_or(false);
        self.snippet_support.store(snippets, Ordering::SeqCst);
    }

    pub fn snippet_support(&self) -> bool {
        self.snippet_support.load(Ordering::SeqCst)
    }

    pub fn open_document(&self, uri: Url, text: &str, version: i32, language_id: String) {
        let doc = Document::new(uri.clone(), text, version, language_id);
        self.documents.insert(uri, doc);
    }

    /// Updates a document with incremental changes. Returns false for an
    /// unknown document.
    pub fn update_document(
        &self,
        uri: &Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> bool {
        match self.documents.get_mut(uri) {
            Some(mut doc) => {
                doc.apply_changes(changes, version);
                true
            }
            None => false,
        }
    }

    pub fn close_document(&self, uri: &Url) -> Option<Document> {
        self.diagnostics.forget(uri.as_str());
        self.documents.remove(uri).map(|(_, doc)| doc)
    }

    pub fn get_document(&self, uri: &Url) -> Option<Document> {
        self.documents.get(uri).map(|r| r.clone())
    }

    pub fn is_open(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn config(&self) -> ServerConfig {
        self.config.read().clone()
    }

    pub fn update_config(&self, config: ServerConfig) {
        *self.config.write() = config;
    }

    pub fn diagnostics(&self) -> &DiagnosticsAdapter {
        &self.diagnostics
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
