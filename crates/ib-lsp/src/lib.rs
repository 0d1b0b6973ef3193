//! IB Pseudocode Language Server
//!
//! Editor support for IB pseudocode over the Language Server Protocol:
//! scope-aware completion with structural templates, indentation after a
//! newline, and diagnostics from the external `ibc` compiler service.
//!
//! # Architecture
//!
//! - **State Management**: open documents and configuration
//! - **Capabilities**: the feature set advertised to the client
//! - **Handlers**: one module per category of LSP traffic
//! - **Diagnostics**: compiler client plus the adapter that orders its
//!   responses
//!
//! Analysis itself lives in `ib-syntax` and `ib-ide`; this crate only maps
//! between LSP and those crates.
//!
//! # Modules
//!
//! - [`capabilities`]: server capability declarations
//! - [`config`]: settings from `initializationOptions`
//! - [`completion`]: completion item mapping
//! - [`diagnostics`]: diagnostic placement and last-request-wins ordering
//! - [`handlers`]: LSP request and notification handlers
//! - [`service`]: compiler service client
//! - [`state`]: server state and document management

pub mod capabilities;
pub mod completion;
pub mod config;
pub mod diagnostics;
pub mod handlers;
pub mod service;
pub mod state;

use std::sync::Arc;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{info, instrument};

use crate::state::ServerState;

/// The IB Language Server.
pub struct IbLanguageServer {
    /// The LSP client handle for sending notifications.
    client: Client,
    /// Shared with spawned diagnostics tasks.
    state: Arc<ServerState>,
}

impl IbLanguageServer {
    pub fn new(client: Client) -> Self {
        Self::with_state(client, Arc::new(ServerState::new()))
    }

    pub fn with_state(client: Client, state: Arc<ServerState>) -> Self {
        Self { client, state }
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// A handle on the state that outlives the current request.
    pub fn shared_state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for IbLanguageServer {
    #[instrument(skip(self))]
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        handlers::initialize::handle_initialize(self, params).await
    }

    #[instrument(skip(self))]
    async fn initialized(&self, params: InitializedParams) {
        handlers::initialize::handle_initialized(self, params).await
    }

    #[instrument(skip(self))]
    async fn shutdown(&self) -> Result<()> {
        handlers::shutdown::handle_shutdown(self).await
    }

    #[instrument(skip(self))]
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        handlers::document::handle_did_open(self, params).await
    }

    #[instrument(skip(self))]
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        handlers::document::handle_did_change(self, params).await
    }

    #[instrument(skip(self))]
    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        handlers::document::handle_did_save(self, params).await
    }

    #[instrument(skip(self))]
    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        handlers::document::handle_did_close(self, params).await
    }

    #[instrument(skip(self))]
    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        handlers::completion::handle_completion(self, params).await
    }

    #[instrument(skip(self))]
    async fn on_type_formatting(
        &self,
        params: DocumentOnTypeFormattingParams,
    ) -> Result<Option<Vec<TextEdit>>> {
        handlers::formatting::handle_on_type_formatting(self, params).await
    }
}

/// Creates the LSP service and IO transport.
pub fn create_server() -> (LspService<IbLanguageServer>, tower_lsp::ClientSocket) {
    LspService::new(IbLanguageServer::new)
}

/// Runs the IB Language Server over stdio.
///
/// ```ignore
/// #[tokio::main]
/// async fn main() {
///     ib_lsp::run_server().await;
/// }
/// ```
pub async fn run_server() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = create_server();

    info!("IB language server starting");

    Server::new(stdin, stdout, socket).serve(service).await;

    info!("IB language server stopped");
}
