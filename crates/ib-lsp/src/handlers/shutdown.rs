//! Shutdown Handler
//!
//! The client sends `shutdown`, waits for the response, then sends `exit`.
//! Diagnostics tasks still in flight are dropped by the ordering check once
//! their documents are gone.

use tower_lsp::jsonrpc::Result;
use tracing::info;

use crate::IbLanguageServer;

/// Handles the `shutdown` request.
pub async fn handle_shutdown(server: &IbLanguageServer) -> Result<()> {
    info!(
        open_documents = server.state().document_count(),
        "IB language server shutting down"
    );
    server.state().set_initialized(false);
    Ok(())
}
