//! Initialization and Initialized Handlers
//!
//! 1. Client sends `initialize` with its capabilities and options
//! 2. Server reads its configuration and answers with its capabilities
//! 3. Client sends `initialized`

use std::sync::Arc;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tracing::{info, warn};

use crate::capabilities::server_capabilities;
use crate::config::ServerConfig;
use crate::service::{DiagnosticsService, HttpCompilerService};
use crate::IbLanguageServer;

/// Handles the `initialize` request.
///
/// Invalid initialization options never fail the handshake; they are logged
/// and replaced by defaults.
pub async fn handle_initialize(
    server: &IbLanguageServer,
    params: InitializeParams,
) -> Result<InitializeResult> {
    info!("Initializing IB language server");

    server.state().set_client_capabilities(&params.capabilities);

    let (config, errors) = ServerConfig::from_init_options(params.initialization_options.as_ref());
    for error in &errors {
        warn!(%error, "ignoring invalid initialization option");
    }

    server
        .state()
        .diagnostics()
        .set_service(diagnostics_service(&config));
    server.state().update_config(config);

    if let Some(client_info) = &params.client_info {
        info!(
            "Client: {} {}",
            client_info.name,
            client_info.version.as_deref().unwrap_or("unknown")
        );
    }

    Ok(InitializeResult {
        capabilities: server_capabilities(),
        server_info: Some(ServerInfo {
            name: "ib-lsp".to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    })
}

/// Handles the `initialized` notification.
pub async fn handle_initialized(server: &IbLanguageServer, _params: InitializedParams) {
    server.state().set_initialized(true);

    let config = server.state().config();
    match &config.compiler_endpoint {
        Some(endpoint) => info!(endpoint = %endpoint, "IB language server ready"),
        None => info!("IB language server ready, compiler diagnostics disabled"),
    }
}

/// Builds the compiler client described by `config`.
fn diagnostics_service(config: &ServerConfig) -> Option<Arc<dyn DiagnosticsService>> {
    let endpoint = config.compiler_endpoint.as_ref()?;
    match HttpCompilerService::new(endpoint.as_str(), config.request_timeout) {
        Ok(service) => Some(Arc::new(service.with_auth_token(config.auth_token.clone()))),
        Err(error) => {
            warn!(%error, endpoint = %endpoint, "compiler client unavailable, diagnostics disabled");
            None
        }
    }
}
