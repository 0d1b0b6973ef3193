//! `ib-lsp` binary: the IB language server over stdio.
//!
//! Logs go to stderr, since stdout carries the protocol. `RUST_LOG`
//! overrides the default `ib_lsp=info` filter.

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ib_lsp=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    ib_lsp::run_server().await;
}
