//! LSP Request and Notification Handlers
//!
//! Each submodule handles one category of LSP traffic.
//!
//! - [`initialize`]: initialization handshake and configuration
//! - [`shutdown`]: shutdown request
//! - [`document`]: text document synchronization and diagnostics publishing
//! - [`completion`]: code completion
//! - [`formatting`]: indentation after a newline

pub mod completion;
pub mod document;
pub mod formatting;
pub mod initialize;
pub mod shutdown;
