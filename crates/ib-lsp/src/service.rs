//! Compiler Service Client
//!
//! Diagnostics are produced by the `ibc` compiler running behind an HTTP
//! service. The server only speaks to it through [`DiagnosticsService`], so
//! tests can substitute an in-process fake.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// A diagnostic as reported by the compiler service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerDiagnostic {
    pub message: String,
    #[serde(flatten)]
    pub position: ReportedPosition,
}

/// Where the compiler says the problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportedPosition {
    /// Byte range into the submitted text.
    Offsets {
        offset_start: usize,
        offset_end: usize,
    },
    /// One-based line and column of a single position.
    LineColumn { line: usize, col: usize },
}

impl CompilerDiagnostic {
    pub fn at_offsets(message: impl Into<String>, offset_start: usize, offset_end: usize) -> Self {
        Self {
            message: message.into(),
            position: ReportedPosition::Offsets {
                offset_start,
                offset_end,
            },
        }
    }

    pub fn at_line_column(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            message: message.into(),
            position: ReportedPosition::LineColumn { line, col },
        }
    }
}

/// Errors talking to the compiler service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("compiler service did not answer in time")]
    Timeout,

    #[error("compiler service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("compiler service answered with HTTP {0}")]
    Status(u16),

    #[error("malformed diagnostics payload: {0}")]
    Decode(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ServiceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ServiceError::Timeout
        } else if error.is_decode() {
            ServiceError::Decode(error)
        } else {
            ServiceError::Transport(error)
        }
    }
}

/// Source of compiler diagnostics for a document.
#[tower_lsp::async_trait]
pub trait DiagnosticsService: Send + Sync {
    /// Analyzes `text`, identified by `document`.
    async fn diagnostics(
        &self,
        document: &str,
        text: &str,
    ) -> Result<Vec<CompilerDiagnostic>, ServiceError>;
}

/// [`DiagnosticsService`] backed by the compiler's HTTP endpoint.
///
/// Posts the raw text to `{endpoint}/diagnostics?id={document}` and expects
/// a JSON array of diagnostics back.
#[derive(Debug, Clone)]
pub struct HttpCompilerService {
    client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpCompilerService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ServiceError::Transport)?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token;
        self
    }

    pub fn url(&self) -> String {
        format!("{}/diagnostics", self.endpoint)
    }
}

#[tower_lsp::async_trait]
impl DiagnosticsService for HttpCompilerService {
    async fn diagnostics(
        &self,
        document: &str,
        text: &str,
    ) -> Result<Vec<CompilerDiagnostic>, ServiceError> {
        let mut request = self
            .client
            .post(self.url())
            .query(&[("id", document)])
            .body(text.to_string());
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }

        let records: Vec<CompilerDiagnostic> = response.json().await?;
        debug!(document, count = records.len(), "received compiler diagnostics");
        Ok(records)
    }
}
