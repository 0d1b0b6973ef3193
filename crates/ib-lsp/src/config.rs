//! Server Configuration
//!
//! Settings arrive once, as the `initializationOptions` of the `initialize`
//! request:
//!
//! ```json
//! {
//!   "indentUnit": 4,
//!   "compilerEndpoint": "http://127.0.0.1:8080",
//!   "requestTimeoutMs": 5000,
//!   "diagnosticSpan": "single-byte",
//!   "authToken": null
//! }
//! ```
//!
//! Every field is optional. Unknown fields are ignored. A field with an
//! invalid value keeps its default and produces a [`ConfigError`] for the
//! caller to log.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Default address of the compiler service.
pub const DEFAULT_COMPILER_ENDPOINT: &str = "http://127.0.0.1:8080";

/// How a diagnostic reported at a single position is widened into a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanPolicy {
    /// `[p, p + 1)`
    #[default]
    SingleByte,
    /// To the end of the word at `p`, at least one byte.
    Token,
}

/// Errors found while reading initialization options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("initialization options must be an object, got {0}")]
    NotAnObject(String),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Server configuration settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Width of one indentation level.
    pub indent_unit: usize,

    /// Base URL of the compiler service. `None` disables diagnostics.
    pub compiler_endpoint: Option<String>,

    /// Timeout for one diagnostics request.
    pub request_timeout: Duration,

    /// Widening of single-position diagnostics.
    pub diagnostic_span: SpanPolicy,

    /// Bearer token sent to the compiler service.
    pub auth_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            indent_unit: ib_ide::DEFAULT_INDENT_UNIT,
            compiler_endpoint: Some(DEFAULT_COMPILER_ENDPOINT.to_string()),
            request_timeout: Duration::from_millis(5000),
            diagnostic_span: SpanPolicy::default(),
            auth_token: None,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from `initializationOptions`.
    ///
    /// Never fails: problems are returned alongside a configuration that
    /// uses defaults for the affected fields.
    pub fn from_init_options(options: Option<&Value>) -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let mut errors = Vec::new();

        let object = match options {
            None | Some(Value::Null) => return (config, errors),
            Some(Value::Object(object)) => object,
            Some(other) => {
                errors.push(ConfigError::NotAnObject(other.to_string()));
                return (config, errors);
            }
        };

        if let Some(value) = object.get("indentUnit") {
            match value.as_u64() {
                Some(unit) if (1..=16).contains(&unit) => config.indent_unit = unit as usize,
                _ => errors.push(invalid("indentUnit", value, "expected an integer in 1..=16")),
            }
        }

        if let Some(value) = object.get("compilerEndpoint") {
            match value {
                Value::Null => config.compiler_endpoint = None,
                Value::String(url) if reqwest::Url::parse(url).is_ok() => {
                    config.compiler_endpoint = Some(url.trim_end_matches('/').to_string());
                }
                _ => errors.push(invalid("compilerEndpoint", value, "expected a URL or null")),
            }
        }

        if let Some(value) = object.get("requestTimeoutMs") {
            match value.as_u64() {
                Some(ms) if ms > 0 => config.request_timeout = Duration::from_millis(ms),
                _ => errors.push(invalid(
                    "requestTimeoutMs",
                    value,
                    "expected a positive integer",
                )),
            }
        }

        if let Some(value) = object.get("diagnosticSpan") {
            match SpanPolicy::deserialize(value) {
                Ok(policy) => config.diagnostic_span = policy,
                Err(_) => errors.push(invalid(
                    "diagnosticSpan",
                    value,
                    "expected \"single-byte\" or \"token\"",
                )),
            }
        }

        if let Some(value) = object.get("authToken") {
            match value {
                Value::Null => config.auth_token = None,
                Value::String(token) => config.auth_token = Some(token.clone()),
                _ => errors.push(invalid("authToken", value, "expected a string or null")),
            }
        }

        (config, errors)
    }
}

fn invalid(field: &'static str, value: &Value, expected: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: format!("{expected}, got {value}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults_without_options() {
        let (config, errors) = ServerConfig::from_init_options(None);
        assert_eq!(config, ServerConfig::default());
        assert!(errors.is_empty());
        assert_eq!(config.indent_unit, 4);
        assert_eq!(
            config.compiler_endpoint.as_deref(),
            Some("http://127.0.0.1:8080")
        );
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.diagnostic_span, SpanPolicy::SingleByte);
    }

    #[test]
    fn test_full_options() {
        let options = json!({
            "indentUnit": 2,
            "compilerEndpoint": "http://compiler.local:9000/",
            "requestTimeoutMs": 250,
            "diagnosticSpan": "token",
            "authToken": "secret",
            "somethingElse": true
        });
        let (config, errors) = ServerConfig::from_init_options(Some(&options));
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(
            config,
            ServerConfig {
                indent_unit: 2,
                compiler_endpoint: Some("http://compiler.local:9000".to_string()),
                request_timeout: Duration::from_millis(250),
                diagnostic_span: SpanPolicy::Token,
                auth_token: Some("secret".to_string()),
            }
        );
    }

    #[test]
    fn test_null_endpoint_disables_diagnostics() {
        let options = json!({ "compilerEndpoint": null });
        let (config, errors) = ServerConfig::from_init_options(Some(&options));
        assert!(errors.is_empty());
        assert_eq!(config.compiler_endpoint, None);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let options = json!({
            "indentUnit": 0,
            "compilerEndpoint": "not a url",
            "diagnosticSpan": "wide"
        });
        let (config, errors) = ServerConfig::from_init_options(Some(&options));
        assert_eq!(config, ServerConfig::default());
        let fields: Vec<_> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::InvalidValue { field, .. } => Some(*field),
                ConfigError::NotAnObject(_) => None,
            })
            .collect();
        assert_eq!(fields, vec!["indentUnit", "compilerEndpoint", "diagnosticSpan"]);
    }

    #[test]
    fn test_non_object_options() {
        let options = json!([1, 2]);
        let (config, errors) = ServerConfig::from_init_options(Some(&options));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(errors, vec![ConfigError::NotAnObject("[1,2]".to_string())]);
    }
}
