// src/error.rs
// =============================================================================
// Error types shared by the settings, gateway and content modules.
//
// - ValidationErrors: settings failed one or more field rules. It is returned
//   as a value so the caller can show every message and ask again.
// - RemoteApiError: anything that went wrong talking to Oh Dear (auth,
//   network, 4xx/5xx, unexpected body). Passed through to the caller as is.
// - GatewayError: things that stop us from building a gateway at all.
//
// main.rs wraps all of these in anyhow::Error; the modules below keep typed
// errors so tests can match on them.
// =============================================================================

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// One broken field rule, e.g. `apiToken: Api Token should contain 60 characters.`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Field name as the admin form knows it (`apiToken`, `selectedSiteId`)
    pub field: &'static str,
    /// Human readable message
    pub message: String,
}

/// Every rule the settings broke, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("invalid settings: {}", join_messages(.violations))]
pub struct ValidationErrors {
    pub violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation {
                field,
                message: message.into(),
            }],
        }
    }

    /// True when at least one violation targets `field`
    #[cfg(test)]
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_messages(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A failed call to the Oh Dear API.
///
/// `status_code` is `None` when no HTTP response came back at all
/// (DNS, TLS, timeout) or when the response body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Oh Dear API request failed{}: {message}", status_suffix(.status_code))]
pub struct RemoteApiError {
    pub status_code: Option<u16>,
    pub message: String,
}

impl RemoteApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
        }
    }
}

fn status_suffix(status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

impl From<reqwest::Error> for RemoteApiError {
    fn from(error: reqwest::Error) -> Self {
        Self {
            status_code: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for RemoteApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::transport(format!("unexpected response body: {}", error))
    }
}

/// Reasons a MonitoringGateway (or its content index) could not be built.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Oh Dear API token is empty")]
    MissingApiToken,

    #[error(transparent)]
    InvalidSettings(#[from] ValidationErrors),

    #[error("could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("could not read content index {}: {source}", .path.display())]
    ContentIndexIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid content index {}: {source}", .path.display())]
    ContentIndexFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}
