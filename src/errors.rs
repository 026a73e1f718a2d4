// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Analyzer Error Types
 * Error taxonomy for the BAC analyzer with thiserror
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use std::time::Duration;
use thiserror::Error;

/// Main analyzer error type
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// An observation referenced an endpoint that was never declared.
    /// This is a broken contract between collaborators, not a data issue.
    #[error("Endpoint '{endpoint}' is not declared in the endpoint catalog")]
    UndeclaredEndpoint { endpoint: String },

    /// Two catalog entries share a name
    #[error("Endpoint '{endpoint}' is declared more than once")]
    DuplicateEndpoint { endpoint: String },

    /// Transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Credential acquisition errors
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Boundary validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Failures that prevented a probe from getting any HTTP response
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request timed out after {timeout:?} for {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("Connection failed for {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Proxy error: {reason}")]
    Proxy { reason: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Transport error: {0}")]
    Other(String),
}

/// Convert reqwest errors to transport errors
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();

        if err.is_timeout() {
            TransportError::Timeout {
                url,
                timeout: Duration::from_secs(0),
            }
        } else if err.is_connect() {
            TransportError::ConnectionFailed {
                url,
                reason: err.to_string(),
            }
        } else if err.is_builder() {
            TransportError::InvalidUrl { url }
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

impl From<reqwest::Error> for AnalyzerError {
    fn from(err: reqwest::Error) -> Self {
        AnalyzerError::Transport(err.into())
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        AnalyzerError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for AnalyzerError {
    fn from(err: serde_yaml::Error) -> Self {
        AnalyzerError::Parse(err.to_string())
    }
}

/// Result type for analyzer operations
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
