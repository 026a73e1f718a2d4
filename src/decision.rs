// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Decision derivation
//!
//! Maps the raw outcome of a probe (an HTTP status code, or the failure
//! sentinel when no response was obtained) to a coarse authorization decision.

use serde::{Deserialize, Serialize};

/// Outcome of one probe as reported by the transport layer.
///
/// Serialized as the bare status code, with `null` standing for `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u16>", into = "Option<u16>")]
pub enum ProbeStatus {
    /// The server answered with this status code
    Code(u16),
    /// No response: timeout, connection refused, TLS failure, cancellation
    Failed,
}

impl ProbeStatus {
    pub fn code(&self) -> Option<u16> {
        match self {
            ProbeStatus::Code(code) => Some(*code),
            ProbeStatus::Failed => None,
        }
    }
}

impl From<Option<u16>> for ProbeStatus {
    fn from(value: Option<u16>) -> Self {
        match value {
            Some(code) => ProbeStatus::Code(code),
            None => ProbeStatus::Failed,
        }
    }
}

impl From<ProbeStatus> for Option<u16> {
    fn from(value: ProbeStatus) -> Self {
        value.code()
    }
}

impl From<u16> for ProbeStatus {
    fn from(code: u16) -> Self {
        ProbeStatus::Code(code)
    }
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Code(code) => write!(f, "{}", code),
            ProbeStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Coarse authorization decision derived from a probe outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
    Error,
}

impl Decision {
    /// Whether this decision can take part in validation and comparison
    pub fn is_usable(&self) -> bool {
        !matches!(self, Decision::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
            Decision::Error => "error",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the authorization decision for a probe outcome.
///
/// 2xx is `allow`, 401/403 is `deny`, everything else (404, 5xx, redirects,
/// transport failures) is `error`.
pub fn derive(status: ProbeStatus) -> Decision {
    match status {
        ProbeStatus::Code(200..=299) => Decision::Allow,
        ProbeStatus::Code(401) | ProbeStatus::Code(403) => Decision::Deny,
        ProbeStatus::Code(_) | ProbeStatus::Failed => Decision::Error,
    }
}
