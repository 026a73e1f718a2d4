// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - BAC Analyzer Library
 * Broken access control detection by role-differential probing
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

// Core classification
pub mod decision;
pub mod differential;
pub mod matrix_validator;
pub mod observation;
pub mod types;

// Reporting
pub mod reporting;

// Probing
pub mod collector;
pub mod credentials;
pub mod http_client;
pub mod retry;

// Error handling and configuration
pub mod config;
pub mod errors;

// Pipeline and HTTP API
pub mod api;
pub mod scan;

pub use decision::{derive, Decision, ProbeStatus};
pub use errors::{AnalyzerError, AnalyzerResult, TransportError};
pub use observation::{Observation, ObservationSet, RecordedProbe};
pub use types::{
    DifferentialFinding, Endpoint, ExpectedDecision, ExpectedMatrix, FindingKind, HttpMethod,
    Mismatch, Report, Role, RoleRanking, Severity,
};
