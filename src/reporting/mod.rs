// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod console;
pub mod formats;
pub mod summary;

pub use formats::json::JsonReportWriter;
pub use summary::ReportSummary;

use crate::types::{DifferentialFinding, Mismatch, Report};

/// Merge validator and analyzer output into one report, keeping each
/// input's own order.
pub fn assemble(mismatches: Vec<Mismatch>, findings: Vec<DifferentialFinding>) -> Report {
    Report {
        matrix_mismatches: mismatches,
        differential_findings: findings,
    }
}
