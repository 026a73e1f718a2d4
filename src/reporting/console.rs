// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Plain-text rendering of a report for the terminal

use std::fmt::Write;

use super::summary::ReportSummary;
use crate::types::Report;

/// Render mismatches, findings and the run summary.
///
/// The differential section and its summary line only appear when
/// differential analysis ran.
pub fn render(report: &Report, summary: &ReportSummary, differential: bool) -> String {
    let mut out = String::new();

    if report.matrix_mismatches.is_empty() {
        let _ = writeln!(out, "No mismatches found.");
    } else {
        let _ = writeln!(out, "--- Mismatches ---");
        for m in &report.matrix_mismatches {
            let _ = writeln!(
                out,
                "  Role: {}, Endpoint: {} | Expected: {}, Actual: {} (HTTP {})",
                m.role, m.endpoint, m.expected, m.actual, m.status
            );
        }
    }
    let _ = writeln!(out);

    if differential {
        if report.differential_findings.is_empty() {
            let _ = writeln!(out, "No differential findings.");
        } else {
            let _ = writeln!(out, "--- Differential findings ---");
            for f in &report.differential_findings {
                let _ = writeln!(
                    out,
                    "  [{}] {} {} {} | roles: [{}] | {}",
                    f.severity,
                    f.endpoint,
                    f.method,
                    f.url,
                    f.roles_compared.join(", "),
                    f.reason
                );
            }
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "--- Summary ---");
    let _ = writeln!(out, "Tested roles: {}", summary.tested_roles);
    let _ = writeln!(out, "Tested endpoints: {}", summary.tested_endpoints);
    let _ = writeln!(out, "Total checks: {}", summary.total_checks);
    let _ = writeln!(out, "Checks without a decision: {}", summary.errored_checks);
    let _ = writeln!(out, "Mismatches found: {}", summary.mismatches);
    if differential {
        let _ = writeln!(
            out,
            "Differential findings: {} (critical: {}, high: {}, medium: {})",
            summary.differential_findings, summary.critical, summary.high, summary.medium
        );
    }

    out
}
