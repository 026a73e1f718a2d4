// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};

use crate::decision::Decision;
use crate::observation::ObservationSet;
use crate::types::{ExpectedMatrix, Report, Severity};

/// Run statistics printed after a scan and returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub tested_roles: usize,
    pub tested_endpoints: usize,
    pub total_checks: usize,
    pub matrix_checks: usize,
    pub errored_checks: usize,
    pub mismatches: usize,
    pub differential_findings: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
}

impl ReportSummary {
    pub fn from_run(observations: &ObservationSet, expected: &ExpectedMatrix, report: &Report) -> Self {
        let tested_endpoints = observations
            .by_endpoint()
            .filter(|(_, observed)| !observed.is_empty())
            .count();

        let matrix_checks = observations
            .iter()
            .filter(|o| expected.has_expectation(&o.role.name, &o.endpoint))
            .count();

        let errored_checks = observations
            .iter()
            .filter(|o| o.decision == Decision::Error)
            .count();

        let count = |severity: Severity| {
            report
                .differential_findings
                .iter()
                .filter(|f| f.severity == severity)
                .count()
        };

        Self {
            tested_roles: observations.roles().len(),
            tested_endpoints,
            total_checks: observations.len(),
            matrix_checks,
            errored_checks,
            mismatches: report.matrix_mismatches.len(),
            differential_findings: report.differential_findings.len(),
            critical: count(Severity::Critical),
            high: count(Severity::High),
            medium: count(Severity::Medium),
        }
    }
}
