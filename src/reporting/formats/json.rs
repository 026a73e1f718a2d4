// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::types::Report;

/// Persists a report as pretty-printed JSON
pub struct JsonReportWriter;

impl JsonReportWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, report: &Report) -> Result<Vec<u8>> {
        let json = serde_json::to_string_pretty(report)?;
        Ok(json.into_bytes())
    }

    pub async fn write(&self, report: &Report, path: &Path) -> Result<()> {
        let bytes = self.generate(report)?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        info!(
            path = %path.display(),
            mismatches = report.matrix_mismatches.len(),
            findings = report.differential_findings.len(),
            "Report saved"
        );
        Ok(())
    }
}

impl Default for JsonReportWriter {
    fn default() -> Self {
        Self::new()
    }
}
