// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan pipeline shared by the CLI and the HTTP API

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::collector::ProbeCollector;
use crate::config::{self, AnalyzerConfig, MatrixFile};
use crate::credentials::{PasswordGrantProvider, TokenStore};
use crate::errors::AnalyzerResult;
use crate::http_client::HttpClient;
use crate::observation::ObservationSet;
use crate::reporting::{self, ReportSummary};
use crate::types::{Endpoint, ExpectedMatrix, Report, RoleRanking};
use crate::{differential, matrix_validator};

/// Everything a scan needs, validated
#[derive(Debug, Clone)]
pub struct ScanInputs {
    pub catalog: Vec<Endpoint>,
    pub tokens: TokenStore,
    pub matrix: ExpectedMatrix,
    pub ranking: RoleRanking,
}

impl ScanInputs {
    /// Assemble inputs, skipping expectations that name a role without a
    /// token or an endpoint outside the catalog.
    pub fn new(
        catalog: Vec<Endpoint>,
        tokens: TokenStore,
        mut matrix: ExpectedMatrix,
        ranking: RoleRanking,
    ) -> Self {
        let skipped = config::prune_matrix(&mut matrix, tokens.roles(), &catalog);
        if skipped > 0 {
            warn!(skipped = skipped, "Some expectations were skipped");
        }

        Self {
            catalog,
            tokens,
            matrix,
            ranking,
        }
    }

    /// Load catalog, matrix and tokens as described by the configuration.
    ///
    /// `ranking` from the command line wins over the config file, which wins
    /// over the matrix file.
    pub async fn load(config: &AnalyzerConfig, ranking: Option<&[String]>) -> Result<Self> {
        let catalog = config::load_endpoints(&config.inputs.endpoints, config.base_url.as_deref())?;
        let matrix_file = load_matrix_or_empty(&config.inputs.matrix)?;
        let tokens = load_tokens(config).await?;
        let ranking = config::resolve_ranking(ranking, &config.ranking, &matrix_file.ranking)?;

        Ok(Self::new(catalog, tokens, matrix_file.matrix, ranking))
    }
}

/// Matrix file contents, or an empty matrix when the file does not exist
pub fn load_matrix_or_empty(path: &Path) -> Result<MatrixFile> {
    if path.exists() {
        config::load_matrix(path)
    } else {
        warn!(path = ?path, "No expected matrix found, matrix validation has nothing to check");
        Ok(MatrixFile::default())
    }
}

pub async fn load_tokens(config: &AnalyzerConfig) -> Result<TokenStore> {
    match &config.identity_provider {
        Some(provider) => {
            let provider = PasswordGrantProvider::new(provider.clone(), &config.http)?;
            provider
                .acquire_all()
                .await
                .context("Failed to acquire tokens from identity provider")
        }
        None => TokenStore::from_file(&config.inputs.tokens),
    }
}

/// Observations plus the report derived from them
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub observations: ObservationSet,
    pub report: Report,
    pub summary: ReportSummary,
}

/// Validate against the matrix and, when asked, compare roles using the
/// ranking the observations were recorded with
pub fn analyze(observations: ObservationSet, expected: &ExpectedMatrix, differential: bool) -> ScanOutcome {
    let mismatches = matrix_validator::validate(&observations, expected);
    let findings = if differential {
        differential::analyze(&observations)
    } else {
        Vec::new()
    };

    let report = reporting::assemble(mismatches, findings);
    let summary = ReportSummary::from_run(&observations, expected, &report);

    ScanOutcome {
        observations,
        report,
        summary,
    }
}

/// Probe every planned pair, then analyze
pub async fn run_scan(
    client: &HttpClient,
    inputs: &ScanInputs,
    differential: bool,
    concurrency: usize,
) -> AnalyzerResult<ScanOutcome> {
    if inputs.matrix.is_empty() && !differential {
        warn!("No expectations and differential analysis is off, nothing will be probed");
    }

    let observations = ProbeCollector::new(client, concurrency)
        .collect(
            &inputs.catalog,
            &inputs.tokens,
            &inputs.ranking,
            &inputs.matrix,
            differential,
        )
        .await?;

    let outcome = analyze(observations, &inputs.matrix, differential);

    info!(
        checks = outcome.summary.total_checks,
        mismatches = outcome.summary.mismatches,
        findings = outcome.summary.differential_findings,
        "Scan complete"
    );

    Ok(outcome)
}
