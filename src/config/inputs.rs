// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Endpoint catalog and expected-matrix files

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;
use url::Url;

use super::loader::read_file;
use super::validation::ConfigValidator;
use crate::types::{Endpoint, ExpectedMatrix, RoleRanking};

/// `endpoints.yaml`: `{ endpoints: [ {name, method, url, body?} ] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsFile {
    pub endpoints: Vec<Endpoint>,
}

/// `authorization_matrix.yaml`: `{ matrix: {role: {endpoint: allow|deny}}, ranking?: [..] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatrixFile {
    #[serde(default)]
    pub matrix: ExpectedMatrix,

    #[serde(default)]
    pub ranking: Vec<String>,
}

pub fn load_endpoints(path: &Path, base_url: Option<&str>) -> Result<Vec<Endpoint>> {
    let file: EndpointsFile =
        read_file(path).with_context(|| format!("Failed to load endpoints from {:?}", path))?;
    prepare_catalog(file.endpoints, base_url)
}

/// Resolve relative URLs and validate the catalog
pub fn prepare_catalog(endpoints: Vec<Endpoint>, base_url: Option<&str>) -> Result<Vec<Endpoint>> {
    let endpoints = endpoints
        .into_iter()
        .map(|mut endpoint| {
            endpoint.url = resolve_url(base_url, &endpoint.url)
                .with_context(|| format!("Endpoint '{}'", endpoint.name))?;
            Ok(endpoint)
        })
        .collect::<Result<Vec<_>>>()?;

    ConfigValidator::validate_catalog(&endpoints)?;
    Ok(endpoints)
}

/// Join a `/`-prefixed URL onto the base URL, under the base's own path;
/// absolute URLs pass through
pub fn resolve_url(base_url: Option<&str>, url: &str) -> Result<String> {
    if !url.starts_with('/') {
        return Ok(url.to_string());
    }

    let base = base_url.ok_or_else(|| {
        anyhow::anyhow!("Relative URL '{}' needs a base URL (--base-url)", url)
    })?;

    let mut base = Url::parse(base).with_context(|| format!("Invalid base URL '{}'", base))?;
    base.set_query(None);
    base.set_fragment(None);
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let joined = base
        .join(url.trim_start_matches('/'))
        .with_context(|| format!("Cannot join '{}' onto '{}'", url, base))?;
    Ok(joined.into())
}

pub fn load_matrix(path: &Path) -> Result<MatrixFile> {
    let file: MatrixFile =
        read_file(path).with_context(|| format!("Failed to load matrix from {:?}", path))?;
    ConfigValidator::validate_ranking(&file.ranking)?;
    Ok(file)
}

/// Drop expectations for roles without a token or endpoints not in the
/// catalog, warning for each one skipped.
pub fn prune_matrix<'a, R>(matrix: &mut ExpectedMatrix, roles: R, catalog: &[Endpoint]) -> usize
where
    R: IntoIterator<Item = &'a str>,
{
    let roles: Vec<&str> = roles.into_iter().collect();
    let mut skipped = 0;

    matrix.retain(|role, endpoint| {
        if !roles.iter().any(|r| *r == role) {
            warn!(role = role, endpoint = endpoint, "Skipping expectation: no token for role");
            skipped += 1;
            return false;
        }
        if !catalog.iter().any(|e| e.name == endpoint) {
            warn!(role = role, endpoint = endpoint, "Skipping expectation: endpoint not declared");
            skipped += 1;
            return false;
        }
        true
    });

    skipped
}

/// Pick the first non-empty ranking: command line, config file, matrix file
pub fn resolve_ranking(
    cli: Option<&[String]>,
    config: &[String],
    matrix_file: &[String],
) -> Result<RoleRanking> {
    let chosen = match cli {
        Some(names) if !names.is_empty() => names,
        _ if !config.is_empty() => config,
        _ => matrix_file,
    };

    ConfigValidator::validate_ranking(chosen)?;
    Ok(RoleRanking::new(chosen.iter().cloned()))
}
