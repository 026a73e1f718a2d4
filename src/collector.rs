// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Probe collection
//!
//! Plans which (role, endpoint) pairs to probe, runs the probes and records
//! one observation per pair. Read-only endpoints are probed concurrently.
//! State-mutating endpoints run afterwards, one request at a time, least
//! privileged role first, so a successful call by a privileged role cannot
//! hide what a weaker role would have been allowed to do.

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::credentials::TokenStore;
use crate::decision::ProbeStatus;
use crate::errors::AnalyzerResult;
use crate::http_client::HttpClient;
use crate::observation::ObservationSet;
use crate::types::{Endpoint, ExpectedMatrix, RoleRanking};

/// One planned probe
#[derive(Debug, Clone, Copy)]
pub struct ProbeTask<'a> {
    pub role: &'a str,
    pub endpoint: &'a Endpoint,
}

/// Probe order: read-only pairs (catalog order, token order), then mutating
/// pairs grouped per endpoint with unranked roles first and ranked roles from
/// least to most privileged.
///
/// With `differential` every role with a token probes every endpoint;
/// otherwise only pairs that carry an expectation are probed.
pub fn plan<'a>(
    catalog: &'a [Endpoint],
    tokens: &'a TokenStore,
    ranking: &RoleRanking,
    expected: &ExpectedMatrix,
    differential: bool,
) -> Vec<ProbeTask<'a>> {
    let mut roles: Vec<&'a str> = tokens.roles().collect();
    let mut read_only = Vec::new();

    for endpoint in catalog.iter().filter(|e| !e.method.is_mutating()) {
        for &role in &roles {
            if differential || expected.has_expectation(role, &endpoint.name) {
                read_only.push(ProbeTask { role, endpoint });
            }
        }
    }

    // Stable sort keeps token order among unranked roles
    roles.sort_by_key(|role| std::cmp::Reverse(ranking.rank_of(role).unwrap_or(usize::MAX)));

    let mut mutating = Vec::new();
    for endpoint in catalog.iter().filter(|e| e.method.is_mutating()) {
        for &role in &roles {
            if differential || expected.has_expectation(role, &endpoint.name) {
                mutating.push(ProbeTask { role, endpoint });
            }
        }
    }

    read_only.extend(mutating);
    read_only
}

pub struct ProbeCollector<'a> {
    client: &'a HttpClient,
    concurrency: usize,
}

impl<'a> ProbeCollector<'a> {
    pub fn new(client: &'a HttpClient, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn collect(
        &self,
        catalog: &[Endpoint],
        tokens: &TokenStore,
        ranking: &RoleRanking,
        expected: &ExpectedMatrix,
        differential: bool,
    ) -> AnalyzerResult<ObservationSet> {
        let tasks = plan(catalog, tokens, ranking, expected, differential);
        let mut observations = ObservationSet::new(catalog.to_vec(), ranking.clone())?;

        let (read_only, mutating): (Vec<ProbeTask>, Vec<ProbeTask>) = tasks
            .into_iter()
            .partition(|task| !task.endpoint.method.is_mutating());

        info!(
            read_only = read_only.len(),
            mutating = mutating.len(),
            concurrency = self.concurrency,
            "Starting probes"
        );

        // Futures are built up front so the stream holds no borrowing closure,
        // and `buffered` yields them in plan order whatever order they finish in
        let probes: Vec<_> = read_only
            .into_iter()
            .map(|task| {
                let pending = self.run(task, tokens);
                async move { (task, pending.await) }
            })
            .collect();

        let results = stream::iter(probes)
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        for (task, status) in results {
            observations.record(task.role, &task.endpoint.name, status)?;
        }

        for task in mutating {
            let status = self.run(task, tokens).await;
            observations.record(task.role, &task.endpoint.name, status)?;
        }

        info!(observations = observations.len(), "Probing finished");
        Ok(observations)
    }

    async fn run(&self, task: ProbeTask<'_>, tokens: &TokenStore) -> ProbeStatus {
        let Some(token) = tokens.get(task.role) else {
            return ProbeStatus::Failed;
        };

        let status = self.client.probe(task.endpoint, token).await;
        debug!(
            role = task.role,
            endpoint = %task.endpoint.name,
            status = %status,
            "Observed"
        );
        status
    }
}
