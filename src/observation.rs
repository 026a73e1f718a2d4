// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Observation set
//!
//! Holds one observed outcome per attempted (role, endpoint) pair, grouped by
//! endpoint in catalog order and, within an endpoint, by declared privilege
//! order. Roles outside the ranking follow the ranked ones in recording order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::decision::{derive, Decision, ProbeStatus};
use crate::errors::{AnalyzerError, AnalyzerResult};
use crate::types::{Endpoint, Role, RoleRanking};

/// Outcome of probing one endpoint as one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub role: Role,
    pub endpoint: String,
    pub status: ProbeStatus,
    pub decision: Decision,
}

impl Observation {
    pub fn new(role: Role, endpoint: &str, status: ProbeStatus) -> Self {
        Self {
            role,
            endpoint: endpoint.to_string(),
            status,
            decision: derive(status),
        }
    }

    /// Whether this observation takes part in validation and comparison
    pub fn is_usable(&self) -> bool {
        self.decision.is_usable()
    }
}

/// A recorded probe outcome as it appears in an observations file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedProbe {
    pub role: String,
    pub endpoint: String,
    pub status: ProbeStatus,
}

/// All observations of one run
#[derive(Debug, Clone)]
pub struct ObservationSet {
    catalog: Vec<Endpoint>,
    index: HashMap<String, usize>,
    ranking: RoleRanking,
    by_endpoint: Vec<Vec<Observation>>,
    duplicates_ignored: usize,
}

impl ObservationSet {
    /// Create an empty set over an endpoint catalog.
    ///
    /// Endpoint names must be unique.
    pub fn new(catalog: Vec<Endpoint>, ranking: RoleRanking) -> AnalyzerResult<Self> {
        let mut index = HashMap::with_capacity(catalog.len());
        for (i, endpoint) in catalog.iter().enumerate() {
            if index.insert(endpoint.name.clone(), i).is_some() {
                return Err(AnalyzerError::DuplicateEndpoint {
                    endpoint: endpoint.name.clone(),
                });
            }
        }

        let by_endpoint = vec![Vec::new(); catalog.len()];

        Ok(Self {
            catalog,
            index,
            ranking,
            by_endpoint,
            duplicates_ignored: 0,
        })
    }

    /// Record the outcome of one probe.
    ///
    /// Returns `Ok(false)` when the pair was already observed; the first
    /// observation stays authoritative. Fails hard on an undeclared endpoint.
    pub fn record(&mut self, role: &str, endpoint: &str, status: ProbeStatus) -> AnalyzerResult<bool> {
        let slot = *self
            .index
            .get(endpoint)
            .ok_or_else(|| AnalyzerError::UndeclaredEndpoint {
                endpoint: endpoint.to_string(),
            })?;

        let observations = &mut self.by_endpoint[slot];
        if observations.iter().any(|o| o.role.name == role) {
            warn!(
                role = role,
                endpoint = endpoint,
                "Duplicate observation ignored, keeping the first one"
            );
            self.duplicates_ignored += 1;
            return Ok(false);
        }

        let observation = Observation::new(self.ranking.role(role), endpoint, status);
        let key = order_key(&observation.role);
        let position = observations
            .iter()
            .position(|o| order_key(&o.role) > key)
            .unwrap_or(observations.len());
        observations.insert(position, observation);

        Ok(true)
    }

    /// Build a set from recorded probes, in recording order
    pub fn from_recorded(
        catalog: Vec<Endpoint>,
        ranking: RoleRanking,
        probes: &[RecordedProbe],
    ) -> AnalyzerResult<Self> {
        let mut set = Self::new(catalog, ranking)?;
        for probe in probes {
            set.record(&probe.role, &probe.endpoint, probe.status)?;
        }
        Ok(set)
    }

    /// Endpoint catalog in declaration order
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.catalog
    }

    pub fn ranking(&self) -> &RoleRanking {
        &self.ranking
    }

    /// Observations for one endpoint, in role order
    pub fn for_endpoint(&self, endpoint: &str) -> &[Observation] {
        match self.index.get(endpoint) {
            Some(&slot) => &self.by_endpoint[slot],
            None => &[],
        }
    }

    /// Endpoints paired with their observations, in catalog order
    pub fn by_endpoint(&self) -> impl Iterator<Item = (&Endpoint, &[Observation])> {
        self.catalog
            .iter()
            .zip(self.by_endpoint.iter().map(|v| v.as_slice()))
    }

    /// Every observation, endpoint-major
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.by_endpoint.iter().flatten()
    }

    pub fn get(&self, role: &str, endpoint: &str) -> Option<&Observation> {
        self.for_endpoint(endpoint).iter().find(|o| o.role.name == role)
    }

    /// Distinct observed roles, ranked roles first
    pub fn roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = Vec::new();
        for observation in self.iter() {
            if !roles.iter().any(|r| r.name == observation.role.name) {
                roles.push(observation.role.clone());
            }
        }
        roles.sort_by_key(order_key);
        roles
    }

    pub fn len(&self) -> usize {
        self.by_endpoint.iter().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duplicates_ignored(&self) -> usize {
        self.duplicates_ignored
    }
}

fn order_key(role: &Role) -> usize {
    role.rank.unwrap_or(usize::MAX)
}
