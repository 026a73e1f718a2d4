// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::decision::Decision;

// ============================================================================
// Endpoints
// ============================================================================

/// HTTP method of a catalogued endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl Default for HttpMethod {
    fn default() -> Self {
        HttpMethod::Get
    }
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether a request with this method may change server state
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete
        )
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(format!("unsupported HTTP method: {}", other)),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_string()
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named API operation to probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    #[serde(default)]
    pub method: HttpMethod,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl Endpoint {
    pub fn new(name: &str, method: HttpMethod, url: &str) -> Self {
        Self {
            name: name.to_string(),
            method,
            url: url.to_string(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

// ============================================================================
// Roles
// ============================================================================

/// A role identity with its position in the privilege ranking.
///
/// `rank` 0 is the most privileged role; `None` means the role was not part
/// of the declared ranking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub rank: Option<usize>,
}

impl Role {
    /// Strictly more privileged than `other`. False when either rank is undefined.
    pub fn outranks(&self, other: &Role) -> bool {
        match (self.rank, other.rank) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }
}

/// Declared privilege order, most privileged role first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RoleRanking {
    order: Vec<String>,
}

impl RoleRanking {
    /// Build a ranking; repeated names keep their first position.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for name in names {
            let name = name.into();
            if seen.insert(name.clone()) {
                order.push(name);
            } else {
                warn!("Role '{}' listed twice in privilege ranking, keeping first position", name);
            }
        }
        Self { order }
    }

    pub fn rank_of(&self, role: &str) -> Option<usize> {
        self.order.iter().position(|r| r == role)
    }

    pub fn role(&self, name: &str) -> Role {
        Role {
            name: name.to_string(),
            rank: self.rank_of(name),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}

impl From<Vec<String>> for RoleRanking {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<RoleRanking> for Vec<String> {
    fn from(ranking: RoleRanking) -> Self {
        ranking.order
    }
}

// ============================================================================
// Expected policy
// ============================================================================

/// Intended decision for a (role, endpoint) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedDecision {
    Allow,
    Deny,
}

impl ExpectedDecision {
    pub fn as_decision(&self) -> Decision {
        match self {
            ExpectedDecision::Allow => Decision::Allow,
            ExpectedDecision::Deny => Decision::Deny,
        }
    }
}

impl std::fmt::Display for ExpectedDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_decision().as_str())
    }
}

/// Hand-authored expected authorization matrix: role -> endpoint -> decision
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpectedMatrix {
    entries: HashMap<String, HashMap<String, ExpectedDecision>>,
}

impl ExpectedMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, role: &str, endpoint: &str, decision: ExpectedDecision) -> Self {
        self.insert(role, endpoint, decision);
        self
    }

    pub fn insert(&mut self, role: &str, endpoint: &str, decision: ExpectedDecision) {
        self.entries
            .entry(role.to_string())
            .or_default()
            .insert(endpoint.to_string(), decision);
    }

    /// Expectation for a pair, if one was authored
    pub fn expectation(&self, role: &str, endpoint: &str) -> Option<ExpectedDecision> {
        self.entries.get(role).and_then(|eps| eps.get(endpoint)).copied()
    }

    pub fn has_expectation(&self, role: &str, endpoint: &str) -> bool {
        self.expectation(role, endpoint).is_some()
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|r| r.as_str())
    }

    pub fn endpoints_for(&self, role: &str) -> impl Iterator<Item = &str> {
        self.entries
            .get(role)
            .into_iter()
            .flat_map(|eps| eps.keys().map(|e| e.as_str()))
    }

    /// Number of authored (role, endpoint) expectations
    pub fn len(&self) -> usize {
        self.entries.values().map(|eps| eps.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expectation for which `keep` returns false
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        for (role, eps) in self.entries.iter_mut() {
            eps.retain(|endpoint, _| keep(role, endpoint));
        }
        self.entries.retain(|_, eps| !eps.is_empty());
    }
}

// ============================================================================
// Results
// ============================================================================

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
        }
    }
}

/// Disagreement between the expected matrix and an observed decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub role: String,
    pub endpoint: String,
    pub expected: ExpectedDecision,
    pub actual: Decision,
    pub status: u16,
}

/// Kind of cross-role inconsistency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A less privileged role gets the same access as a more privileged one
    SameAccess,
    /// A less privileged role is allowed where a more privileged one is denied
    InvertedPrivilege,
    /// Three or more roles, all allowed
    SuspiciousEquality,
}

impl FindingKind {
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::InvertedPrivilege => Severity::Critical,
            FindingKind::SameAccess => Severity::High,
            FindingKind::SuspiciousEquality => Severity::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::SameAccess => "same_access",
            FindingKind::InvertedPrivilege => "inverted_privilege",
            FindingKind::SuspiciousEquality => "suspicious_equality",
        }
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status code per compared role, kept in comparison order.
///
/// Serialized as a JSON object `{ "<role>": <status> }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleStatuses(Vec<(String, u16)>);

impl RoleStatuses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: &str, status: u16) {
        self.0.push((role.to_string(), status));
    }

    pub fn get(&self, role: &str) -> Option<u16> {
        self.0.iter().find(|(r, _)| r == role).map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u16)> {
        self.0.iter().map(|(r, s)| (r.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u16)> for RoleStatuses {
    fn from_iter<T: IntoIterator<Item = (String, u16)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for RoleStatuses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (role, status) in &self.0 {
            map.serialize_entry(role, status)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RoleStatuses {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RoleStatusesVisitor;

        impl<'de> Visitor<'de> for RoleStatusesVisitor {
            type Value = RoleStatuses;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of role name to status code")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((role, status)) = access.next_entry::<String, u16>()? {
                    entries.push((role, status));
                }
                Ok(RoleStatuses(entries))
            }
        }

        deserializer.deserialize_map(RoleStatusesVisitor)
    }
}

/// Cross-role inconsistency detected without reference to the expected matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferentialFinding {
    pub kind: FindingKind,
    pub endpoint: String,
    pub method: HttpMethod,
    pub url: String,
    pub roles_compared: Vec<String>,
    pub status_codes: RoleStatuses,
    pub severity: Severity,
    pub reason: String,
}

/// Result of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub matrix_mismatches: Vec<Mismatch>,
    pub differential_findings: Vec<DifferentialFinding>,
}
