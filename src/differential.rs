// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Differential Role Comparison
//!
//! Detects authorization inconsistencies by comparing the decisions different
//! roles received for the same endpoint, without any expected matrix:
//! - Inverted privilege (lower role allowed, higher role denied)
//! - Same access (lower role allowed exactly like a higher role)
//! - Suspicious equality (three or more roles, all allowed)

use tracing::debug;

use crate::decision::Decision;
use crate::observation::ObservationSet;
use crate::types::{DifferentialFinding, Endpoint, FindingKind, Role, RoleStatuses};

/// Minimum number of usable observations before the equality check applies
const EQUALITY_MIN_ROLES: usize = 3;

/// One usable (non-error) observation of an endpoint
struct Participant {
    role: Role,
    decision: Decision,
    status: u16,
}

/// Classify cross-role inconsistencies for every endpoint.
///
/// Ranks are the ones the set recorded each role with, so comparison and
/// output order share one ranking. Unranked roles sit out the pairwise check
/// but still count towards the equality check. Findings are grouped by
/// endpoint in catalog order, pairwise findings first, equality finding last.
pub fn analyze(observations: &ObservationSet) -> Vec<DifferentialFinding> {
    let mut findings = Vec::new();

    for (endpoint, observed) in observations.by_endpoint() {
        let participants: Vec<Participant> = observed
            .iter()
            .filter(|o| o.is_usable())
            .filter_map(|o| {
                o.status.code().map(|status| Participant {
                    role: o.role.clone(),
                    decision: o.decision,
                    status,
                })
            })
            .collect();

        if participants.len() < 2 {
            debug!(
                endpoint = %endpoint.name,
                usable = participants.len(),
                "Not enough usable observations for comparison"
            );
            continue;
        }

        findings.extend(pairwise_findings(endpoint, &participants));

        if let Some(finding) = equality_finding(endpoint, &participants) {
            findings.push(finding);
        }
    }

    findings
}

fn pairwise_findings(endpoint: &Endpoint, participants: &[Participant]) -> Vec<DifferentialFinding> {
    let mut findings = Vec::new();

    for (i, a) in participants.iter().enumerate() {
        for b in &participants[i + 1..] {
            let (higher, lower) = if a.role.outranks(&b.role) {
                (a, b)
            } else if b.role.outranks(&a.role) {
                (b, a)
            } else {
                continue;
            };

            let kind = match (higher.decision, lower.decision) {
                (Decision::Deny, Decision::Allow) => FindingKind::InvertedPrivilege,
                (Decision::Allow, Decision::Allow) => FindingKind::SameAccess,
                _ => continue,
            };

            let reason = match kind {
                FindingKind::InvertedPrivilege => format!(
                    "Inverted privilege hierarchy: '{}' is allowed where more privileged '{}' is denied",
                    lower.role.name, higher.role.name
                ),
                _ => format!(
                    "Lower privilege role '{}' has same access as '{}'",
                    lower.role.name, higher.role.name
                ),
            };

            findings.push(finding(endpoint, kind, &[higher, lower], reason));
        }
    }

    findings
}

fn equality_finding(endpoint: &Endpoint, participants: &[Participant]) -> Option<DifferentialFinding> {
    if participants.len() < EQUALITY_MIN_ROLES {
        return None;
    }

    if !participants.iter().all(|p| p.decision == Decision::Allow) {
        return None;
    }

    let all: Vec<&Participant> = participants.iter().collect();
    Some(finding(
        endpoint,
        FindingKind::SuspiciousEquality,
        &all,
        "All roles have identical access".to_string(),
    ))
}

fn finding(
    endpoint: &Endpoint,
    kind: FindingKind,
    roles: &[&Participant],
    reason: String,
) -> DifferentialFinding {
    DifferentialFinding {
        kind,
        endpoint: endpoint.name.clone(),
        method: endpoint.method,
        url: endpoint.url.clone(),
        roles_compared: roles.iter().map(|p| p.role.name.clone()).collect(),
        status_codes: roles
            .iter()
            .map(|p| (p.role.name.clone(), p.status))
            .collect::<RoleStatuses>(),
        severity: kind.severity(),
        reason,
    }
}
