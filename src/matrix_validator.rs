// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Matrix validation
//!
//! Compares observed decisions against the hand-authored expected matrix.

use crate::observation::ObservationSet;
use crate::types::{ExpectedMatrix, Mismatch};

/// Emit a mismatch for every observed pair that has an expectation, a usable
/// decision, and disagrees with the expectation.
///
/// Output follows endpoint declaration order, then role order. Pairs without
/// an expectation and `error` decisions are skipped silently.
pub fn validate(observations: &ObservationSet, expected: &ExpectedMatrix) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    for (endpoint, observed) in observations.by_endpoint() {
        for observation in observed {
            let Some(expectation) = expected.expectation(&observation.role.name, &endpoint.name)
            else {
                continue;
            };

            let Some(status) = observation.status.code() else {
                continue;
            };

            if !observation.is_usable() {
                continue;
            }

            if observation.decision != expectation.as_decision() {
                mismatches.push(Mismatch {
                    role: observation.role.name.clone(),
                    endpoint: endpoint.name.clone(),
                    expected: expectation,
                    actual: observation.decision,
                    status,
                });
            }
        }
    }

    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{Decision, ProbeStatus};
    use crate::types::{Endpoint, ExpectedDecision, HttpMethod, RoleRanking};

    fn observations(statuses: &[(&str, &str, ProbeStatus)]) -> ObservationSet {
        let catalog = vec![
            Endpoint::new("get_users", HttpMethod::Get, "http://api/users"),
            Endpoint::new("delete_user", HttpMethod::Delete, "http://api/users/1"),
        ];
        let mut set =
            ObservationSet::new(catalog, RoleRanking::new(["admin", "manager", "user"])).unwrap();
        for (role, endpoint, status) in statuses {
            set.record(role, endpoint, *status).unwrap();
        }
        set
    }

    #[test]
    fn test_delete_user_scenario() {
        let set = observations(&[
            ("admin", "delete_user", 200.into()),
            ("manager", "delete_user", 200.into()),
            ("user", "delete_user", 403.into()),
        ]);
        let matrix = ExpectedMatrix::new()
            .with_entry("admin", "delete_user", ExpectedDecision::Allow)
            .with_entry("manager", "delete_user", ExpectedDecision::Deny)
            .with_entry("user", "delete_user", ExpectedDecision::Deny);

        let mismatches = validate(&set, &matrix);

        assert_eq!(
            mismatches,
            vec![Mismatch {
                role: "manager".to_string(),
                endpoint: "delete_user".to_string(),
                expected: ExpectedDecision::Deny,
                actual: Decision::Allow,
                status: 200,
            }]
        );
    }

    #[test]
    fn test_missing_expectation_is_skipped() {
        let set = observations(&[("user", "get_users", 200.into())]);
        let matrix = ExpectedMatrix::new().with_entry("admin", "get_users", ExpectedDecision::Deny);

        assert!(validate(&set, &matrix).is_empty());
    }

    #[test]
    fn test_error_decisions_are_skipped() {
        let set = observations(&[
            ("user", "get_users", ProbeStatus::Failed),
            ("manager", "get_users", 500.into()),
            ("admin", "get_users", 404.into()),
        ]);
        let matrix = ExpectedMatrix::new()
            .with_entry("user", "get_users", ExpectedDecision::Allow)
            .with_entry("manager", "get_users", ExpectedDecision::Allow)
            .with_entry("admin", "get_users", ExpectedDecision::Allow);

        assert!(validate(&set, &matrix).is_empty());
    }

    #[test]
    fn test_order_follows_catalog_then_rank() {
        // Recorded in scrambled order on purpose
        let set = observations(&[
            ("user", "delete_user", 204.into()),
            ("user", "get_users", 200.into()),
            ("manager", "delete_user", 200.into()),
            ("admin", "get_users", 403.into()),
        ]);
        let matrix = ExpectedMatrix::new()
            .with_entry("user", "delete_user", ExpectedDecision::Deny)
            .with_entry("user", "get_users", ExpectedDecision::Deny)
            .with_entry("manager", "delete_user", ExpectedDecision::Deny)
            .with_entry("admin", "get_users", ExpectedDecision::Allow);

        let order: Vec<(String, String)> = validate(&set, &matrix)
            .into_iter()
            .map(|m| (m.endpoint, m.role))
            .collect();

        assert_eq!(
            order,
            vec![
                ("get_users".to_string(), "admin".to_string()),
                ("get_users".to_string(), "user".to_string()),
                ("delete_user".to_string(), "manager".to_string()),
                ("delete_user".to_string(), "user".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_is_idempotent() {
        let set = observations(&[
            ("admin", "get_users", 401.into()),
            ("user", "get_users", 200.into()),
        ]);
        let matrix = ExpectedMatrix::new()
            .with_entry("admin", "get_users", ExpectedDecision::Allow)
            .with_entry("user", "get_users", ExpectedDecision::Deny);

        let first = validate(&set, &matrix);
        let second = validate(&set, &matrix);
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_matching_decisions_produce_nothing() {
        let set = observations(&[
            ("admin", "delete_user", 204.into()),
            ("user", "delete_user", 401.into()),
        ]);
        let matrix = ExpectedMatrix::new()
            .with_entry("admin", "delete_user", ExpectedDecision::Allow)
            .with_entry("user", "delete_user", ExpectedDecision::Deny);

        assert!(validate(&set, &matrix).is_empty());
    }
}
