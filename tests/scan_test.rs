// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Scan Pipeline Tests
 * End-to-end probing against a mocked lab API
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

mod common;

use bac_analyzer::config::HttpConfig;
use bac_analyzer::decision::{Decision, ProbeStatus};
use bac_analyzer::http_client::HttpClient;
use bac_analyzer::scan::{self, ScanInputs};
use bac_analyzer::types::{
    Endpoint, ExpectedDecision, ExpectedMatrix, FindingKind, HttpMethod, RoleRanking, Severity,
};

fn client() -> HttpClient {
    HttpClient::new(&HttpConfig {
        timeout_secs: 5,
        max_retries: 0,
        ..HttpConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_lab_scan_finds_manager_delete() {
    let server = common::lab_server().await;
    let inputs = ScanInputs::new(
        common::catalog(&server.uri()),
        common::tokens(),
        common::matrix(),
        common::ranking(),
    );

    let outcome = scan::run_scan(&client(), &inputs, false, 4).await.unwrap();

    assert_eq!(outcome.report.matrix_mismatches.len(), 1);
    let mismatch = &outcome.report.matrix_mismatches[0];
    assert_eq!(mismatch.role, "manager");
    assert_eq!(mismatch.endpoint, "delete_user");
    assert_eq!(mismatch.expected, ExpectedDecision::Deny);
    assert_eq!(mismatch.actual, Decision::Allow);
    assert_eq!(mismatch.status, 200);

    assert!(outcome.report.differential_findings.is_empty());
    assert_eq!(outcome.summary.matrix_checks, 6);
    assert_eq!(outcome.summary.mismatches, 1);
}

#[tokio::test]
async fn test_lab_scan_differential() {
    let server = common::lab_server().await;
    let inputs = ScanInputs::new(
        common::catalog(&server.uri()),
        common::tokens(),
        common::matrix(),
        common::ranking(),
    );

    let outcome = scan::run_scan(&client(), &inputs, true, 4).await.unwrap();

    // Every role probes every endpoint in differential mode
    assert_eq!(outcome.observations.len(), 9);
    assert_eq!(outcome.report.matrix_mismatches.len(), 1);

    let findings = &outcome.report.differential_findings;
    assert_eq!(findings.len(), 2);

    assert_eq!(findings[0].endpoint, "get_users");
    assert_eq!(findings[0].kind, FindingKind::SameAccess);
    assert_eq!(findings[0].severity, Severity::High);
    assert_eq!(findings[0].roles_compared, vec!["admin", "manager"]);

    assert_eq!(findings[1].endpoint, "delete_user");
    assert_eq!(findings[1].method, HttpMethod::Delete);
    assert_eq!(findings[1].kind, FindingKind::SameAccess);
    assert_eq!(findings[1].status_codes.get("manager"), Some(200));

    assert_eq!(outcome.summary.high, 2);
    assert_eq!(outcome.summary.critical, 0);
}

#[tokio::test]
async fn test_mutating_probes_run_least_privileged_first() {
    let server = common::lab_server().await;
    let inputs = ScanInputs::new(
        common::catalog(&server.uri()),
        common::tokens(),
        ExpectedMatrix::new(),
        common::ranking(),
    );

    scan::run_scan(&client(), &inputs, true, 8).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 9);

    let deletes: Vec<String> = requests
        .iter()
        .filter(|r| r.method.as_str() == "DELETE")
        .filter_map(|r| r.headers.get("authorization"))
        .filter_map(|v| v.to_str().ok().map(|s| s.to_string()))
        .collect();
    assert_eq!(
        deletes,
        vec!["Bearer user-token", "Bearer manager-token", "Bearer admin-token"]
    );

    // Read-only probes all come before the first mutating one
    let first_delete = requests
        .iter()
        .position(|r| r.method.as_str() == "DELETE")
        .unwrap();
    assert_eq!(first_delete, 6);
}

#[tokio::test]
async fn test_only_matrix_pairs_probed_without_differential() {
    let server = common::lab_server().await;
    let matrix = ExpectedMatrix::new().with_entry("user", "get_users", ExpectedDecision::Deny);
    let inputs = ScanInputs::new(
        common::catalog(&server.uri()),
        common::tokens(),
        matrix,
        common::ranking(),
    );

    let outcome = scan::run_scan(&client(), &inputs, false, 4).await.unwrap();

    assert_eq!(outcome.observations.len(), 1);
    assert!(outcome.report.matrix_mismatches.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_inverted_privilege_on_lab() {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    for (token, status) in [("admin-token", 403), ("manager-token", 200), ("user-token", 403)] {
        Mock::given(method("GET"))
            .and(path("/api/reports"))
            .and(header("Authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
    }

    let catalog = vec![Endpoint::new(
        "reports",
        HttpMethod::Get,
        &format!("{}/api/reports", server.uri()),
    )];
    let inputs = ScanInputs::new(catalog, common::tokens(), ExpectedMatrix::new(), common::ranking());

    let outcome = scan::run_scan(&client(), &inputs, true, 2).await.unwrap();
    let findings = &outcome.report.differential_findings;

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::InvertedPrivilege);
    assert_eq!(findings[0].severity, Severity::Critical);
    assert_eq!(findings[0].roles_compared, vec!["admin", "manager"]);
}

#[tokio::test]
async fn test_unreachable_target_is_recorded_as_error() {
    // Reserve a port, then free it so nothing is listening there
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let catalog = vec![Endpoint::new(
        "get_users",
        HttpMethod::Get,
        &format!("http://127.0.0.1:{}/api/users", port),
    )];
    let inputs = ScanInputs::new(
        catalog,
        common::tokens(),
        ExpectedMatrix::new().with_entry("user", "get_users", ExpectedDecision::Deny),
        common::ranking(),
    );

    let outcome = scan::run_scan(&client(), &inputs, true, 4).await.unwrap();

    assert_eq!(outcome.observations.len(), 3);
    assert!(outcome
        .observations
        .iter()
        .all(|o| o.status == ProbeStatus::Failed && o.decision == Decision::Error));
    assert!(outcome.report.matrix_mismatches.is_empty());
    assert!(outcome.report.differential_findings.is_empty());
    assert_eq!(outcome.summary.errored_checks, 3);
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/login"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let catalog = vec![Endpoint::new(
        "get_users",
        HttpMethod::Get,
        &format!("{}/api/users", server.uri()),
    )];
    let matrix = ExpectedMatrix::new().with_entry("user", "get_users", ExpectedDecision::Deny);
    let inputs = ScanInputs::new(catalog, common::tokens(), matrix, RoleRanking::default());

    let outcome = scan::run_scan(&client(), &inputs, false, 1).await.unwrap();
    let observed = outcome.observations.get("user", "get_users").unwrap();

    assert_eq!(observed.status, ProbeStatus::Code(302));
    assert_eq!(observed.decision, Decision::Error);
    assert!(outcome.report.matrix_mismatches.is_empty());
}

#[tokio::test]
async fn test_unranked_report_follows_token_order_not_completion_order() {
    use bac_analyzer::credentials::TokenStore;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    for (token, delay_ms) in [("token-a", 400), ("token-b", 0), ("token-c", 0)] {
        Mock::given(method("GET"))
            .and(path("/api/items"))
            .and(header("Authorization", format!("Bearer {}", token).as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(&server)
            .await;
    }

    let tokens: TokenStore = [("a", "token-a"), ("b", "token-b"), ("c", "token-c")]
        .into_iter()
        .map(|(role, token)| (role.to_string(), token.to_string()))
        .collect();
    let catalog = vec![Endpoint::new(
        "get_items",
        HttpMethod::Get,
        &format!("{}/api/items", server.uri()),
    )];
    let matrix = ExpectedMatrix::new()
        .with_entry("c", "get_items", ExpectedDecision::Deny)
        .with_entry("a", "get_items", ExpectedDecision::Deny)
        .with_entry("b", "get_items", ExpectedDecision::Deny);
    let inputs = ScanInputs::new(catalog, tokens, matrix, RoleRanking::default());

    let outcome = scan::run_scan(&client(), &inputs, true, 3).await.unwrap();

    let mismatch_roles: Vec<&str> = outcome
        .report
        .matrix_mismatches
        .iter()
        .map(|m| m.role.as_str())
        .collect();
    assert_eq!(mismatch_roles, vec!["a", "b", "c"]);

    let findings = &outcome.report.differential_findings;
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::SuspiciousEquality);
    assert_eq!(findings[0].roles_compared, vec!["a", "b", "c"]);
}
