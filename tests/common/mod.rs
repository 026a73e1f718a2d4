// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Mock of the lab API: admin and manager may list and delete users (the
//! delete is the planted flaw), only admin may read another user's profile.

#![allow(dead_code)]

use bac_analyzer::credentials::TokenStore;
use bac_analyzer::types::{Endpoint, ExpectedDecision, ExpectedMatrix, HttpMethod, RoleRanking};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const ROLES: [(&str, &str); 3] = [
    ("admin", "admin-token"),
    ("manager", "manager-token"),
    ("user", "user-token"),
];

pub fn tokens() -> TokenStore {
    ROLES
        .iter()
        .map(|(role, token)| (role.to_string(), token.to_string()))
        .collect()
}

pub fn ranking() -> RoleRanking {
    RoleRanking::new(["admin", "manager", "user"])
}

pub fn catalog(base: &str) -> Vec<Endpoint> {
    vec![
        Endpoint::new("get_users", HttpMethod::Get, &format!("{}/api/users", base)),
        Endpoint::new(
            "get_profile_admin",
            HttpMethod::Get,
            &format!("{}/api/profile/admin_user", base),
        ),
        Endpoint::new("delete_user", HttpMethod::Delete, &format!("{}/api/users/3", base)),
    ]
}

pub fn matrix() -> ExpectedMatrix {
    ExpectedMatrix::new()
        .with_entry("admin", "delete_user", ExpectedDecision::Allow)
        .with_entry("manager", "delete_user", ExpectedDecision::Deny)
        .with_entry("user", "delete_user", ExpectedDecision::Deny)
        .with_entry("manager", "get_users", ExpectedDecision::Allow)
        .with_entry("user", "get_users", ExpectedDecision::Deny)
        .with_entry("manager", "get_profile_admin", ExpectedDecision::Deny)
}

async fn route(server: &MockServer, verb: &str, route: &str, token: &str, status: u16) {
    Mock::given(method(verb))
        .and(path(route))
        .and(header("Authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub async fn lab_server() -> MockServer {
    let server = MockServer::start().await;

    route(&server, "GET", "/api/users", "admin-token", 200).await;
    route(&server, "GET", "/api/users", "manager-token", 200).await;
    route(&server, "GET", "/api/users", "user-token", 403).await;

    route(&server, "GET", "/api/profile/admin_user", "admin-token", 200).await;
    route(&server, "GET", "/api/profile/admin_user", "manager-token", 403).await;
    route(&server, "GET", "/api/profile/admin_user", "user-token", 403).await;

    route(&server, "DELETE", "/api/users/3", "admin-token", 200).await;
    route(&server, "DELETE", "/api/users/3", "manager-token", 200).await;
    route(&server, "DELETE", "/api/users/3", "user-token", 403).await;

    server
}
