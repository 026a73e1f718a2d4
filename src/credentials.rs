// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bearer tokens per role
//!
//! Tokens come either from a `tokens.json` object (`{"<role>": "<token>"}`,
//! declaration order kept) or from an OpenID Connect token endpoint using the
//! resource-owner password grant.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use crate::config::{HttpConfig, IdentityProviderConfig, UserCredentials};
use crate::errors::{AnalyzerError, AnalyzerResult, TransportError};

/// Ordered role -> bearer token map
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenStore {
    tokens: Vec<(String, String)>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token for a role; a repeated role keeps its position
    pub fn insert(&mut self, role: &str, token: &str) {
        match self.tokens.iter_mut().find(|(r, _)| r == role) {
            Some(entry) => entry.1 = token.to_string(),
            None => self.tokens.push((role.to_string(), token.to_string())),
        }
    }

    pub fn get(&self, role: &str) -> Option<&str> {
        self.tokens
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, t)| t.as_str())
    }

    pub fn contains(&self, role: &str) -> bool {
        self.get(role).is_some()
    }

    /// Roles in declaration order
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|(r, _)| r.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens.iter().map(|(r, t)| (r.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Build from a JSON object of role -> token strings
    pub fn from_json_value(value: &serde_json::Value) -> AnalyzerResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            AnalyzerError::Credentials("tokens must be a JSON object of role -> token".to_string())
        })?;

        let mut store = Self::new();
        for (role, token) in object {
            let token = token.as_str().ok_or_else(|| {
                AnalyzerError::Credentials(format!("token for role '{}' must be a string", role))
            })?;
            if role.trim().is_empty() {
                return Err(AnalyzerError::Credentials("empty role name in tokens".to_string()));
            }
            if token.trim().is_empty() {
                return Err(AnalyzerError::Credentials(format!(
                    "token for role '{}' is empty",
                    role
                )));
            }
            store.insert(role, token.trim());
        }

        Ok(store)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tokens file: {:?}", path))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {:?}", path))?;
        let store = Self::from_json_value(&value)?;

        info!(roles = store.len(), "Loaded tokens from {:?}", path);
        Ok(store)
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.tokens.iter().map(|(r, _)| (r, "[REDACTED]")))
            .finish()
    }
}

impl FromIterator<(String, String)> for TokenStore {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut store = Self::new();
        for (role, token) in iter {
            store.insert(&role, &token);
        }
        store
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Obtains tokens from an OpenID Connect provider with the password grant
pub struct PasswordGrantProvider {
    client: reqwest::Client,
    config: IdentityProviderConfig,
}

impl PasswordGrantProvider {
    pub fn new(config: IdentityProviderConfig, http: &HttpConfig) -> AnalyzerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(http.timeout())
            .danger_accept_invalid_certs(http.accept_invalid_certs)
            .user_agent(http.user_agent.as_str())
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub async fn fetch_token(&self, user: &UserCredentials) -> AnalyzerResult<String> {
        let mut form = vec![
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("username", user.username.as_str()),
            ("password", user.password.as_str()),
        ];
        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalyzerError::Credentials(format!(
                "token request for '{}' (role '{}') rejected with HTTP {}",
                user.username,
                user.role,
                status.as_u16()
            )));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            AnalyzerError::Credentials(format!(
                "token response for '{}' has no access_token: {}",
                user.username, e
            ))
        })?;

        debug!(role = %user.role, username = %user.username, "Token acquired");
        Ok(body.access_token)
    }

    /// Acquire a token for every configured user, in configuration order
    pub async fn acquire_all(&self) -> AnalyzerResult<TokenStore> {
        let mut store = TokenStore::new();
        for user in &self.config.users {
            let token = self.fetch_token(user).await?;
            store.insert(&user.role, &token);
        }

        info!(
            roles = store.len(),
            token_url = %self.config.token_url,
            "Acquired tokens from identity provider"
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_keep_file_order() {
        let value: serde_json::Value =
            serde_json::from_str(r#"{"user": "u-tok", "admin": "a-tok", "manager": "m-tok"}"#)
                .unwrap();

        let store = TokenStore::from_json_value(&value).unwrap();

        assert_eq!(store.roles().collect::<Vec<_>>(), vec!["user", "admin", "manager"]);
        assert_eq!(store.get("admin"), Some("a-tok"));
        assert_eq!(store.get("guest"), None);
    }

    #[test]
    fn test_non_string_token_rejected() {
        let value = serde_json::json!({"admin": 42});
        assert!(matches!(
            TokenStore::from_json_value(&value),
            Err(AnalyzerError::Credentials(_))
        ));

        let value = serde_json::json!({"admin": "  "});
        assert!(TokenStore::from_json_value(&value).is_err());

        let value = serde_json::json!(["admin"]);
        assert!(TokenStore::from_json_value(&value).is_err());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let mut store = TokenStore::new();
        store.insert("admin", "eyJhbGciOi.secret");

        let debug = format!("{:?}", store);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut store = TokenStore::new();
        store.insert("admin", "one");
        store.insert("user", "two");
        store.insert("admin", "three");

        assert_eq!(
            store.iter().collect::<Vec<_>>(),
            vec![("admin", "three"), ("user", "two")]
        );
    }
}
