// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use std::collections::HashSet;
use validator::Validate;

use super::core::{AnalyzerConfig, IdentityProviderConfig};
use crate::types::Endpoint;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_config(config: &AnalyzerConfig) -> Result<()> {
        config.validate().context("Configuration validation failed")?;
        config.http.validate().context("HTTP configuration validation failed")?;
        config.server.validate().context("Server configuration validation failed")?;

        if let Some(proxy) = &config.http.proxy {
            if proxy.trim().is_empty() {
                return Err(anyhow::anyhow!("Proxy URL cannot be empty"));
            }
        }

        if config.http.user_agent.is_empty() {
            return Err(anyhow::anyhow!("User agent cannot be empty"));
        }

        Self::validate_ranking(&config.ranking)?;

        if let Some(provider) = &config.identity_provider {
            Self::validate_identity_provider(provider)?;
        }

        Ok(())
    }

    /// Ranking entries must be non-empty and listed once
    pub fn validate_ranking(ranking: &[String]) -> Result<()> {
        let mut seen = HashSet::new();
        for role in ranking {
            if role.trim().is_empty() {
                return Err(anyhow::anyhow!("Ranking contains an empty role name"));
            }
            if !seen.insert(role.as_str()) {
                return Err(anyhow::anyhow!("Role '{}' appears twice in the ranking", role));
            }
        }
        Ok(())
    }

    pub fn validate_identity_provider(provider: &IdentityProviderConfig) -> Result<()> {
        provider
            .validate()
            .context("Identity provider validation failed")?;

        let mut roles = HashSet::new();
        for user in &provider.users {
            if user.role.is_empty() || user.username.is_empty() {
                return Err(anyhow::anyhow!(
                    "Identity provider users need both a role and a username"
                ));
            }
            if !roles.insert(user.role.as_str()) {
                return Err(anyhow::anyhow!(
                    "Role '{}' is mapped to more than one identity provider user",
                    user.role
                ));
            }
        }

        Ok(())
    }

    /// Catalog checks that need the whole list: names present and unique,
    /// URLs absolute http(s).
    pub fn validate_catalog(endpoints: &[Endpoint]) -> Result<()> {
        let mut names = HashSet::new();

        for endpoint in endpoints {
            if endpoint.name.trim().is_empty() {
                return Err(anyhow::anyhow!("Endpoint with URL '{}' has no name", endpoint.url));
            }

            if !names.insert(endpoint.name.as_str()) {
                return Err(anyhow::anyhow!(
                    "Endpoint '{}' is declared more than once",
                    endpoint.name
                ));
            }

            let url = url::Url::parse(&endpoint.url).with_context(|| {
                format!("Endpoint '{}' has an invalid URL: {}", endpoint.name, endpoint.url)
            })?;

            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(anyhow::anyhow!(
                    "Endpoint '{}' must use http or https, got {}",
                    endpoint.name,
                    url.scheme()
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::core::UserCredentials;
    use crate::types::HttpMethod;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ConfigValidator::validate_config(&AnalyzerConfig::default()).is_ok());
    }

    #[test]
    fn test_duplicate_ranking_rejected() {
        let ranking = vec!["admin".to_string(), "user".to_string(), "admin".to_string()];
        let err = ConfigValidator::validate_ranking(&ranking).unwrap_err();
        assert!(err.to_string().contains("appears twice"));
    }

    #[test]
    fn test_catalog_rejects_duplicates_and_bad_urls() {
        let dup = vec![
            Endpoint::new("get_users", HttpMethod::Get, "http://api/users"),
            Endpoint::new("get_users", HttpMethod::Get, "http://api/users?page=2"),
        ];
        assert!(ConfigValidator::validate_catalog(&dup).is_err());

        let relative = vec![Endpoint::new("get_users", HttpMethod::Get, "/api/users")];
        assert!(ConfigValidator::validate_catalog(&relative).is_err());

        let ftp = vec![Endpoint::new("files", HttpMethod::Get, "ftp://files.local/")];
        assert!(ConfigValidator::validate_catalog(&ftp).is_err());

        let ok = vec![Endpoint::new("get_users", HttpMethod::Get, "http://localhost:5000/api/users")];
        assert!(ConfigValidator::validate_catalog(&ok).is_ok());
    }

    #[test]
    fn test_identity_provider_role_mapped_once() {
        let user = |role: &str, name: &str| UserCredentials {
            role: role.to_string(),
            username: name.to_string(),
            password: "pw".to_string(),
        };
        let provider = IdentityProviderConfig {
            token_url: "http://localhost:8080/realms/bac/protocol/openid-connect/token".to_string(),
            client_id: "bac-client".to_string(),
            client_secret: None,
            users: vec![user("admin", "admin_user"), user("admin", "other_admin")],
        };

        assert!(ConfigValidator::validate_identity_provider(&provider).is_err());
    }
}
