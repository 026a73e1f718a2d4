// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub inputs: InputPaths,

    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Privilege order, most privileged role first
    #[serde(default)]
    pub ranking: Vec<String>,

    /// Joined onto endpoint URLs that start with `/`
    #[validate(url)]
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub differential: bool,

    #[serde(default)]
    pub identity_provider: Option<IdentityProviderConfig>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HttpConfig {
    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Extra attempts for probes that never reached the server
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    #[validate(range(min = 1, max = 256))]
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub proxy: Option<String>,

    #[serde(default)]
    pub accept_invalid_certs: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputPaths {
    #[serde(default = "default_tokens_path")]
    pub tokens: PathBuf,

    #[serde(default = "default_endpoints_path")]
    pub endpoints: PathBuf,

    #[serde(default = "default_matrix_path")]
    pub matrix: PathBuf,
}

/// OpenID Connect provider used to obtain bearer tokens with the password grant
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IdentityProviderConfig {
    #[validate(url)]
    pub token_url: String,

    #[validate(length(min = 1))]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[validate(length(min = 1))]
    pub users: Vec<UserCredentials>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    pub role: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("role", &self.role)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    #[serde(default = "default_host")]
    pub host: String,

    #[validate(range(min = 1))]
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            inputs: InputPaths::default(),
            output: default_output(),
            ranking: Vec::new(),
            base_url: None,
            differential: false,
            identity_provider: None,
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            concurrency: default_concurrency(),
            proxy: None,
            accept_invalid_certs: false,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            tokens: default_tokens_path(),
            endpoints: default_endpoints_path(),
            matrix: default_matrix_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    2
}

fn default_concurrency() -> usize {
    4
}

fn default_user_agent() -> String {
    format!("bac-analyzer/{}", env!("CARGO_PKG_VERSION"))
}

fn default_output() -> PathBuf {
    PathBuf::from("report.json")
}

fn default_tokens_path() -> PathBuf {
    PathBuf::from("tokens.json")
}

fn default_endpoints_path() -> PathBuf {
    PathBuf::from("endpoints.yaml")
}

fn default_matrix_path() -> PathBuf {
    PathBuf::from("authorization_matrix.yaml")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: AnalyzerConfig = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.http.max_retries, 2);
        assert_eq!(config.http.concurrency, 4);
        assert!(!config.http.accept_invalid_certs);
        assert_eq!(config.inputs.tokens, PathBuf::from("tokens.json"));
        assert_eq!(config.inputs.matrix, PathBuf::from("authorization_matrix.yaml"));
        assert_eq!(config.output, PathBuf::from("report.json"));
        assert!(!config.differential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config: AnalyzerConfig = toml::from_str("[http]\ntimeout_secs = 0\n").unwrap();
        assert!(config.http.validate().is_err());
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let user = UserCredentials {
            role: "admin".to_string(),
            username: "admin_user".to_string(),
            password: "s3cret".to_string(),
        };
        let debug = format!("{:?}", user);
        assert!(debug.contains("admin_user"));
        assert!(!debug.contains("s3cret"));
    }
}
