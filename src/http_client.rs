// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::decision::ProbeStatus;
use crate::errors::{AnalyzerResult, TransportError};
use crate::retry::{retry_refused, RetryPolicy};
use crate::types::{Endpoint, HttpMethod};

/// Idle connections kept per host between probes
const DEFAULT_POOL_IDLE_PER_HOST: usize = 8;

/// Response of a single connectivity check.
///
/// `success` means the target answered at all, whatever the status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionCheck {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub success: bool,
}

#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> AnalyzerResult<Self> {
        if config.accept_invalid_certs {
            warn!("Certificate validation is DISABLED, only use this against lab targets");
        }

        // Redirects are not followed: a 3xx is reported as observed
        let mut builder = Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(DEFAULT_POOL_IDLE_PER_HOST)
            .tcp_nodelay(true);

        if let Some(proxy) = &config.proxy {
            let proxy_url = normalize_proxy_url(proxy);
            let proxy = reqwest::Proxy::all(&proxy_url).map_err(|e| TransportError::Proxy {
                reason: format!("{}: {}", proxy_url, e),
            })?;
            debug!(proxy = %proxy_url, "Routing probes through proxy");
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            timeout: config.timeout(),
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one authenticated request and return its status code
    pub async fn send(&self, endpoint: &Endpoint, token: &str) -> AnalyzerResult<u16> {
        Ok(self.send_once(endpoint, token).await?)
    }

    async fn send_once(&self, endpoint: &Endpoint, token: &str) -> Result<u16, TransportError> {
        let mut request = self
            .client
            .request(to_reqwest_method(endpoint.method), &endpoint.url)
            .bearer_auth(token);

        if let Some(body) = &endpoint.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        Ok(response.status().as_u16())
    }

    /// Probe an endpoint as one role.
    ///
    /// Any HTTP response is final. Refused connections are resent per the
    /// retry policy; anything left unresolved becomes `ProbeStatus::Failed`.
    pub async fn probe(&self, endpoint: &Endpoint, token: &str) -> ProbeStatus {
        match retry_refused(&self.retry, &endpoint.url, || self.send_once(endpoint, token)).await {
            Ok(status) => {
                debug!(
                    endpoint = %endpoint.name,
                    method = %endpoint.method,
                    status = status,
                    "Probe completed"
                );
                ProbeStatus::Code(status)
            }
            Err(err) => {
                warn!(
                    endpoint = %endpoint.name,
                    url = %endpoint.url,
                    error = %err,
                    "Probe failed without a response"
                );
                ProbeStatus::Failed
            }
        }
    }

    /// Single GET used to check that a target and token are reachable
    pub async fn test_connection(&self, url: &str, token: Option<&str>) -> AnalyzerResult<ConnectionCheck> {
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();

        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|value| (k.as_str().to_string(), value.to_string()))
            })
            .collect();

        Ok(ConnectionCheck {
            status_code: status.as_u16(),
            headers,
            success: true,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> TransportError {
        match TransportError::from(err) {
            TransportError::Timeout { url, .. } => TransportError::Timeout {
                url,
                timeout: self.timeout,
            },
            other => other,
        }
    }
}

/// Proxy addresses given as `host:port` default to plain http
pub fn normalize_proxy_url(proxy: &str) -> String {
    let proxy = proxy.trim();
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}
