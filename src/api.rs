// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::{self, AnalyzerConfig};
use crate::credentials::TokenStore;
use crate::http_client::{ConnectionCheck, HttpClient};
use crate::reporting::{console, ReportSummary};
use crate::scan::{self, ScanInputs};
use crate::types::{Endpoint, ExpectedMatrix, Report};

pub struct ApiState {
    pub config: AnalyzerConfig,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/scan", post(scan_handler))
        .route("/api/config", get(config_handler))
        .route("/api/test-connection", post(test_connection_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: AnalyzerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API listening on http://{}", addr);

    let router = create_router(Arc::new(ApiState { config }));
    axum::serve(listener, router).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ScanRequest {
    tokens: Option<serde_json::Value>,
    endpoints: Option<Vec<Endpoint>>,
    matrix: Option<ExpectedMatrix>,
    ranking: Option<Vec<String>>,
    #[serde(default)]
    run_diff: bool,
    proxy: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScanResponse {
    success: bool,
    scanned_at: String,
    output: String,
    report: Report,
    summary: ReportSummary,
}

async fn scan_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, ApiError> {
    let tokens = request
        .tokens
        .ok_or_else(|| ApiError::BadRequest("Missing required field: tokens".to_string()))?;
    let endpoints = request
        .endpoints
        .ok_or_else(|| ApiError::BadRequest("Missing required field: endpoints".to_string()))?;

    let tokens = TokenStore::from_json_value(&tokens).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let base_url = request.base_url.or_else(|| state.config.base_url.clone());
    let catalog = config::prepare_catalog(endpoints, base_url.as_deref())
        .map_err(|e| ApiError::BadRequest(format!("{:#}", e)))?;

    let (matrix, file_ranking) = match request.matrix {
        Some(matrix) => (matrix, Vec::new()),
        None => {
            let file = scan::load_matrix_or_empty(&state.config.inputs.matrix)
                .map_err(|e| ApiError::InternalError(format!("{:#}", e)))?;
            (file.matrix, file.ranking)
        }
    };

    let ranking = config::resolve_ranking(
        request.ranking.as_deref(),
        &state.config.ranking,
        &file_ranking,
    )
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut http = state.config.http.clone();
    if let Some(proxy) = request.proxy {
        http.proxy = Some(proxy);
    }
    let client = HttpClient::new(&http).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let inputs = ScanInputs::new(catalog, tokens, matrix, ranking);
    info!(
        roles = inputs.tokens.len(),
        endpoints = inputs.catalog.len(),
        differential = request.run_diff,
        "Scan requested"
    );

    let outcome = scan::run_scan(&client, &inputs, request.run_diff, http.concurrency)
        .await
        .map_err(|e| {
            error!("Scan failed: {}", e);
            ApiError::InternalError(e.to_string())
        })?;

    Ok(Json(ScanResponse {
        success: true,
        scanned_at: chrono::Utc::now().to_rfc3339(),
        output: console::render(&outcome.report, &outcome.summary, request.run_diff),
        report: outcome.report,
        summary: outcome.summary,
    }))
}

/// Default inputs from the configured paths; missing files are left out
async fn config_handler(State(state): State<Arc<ApiState>>) -> Result<impl IntoResponse, ApiError> {
    let inputs = &state.config.inputs;
    let mut body = serde_json::Map::new();

    if inputs.tokens.exists() {
        let tokens: serde_json::Value =
            config::read_file(&inputs.tokens).map_err(|e| ApiError::InternalError(format!("{:#}", e)))?;
        body.insert("tokens".to_string(), tokens);
    }

    if inputs.endpoints.exists() {
        let file: config::EndpointsFile = config::read_file(&inputs.endpoints)
            .map_err(|e| ApiError::InternalError(format!("{:#}", e)))?;
        body.insert("endpoints".to_string(), serde_json::to_value(file.endpoints).map_err(internal)?);
    }

    if inputs.matrix.exists() {
        let file = config::load_matrix(&inputs.matrix)
            .map_err(|e| ApiError::InternalError(format!("{:#}", e)))?;
        body.insert("matrix".to_string(), serde_json::to_value(file.matrix).map_err(internal)?);
    }

    Ok(Json(serde_json::Value::Object(body)))
}

#[derive(Debug, Deserialize)]
struct TestConnectionRequest {
    url: Option<String>,
    token: Option<String>,
}

async fn test_connection_handler(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<TestConnectionRequest>,
) -> Result<Json<ConnectionCheck>, ApiError> {
    let (Some(url), Some(token)) = (request.url, request.token) else {
        return Err(ApiError::BadRequest("Missing url or token".to_string()));
    };

    let client = HttpClient::new(&state.config.http).map_err(internal)?;
    let check = client
        .test_connection(&url, Some(&token))
        .await
        .map_err(internal)?;

    Ok(Json(check))
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

fn internal<E: std::fmt::Display>(err: E) -> ApiError {
    ApiError::InternalError(err.to_string())
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
