//! Foundry Responses API client
//!
//! [`ConnectionConfig`] fixes where requests go and how they are authorised;
//! [`FoundryClient`] issues one `POST /responses` per [`InferenceRequest`].

use crate::credential::Credential;
use crate::error::{FoundryError, FoundryResult};
use crate::logging::{log_debug, log_error, log_warn};
use crate::types::{ErrorEnvelope, InferenceRequest, InferenceResponse, ResponseObject, ResponseStatus};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::collections::BTreeMap;
use std::time::Instant;

/// Path appended to a Foundry endpoint to reach the OpenAI-compatible v1 API.
pub const OPENAI_PATH_SUFFIX: &str = "/openai/v1";

const USER_AGENT: &str = concat!("foundry-responses/", env!("CARGO_PKG_VERSION"));

/// Endpoint with every trailing `/` removed, plus [`OPENAI_PATH_SUFFIX`].
pub fn resolve_base_url(endpoint: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), OPENAI_PATH_SUFFIX)
}

/// Immutable connection settings for one run.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub base_endpoint: String,
    pub resolved_base_url: String,
    pub credential: Credential,
    /// Merged into the query string of every request.
    pub extra_query_params: BTreeMap<String, String>,
}

impl ConnectionConfig {
    /// # Errors
    ///
    /// Returns [`FoundryError::ConfigurationError`] if the endpoint is empty.
    pub fn new(
        endpoint: impl Into<String>,
        credential: Credential,
        extra_query_params: BTreeMap<String, String>,
    ) -> FoundryResult<Self> {
        let base_endpoint = endpoint.into();
        if base_endpoint.trim().trim_end_matches('/').is_empty() {
            return Err(FoundryError::configuration_error("Endpoint must not be empty"));
        }

        Ok(Self {
            resolved_base_url: resolve_base_url(&base_endpoint),
            base_endpoint,
            credential,
            extra_query_params,
        })
    }

    /// Adds one query parameter sent with every request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_query_params.insert(key.into(), value.into());
        self
    }
}

/// HTTP client bound to one [`ConnectionConfig`].
///
/// Read-only after construction; reuse it for sequential calls.
#[derive(Debug)]
pub struct FoundryClient {
    http: reqwest::Client,
    config: ConnectionConfig,
}

impl FoundryClient {
    /// Build the client. Performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns [`FoundryError::ConfigurationError`] if:
    /// - The credential cannot be carried in an HTTP header
    /// - The underlying HTTP client fails to initialise
    pub fn new(config: ConnectionConfig) -> FoundryResult<Self> {
        let headers = Self::build_default_headers(&config.credential)?;

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                FoundryError::configuration_error(format!("Failed to build HTTP client: {e}"))
            })?;

        log_debug!(
            base_url = %config.resolved_base_url,
            credential_kind = config.credential.kind(),
            query_params = ?config.extra_query_params.keys().collect::<Vec<_>>(),
            "Foundry client configured"
        );

        Ok(Self { http, config })
    }

    /// Authorization and content-type headers for every request.
    fn build_default_headers(credential: &Credential) -> FoundryResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.secret()))
            .map_err(|e| FoundryError::configuration_error(format!("Invalid credential format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        Ok(headers)
    }

    pub fn base_url(&self) -> &str {
        &self.config.resolved_base_url
    }

    pub fn connection(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Issue exactly one create-response call. No retries.
    ///
    /// # Errors
    ///
    /// - [`FoundryError::RequestFailed`] on transport failure or a non-success status
    /// - [`FoundryError::AuthenticationFailed`] on 401/403
    /// - [`FoundryError::ResponseParsingError`] if the body cannot be decoded
    pub async fn create_response(
        &self,
        request: &InferenceRequest,
    ) -> FoundryResult<InferenceResponse> {
        let url = format!("{}/responses", self.config.resolved_base_url);

        log_debug!(
            url = %url,
            model = %request.model,
            max_output_tokens = request.max_output_tokens,
            "Sending create-response request"
        );

        let mut builder = self.http.post(&url).json(request);
        if !self.config.extra_query_params.is_empty() {
            builder = builder.query(&self.config.extra_query_params);
        }

        let start_time = Instant::now();
        let response = builder.send().await.map_err(|e| {
            FoundryError::request_failed(format!("could not reach {url}"), Some(Box::new(e)))
        })?;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        if !response.status().is_success() {
            return Err(handle_error_response(response).await);
        }

        let object = parse_success_response(response).await?;
        let parsed = InferenceResponse::from(object);

        log_debug!(
            model = %request.model,
            response_id = parsed.id.as_deref().unwrap_or_default(),
            status = %parsed.status,
            input_tokens = parsed.input_token_count,
            output_tokens = parsed.output_token_count,
            duration_ms = duration_ms,
            "Create-response request completed"
        );
        warn_on_unfinished(&parsed);

        Ok(parsed)
    }
}

/// A completed HTTP call can still carry a failed or truncated generation.
fn warn_on_unfinished(response: &InferenceResponse) {
    match response.status {
        ResponseStatus::Failed => log_warn!(
            response_id = response.id.as_deref().unwrap_or_default(),
            error = response.error_message.as_deref().unwrap_or_default(),
            "Service reported a failed generation"
        ),
        ResponseStatus::Incomplete => log_warn!(
            response_id = response.id.as_deref().unwrap_or_default(),
            reason = response.incomplete_reason.as_deref().unwrap_or_default(),
            "Generation stopped before completion"
        ),
        _ => {}
    }
}

/// Handle non-success HTTP responses
async fn handle_error_response(response: reqwest::Response) -> FoundryError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    log_error!(status = %status, error_text = %error_text, "API error response");

    let detail = serde_json::from_str::<ErrorEnvelope>(&error_text)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or(error_text);

    match status.as_u16() {
        401 | 403 => FoundryError::authentication_failed(status.as_u16(), detail),
        _ => FoundryError::request_failed(format!("API error {status}: {detail}"), None),
    }
}

/// Parse successful HTTP response into a ResponseObject
async fn parse_success_response(response: reqwest::Response) -> FoundryResult<ResponseObject> {
    let raw_body = response.text().await.map_err(|e| {
        log_error!(error = %e, "Failed to read response body");
        FoundryError::response_parsing_error(format!("Failed to read response: {e}"))
    })?;

    serde_json::from_str(&raw_body).map_err(|e| {
        log_error!(error = %e, raw_body = %raw_body, "Failed to parse response");
        FoundryError::response_parsing_error(format!("Invalid response: {e}"))
    })
}
