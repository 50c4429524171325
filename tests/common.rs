//! Test helper utilities for foundry-responses integration tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use chrono::{Duration, Utc};
use foundry_responses::{AccessToken, Credential, FoundryResult, TokenCredential};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::ResponseTemplate;

pub const TEST_API_KEY: &str = "test-foundry-key";

/// Responses API body with one message containing `text`.
pub fn response_body(text: &str, status: &str, output_tokens: u64) -> serde_json::Value {
    serde_json::json!({
        "id": "resp_0123",
        "object": "response",
        "created_at": 1_741_476_542,
        "model": "gpt-4.1-mini",
        "status": status,
        "output": [{
            "type": "message",
            "id": "msg_0123",
            "role": "assistant",
            "status": "completed",
            "content": [{ "type": "output_text", "text": text, "annotations": [] }]
        }],
        "usage": {
            "input_tokens": 11,
            "output_tokens": output_tokens,
            "total_tokens": 11 + output_tokens
        }
    })
}

pub fn success_response(text: &str, output_tokens: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(response_body(text, "completed", output_tokens))
}

pub fn error_response(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(serde_json::json!({
        "error": { "code": code, "message": message }
    }))
}

pub fn api_key() -> Credential {
    Credential::ApiKey(TEST_API_KEY.to_string())
}

/// Token credential returning a fixed token and counting calls.
#[derive(Debug, Clone)]
pub struct FixedTokenCredential {
    pub token: String,
    pub calls: Arc<AtomicUsize>,
}

impl FixedTokenCredential {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TokenCredential for FixedTokenCredential {
    fn name(&self) -> &'static str {
        "FixedTokenCredential"
    }

    async fn get_token(&self, _scope: &str) -> FoundryResult<AccessToken> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new(
            self.token.clone(),
            Utc::now() + Duration::hours(1),
        ))
    }
}
