//! Test helper utilities for foundry-responses unit tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

#![allow(dead_code)]

use crate::credential::AccessToken;
use crate::types::{InferenceResponse, ResponseStatus};
use chrono::{Duration, Utc};
use std::collections::HashMap;

/// Build an environment lookup from fixed pairs.
pub fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

/// A token valid for one hour.
pub fn test_token(value: &str) -> AccessToken {
    AccessToken::new(value, Utc::now() + Duration::hours(1))
}

/// A decoded response with the three reported fields set.
pub fn inference_response(text: &str, status: ResponseStatus, output_tokens: u64) -> InferenceResponse {
    InferenceResponse {
        id: Some("resp_test".to_string()),
        model: Some("gpt-4.1-mini".to_string()),
        output_text: text.to_string(),
        status,
        output_token_count: output_tokens,
        input_token_count: 0,
        total_token_count: output_tokens,
        incomplete_reason: None,
        error_message: None,
    }
}

/// Responses API body with one message containing `text`.
pub fn response_body(text: &str, status: &str, output_tokens: u64) -> serde_json::Value {
    serde_json::json!({
        "id": "resp_test",
        "object": "response",
        "model": "gpt-4.1-mini",
        "status": status,
        "output": [{
            "type": "message",
            "id": "msg_1",
            "role": "assistant",
            "status": "completed",
            "content": [{ "type": "output_text", "text": text, "annotations": [] }]
        }],
        "usage": {
            "input_tokens": 12,
            "output_tokens": output_tokens,
            "total_tokens": 12 + output_tokens
        }
    })
}
