//! Request and response types for the Responses API
//!
//! Only the fields this crate populates or reads are modelled; everything
//! else in the service's payload is ignored on decode.

use crate::error::{FoundryError, FoundryResult};
use serde::{Deserialize, Deserializer, Serialize};

/// `null` decodes like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One independent, single-turn generation request.
///
/// Serialises as `{"model", "input", "max_output_tokens"}`. Sampling,
/// streaming and conversation fields are never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferenceRequest {
    pub model: String,
    #[serde(rename = "input")]
    pub prompt: String,
    pub max_output_tokens: u32,
}

impl InferenceRequest {
    /// # Errors
    ///
    /// Returns [`FoundryError::ConfigurationError`] when `max_output_tokens` is zero.
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        max_output_tokens: u32,
    ) -> FoundryResult<Self> {
        if max_output_tokens == 0 {
            return Err(FoundryError::configuration_error(
                "max_output_tokens must be greater than zero",
            ));
        }
        Ok(Self {
            model: model.into(),
            prompt: prompt.into(),
            max_output_tokens,
        })
    }
}

/// Provider-defined lifecycle state of a response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<String>")]
pub enum ResponseStatus {
    Completed,
    Incomplete,
    Failed,
    InProgress,
    Cancelled,
    Queued,
    /// A value this crate does not know, kept verbatim.
    Other(String),
}

impl From<String> for ResponseStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "completed" => Self::Completed,
            "incomplete" => Self::Incomplete,
            "failed" => Self::Failed,
            "in_progress" => Self::InProgress,
            "cancelled" => Self::Cancelled,
            "queued" => Self::Queued,
            _ => Self::Other(value),
        }
    }
}

impl From<Option<String>> for ResponseStatus {
    fn from(value: Option<String>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

impl Default for ResponseStatus {
    fn default() -> Self {
        Self::Other("unknown".to_string())
    }
}

impl ResponseStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::Failed => "failed",
            Self::InProgress => "in_progress",
            Self::Cancelled => "cancelled",
            Self::Queued => "queued",
            Self::Other(value) => value,
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response object as returned by `POST /responses`
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub status: ResponseStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub usage: Option<ResponseUsage>,
    #[serde(default)]
    pub error: Option<ResponseErrorDetail>,
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
}

impl ResponseObject {
    /// Concatenated text of every `output_text` part of every message item.
    ///
    /// Reasoning and tool items contribute nothing.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message { content } => Some(content),
                OutputItem::Other => None,
            })
            .flatten()
            .filter_map(|part| match part {
                ContentPart::OutputText { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default, deserialize_with = "null_as_default")]
        content: Vec<ContentPart>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText {
        text: String,
    },
    Refusal {
        refusal: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseUsage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output_tokens: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncompleteDetails {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Error envelope on non-success HTTP statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ResponseErrorDetail,
}

/// What a caller reads from one completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    pub output_text: String,
    pub status: ResponseStatus,
    pub output_token_count: u64,
    pub input_token_count: u64,
    pub total_token_count: u64,
    pub incomplete_reason: Option<String>,
    pub error_message: Option<String>,
}

impl From<ResponseObject> for InferenceResponse {
    fn from(object: ResponseObject) -> Self {
        let output_text = object.output_text();
        let usage = object.usage.unwrap_or_default();

        Self {
            id: object.id,
            model: object.model,
            output_text,
            status: object.status,
            output_token_count: usage.output_tokens,
            input_token_count: usage.input_tokens,
            total_token_count: usage.total_tokens,
            incomplete_reason: object.incomplete_details.and_then(|d| d.reason),
            error_message: object.error.and_then(|e| e.message),
        }
    }
}
