//! Process-action request/response envelope.
//!
//! Requests arrive as a JSON object with the selected record ids under
//! `recordIds` and the process parameters under `_params`. Responses take one
//! of three shapes:
//!
//! ```text
//! success: {"responseActions":[{"showMsgInProcessView":{"msgType":"success","msgTitle":..,"msgText":..}}]}
//! retry:   {"retryExecution":true,"message":{"severity":"error","text":..}}
//! error:   {"message":{"severity":"error","text":..}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use bookstore_infra::session::Session;

/// Raw process request. Fields are kept loosely typed; handlers validate them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(rename = "recordIds", default, skip_serializing_if = "Option::is_none")]
    pub record_ids: Option<JsonValue>,

    #[serde(rename = "_params", default, skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonValue>,
}

impl ProcessRequest {
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// `_params` is present and an object.
    pub fn has_params(&self) -> bool {
        matches!(self.params, Some(JsonValue::Object(_)))
    }

    /// A parameter rendered as a string, trimmed; blank counts as absent.
    ///
    /// Numbers and booleans are rendered with their JSON text.
    pub fn param(&self, key: &str) -> Option<String> {
        let value = self.params.as_ref()?.get(key)?;
        let text = match value {
            JsonValue::String(s) => s.trim().to_string(),
            JsonValue::Number(n) => n.to_string(),
            JsonValue::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Selected record ids, if `recordIds` is an array.
    pub fn record_ids(&self) -> Option<&Vec<JsonValue>> {
        self.record_ids.as_ref()?.as_array()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMessage {
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewMessage {
    #[serde(rename = "msgType")]
    pub msg_type: Severity,
    #[serde(rename = "msgTitle")]
    pub msg_title: String,
    #[serde(rename = "msgText")]
    pub msg_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseAction {
    #[serde(rename = "showMsgInProcessView")]
    pub show_msg_in_process_view: ViewMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessResponse {
    Success {
        #[serde(rename = "responseActions")]
        response_actions: Vec<ResponseAction>,
    },
    Retry {
        #[serde(rename = "retryExecution")]
        retry_execution: bool,
        message: ProcessMessage,
    },
    Error {
        message: ProcessMessage,
    },
}

impl ProcessResponse {
    pub fn success(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Success {
            response_actions: vec![ResponseAction {
                show_msg_in_process_view: ViewMessage {
                    msg_type: Severity::Success,
                    msg_title: title.into(),
                    msg_text: text.into(),
                },
            }],
        }
    }

    /// Ask the user to fix the parameters and run again.
    pub fn retry(text: impl Into<String>) -> Self {
        Self::Retry {
            retry_execution: true,
            message: ProcessMessage {
                severity: Severity::Error,
                text: text.into(),
            },
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error {
            message: ProcessMessage {
                severity: Severity::Error,
                text: text.into(),
            },
        }
    }

    /// Failure after which nothing was saved.
    pub fn aborted(cause: impl core::fmt::Display) -> Self {
        Self::error(format!("Process aborted. No changes saved.\nError: {cause}"))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, Self::Retry { .. })
    }

    /// The user-facing text carried by the response.
    pub fn text(&self) -> &str {
        match self {
            Self::Success { response_actions } => response_actions
                .first()
                .map(|a| a.show_msg_in_process_view.msg_text.as_str())
                .unwrap_or_default(),
            Self::Retry { message, .. } | Self::Error { message } => &message.text,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| JsonValue::Object(Default::default()))
    }
}

/// A user-triggered bulk process.
pub trait ProcessActionHandler: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(&self, session: &mut dyn Session, request: ProcessRequest) -> ProcessResponse;

    /// Parse the raw request body and handle it.
    fn execute(&self, session: &mut dyn Session, content: &str) -> ProcessResponse {
        match ProcessRequest::parse(content) {
            Ok(request) => self.handle(session, request),
            Err(e) => {
                tracing::error!(process = self.name(), "malformed process request: {e}");
                ProcessResponse::aborted(e)
            }
        }
    }
}
