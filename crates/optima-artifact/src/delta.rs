use std::borrow::Cow;

use crate::errors::DecodeError;
use crate::kind::DeltaKind;

/// Inline edit proposed for the current document.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Text that was selected when the suggestion was produced.
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub suggested_text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_resolved: bool,
}

impl Suggestion {
    pub fn new(
        id: impl Into<String>,
        original_text: impl Into<String>,
        suggested_text: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            document_id: None,
            original_text: original_text.into(),
            suggested_text: suggested_text.into(),
            description: description.into(),
            is_resolved: false,
        }
    }

    /// Parses a suggestion that arrived as JSON text.
    pub fn from_json(raw: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(raw).map_err(|e| DecodeError::InvalidSuggestion(e.to_string()))
    }
}

/// Payload carried by a delta event.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum DeltaPayload {
    /// Content chunk, full snapshot, status label or identifier.
    Text(String),
    Suggestion(Suggestion),
}

impl DeltaPayload {
    /// Returns the payload as text.
    ///
    /// Suggestion payloads render as their JSON form so a misrouted
    /// suggestion is still stored instead of dropped.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            DeltaPayload::Text(text) => Cow::Borrowed(text),
            DeltaPayload::Suggestion(suggestion) => Cow::Owned(
                serde_json::to_string(suggestion).unwrap_or_else(|_| suggestion.id.clone()),
            ),
        }
    }

    /// Interprets the payload as a suggestion, decoding text payloads as JSON.
    pub fn to_suggestion(&self) -> Result<Suggestion, DecodeError> {
        match self {
            DeltaPayload::Suggestion(suggestion) => Ok(suggestion.clone()),
            DeltaPayload::Text(raw) => Suggestion::from_json(raw),
        }
    }
}

impl Default for DeltaPayload {
    fn default() -> Self {
        DeltaPayload::Text(String::new())
    }
}

impl From<&str> for DeltaPayload {
    fn from(value: &str) -> Self {
        DeltaPayload::Text(value.to_string())
    }
}

impl From<String> for DeltaPayload {
    fn from(value: String) -> Self {
        DeltaPayload::Text(value)
    }
}

impl From<Suggestion> for DeltaPayload {
    fn from(value: Suggestion) -> Self {
        DeltaPayload::Suggestion(value)
    }
}

/// One unit of the server-to-client stream for the active tool or model call.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeltaEvent {
    pub kind: DeltaKind,
    #[serde(default)]
    pub payload: DeltaPayload,
}

impl DeltaEvent {
    pub fn new(kind: impl Into<DeltaKind>, payload: impl Into<DeltaPayload>) -> Self {
        Self {
            kind: kind.into(),
            payload: payload.into(),
        }
    }

    pub fn text_delta(text: impl Into<String>) -> Self {
        Self::new(DeltaKind::TextDelta, text.into())
    }

    pub fn finish() -> Self {
        Self::new(DeltaKind::Finish, String::new())
    }

    pub fn clear() -> Self {
        Self::new(DeltaKind::Clear, String::new())
    }

    pub fn suggestion(suggestion: Suggestion) -> Self {
        Self::new(DeltaKind::Suggestion, suggestion)
    }
}
