/// Errors raised while decoding delta records at the transport boundary or
/// while the display layer interprets a stored tool result.
///
/// The reducer itself never returns these: anything that reaches `apply` has
/// already been decoded, and malformed payloads are kept raw.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A line or frame did not contain a valid wire record.
    #[error("invalid delta record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
    /// The record is valid JSON but has no `type`/`kind` discriminator.
    #[error("delta record at line {line} has no event kind")]
    MissingKind { line: usize },
    /// A stored tool result could not be parsed into the requested shape.
    #[error("tool result is not valid JSON for the requested shape: {0}")]
    InvalidResult(String),
    /// A suggestion payload did not match the suggestion schema.
    #[error("invalid suggestion payload: {0}")]
    InvalidSuggestion(String),
}

impl DecodeError {
    pub(crate) fn invalid_record(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line,
            message: message.into(),
        }
    }

    /// Returns the 1-based source line for record-level errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidRecord { line, .. } | Self::MissingKind { line } => Some(*line),
            Self::InvalidResult(_) | Self::InvalidSuggestion(_) => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        DecodeError::InvalidResult(value.to_string())
    }
}
