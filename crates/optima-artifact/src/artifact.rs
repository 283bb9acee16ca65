use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;

use crate::errors::DecodeError;
use crate::kind::ArtifactKind;

/// Document id held by an artifact before the server assigns one.
pub const INITIAL_DOCUMENT_ID: &str = "init";

/// Streaming state of an artifact.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    #[default]
    Idle,
    Streaming,
}

/// Side-channel tools that report progress alongside an artifact.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolName {
    PexelsSearch,
    PexelsAutoImages,
    WebSearch,
    WebpageScreenshot,
    WebScraper,
}

impl ToolName {
    /// Status label that means the tool is actively working.
    ///
    /// Entering this status marks the artifact as streaming even before any
    /// content arrives.
    pub fn busy_status(&self) -> Option<&'static str> {
        match self {
            ToolName::PexelsSearch => Some("searching-pexels"),
            ToolName::WebSearch => Some("searching-web"),
            ToolName::WebpageScreenshot => Some("taking-screenshot"),
            ToolName::WebScraper => Some("scraping-webpage"),
            ToolName::PexelsAutoImages => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::PexelsSearch => "pexels-search",
            ToolName::PexelsAutoImages => "pexels-auto-images",
            ToolName::WebSearch => "web-search",
            ToolName::WebpageScreenshot => "webpage-screenshot",
            ToolName::WebScraper => "web-scraper",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest status label and raw result reported by one tool.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolActivity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Raw result text, usually JSON. Stored exactly as received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ToolActivity {
    /// Parses the stored result for display.
    ///
    /// Returns `Ok(None)` when no result has arrived yet.
    pub fn decode_result<T: DeserializeOwned>(&self) -> Result<Option<T>, DecodeError> {
        match &self.result {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|e| DecodeError::InvalidResult(e.to_string())),
        }
    }
}

/// Tool activity keyed by tool.
pub type ToolActivityMap = BTreeMap<ToolName, ToolActivity>;

/// Client-visible projection of the document being streamed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Artifact {
    pub document_id: String,
    pub title: String,
    /// Unset until an `artifact-kind` event arrives.
    pub kind: Option<ArtifactKind>,
    pub content: String,
    pub status: ArtifactStatus,
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tools: ToolActivityMap,
}

impl Artifact {
    /// The artifact synthesized when the first event of a stream arrives.
    pub fn initial() -> Self {
        Self {
            document_id: INITIAL_DOCUMENT_ID.to_string(),
            title: String::new(),
            kind: None,
            content: String::new(),
            status: ArtifactStatus::Streaming,
            is_visible: false,
            tools: ToolActivityMap::new(),
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.status == ArtifactStatus::Streaming
    }

    /// Whether an `id` event has assigned a real document id.
    pub fn has_document_id(&self) -> bool {
        self.document_id != INITIAL_DOCUMENT_ID
    }

    pub fn tool(&self, tool: ToolName) -> Option<&ToolActivity> {
        self.tools.get(&tool)
    }

    pub fn tool_status(&self, tool: ToolName) -> Option<&str> {
        self.tool(tool).and_then(|activity| activity.status.as_deref())
    }

    pub fn tool_result(&self, tool: ToolName) -> Option<&str> {
        self.tool(tool).and_then(|activity| activity.result.as_deref())
    }

    /// Content length in characters, which is what the reveal window measures.
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

impl Default for Artifact {
    fn default() -> Self {
        Self::initial()
    }
}
