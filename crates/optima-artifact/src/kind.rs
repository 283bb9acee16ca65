use std::fmt;

/// Kind of document an artifact renders as.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Text,
    Code,
    Image,
    Sheet,
    Html,
    Svg,
    Diagram,
    Sandbox,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 8] = [
        ArtifactKind::Text,
        ArtifactKind::Code,
        ArtifactKind::Image,
        ArtifactKind::Sheet,
        ArtifactKind::Html,
        ArtifactKind::Svg,
        ArtifactKind::Diagram,
        ArtifactKind::Sandbox,
    ];

    /// Returns the wire name (for example `html`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Text => "text",
            ArtifactKind::Code => "code",
            ArtifactKind::Image => "image",
            ArtifactKind::Sheet => "sheet",
            ArtifactKind::Html => "html",
            ArtifactKind::Svg => "svg",
            ArtifactKind::Diagram => "diagram",
            ArtifactKind::Sandbox => "sandbox",
        }
    }

    /// Parses a wire name, tolerating surrounding whitespace and case.
    pub fn from_wire(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminator of a streamed delta event.
///
/// Kinds the client does not know decode to [`DeltaKind::Unknown`] so that a
/// newer server never breaks an older reducer.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeltaKind {
    TextDelta,
    CodeDelta,
    SheetDelta,
    ImageDelta,
    HtmlDelta,
    SvgDelta,
    DiagramDelta,
    SandboxDelta,
    VideoGeneratorDelta,
    HtmlSmartUpdate,
    Title,
    Id,
    Suggestion,
    Clear,
    Finish,
    ArtifactKind,
    PexelsSearchStatus,
    PexelsSearchResults,
    PexelsAutoImages,
    WebSearchStatus,
    WebSearchResults,
    WebpageScreenshotStatus,
    WebpageScreenshotResult,
    WebScraperStatus,
    WebScraperResult,
    Unknown(String),
}

const KNOWN_KINDS: [(DeltaKind, &str); 25] = [
    (DeltaKind::TextDelta, "text-delta"),
    (DeltaKind::CodeDelta, "code-delta"),
    (DeltaKind::SheetDelta, "sheet-delta"),
    (DeltaKind::ImageDelta, "image-delta"),
    (DeltaKind::HtmlDelta, "html-delta"),
    (DeltaKind::SvgDelta, "svg-delta"),
    (DeltaKind::DiagramDelta, "diagram-delta"),
    (DeltaKind::SandboxDelta, "sandbox-delta"),
    (DeltaKind::VideoGeneratorDelta, "video-generator-delta"),
    (DeltaKind::HtmlSmartUpdate, "html-smart-update"),
    (DeltaKind::Title, "title"),
    (DeltaKind::Id, "id"),
    (DeltaKind::Suggestion, "suggestion"),
    (DeltaKind::Clear, "clear"),
    (DeltaKind::Finish, "finish"),
    (DeltaKind::ArtifactKind, "artifact-kind"),
    (DeltaKind::PexelsSearchStatus, "pexels-search-status"),
    (DeltaKind::PexelsSearchResults, "pexels-search-results"),
    (DeltaKind::PexelsAutoImages, "pexels-auto-images"),
    (DeltaKind::WebSearchStatus, "web-search-status"),
    (DeltaKind::WebSearchResults, "web-search-results"),
    (DeltaKind::WebpageScreenshotStatus, "webpage-screenshot-status"),
    (DeltaKind::WebpageScreenshotResult, "webpage-screenshot-result"),
    (DeltaKind::WebScraperStatus, "web-scraper-status"),
    (DeltaKind::WebScraperResult, "web-scraper-result"),
];

impl DeltaKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &str {
        if let Self::Unknown(raw) = self {
            return raw;
        }
        KNOWN_KINDS
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }

    /// Parses a wire name. Never fails; unrecognised names are preserved.
    pub fn from_wire(value: &str) -> Self {
        KNOWN_KINDS
            .iter()
            .find(|(_, name)| *name == value)
            .map(|(kind, _)| kind.clone())
            .unwrap_or_else(|| Self::Unknown(value.to_string()))
    }

    /// Every recognised kind, in wire-table order.
    pub fn known() -> impl Iterator<Item = DeltaKind> {
        KNOWN_KINDS.iter().map(|(kind, _)| kind.clone())
    }

    /// Kinds whose payload is a complete content snapshot rather than an
    /// incremental chunk.
    pub fn is_snapshot(&self) -> bool {
        matches!(
            self,
            Self::CodeDelta
                | Self::SheetDelta
                | Self::ImageDelta
                | Self::HtmlDelta
                | Self::SvgDelta
                | Self::DiagramDelta
                | Self::SandboxDelta
                | Self::VideoGeneratorDelta
                | Self::HtmlSmartUpdate
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for DeltaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DeltaKind {
    fn from(value: &str) -> Self {
        Self::from_wire(value)
    }
}

impl From<String> for DeltaKind {
    fn from(value: String) -> Self {
        Self::from_wire(&value)
    }
}

impl From<DeltaKind> for String {
    fn from(value: DeltaKind) -> Self {
        match value {
            DeltaKind::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_kind_round_trips_through_its_wire_name() {
        for (kind, name) in KNOWN_KINDS.iter() {
            assert_eq!(kind.as_str(), *name);
            assert_eq!(&DeltaKind::from_wire(name), kind);
        }
    }

    #[test]
    fn unrecognised_kind_is_preserved() {
        let kind = DeltaKind::from_wire("audio-delta");
        assert_eq!(kind, DeltaKind::Unknown("audio-delta".into()));
        assert!(kind.is_unknown());
        assert_eq!(kind.to_string(), "audio-delta");
    }

    #[test]
    fn delta_kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&DeltaKind::WebScraperResult).expect("serialize");
        assert_eq!(json, "\"web-scraper-result\"");
        let parsed: DeltaKind = serde_json::from_str("\"mystery\"").expect("deserialize");
        assert_eq!(parsed, DeltaKind::Unknown("mystery".into()));
    }

    #[test]
    fn snapshot_kinds_exclude_text_delta() {
        assert!(!DeltaKind::TextDelta.is_snapshot());
        assert!(DeltaKind::VideoGeneratorDelta.is_snapshot());
        assert!(DeltaKind::HtmlSmartUpdate.is_snapshot());
        assert!(!DeltaKind::Finish.is_snapshot());
    }

    #[test]
    fn artifact_kind_parses_case_insensitively() {
        assert_eq!(ArtifactKind::from_wire(" HTML "), Some(ArtifactKind::Html));
        assert_eq!(ArtifactKind::from_wire("video"), None);
        assert_eq!(
            serde_json::to_value(ArtifactKind::Diagram).expect("serialize"),
            serde_json::json!("diagram")
        );
    }
}
