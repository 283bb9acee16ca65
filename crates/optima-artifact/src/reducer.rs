//! Pure fold of delta events into an [`Artifact`].

use tracing::{debug, warn};

use crate::artifact::{Artifact, ArtifactStatus, ToolName};
use crate::delta::DeltaEvent;
use crate::kind::{ArtifactKind, DeltaKind};

/// Text artifacts become visible once their length (in characters) falls
/// strictly inside this window while streaming.
pub const REVEAL_WINDOW_MIN: usize = 400;
pub const REVEAL_WINDOW_MAX: usize = 450;

/// Applies one event and returns the next artifact.
///
/// `current = None` starts from [`Artifact::initial`]. The input is never
/// modified, and the result depends only on the two arguments.
pub fn apply(current: Option<&Artifact>, event: &DeltaEvent) -> Artifact {
    let mut next = current.cloned().unwrap_or_else(Artifact::initial);
    let payload = event.payload.as_text();

    match &event.kind {
        DeltaKind::Id => {
            next.document_id = payload.into_owned();
            next.status = ArtifactStatus::Streaming;
        }
        DeltaKind::Title => {
            next.title = payload.into_owned();
            next.status = ArtifactStatus::Streaming;
        }
        DeltaKind::ArtifactKind => {
            match ArtifactKind::from_wire(&payload) {
                Some(kind) => next.kind = Some(kind),
                None => warn!(kind = %payload, "ignoring unrecognised artifact kind"),
            }
            next.status = ArtifactStatus::Streaming;
        }
        DeltaKind::Clear => {
            next.content.clear();
            next.status = ArtifactStatus::Streaming;
        }
        DeltaKind::Finish => {
            next.status = ArtifactStatus::Idle;
        }
        DeltaKind::TextDelta => {
            let was_streaming = next.is_streaming();
            let previous_len = next.content_chars();
            next.content.push_str(&payload);
            if was_streaming
                && !next.is_visible
                && (in_reveal_window(previous_len) || in_reveal_window(next.content_chars()))
            {
                next.is_visible = true;
            }
            next.status = ArtifactStatus::Streaming;
        }
        DeltaKind::CodeDelta
        | DeltaKind::SheetDelta
        | DeltaKind::ImageDelta
        | DeltaKind::HtmlDelta
        | DeltaKind::SvgDelta
        | DeltaKind::DiagramDelta
        | DeltaKind::SandboxDelta
        | DeltaKind::VideoGeneratorDelta
        | DeltaKind::HtmlSmartUpdate => {
            next.content = payload.into_owned();
            next.is_visible = true;
            next.status = ArtifactStatus::Streaming;
        }
        DeltaKind::PexelsSearchStatus => set_status(&mut next, ToolName::PexelsSearch, &payload),
        DeltaKind::WebSearchStatus => set_status(&mut next, ToolName::WebSearch, &payload),
        DeltaKind::WebpageScreenshotStatus => {
            set_status(&mut next, ToolName::WebpageScreenshot, &payload)
        }
        DeltaKind::WebScraperStatus => set_status(&mut next, ToolName::WebScraper, &payload),
        DeltaKind::PexelsSearchResults => set_result(&mut next, ToolName::PexelsSearch, &payload),
        DeltaKind::PexelsAutoImages => set_result(&mut next, ToolName::PexelsAutoImages, &payload),
        DeltaKind::WebSearchResults => set_result(&mut next, ToolName::WebSearch, &payload),
        DeltaKind::WebpageScreenshotResult => {
            set_result(&mut next, ToolName::WebpageScreenshot, &payload)
        }
        DeltaKind::WebScraperResult => set_result(&mut next, ToolName::WebScraper, &payload),
        // Suggestions are routed to `ArtifactMetadata` by the consumer.
        DeltaKind::Suggestion => {}
        DeltaKind::Unknown(raw) => {
            debug!(kind = %raw, "ignoring unknown delta kind");
        }
    }

    next
}

/// Folds a whole event sequence starting from `start`.
pub fn fold<'a, I>(start: Option<Artifact>, events: I) -> Option<Artifact>
where
    I: IntoIterator<Item = &'a DeltaEvent>,
{
    events
        .into_iter()
        .fold(start, |current, event| Some(apply(current.as_ref(), event)))
}

fn in_reveal_window(len: usize) -> bool {
    len > REVEAL_WINDOW_MIN && len < REVEAL_WINDOW_MAX
}

fn set_status(artifact: &mut Artifact, tool: ToolName, status: &str) {
    if tool.busy_status() == Some(status) {
        artifact.status = ArtifactStatus::Streaming;
    }
    artifact.tools.entry(tool).or_default().status = Some(status.to_string());
}

fn set_result(artifact: &mut Artifact, tool: ToolName, result: &str) {
    artifact.tools.entry(tool).or_default().result = Some(result.to_string());
}
