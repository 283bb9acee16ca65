//! Streamed artifact state for the Optima chat client.
//!
//! The server streams typed delta events for whichever tool or model call is
//! active. This crate folds them, in arrival order, into the single artifact
//! shown beside the chat.
//!
//! # Replaying a stream
//!
//! ```
//! use optima_artifact::prelude::*;
//!
//! let events = vec![
//!     DeltaEvent::new(DeltaKind::Id, "doc-1"),
//!     DeltaEvent::new(DeltaKind::ArtifactKind, "text"),
//!     DeltaEvent::text_delta("Hello "),
//!     DeltaEvent::text_delta("world"),
//!     DeltaEvent::finish(),
//! ];
//!
//! let mut consumer = StreamConsumer::new();
//! consumer.consume(&events[..2]);
//! // Re-delivering a grown list only applies the new tail.
//! consumer.consume(&events);
//!
//! let artifact = consumer.artifact().expect("artifact");
//! assert_eq!(artifact.content, "Hello world");
//! assert_eq!(artifact.status, ArtifactStatus::Idle);
//! ```

/// Artifact record, status and side-channel tool activity.
pub mod artifact;
/// Cursor-based consumption of append-only event lists.
pub mod consumer;
/// Delta events and their payloads.
pub mod delta;
/// Errors raised at the decoding boundary.
pub mod errors;
/// Event and artifact kind enumerations.
pub mod kind;
/// Per-kind side data such as inline suggestions.
pub mod metadata;
/// Common imports for typical usage.
pub mod prelude;
/// The pure event reducer.
pub mod reducer;
/// Wire decoding for SSE and JSON-lines transports.
pub mod transport;

pub use artifact::{
    Artifact, ArtifactStatus, INITIAL_DOCUMENT_ID, ToolActivity, ToolActivityMap, ToolName,
};
pub use consumer::{AbortHandle, StreamConsumer, StreamCursor, StreamState, consume, follow, replay};
pub use delta::{DeltaEvent, DeltaPayload, Suggestion};
pub use errors::DecodeError;
pub use kind::{ArtifactKind, DeltaKind};
pub use metadata::ArtifactMetadata;
pub use reducer::{REVEAL_WINDOW_MAX, REVEAL_WINDOW_MIN, apply, fold};
pub use transport::{SseDecoder, SseFrame, decode_jsonl, decode_sse};
