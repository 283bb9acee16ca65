//! Common imports for consuming artifact streams.
pub use crate::{
    Artifact, ArtifactKind, ArtifactMetadata, ArtifactStatus, DecodeError, DeltaEvent, DeltaKind,
    DeltaPayload, StreamConsumer, StreamCursor, StreamState, Suggestion, ToolActivity, ToolName,
    apply,
};
