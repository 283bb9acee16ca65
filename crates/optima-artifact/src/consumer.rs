//! Cursor-driven consumption of an append-only delta list.
//!
//! Transports often hand the client the whole event list seen so far each
//! time it grows. The cursor makes re-delivery harmless: only events past the
//! cursor are applied, strictly in index order.

use futures::{Stream, StreamExt as _};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::artifact::Artifact;
use crate::delta::DeltaEvent;
use crate::kind::{ArtifactKind, DeltaKind};
use crate::metadata::ArtifactMetadata;
use crate::reducer::apply;

/// Number of events of the append-only list that have been applied.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StreamCursor {
    processed: usize,
}

impl StreamCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Index of the last applied event, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.processed.checked_sub(1)
    }

    /// Events in `events` that have not been applied yet.
    pub fn pending<'a>(&self, events: &'a [DeltaEvent]) -> &'a [DeltaEvent] {
        events.get(self.processed..).unwrap_or_default()
    }

    pub fn advanced_to(self, len: usize) -> Self {
        Self {
            processed: self.processed.max(len),
        }
    }
}

/// Artifact plus its side metadata for one chat session.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StreamState {
    pub artifact: Option<Artifact>,
    pub metadata: ArtifactMetadata,
}

impl StreamState {
    /// Applies one event, routing suggestions into the metadata.
    pub fn apply(mut self, event: &DeltaEvent) -> Self {
        if event.kind == DeltaKind::Suggestion {
            let kind = self
                .artifact
                .as_ref()
                .and_then(|artifact| artifact.kind)
                .unwrap_or(ArtifactKind::Text);
            match event.payload.to_suggestion() {
                Ok(suggestion) => self.metadata.push_suggestion(kind, suggestion),
                Err(err) => warn!(error = %err, "skipping undecodable suggestion"),
            }
        }
        let artifact = apply(self.artifact.as_ref(), event);
        self.artifact = Some(artifact);
        self
    }
}

/// Applies every event past `cursor` and returns the advanced cursor.
///
/// Calling this again with the same list, or with a list that only grew,
/// never re-applies an event. A list shorter than the cursor is left alone.
pub fn consume(
    cursor: StreamCursor,
    state: StreamState,
    events: &[DeltaEvent],
) -> (StreamCursor, StreamState) {
    if events.len() < cursor.processed() {
        warn!(
            processed = cursor.processed(),
            received = events.len(),
            "ignoring delta list shorter than the cursor"
        );
        return (cursor, state);
    }
    let mut state = state;
    for (offset, event) in cursor.pending(events).iter().enumerate() {
        debug!(index = cursor.processed() + offset, kind = %event.kind, "applying delta");
        state = state.apply(event);
    }
    (cursor.advanced_to(events.len()), state)
}

/// Folds a complete event list from scratch.
pub fn replay(events: &[DeltaEvent]) -> StreamState {
    consume(StreamCursor::new(), StreamState::default(), events).1
}

/// Owns the cursor and state for one chat session.
#[derive(Clone, Debug)]
pub struct StreamConsumer {
    session_id: uuid::Uuid,
    cursor: StreamCursor,
    state: StreamState,
}

impl StreamConsumer {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4(),
            cursor: StreamCursor::new(),
            state: StreamState::default(),
        }
    }

    pub fn session_id(&self) -> uuid::Uuid {
        self.session_id
    }

    pub fn cursor(&self) -> StreamCursor {
        self.cursor
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.state.artifact.as_ref()
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.state.metadata
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn into_state(self) -> StreamState {
        self.state
    }

    /// Applies the unprocessed tail of `events`.
    ///
    /// Returns the number of events applied by this call.
    pub fn consume(&mut self, events: &[DeltaEvent]) -> usize {
        let before = self.cursor;
        let state = std::mem::take(&mut self.state);
        let (cursor, state) = consume(self.cursor, state, events);
        self.cursor = cursor;
        self.state = state;
        cursor.processed() - before.processed()
    }

    /// Starts a new chat session: fresh id, cursor and state.
    pub fn reset(&mut self) {
        debug!(session_id = %self.session_id, "resetting artifact stream");
        *self = Self::new();
    }
}

impl Default for StreamConsumer {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle used to stop a running [`follow`] loop.
#[derive(Clone, Debug)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Creates a handle and the receiver [`follow`] listens on.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, rx)
    }

    /// Requests that no further events be applied.
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// Feeds growing snapshots of the event list into `consumer`.
///
/// After every snapshot that applied at least one event the latest artifact
/// is published on `updates`. The loop ends when the snapshot stream ends or
/// `abort` fires; either way the consumer is returned with whatever was
/// applied so far.
pub async fn follow<S>(
    mut consumer: StreamConsumer,
    snapshots: S,
    updates: watch::Sender<Option<Artifact>>,
    mut abort: watch::Receiver<bool>,
) -> StreamConsumer
where
    S: Stream<Item = Vec<DeltaEvent>>,
{
    let session_id = consumer.session_id();
    info!(session_id = %session_id, "following artifact stream");
    futures::pin_mut!(snapshots);

    if *abort.borrow() {
        info!(session_id = %session_id, "artifact stream aborted before start");
        return consumer;
    }

    loop {
        tokio::select! {
            biased;
            changed = abort.changed() => {
                match changed {
                    Ok(()) if *abort.borrow() => {
                        info!(session_id = %session_id, processed = consumer.cursor().processed(), "artifact stream aborted");
                        break;
                    }
                    Ok(()) => {}
                    // Abort handle dropped: keep following until the stream ends.
                    Err(_) => {
                        drain(&mut consumer, &mut snapshots, &updates).await;
                        break;
                    }
                }
            }
            next = snapshots.next() => {
                match next {
                    Some(events) => publish(&mut consumer, &events, &updates),
                    None => break,
                }
            }
        }
    }

    info!(session_id = %session_id, processed = consumer.cursor().processed(), "artifact stream finished");
    consumer
}

async fn drain<S>(
    consumer: &mut StreamConsumer,
    snapshots: &mut std::pin::Pin<&mut S>,
    updates: &watch::Sender<Option<Artifact>>,
) where
    S: Stream<Item = Vec<DeltaEvent>>,
{
    while let Some(events) = snapshots.next().await {
        publish(consumer, &events, updates);
    }
}

fn publish(
    consumer: &mut StreamConsumer,
    events: &[DeltaEvent],
    updates: &watch::Sender<Option<Artifact>>,
) {
    if consumer.consume(events) > 0 {
        let _ = updates.send(consumer.artifact().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactStatus;
    use crate::delta::Suggestion;
    use futures::StreamExt as _;
    use futures::stream;

    fn events() -> Vec<DeltaEvent> {
        vec![
            DeltaEvent::new(DeltaKind::Id, "doc-1"),
            DeltaEvent::new(DeltaKind::ArtifactKind, "text"),
            DeltaEvent::text_delta("Hello "),
            DeltaEvent::text_delta("world"),
            DeltaEvent::finish(),
        ]
    }

    #[test]
    fn cursor_pending_returns_unprocessed_tail() {
        let all = events();
        let cursor = StreamCursor::new().advanced_to(3);
        assert_eq!(cursor.pending(&all).len(), 2);
        assert_eq!(cursor.last_index(), Some(2));
        assert!(cursor.pending(&all[..2]).is_empty());
        assert_eq!(StreamCursor::new().last_index(), None);
    }

    #[test]
    fn cursor_never_moves_backwards() {
        let cursor = StreamCursor::new().advanced_to(4).advanced_to(2);
        assert_eq!(cursor.processed(), 4);
    }

    #[test]
    fn superset_delivery_matches_single_delivery() {
        let all = events();
        let mut incremental = StreamConsumer::new();
        assert_eq!(incremental.consume(&all[..2]), 2);
        assert_eq!(incremental.consume(&all[..2]), 0);
        assert_eq!(incremental.consume(&all[..3]), 1);
        assert_eq!(incremental.consume(&all), 2);

        let once = replay(&all);
        assert_eq!(incremental.state(), &once);
        let artifact = once.artifact.expect("artifact");
        assert_eq!(artifact.content, "Hello world");
        assert_eq!(artifact.status, ArtifactStatus::Idle);
    }

    #[test]
    fn explicit_cursor_round_trip_is_idempotent() {
        let all = events();
        let (cursor, state) = consume(StreamCursor::new(), StreamState::default(), &all[..2]);
        let (cursor, state) = consume(cursor, state, &all[..2]);
        let (cursor, state) = consume(cursor, state, &all);
        assert_eq!(cursor.processed(), all.len());
        assert_eq!(state, replay(&all));
    }

    #[test]
    fn shorter_list_is_ignored() {
        let all = events();
        let mut consumer = StreamConsumer::new();
        consumer.consume(&all);
        let before = consumer.state().clone();
        assert_eq!(consumer.consume(&all[..1]), 0);
        assert_eq!(consumer.state(), &before);
        assert_eq!(consumer.cursor().processed(), all.len());
    }

    #[test]
    fn suggestions_are_keyed_by_current_kind_and_survive_clear() {
        let state = replay(&[
            DeltaEvent::suggestion(Suggestion::new("early", "a", "b", "before kind")),
            DeltaEvent::new(DeltaKind::ArtifactKind, "code"),
            DeltaEvent::suggestion(Suggestion::new("s-1", "x", "y", "rename")),
            DeltaEvent::clear(),
            DeltaEvent::new(DeltaKind::Suggestion, r#"{"id":"s-2","description":"json"}"#),
            DeltaEvent::new(DeltaKind::Suggestion, "not a suggestion"),
        ]);
        let ids: Vec<&str> = state
            .metadata
            .suggestions(ArtifactKind::Code)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["s-1", "s-2"]);
        assert_eq!(state.metadata.suggestions(ArtifactKind::Text).len(), 1);
        assert_eq!(state.artifact.expect("artifact").content, "");
    }

    #[test]
    fn reset_starts_a_new_session() {
        let mut consumer = StreamConsumer::new();
        let first_session = consumer.session_id();
        consumer.consume(&events());
        consumer.reset();
        assert_ne!(consumer.session_id(), first_session);
        assert!(consumer.artifact().is_none());
        assert_eq!(consumer.cursor(), StreamCursor::new());
        assert!(consumer.metadata().is_empty());
    }

    #[tokio::test]
    async fn follow_applies_growing_snapshots_in_order() {
        let all = events();
        let snapshots = stream::iter(vec![
            all[..1].to_vec(),
            all[..3].to_vec(),
            all[..3].to_vec(),
            all.clone(),
        ]);
        let (updates_tx, updates_rx) = watch::channel(None);
        let (_abort, abort_rx) = AbortHandle::new();

        let consumer = follow(StreamConsumer::new(), snapshots, updates_tx, abort_rx).await;

        assert_eq!(consumer.cursor().processed(), all.len());
        assert_eq!(consumer.state(), &replay(&all));
        let published = updates_rx.borrow().clone().expect("published artifact");
        assert_eq!(published.content, "Hello world");
    }

    #[tokio::test]
    async fn follow_stops_after_abort() {
        let all = events();
        let (updates_tx, _updates_rx) = watch::channel(None);
        let (abort, abort_rx) = AbortHandle::new();
        abort.abort();

        let consumer = follow(
            StreamConsumer::new(),
            stream::iter(vec![all.clone()]),
            updates_tx,
            abort_rx,
        )
        .await;
        assert!(consumer.artifact().is_none());
    }

    #[tokio::test]
    async fn follow_stops_on_abort_while_waiting() {
        let all = events();
        let (updates_tx, _updates_rx) = watch::channel(None);
        let (abort, abort_rx) = AbortHandle::new();
        let snapshots = stream::iter(vec![all[..2].to_vec()]).chain(stream::pending());

        let task = tokio::spawn(follow(StreamConsumer::new(), snapshots, updates_tx, abort_rx));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        abort.abort();

        let consumer = task.await.expect("follow task");
        assert_eq!(consumer.cursor().processed(), 2);
        assert_eq!(
            consumer.artifact().map(|a| a.document_id.as_str()),
            Some("doc-1")
        );
    }
}
