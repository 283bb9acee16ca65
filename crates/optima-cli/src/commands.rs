use anyhow::Context as _;
use clap::ValueEnum;
use futures::stream;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use optima_artifact::{
    AbortHandle, Artifact, ArtifactMetadata, DeltaEvent, StreamConsumer, decode_jsonl, decode_sse,
    follow,
};
use optima_video::{
    ScenePlan, TextReveal, TimingConfig, plan_scenes, text_reveals_with, word_reveals_with,
};

/// Wire format of a recorded delta stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StreamFormat {
    /// One JSON record per line.
    Jsonl,
    /// A captured `text/event-stream` body.
    Sse,
}

impl StreamFormat {
    /// `.sse` files are event-stream captures; everything else is read as
    /// JSON lines.
    pub fn from_extension(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("sse") => StreamFormat::Sse,
            _ => StreamFormat::Jsonl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RevealMode {
    Chars,
    Words,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub session_id: String,
    pub events: usize,
    pub snapshots: usize,
    pub artifact: Option<Artifact>,
    pub metadata: ArtifactMetadata,
}

#[derive(Debug, Serialize)]
pub struct PlanReport {
    #[serde(flatten)]
    pub plan: ScenePlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveals: Option<Vec<Vec<TextReveal>>>,
}

pub fn decode_events(raw: &[u8], format: StreamFormat) -> anyhow::Result<Vec<DeltaEvent>> {
    let events = match format {
        StreamFormat::Jsonl => {
            let text = std::str::from_utf8(raw).context("delta stream is not UTF-8")?;
            decode_jsonl(text)?
        }
        StreamFormat::Sse => decode_sse(raw)?,
    };
    Ok(events)
}

/// Growing prefixes of `events`, `batch` events apart, ending with the full
/// list. This mirrors how the chat transport re-delivers its event array.
pub fn snapshots(events: &[DeltaEvent], batch: usize) -> Vec<Vec<DeltaEvent>> {
    let batch = batch.max(1);
    let mut out: Vec<Vec<DeltaEvent>> = (1..=events.len().div_ceil(batch))
        .map(|step| events[..(step * batch).min(events.len())].to_vec())
        .collect();
    if out.is_empty() {
        out.push(Vec::new());
    }
    out
}

pub async fn replay(events: Vec<DeltaEvent>, batch: usize) -> ReplayReport {
    let snapshots = snapshots(&events, batch);
    let snapshot_count = snapshots.len();
    info!(events = events.len(), snapshots = snapshot_count, "replaying delta stream");

    let (updates_tx, mut updates_rx) = watch::channel::<Option<Artifact>>(None);
    let (_abort, abort_rx) = AbortHandle::new();
    let watcher = tokio::spawn(async move {
        let mut published = 0_usize;
        while updates_rx.changed().await.is_ok() {
            published += 1;
            if let Some(artifact) = updates_rx.borrow_and_update().as_ref() {
                debug!(status = ?artifact.status, chars = artifact.content_chars(), "artifact updated");
            }
        }
        published
    });

    let consumer = follow(
        StreamConsumer::new(),
        stream::iter(snapshots),
        updates_tx,
        abort_rx,
    )
    .await;
    if let Ok(published) = watcher.await {
        debug!(published, "artifact watcher finished");
    }

    let session_id = consumer.session_id().to_string();
    let processed = consumer.cursor().processed();
    let state = consumer.into_state();
    ReplayReport {
        session_id,
        events: processed,
        snapshots: snapshot_count,
        artifact: state.artifact,
        metadata: state.metadata,
    }
}

pub fn plan(
    script: &str,
    duration: f64,
    reveals: Option<RevealMode>,
    config: &TimingConfig,
) -> PlanReport {
    let plan = plan_scenes(script, duration, config);
    info!(
        scenes = plan.scenes.len(),
        total_duration = plan.total_duration,
        "planned script"
    );
    let reveals = reveals.map(|mode| {
        plan.scenes
            .iter()
            .map(|scene| match mode {
                RevealMode::Chars => text_reveals_with(&scene.text, scene.duration_seconds, config),
                RevealMode::Words => word_reveals_with(&scene.text, scene.duration_seconds, config),
            })
            .collect()
    });
    PlanReport { plan, reveals }
}
