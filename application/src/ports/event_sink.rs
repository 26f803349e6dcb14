//! Lifecycle events emitted while the pipeline runs.
//!
//! A streaming consumer (SSE endpoint, progress UI) receives one
//! [`CouncilEvent`] per lifecycle step, in a fixed order:
//! `stage1_start`, `stage1_complete`, `stage2_start`, `stage2_complete`,
//! `stage3_start`, `stage3_complete`, `complete`. After a stage-1 total
//! failure the sequence is `stage1_start`, `stage1_complete`, `error` —
//! stage-2/3 events are never emitted in that case.

use council_domain::{
    AggregateEntry, LabelMap, QueryError, Stage1Response, Stage2Ranking, Stage3Synthesis,
    TournamentEntry,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Ranking metadata attached to the `stage2_complete` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage2Metadata {
    pub label_to_model: LabelMap,
    pub aggregate_rankings: Vec<AggregateEntry>,
    pub tournament_rankings: Vec<TournamentEntry>,
}

/// One discrete lifecycle event, tagged with a `type` discriminator on
/// the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouncilEvent {
    Stage1Start,
    Stage1Complete {
        data: Vec<Stage1Response>,
        #[serde(skip_serializing_if = "Option::is_none")]
        errors: Option<Vec<QueryError>>,
    },
    Stage2Start,
    Stage2Complete {
        data: Vec<Stage2Ranking>,
        metadata: Stage2Metadata,
        #[serde(skip_serializing_if = "Option::is_none")]
        errors: Option<Vec<QueryError>>,
    },
    Stage3Start,
    Stage3Complete {
        data: Stage3Synthesis,
        #[serde(skip_serializing_if = "Option::is_none")]
        errors: Option<Vec<QueryError>>,
    },
    Complete,
    /// Terminal failure event. The message is always safe to show —
    /// internal details never leak through this variant.
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        errors: Option<Vec<QueryError>>,
    },
}

impl CouncilEvent {
    /// The wire value of the `type` discriminator.
    pub fn event_type(&self) -> &'static str {
        match self {
            CouncilEvent::Stage1Start => "stage1_start",
            CouncilEvent::Stage1Complete { .. } => "stage1_complete",
            CouncilEvent::Stage2Start => "stage2_start",
            CouncilEvent::Stage2Complete { .. } => "stage2_complete",
            CouncilEvent::Stage3Start => "stage3_start",
            CouncilEvent::Stage3Complete { .. } => "stage3_complete",
            CouncilEvent::Complete => "complete",
            CouncilEvent::Error { .. } => "error",
        }
    }
}

/// Receiver of pipeline lifecycle events.
///
/// Implementations live in the presentation layer (progress bars, SSE
/// writers). Emission is fire-and-forget: a sink that can no longer
/// deliver must swallow the event, never fail the pipeline.
pub trait CouncilEventSink: Send + Sync {
    fn emit(&self, event: CouncilEvent);
}

/// No-op sink for when nobody is listening.
pub struct NoopSink;

impl CouncilEventSink for NoopSink {
    fn emit(&self, _event: CouncilEvent) {}
}

/// Sink that forwards events into an unbounded channel.
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<CouncilEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CouncilEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl CouncilEventSink for ChannelSink {
    fn emit(&self, event: CouncilEvent) {
        // Receiver dropped means nobody is listening anymore
        let _ = self.sender.send(event);
    }
}
