//! Notifications emitted by the pipeline and the sinks that receive them.
//!
//! Every stage reports through a shared `Arc<dyn EventSink>`. The binary
//! uses [`TracingSink`]; tests and embedders use [`ChannelSink`] to observe
//! the exact event sequence.

use crate::pipeline::nodes::FilterKind;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fmt;

/// One externally visible pipeline event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A value made it through every stage to the consumer.
    Processed(i64),
    /// A filter discarded a value.
    Filtered { filter: FilterKind, value: i64 },
    /// An input token was not an integer.
    ParseError(String),
    /// The exit token was read.
    Ended,
    /// The buffering stage drained a non-empty batch.
    Flushed { count: usize },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::Processed(v) => write!(f, "processed value {}", v),
            PipelineEvent::Filtered { filter, value } => {
                write!(f, "filtered by {} filter: {}", filter.name(), value)
            }
            PipelineEvent::ParseError(_) => write!(f, "input only accepts integers"),
            PipelineEvent::Ended => write!(f, "the program has ended"),
            PipelineEvent::Flushed { count } => write!(f, "flushed {} buffered values", count),
        }
    }
}

/// Receiver of pipeline notifications. Called from stage threads.
#[cfg_attr(test, mockall::automock)]
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        match &event {
            PipelineEvent::ParseError(token) => {
                tracing::warn!("{} (got {:?})", event, token);
            }
            PipelineEvent::Flushed { .. } => tracing::debug!("{}", event),
            _ => tracing::info!("{}", event),
        }
    }
}

/// Forwards every event into an unbounded channel. Never blocks a stage.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<PipelineEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<PipelineEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: PipelineEvent) {
        // The observer may have gone away; the pipeline does not care.
        let _ = self.tx.send(event);
    }
}
