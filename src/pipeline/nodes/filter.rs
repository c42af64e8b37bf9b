//! FilterStage — predicate filtering stage.
//!
//! Reads one value at a time, forwards it unchanged if the predicate holds,
//! otherwise reports a `Filtered` event and drops it. At most one value is
//! in flight inside the stage at any time.

use crate::pipeline::cancel::CancellationSignal;
use crate::pipeline::sink::{EventSink, PipelineEvent};
use crate::pipeline::stage::{recv_or_cancel, send_or_cancel, StageOutcome};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

/// The predicates the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Passes `v >= 0`.
    NonNegative,
    /// Passes `v % 3 == 0`. Its report name, "not-divided-by-three", names
    /// what it throws away, not what it keeps.
    MultipleOfThree,
}

impl FilterKind {
    pub fn accepts(self, value: i64) -> bool {
        match self {
            FilterKind::NonNegative => value >= 0,
            FilterKind::MultipleOfThree => value % 3 == 0,
        }
    }

    /// Name used in discard notifications.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::NonNegative => "negative",
            FilterKind::MultipleOfThree => "not-divided-by-three",
        }
    }

    /// Thread name suffix for the stage running this filter.
    pub fn stage_name(self) -> &'static str {
        match self {
            FilterKind::NonNegative => "non-negative-filter",
            FilterKind::MultipleOfThree => "multiple-of-three-filter",
        }
    }
}

/// A single-input, single-output filtering worker.
pub struct FilterStage {
    kind: FilterKind,
    input: Receiver<i64>,
    output: Sender<i64>,
    cancel: CancellationSignal,
    events: Arc<dyn EventSink>,
}

impl FilterStage {
    pub fn new(
        kind: FilterKind,
        input: Receiver<i64>,
        output: Sender<i64>,
        cancel: CancellationSignal,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            kind,
            input,
            output,
            cancel,
            events,
        }
    }

    /// Run until cancelled or a neighbouring stage disconnects.
    pub fn run(self) -> StageOutcome {
        loop {
            let value = match recv_or_cancel(&self.input, &self.cancel) {
                Ok(value) => value,
                Err(outcome) => return outcome,
            };

            if self.kind.accepts(value) {
                if let Err(outcome) = send_or_cancel(&self.output, value, &self.cancel) {
                    return outcome;
                }
            } else {
                self.events.emit(PipelineEvent::Filtered {
                    filter: self.kind,
                    value,
                });
            }
        }
    }
}
