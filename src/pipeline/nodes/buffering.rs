//! BufferingStage — time-windowed batching stage.
//!
//! ```text
//!            value arrives              interval elapses
//!          ┌──────────────┐          ┌──────────────────┐
//!          ▼              │          │                  ▼
//!      [Filling] ─────────┘      [Filling] ──────► [Flushing] ──► reset timer ──► [Filling]
//!          │
//!          └── cancellation ──► [Terminated]
//! ```
//!
//! The interval is measured from the end of the previous flush, not on a
//! fixed wall-clock grid: the timer is reset only after the last value of a
//! batch has been handed downstream.

use crate::pipeline::cancel::CancellationSignal;
use crate::pipeline::sink::{EventSink, PipelineEvent};
use crate::pipeline::stage::{send_or_cancel, StageOutcome};
use crate::pipeline::window::SlidingWindow;
use crossbeam_channel::{select, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Single owned flush deadline, rearmed explicitly after each flush.
#[derive(Debug, Clone)]
pub struct FlushTimer {
    interval: Duration,
    deadline: Instant,
}

impl FlushTimer {
    /// Start a timer whose first deadline is one interval from now.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: Instant::now() + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_due(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Start a new interval from now.
    pub fn reset(&mut self) {
        self.deadline = Instant::now() + self.interval;
    }
}

/// Collects values into a [`SlidingWindow`] and forwards them in bursts.
pub struct BufferingStage {
    window: Arc<SlidingWindow>,
    timer: FlushTimer,
    input: Receiver<i64>,
    output: Sender<i64>,
    cancel: CancellationSignal,
    events: Arc<dyn EventSink>,
}

impl BufferingStage {
    /// The flush timer starts counting at construction.
    pub fn new(
        window: Arc<SlidingWindow>,
        interval: Duration,
        input: Receiver<i64>,
        output: Sender<i64>,
        cancel: CancellationSignal,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            window,
            timer: FlushTimer::new(interval),
            input,
            output,
            cancel,
            events,
        }
    }

    pub fn run(self) -> StageOutcome {
        let BufferingStage {
            window,
            mut timer,
            input,
            output,
            cancel,
            events,
        } = self;

        loop {
            select! {
                recv(input) -> msg => match msg {
                    Ok(value) => window.insert(value),
                    Err(_) => return StageOutcome::UpstreamClosed,
                },
                recv(cancel.listener()) -> _ => return StageOutcome::Cancelled,
                default(timer.remaining()) => {
                    if let Err(outcome) = flush(&window, &output, &cancel, events.as_ref()) {
                        return outcome;
                    }
                    timer.reset();
                }
            }
        }
    }
}

/// Drain the window and hand every value downstream in arrival order.
/// An empty window sends nothing.
fn flush(
    window: &SlidingWindow,
    output: &Sender<i64>,
    cancel: &CancellationSignal,
    events: &dyn EventSink,
) -> Result<(), StageOutcome> {
    let Some(batch) = window.drain() else {
        return Ok(());
    };

    events.emit(PipelineEvent::Flushed { count: batch.len() });
    for value in batch {
        send_or_cancel(output, value, cancel)?;
    }
    Ok(())
}
