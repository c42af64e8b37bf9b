//! Stage worker model.
//!
//! Every stage runs on its own named thread and suspends only inside
//! [`recv_or_cancel`] or [`send_or_cancel`], both of which race the data
//! channel against the cancellation listener. When both are ready at the
//! same instant `select!` picks one at random, so a value already taken
//! from the input but not yet forwarded can be dropped on shutdown. That
//! loss is part of the shutdown protocol and is not reported.

use crate::pipeline::cancel::CancellationSignal;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crossbeam_channel::{select, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Why a stage stopped. All variants mean the stage is gone for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The cancellation signal won a wait.
    Cancelled,
    /// The input channel was disconnected (upstream stage exited).
    UpstreamClosed,
    /// The output channel was disconnected (downstream stage exited).
    DownstreamClosed,
}

/// Wait for the next input value, or stop.
pub fn recv_or_cancel<T>(
    input: &Receiver<T>,
    cancel: &CancellationSignal,
) -> Result<T, StageOutcome> {
    select! {
        recv(input) -> msg => msg.map_err(|_| StageOutcome::UpstreamClosed),
        recv(cancel.listener()) -> _ => Err(StageOutcome::Cancelled),
    }
}

/// Hand a value to the next stage, or stop. On a rendezvous channel this
/// blocks until the receiver takes the value.
pub fn send_or_cancel<T>(
    output: &Sender<T>,
    value: T,
    cancel: &CancellationSignal,
) -> Result<(), StageOutcome> {
    select! {
        send(output, value) -> res => res.map_err(|_| StageOutcome::DownstreamClosed),
        recv(cancel.listener()) -> _ => Err(StageOutcome::Cancelled),
    }
}

/// A running stage thread.
#[derive(Debug)]
pub struct StageHandle {
    name: String,
    handle: JoinHandle<StageOutcome>,
}

/// Final state of one stage, as recorded after the pipeline shut down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub name: String,
    pub outcome: StageOutcome,
}

impl StageHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the stage thread to exit.
    pub fn join(self) -> PipelineResult<StageReport> {
        let StageHandle { name, handle } = self;
        match handle.join() {
            Ok(outcome) => Ok(StageReport { name, outcome }),
            Err(_) => Err(PipelineError::StagePanicked(name)),
        }
    }
}

/// Spawn `body` on a dedicated thread named after the stage.
pub fn spawn_stage<F>(name: &str, body: F) -> PipelineResult<StageHandle>
where
    F: FnOnce() -> StageOutcome + Send + 'static,
{
    let stage_name = name.to_string();
    let handle = thread::Builder::new()
        .name(format!("stage-{}", name))
        .spawn(move || {
            tracing::debug!("Stage '{}' started", stage_name);
            let outcome = body();
            tracing::debug!("Stage '{}' stopped: {:?}", stage_name, outcome);
            outcome
        })?;

    Ok(StageHandle {
        name: name.to_string(),
        handle,
    })
}
