//! Pipeline orchestrator — wires the stages and runs the consumer loop.
//!
//! `PipelineBuilder::spawn` starts four stage threads connected by
//! zero-capacity (rendezvous) channels. The caller's thread then becomes
//! the consumer: `RunningPipeline::run_to_completion` receives flushed
//! values until cancellation, then joins the stages.

use crate::config::PipelineConfig;
use crate::pipeline::cancel::CancellationSignal;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::nodes::{BufferingStage, FilterKind, FilterStage};
use crate::pipeline::sink::{EventSink, PipelineEvent, TracingSink};
use crate::pipeline::source::LineSource;
use crate::pipeline::stage::{spawn_stage, StageHandle, StageReport};
use crate::pipeline::window::SlidingWindow;
use crossbeam_channel::{bounded, select, Receiver};
use std::io::BufRead;
use std::sync::Arc;

/// Stage name of the input reader.
pub const SOURCE_STAGE: &str = "line-source";
/// Stage name of the buffering stage.
pub const BUFFER_STAGE: &str = "buffering";

/// Builds and starts a pipeline.
pub struct PipelineBuilder {
    config: PipelineConfig,
    events: Arc<dyn EventSink>,
}

impl PipelineBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            events: Arc::new(TracingSink),
        }
    }

    /// Replace the default tracing sink.
    pub fn with_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Start every stage, reading tokens from `reader`.
    pub fn spawn<R>(self, reader: R) -> PipelineResult<RunningPipeline>
    where
        R: BufRead + Send + 'static,
    {
        let interval = self.config.drain_interval();
        if interval.is_zero() {
            return Err(PipelineError::InvalidInterval);
        }
        let window = Arc::new(SlidingWindow::new(self.config.buffer_capacity)?);
        let cancel = CancellationSignal::new();

        let (input_tx, input_rx) = bounded(0);
        let (non_negative_tx, non_negative_rx) = bounded(0);
        let (multiple_tx, multiple_rx) = bounded(0);
        let (buffered_tx, buffered_rx) = bounded(0);

        tracing::info!("Starting pipeline ({})", self.config);

        let mut stages = Vec::with_capacity(3);

        // A failed spawn raises cancellation so earlier stages stop too.
        let source = {
            let cancel = cancel.clone();
            let events = self.events.clone();
            let source = LineSource::new(reader);
            spawn_stage(SOURCE_STAGE, move || source.run(input_tx, cancel, events))
        };
        let source = cancel.raise_on_err(source)?;

        let filter = FilterStage::new(
            FilterKind::NonNegative,
            input_rx,
            non_negative_tx,
            cancel.clone(),
            self.events.clone(),
        );
        let stage = spawn_stage(FilterKind::NonNegative.stage_name(), move || filter.run());
        stages.push(cancel.raise_on_err(stage)?);

        let filter = FilterStage::new(
            FilterKind::MultipleOfThree,
            non_negative_rx,
            multiple_tx,
            cancel.clone(),
            self.events.clone(),
        );
        let stage = spawn_stage(FilterKind::MultipleOfThree.stage_name(), move || filter.run());
        stages.push(cancel.raise_on_err(stage)?);

        let buffering = BufferingStage::new(
            window.clone(),
            interval,
            multiple_rx,
            buffered_tx,
            cancel.clone(),
            self.events.clone(),
        );
        let stage = spawn_stage(BUFFER_STAGE, move || buffering.run());
        stages.push(cancel.raise_on_err(stage)?);

        Ok(RunningPipeline {
            cancel,
            output: buffered_rx,
            source,
            stages,
            window,
            events: self.events,
        })
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Values delivered to the consumer.
    pub processed: u64,
    /// Outcome of the input stage, or `None` if it was still blocked on its
    /// reader at shutdown and was left behind.
    pub source: Option<StageReport>,
    /// Outcome of the filter and buffering stages, in pipeline order.
    pub stages: Vec<StageReport>,
    /// Values still buffered at shutdown, never delivered.
    pub unflushed: usize,
}

/// Handle to a started pipeline.
pub struct RunningPipeline {
    cancel: CancellationSignal,
    output: Receiver<i64>,
    source: StageHandle,
    stages: Vec<StageHandle>,
    window: Arc<SlidingWindow>,
    events: Arc<dyn EventSink>,
}

impl RunningPipeline {
    /// Handle for raising cancellation from another thread.
    pub fn cancellation(&self) -> CancellationSignal {
        self.cancel.clone()
    }

    /// Raise cancellation.
    pub fn cancel(&self) {
        self.cancel.raise();
    }

    /// Consume output on the calling thread until cancellation, then join.
    pub fn run_to_completion(self) -> PipelineResult<PipelineReport> {
        let RunningPipeline {
            cancel,
            output,
            source,
            stages,
            window,
            events,
        } = self;

        let mut processed = 0u64;
        loop {
            select! {
                recv(output) -> msg => match msg {
                    Ok(value) => {
                        processed += 1;
                        events.emit(PipelineEvent::Processed(value));
                    }
                    Err(_) => break,
                },
                recv(cancel.listener()) -> _ => break,
            }
        }

        // The loop can also end because the buffering stage went away.
        cancel.raise();
        drop(output);

        let mut reports = Vec::with_capacity(stages.len());
        for stage in stages {
            reports.push(stage.join()?);
        }
        let source = if source.is_finished() {
            Some(source.join()?)
        } else {
            tracing::debug!("Input stage still blocked on read, detaching it");
            None
        };

        let unflushed = window.len();
        tracing::info!(
            "Pipeline stopped after {} processed values ({} unflushed)",
            processed,
            unflushed
        );
        Ok(PipelineReport {
            processed,
            source,
            stages: reports,
            unflushed,
        })
    }
}
