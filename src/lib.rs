//! # stagepipe: staged integer filtering pipeline
//!
//! Reads integers line by line and passes each through a fixed chain of
//! concurrent stages: a non-negative filter, a multiple-of-three filter, and
//! a buffering stage that collects survivors in a sliding window and
//! flushes them downstream on a fixed interval.
//!
//! ## Architecture
//!
//! - **Stages**: one OS thread each, connected by rendezvous channels
//! - **Cancellation**: a one-shot broadcast signal observed at every wait
//! - **Buffering**: a drop-oldest sliding window drained as a single batch
//! - **Communication**: Crossbeam channels and `select!`
//!
//! ## Example
//!
//! ```no_run
//! use stagepipe::{PipelineBuilder, PipelineConfig};
//! use std::io::BufReader;
//!
//! let config = PipelineConfig::default();
//! let running = PipelineBuilder::new(config)
//!     .spawn(BufReader::new(std::io::stdin()))
//!     .expect("failed to start pipeline");
//! let report = running.run_to_completion().expect("stage panicked");
//! println!("{} values processed", report.processed);
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{Result, ResultExt, StagePipeError};
pub use pipeline::{
    CancellationSignal, ChannelSink, EventSink, FilterKind, PipelineBuilder, PipelineEvent,
    PipelineReport, RunningPipeline, SlidingWindow,
};
