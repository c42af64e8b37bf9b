//! Staged integer pipeline.
//!
//! Values flow strictly linearly, one thread per stage, each hop a
//! zero-capacity crossbeam channel:
//!
//! ```text
//! [LineSource] ──► [NonNegative] ──► [MultipleOfThree] ──► [Buffering] ──► consumer
//!       │                │                   │                  │              │
//!       └────────────────┴──── CancellationSignal (select!) ────┴──────────────┘
//! ```
//!
//! # Design
//!
//! - **Rendezvous hops** — a send completes only when the next stage
//!   receives, so a slow consumer stalls every upstream stage.
//! - **One shutdown path** — every wait is a `select!` that includes the
//!   cancellation listener. Raising it stops every stage at its next wait.
//! - **Lossy shutdown** — a value taken from an input but not yet forwarded
//!   when cancellation wins is dropped without a report.
//! - **Self-locking window** — `SlidingWindow` owns its mutex and exposes
//!   only atomic operations.

pub mod cancel;
pub mod error;
pub mod executor;
pub mod nodes;
pub mod sink;
pub mod source;
pub mod stage;
pub mod window;

pub use cancel::CancellationSignal;
pub use error::{PipelineError, PipelineResult};
pub use executor::{PipelineBuilder, PipelineReport, RunningPipeline};
pub use nodes::{BufferingStage, FilterKind, FilterStage, FlushTimer};
pub use sink::{ChannelSink, EventSink, PipelineEvent, TracingSink};
pub use source::{parse_token, InputToken, LineSource};
pub use stage::{StageOutcome, StageReport};
pub use window::SlidingWindow;
