//! Built-in pipeline stage implementations.

pub mod buffering;
pub mod filter;

pub use buffering::{BufferingStage, FlushTimer};
pub use filter::{FilterKind, FilterStage};
