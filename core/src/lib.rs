//! Fixed-point signal-processing core for the streaming range-Doppler pipeline.
//!
//! The modules mirror the two-phase radar dataflow: per-pulse matched
//! filtering into a range-pulse matrix, then per-range-bin Doppler
//! estimation, with bounded FIFO queues carrying samples between the
//! concurrently running stages of each phase.

pub mod axis_interface;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{ProcessingStage, StageConfig, StageError, StageResult};
