pub mod fft;
pub mod fixed;
pub mod stats;

pub use fft::{Direction, FftEngine, FftStatus, ScalingSchedule};
pub use fixed::{CFix, Fx};
pub use stats::StatsHelper;
