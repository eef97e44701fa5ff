use serde::{Deserialize, Serialize};

use crate::math::fixed::CFix;

/// Shared configuration for the processing stages and the pipeline driver.
///
/// The scaling-schedule words are tunables carried over from the shipped
/// 128-point build; they are not derivable from the dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub range_bins: usize,
    pub pulse_count: usize,
    /// Per-stage shift schedule for the forward range transform.
    pub forward_schedule: u32,
    /// Per-stage shift schedule for the inverse range transform.
    pub inverse_schedule: u32,
    /// Per-stage shift schedule for the Doppler transform.
    pub doppler_schedule: u32,
    /// Depth of the FIFO between the compressor and the matrix writer.
    pub compress_fifo_depth: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            range_bins: 128,
            pulse_count: 128,
            forward_schedule: 0x6A,
            inverse_schedule: 0x55,
            doppler_schedule: 0x1555,
            compress_fifo_depth: 16,
        }
    }
}

impl StageConfig {
    /// Rejects dimensions the radix-2 transform engine cannot take.
    pub fn validate(&self) -> StageResult<()> {
        for (label, value) in [
            ("range_bins", self.range_bins),
            ("pulse_count", self.pulse_count),
        ] {
            if value < 2 || !value.is_power_of_two() {
                return Err(StageError::InvalidInput(format!(
                    "{} must be a power of two >= 2, got {}",
                    label, value
                )));
            }
        }
        if self.compress_fifo_depth == 0 {
            return Err(StageError::InvalidInput(
                "compress_fifo_depth must be nonzero".into(),
            ));
        }
        Ok(())
    }

    pub fn total_samples(&self) -> usize {
        self.range_bins * self.pulse_count
    }
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("transform status sequence violated: {0}")]
    StatusSequence(String),
    #[error("phase ordering violated: {0}")]
    PhaseOrder(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing sample-vector processing stages.
pub trait ProcessingStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()>;
    fn execute(&mut self, input: &[CFix]) -> StageResult<Vec<CFix>>;
    fn cleanup(&mut self);
}
