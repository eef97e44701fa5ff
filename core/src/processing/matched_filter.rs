use std::sync::Arc;

use crate::math::fft::{Direction, FftEngine, ScalingSchedule};
use crate::math::fixed::CFix;
use crate::math::stats::StatsHelper;
use crate::prelude::{ProcessingStage, StageConfig, StageError, StageResult};
use crate::processing::reference::ReferenceSpectrum;
use crate::telemetry::log::LogManager;

/// Pulse-compression stage: forward transform, per-bin multiply against the
/// reference spectrum, inverse transform. One pulse vector per execute.
pub struct MatchedFilterStage {
    reference: Arc<ReferenceSpectrum>,
    engine: Option<FftEngine>,
    forward_schedule: ScalingSchedule,
    inverse_schedule: ScalingSchedule,
    logger: LogManager,
}

impl MatchedFilterStage {
    pub fn new(reference: Arc<ReferenceSpectrum>) -> Self {
        Self {
            reference,
            engine: None,
            forward_schedule: ScalingSchedule(0),
            inverse_schedule: ScalingSchedule(0),
            logger: LogManager::new(),
        }
    }
}

impl ProcessingStage for MatchedFilterStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        if self.reference.len() != config.range_bins {
            return Err(StageError::InvalidInput(format!(
                "reference spectrum holds {} bins, config wants {}",
                self.reference.len(),
                config.range_bins
            )));
        }
        self.engine = Some(FftEngine::new(config.range_bins)?);
        self.forward_schedule = ScalingSchedule(config.forward_schedule);
        self.inverse_schedule = ScalingSchedule(config.inverse_schedule);
        Ok(())
    }

    fn execute(&mut self, input: &[CFix]) -> StageResult<Vec<CFix>> {
        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let (spectrum, forward_status) =
            engine.execute(input, Direction::Forward, self.forward_schedule)?;

        let product: Vec<CFix> = spectrum
            .iter()
            .zip(self.reference.as_slice())
            .map(|(&bin, &coefficient)| bin.mul(coefficient))
            .collect();

        let (compressed, inverse_status) =
            engine.execute(&product, Direction::Inverse, self.inverse_schedule)?;

        if forward_status.overflow || inverse_status.overflow {
            self.logger.record("MatchedFilterStage transform overflow");
        }
        self.logger.record(&format!(
            "MatchedFilterStage RMS {:.4}",
            StatsHelper::rms(&compressed)
        ));

        Ok(compressed)
    }

    fn cleanup(&mut self) {
        self.engine = None;
    }
}
