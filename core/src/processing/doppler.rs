use crate::math::fft::{Direction, FftEngine, ScalingSchedule};
use crate::math::fixed::CFix;
use crate::math::stats::StatsHelper;
use crate::prelude::{ProcessingStage, StageConfig, StageError, StageResult};
use crate::telemetry::log::LogManager;

/// Doppler-estimation stage: one forward transform across the pulse
/// dimension per range bin. Plain spectral analysis, no reference multiply.
pub struct DopplerStage {
    engine: Option<FftEngine>,
    schedule: ScalingSchedule,
    logger: LogManager,
}

impl DopplerStage {
    pub fn new() -> Self {
        Self {
            engine: None,
            schedule: ScalingSchedule(0),
            logger: LogManager::new(),
        }
    }
}

impl Default for DopplerStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for DopplerStage {
    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        self.engine = Some(FftEngine::new(config.pulse_count)?);
        self.schedule = ScalingSchedule(config.doppler_schedule);
        Ok(())
    }

    fn execute(&mut self, input: &[CFix]) -> StageResult<Vec<CFix>> {
        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let (spectrum, status) = engine.execute(input, Direction::Forward, self.schedule)?;
        if status.overflow {
            self.logger.record("DopplerStage transform overflow");
        }
        self.logger.record(&format!(
            "DopplerStage RMS {:.4}",
            StatsHelper::rms(&spectrum)
        ));

        Ok(spectrum)
    }

    fn cleanup(&mut self) {
        self.engine = None;
    }
}
