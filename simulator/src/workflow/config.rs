use anyhow::Context;
use rdmcore::math::fft::ScalingSchedule;
use rdmcore::prelude::StageConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::chirp::StimulusConfig;

/// One simulated scenario: map dimensions, injected target, front-end
/// noise, and optional transform scaling overrides.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub range_bins: usize,
    pub pulse_count: usize,
    pub target_range_bin: usize,
    pub target_doppler_bin: usize,
    pub sample_rate: f32,
    pub bandwidth: f32,
    pub noise: f32,
    pub seed: u64,
    pub forward_schedule: Option<u32>,
    pub inverse_schedule: Option<u32>,
    pub doppler_schedule: Option<u32>,
    pub compress_fifo_depth: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            range_bins: 128,
            pulse_count: 128,
            target_range_bin: 50,
            target_doppler_bin: 32,
            sample_rate: 20_000.0,
            bandwidth: 10_000.0,
            noise: 0.05,
            seed: 0,
            forward_schedule: None,
            inverse_schedule: None,
            doppler_schedule: None,
            compress_fifo_depth: 16,
        }
    }
}

impl ScenarioConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scenario config {}", path_ref.display()))?;
        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing scenario config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        range_bins: usize,
        pulse_count: usize,
        target_range_bin: usize,
        target_doppler_bin: usize,
    ) -> Self {
        Self {
            range_bins,
            pulse_count,
            target_range_bin,
            target_doppler_bin,
            ..Default::default()
        }
    }

    /// Maps onto the core stage configuration. Unset schedules fall back to
    /// one shift per stage, which is overflow-safe at any length.
    pub fn to_stage_config(&self) -> StageConfig {
        let range_stages = self.range_bins.trailing_zeros();
        let doppler_stages = self.pulse_count.trailing_zeros();
        StageConfig {
            range_bins: self.range_bins,
            pulse_count: self.pulse_count,
            forward_schedule: self
                .forward_schedule
                .unwrap_or(ScalingSchedule::unit(range_stages).0),
            inverse_schedule: self
                .inverse_schedule
                .unwrap_or(ScalingSchedule::unit(range_stages).0),
            doppler_schedule: self
                .doppler_schedule
                .unwrap_or(ScalingSchedule::unit(doppler_stages).0),
            compress_fifo_depth: self.compress_fifo_depth,
        }
    }

    pub fn to_stimulus_config(&self) -> StimulusConfig {
        StimulusConfig {
            range_bins: self.range_bins,
            pulse_count: self.pulse_count,
            target_range_bin: self.target_range_bin,
            target_doppler_bin: self.target_doppler_bin,
            sample_rate: self.sample_rate,
            bandwidth: self.bandwidth,
            noise: self.noise,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_stage_config() {
        let cfg = ScenarioConfig::from_args(64, 32, 10, 4);
        let stage = cfg.to_stage_config();
        assert_eq!(stage.range_bins, 64);
        assert_eq!(stage.pulse_count, 32);
        assert_eq!(stage.forward_schedule, ScalingSchedule::unit(6).0);
        stage.validate().unwrap();
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"range_bins: 64\npulse_count: 32\ntarget_range_bin: 9\nforward_schedule: 106\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ScenarioConfig::load(&path).unwrap();
        assert_eq!(cfg.range_bins, 64);
        assert_eq!(cfg.target_range_bin, 9);
        assert_eq!(cfg.forward_schedule, Some(0x6A));
        assert_eq!(cfg.to_stage_config().forward_schedule, 0x6A);
    }
}
