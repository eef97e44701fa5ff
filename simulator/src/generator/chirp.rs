use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rdmcore::axis_interface::InputWord;
use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const ADC_FULL_SCALE: f32 = ((1 << 13) - 1) as f32;

/// Configuration for synthesizing a target echo burst.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusConfig {
    pub range_bins: usize,
    pub pulse_count: usize,
    pub target_range_bin: usize,
    pub target_doppler_bin: usize,
    pub sample_rate: f32,
    pub bandwidth: f32,
    pub noise: f32,
    pub seed: u64,
}

impl Default for StimulusConfig {
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
        }
    }
}

/// Linear FM chirp spanning one pulse's sampling window.
pub fn lfm_chirp(config: &StimulusConfig) -> Vec<Complex32> {
    let n = config.range_bins;
    let pulse_width = n as f64 / config.sample_rate as f64;
    let rate = config.bandwidth as f64 / pulse_width;

    (0..n)
        .map(|i| {
            let t = i as f64 / config.sample_rate as f64;
            let phase = PI * rate * t * t;
            Complex32::new(phase.cos() as f32, phase.sin() as f32)
        })
        .collect()
}

/// Matched-filter coefficient table: forward transform of the design chirp,
/// conjugated, normalized to 0.9 of full scale.
pub fn reference_components(chirp: &[Complex32]) -> Vec<Complex32> {
    let mut spectrum = chirp.to_vec();
    FftPlanner::new()
        .plan_fft_forward(chirp.len())
        .process(&mut spectrum);

    let max_magnitude = spectrum.iter().map(|c| c.norm()).fold(f32::MIN, f32::max);
    spectrum
        .iter()
        .map(|c| c.conj() * 0.9 / max_magnitude)
        .collect()
}

/// Builds the packed input burst: a circularly delayed chirp echo with a
/// per-pulse Doppler phase rotation, jitter, and 14-bit quantization.
pub fn build_stimulus(config: &StimulusConfig, chirp: &[Complex32]) -> anyhow::Result<Vec<InputWord>> {
    let n = config.range_bins;
    if chirp.len() != n {
        anyhow::bail!("chirp holds {} samples, config wants {}", chirp.len(), n);
    }
    if config.target_range_bin >= n || config.target_doppler_bin >= config.pulse_count {
        anyhow::bail!(
            "target ({}, {}) outside the {}x{} map",
            config.target_range_bin,
            config.target_doppler_bin,
            n,
            config.pulse_count
        );
    }

    let total = n
        .checked_mul(config.pulse_count)
        .context("overflow computing stimulus sample count")?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut words = Vec::with_capacity(total);

    for pulse in 0..config.pulse_count {
        let rotation = 2.0 * PI * config.target_doppler_bin as f64 * pulse as f64
            / config.pulse_count as f64;
        let rotor = Complex32::new(rotation.cos() as f32, rotation.sin() as f32);

        for i in 0..n {
            let echo = chirp[(i + n - config.target_range_bin) % n] * rotor * 0.7;
            let jitter_re = jitter(&mut rng, config.noise);
            let jitter_im = jitter(&mut rng, config.noise);

            let re = quantize(echo.re + jitter_re);
            let im = quantize(echo.im + jitter_im);
            let last = words.len() == total - 1;
            words.push(InputWord::pack(re, im, last));
        }
    }

    Ok(words)
}

fn jitter(rng: &mut StdRng, noise: f32) -> f32 {
    if noise > 0.0 {
        rng.gen_range(-noise..noise)
    } else {
        0.0
    }
}

fn quantize(value: f32) -> u16 {
    let scaled = (value * ADC_FULL_SCALE)
        .round()
        .clamp(-ADC_FULL_SCALE, ADC_FULL_SCALE);
    scaled as i16 as u16
}
