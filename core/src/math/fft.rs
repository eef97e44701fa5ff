use std::f64::consts::PI;

use crate::math::fixed::{CFix, Fx};
use crate::prelude::{StageError, StageResult};

/// Transform direction. The inverse conjugates the twiddles and applies no
/// implicit 1/N; all scaling comes from the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Inverse,
}

/// Per-stage right-shift schedule, packed two bits per butterfly stage with
/// the first stage in the least-significant pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingSchedule(pub u32);

impl ScalingSchedule {
    /// One shift per stage: unconditional 1/N scaling, safe for any input.
    pub fn unit(stages: u32) -> Self {
        let mut word = 0u32;
        for stage in 0..stages {
            word |= 1 << (2 * stage);
        }
        ScalingSchedule(word)
    }

    pub fn stage_shift(self, stage: u32) -> u32 {
        (self.0 >> (2 * stage)) & 0b11
    }
}

/// Completion token produced by every transform invocation.
///
/// The engine refuses a new invocation until the previous status has been
/// drained; `FftEngine::execute` performs both steps as one operation.
#[must_use = "transform status must be drained before the engine is reused"]
#[derive(Debug, Clone, Copy)]
pub struct FftStatus {
    /// Set when a butterfly result wrapped the internal width.
    pub overflow: bool,
}

/// Radix-2 decimation-in-time transform over complex fixed-point samples,
/// natural-order output.
pub struct FftEngine {
    size: usize,
    stages: u32,
    twiddles: Vec<CFix>,
    bitrev: Vec<usize>,
    pending_status: Option<FftStatus>,
}

impl FftEngine {
    pub fn new(size: usize) -> StageResult<Self> {
        if size < 2 || !size.is_power_of_two() {
            return Err(StageError::InvalidInput(format!(
                "transform length must be a power of two >= 2, got {}",
                size
            )));
        }

        let mut twiddles = Vec::with_capacity(size / 2);
        for j in 0..size / 2 {
            let angle = -2.0 * PI * j as f64 / size as f64;
            twiddles.push(CFix::new(
                Fx::from_f32(angle.cos() as f32),
                Fx::from_f32(angle.sin() as f32),
            ));
        }

        let mut bitrev = vec![0usize; size];
        let mut j = 0;
        for i in 1..size {
            let mut k = size >> 1;
            while j >= k {
                j -= k;
                k >>= 1;
            }
            j += k;
            bitrev[i] = j;
        }

        Ok(Self {
            size,
            stages: size.trailing_zeros(),
            twiddles,
            bitrev,
            pending_status: None,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn stages(&self) -> u32 {
        self.stages
    }

    /// Runs one transform and drains its status as a single operation.
    pub fn execute(
        &mut self,
        input: &[CFix],
        direction: Direction,
        schedule: ScalingSchedule,
    ) -> StageResult<(Vec<CFix>, FftStatus)> {
        let output = self.invoke(input, direction, schedule)?;
        let status = self.drain_status()?;
        Ok((output, status))
    }

    fn invoke(
        &mut self,
        input: &[CFix],
        direction: Direction,
        schedule: ScalingSchedule,
    ) -> StageResult<Vec<CFix>> {
        if self.pending_status.is_some() {
            return Err(StageError::StatusSequence(
                "previous transform status not drained".into(),
            ));
        }
        if input.len() != self.size {
            return Err(StageError::InvalidInput(format!(
                "transform expects {} samples, got {}",
                self.size,
                input.len()
            )));
        }

        let mut buffer = vec![CFix::ZERO; self.size];
        for (i, &sample) in input.iter().enumerate() {
            buffer[self.bitrev[i]] = sample;
        }

        let mut overflow = false;
        let mut stride = 1usize;
        let mut twiddle_step = self.size >> 1;
        let mut stage = 0u32;

        while stride < self.size {
            let shift = schedule.stage_shift(stage);
            for base in (0..self.size).step_by(stride << 1) {
                for i in 0..stride {
                    let mut w = self.twiddles[i * twiddle_step];
                    if direction == Direction::Inverse {
                        w = CFix::new(w.re, -w.im);
                    }

                    let top = buffer[base + i];
                    let t = buffer[base + i + stride].mul(w);

                    let sum_re = top.re.raw() as i32 + t.re.raw() as i32;
                    let sum_im = top.im.raw() as i32 + t.im.raw() as i32;
                    let diff_re = top.re.raw() as i32 - t.re.raw() as i32;
                    let diff_im = top.im.raw() as i32 - t.im.raw() as i32;

                    buffer[base + i] = CFix::new(
                        scale_to_width(sum_re, shift, &mut overflow),
                        scale_to_width(sum_im, shift, &mut overflow),
                    );
                    buffer[base + i + stride] = CFix::new(
                        scale_to_width(diff_re, shift, &mut overflow),
                        scale_to_width(diff_im, shift, &mut overflow),
                    );
                }
            }
            stride <<= 1;
            twiddle_step >>= 1;
            stage += 1;
        }

        self.pending_status = Some(FftStatus { overflow });
        Ok(buffer)
    }

    fn drain_status(&mut self) -> StageResult<FftStatus> {
        self.pending_status.take().ok_or_else(|| {
            StageError::StatusSequence("no transform status pending".into())
        })
    }
}

/// Truncating right shift back into the 16-bit width, flagging wraps.
fn scale_to_width(value: i32, shift: u32, overflow: &mut bool) -> Fx {
    let shifted = value >> shift;
    if shifted > i16::MAX as i32 || shifted < i16::MIN as i32 {
        *overflow = true;
    }
    Fx::from_raw(shifted as i16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::num_complex::Complex64;
    use rustfft::FftPlanner;

    fn tone(size: usize, bin: usize, amplitude: f32) -> Vec<CFix> {
        (0..size)
            .map(|n| {
                let phase = 2.0 * std::f64::consts::PI * bin as f64 * n as f64 / size as f64;
                CFix::from_f32(
                    amplitude * phase.cos() as f32,
                    amplitude * phase.sin() as f32,
                )
            })
            .collect()
    }

    #[test]
    fn engine_rejects_non_power_of_two_length() {
        assert!(FftEngine::new(96).is_err());
        assert!(FftEngine::new(1).is_err());
    }

    #[test]
    fn forward_transform_peaks_at_tone_bin() {
        let size = 32;
        let mut engine = FftEngine::new(size).unwrap();
        let schedule = ScalingSchedule::unit(engine.stages());
        let input = tone(size, 5, 0.5);

        let (output, status) = engine
            .execute(&input, Direction::Forward, schedule)
            .unwrap();
        assert!(!status.overflow);

        let peak_bin = output
            .iter()
            .enumerate()
            .max_by(|a, b| {
                a.1.magnitude_sq()
                    .partial_cmp(&b.1.magnitude_sq())
                    .unwrap()
            })
            .map(|(bin, _)| bin)
            .unwrap();
        assert_eq!(peak_bin, 5);
        assert!((output[5].magnitude_sq().sqrt() - 0.5).abs() < 0.02);
    }

    #[test]
    fn forward_transform_tracks_float_reference() {
        let size = 64;
        let mut engine = FftEngine::new(size).unwrap();
        let schedule = ScalingSchedule::unit(engine.stages());

        // Short up-chirp exercises every bin with non-trivial phase.
        let input: Vec<CFix> = (0..size)
            .map(|n| {
                let phase = std::f64::consts::PI * (n * n) as f64 / size as f64;
                CFix::from_f32(0.4 * phase.cos() as f32, 0.4 * phase.sin() as f32)
            })
            .collect();

        let mut reference: Vec<Complex64> = input
            .iter()
            .map(|s| Complex64::new(s.re.to_f32() as f64, s.im.to_f32() as f64))
            .collect();
        FftPlanner::new()
            .plan_fft_forward(size)
            .process(&mut reference);

        let (output, status) = engine
            .execute(&input, Direction::Forward, schedule)
            .unwrap();
        assert!(!status.overflow);

        for (bin, sample) in output.iter().enumerate() {
            let expected = reference[bin] / size as f64;
            assert!(
                (sample.re.to_f32() as f64 - expected.re).abs() < 0.01,
                "bin {} re off: {} vs {}",
                bin,
                sample.re.to_f32(),
                expected.re
            );
            assert!((sample.im.to_f32() as f64 - expected.im).abs() < 0.01);
        }
    }

    #[test]
    fn inverse_transform_recovers_time_samples() {
        let size = 16;
        let mut engine = FftEngine::new(size).unwrap();
        let forward = ScalingSchedule::unit(engine.stages());
        let input = tone(size, 3, 0.25);

        let (spectrum, status) = engine
            .execute(&input, Direction::Forward, forward)
            .unwrap();
        assert!(!status.overflow);

        // Unscaled inverse undoes the forward 1/N exactly.
        let (recovered, status) = engine
            .execute(&spectrum, Direction::Inverse, ScalingSchedule(0))
            .unwrap();
        assert!(!status.overflow);

        for (original, round_trip) in input.iter().zip(recovered.iter()) {
            assert!((original.re.to_f32() - round_trip.re.to_f32()).abs() < 0.01);
            assert!((original.im.to_f32() - round_trip.im.to_f32()).abs() < 0.01);
        }
    }

    #[test]
    fn unscaled_stage_on_hot_input_reports_overflow() {
        let size = 8;
        let mut engine = FftEngine::new(size).unwrap();
        let input = vec![CFix::from_f32(0.9, 0.0); size];

        let (_, status) = engine
            .execute(&input, Direction::Forward, ScalingSchedule(0))
            .unwrap();
        assert!(status.overflow);
    }

    #[test]
    fn second_invoke_without_drain_is_rejected() {
        let size = 8;
        let mut engine = FftEngine::new(size).unwrap();
        let schedule = ScalingSchedule::unit(engine.stages());
        let input = vec![CFix::ZERO; size];

        let _output = engine.invoke(&input, Direction::Forward, schedule).unwrap();
        let err = engine
            .invoke(&input, Direction::Forward, schedule)
            .unwrap_err();
        assert!(matches!(err, StageError::StatusSequence(_)));

        let _ = engine.drain_status().unwrap();
        let err = engine.drain_status().unwrap_err();
        assert!(matches!(err, StageError::StatusSequence(_)));
    }
}
