use crate::math::fixed::CFix;

pub struct StatsHelper;

impl StatsHelper {
    /// RMS magnitude of a complex sample vector, in float for telemetry.
    pub fn rms(samples: &[CFix]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|s| s.magnitude_sq()).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    /// Index and magnitude of the strongest sample.
    pub fn peak(samples: &[CFix]) -> Option<(usize, f32)> {
        samples
            .iter()
            .enumerate()
            .map(|(idx, s)| (idx, s.magnitude_sq().sqrt()))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fixed::CFix;

    #[test]
    fn rms_zero_sequence_yields_zero() {
        assert_eq!(StatsHelper::rms(&[]), 0.0);
        assert_eq!(StatsHelper::rms(&[CFix::ZERO, CFix::ZERO]), 0.0);
    }

    #[test]
    fn rms_handles_single_value() {
        let sample = CFix::from_f32(0.5, 0.0);
        assert!((StatsHelper::rms(&[sample]) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn peak_finds_strongest_sample() {
        let samples = vec![
            CFix::from_f32(0.1, 0.0),
            CFix::from_f32(0.0, -0.6),
            CFix::from_f32(0.2, 0.2),
        ];
        let (idx, magnitude) = StatsHelper::peak(&samples).unwrap();
        assert_eq!(idx, 1);
        assert!((magnitude - 0.6).abs() < 1e-3);
    }
}
