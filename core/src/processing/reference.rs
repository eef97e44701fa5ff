use num_complex::Complex32;

use crate::math::fixed::CFix;
use crate::prelude::{StageError, StageResult};

/// Matched-filter reference spectrum: one pre-conjugated coefficient per
/// frequency bin in natural order, immutable for the process lifetime.
pub struct ReferenceSpectrum {
    coefficients: Vec<CFix>,
}

impl ReferenceSpectrum {
    /// Quantizes an externally generated coefficient table, rounding and
    /// saturating at the float boundary.
    pub fn from_components(range_bins: usize, components: &[Complex32]) -> StageResult<Self> {
        if components.len() != range_bins {
            return Err(StageError::InvalidInput(format!(
                "reference spectrum needs {} coefficients, got {}",
                range_bins,
                components.len()
            )));
        }
        Ok(Self {
            coefficients: components.iter().map(|&c| CFix::from_complex32(c)).collect(),
        })
    }

    pub fn from_fixed(range_bins: usize, coefficients: Vec<CFix>) -> StageResult<Self> {
        if coefficients.len() != range_bins {
            return Err(StageError::InvalidInput(format!(
                "reference spectrum needs {} coefficients, got {}",
                range_bins,
                coefficients.len()
            )));
        }
        Ok(Self { coefficients })
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn bin(&self, index: usize) -> CFix {
        self.coefficients[index]
    }

    pub fn as_slice(&self) -> &[CFix] {
        &self.coefficients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_components_rejects_length_mismatch() {
        let coefficients = vec![Complex32::new(0.5, 0.0); 8];
        assert!(ReferenceSpectrum::from_components(16, &coefficients).is_err());
        assert!(ReferenceSpectrum::from_components(8, &coefficients).is_ok());
    }

    #[test]
    fn quantization_saturates_out_of_range_coefficients() {
        let coefficients = vec![Complex32::new(1.5, -1.5); 4];
        let spectrum = ReferenceSpectrum::from_components(4, &coefficients).unwrap();
        let bin = spectrum.bin(0);
        assert!(bin.re.to_f32() > 0.999);
        assert!((bin.im.to_f32() + 1.0).abs() < 1e-6);
    }
}
