use std::ops::{Add, Neg, Sub};

use num_complex::Complex32;

/// Signed fixed-point scalar: 16 bits total, 1 integer bit (Q1.15).
///
/// Arithmetic wraps on overflow and multiplication truncates toward minus
/// infinity, matching the transform engine's internal number format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fx(i16);

impl Fx {
    /// Fractional bits of the internal representation.
    pub const FRAC_BITS: u32 = 15;
    /// Total width of a raw ADC field.
    pub const ADC_BITS: u32 = 14;
    /// Fractional bits of a raw ADC field (Q1.13).
    pub const ADC_FRAC_BITS: u32 = 13;

    pub const ZERO: Fx = Fx(0);

    pub fn from_raw(raw: i16) -> Self {
        Fx(raw)
    }

    pub fn raw(self) -> i16 {
        self.0
    }

    /// Widens a 14-bit ADC field into the internal format by bit placement.
    ///
    /// The field's sign bit lands on the internal sign bit and the
    /// fractional bits line up; full-scale ADC maps to full-scale internal
    /// with no arithmetic scaling anywhere.
    pub fn from_adc_bits(bits: u16) -> Self {
        let field = (bits & 0x3FFF) as i16;
        Fx(field << (Self::FRAC_BITS - Self::ADC_FRAC_BITS))
    }

    /// Narrows back to the 14-bit ADC field, dropping the widening bits.
    pub fn to_adc_bits(self) -> u16 {
        ((self.0 >> (Self::FRAC_BITS - Self::ADC_FRAC_BITS)) as u16) & 0x3FFF
    }

    /// Quantizes a float with round-to-nearest and saturation. Only used at
    /// the coefficient and test boundaries, never inside the pipeline.
    pub fn from_f32(value: f32) -> Self {
        let scaled = (value * (1 << Self::FRAC_BITS) as f32).round();
        Fx(scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16)
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1 << Self::FRAC_BITS) as f32
    }

    /// Truncating Q1.15 multiply with a 64-bit intermediate.
    pub fn mul(self, rhs: Fx) -> Fx {
        let wide = self.0 as i64 * rhs.0 as i64;
        Fx((wide >> Self::FRAC_BITS) as i16)
    }
}

impl Add for Fx {
    type Output = Fx;

    fn add(self, rhs: Fx) -> Fx {
        Fx(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fx {
    type Output = Fx;

    fn sub(self, rhs: Fx) -> Fx {
        Fx(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Fx {
    type Output = Fx;

    fn neg(self) -> Fx {
        Fx(self.0.wrapping_neg())
    }
}

/// Complex fixed-point sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CFix {
    pub re: Fx,
    pub im: Fx,
}

impl CFix {
    pub const ZERO: CFix = CFix {
        re: Fx::ZERO,
        im: Fx::ZERO,
    };

    pub fn new(re: Fx, im: Fx) -> Self {
        Self { re, im }
    }

    pub fn from_f32(re: f32, im: f32) -> Self {
        Self {
            re: Fx::from_f32(re),
            im: Fx::from_f32(im),
        }
    }

    pub fn from_complex32(value: Complex32) -> Self {
        Self::from_f32(value.re, value.im)
    }

    pub fn to_complex32(self) -> Complex32 {
        Complex32::new(self.re.to_f32(), self.im.to_f32())
    }

    /// Complex product `(ac - bd) + (ad + bc)i`, combined in 64-bit
    /// intermediates with a single truncation per component.
    pub fn mul(self, rhs: CFix) -> CFix {
        let (a, b) = (self.re.raw() as i64, self.im.raw() as i64);
        let (c, d) = (rhs.re.raw() as i64, rhs.im.raw() as i64);
        let re = (a * c - b * d) >> Fx::FRAC_BITS;
        let im = (a * d + b * c) >> Fx::FRAC_BITS;
        CFix {
            re: Fx::from_raw(re as i16),
            im: Fx::from_raw(im as i16),
        }
    }

    pub fn add(self, rhs: CFix) -> CFix {
        CFix {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }

    pub fn sub(self, rhs: CFix) -> CFix {
        CFix {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }

    /// Squared magnitude in float, for telemetry and peak scans.
    pub fn magnitude_sq(self) -> f32 {
        let re = self.re.to_f32();
        let im = self.im.to_f32();
        re * re + im * im
    }
}
