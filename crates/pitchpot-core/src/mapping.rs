//! Linear mapping from raw converter codes to engineering units.
//!
//! A 10-bit converter reports codes in `0..=1023`. Each parameter owns a
//! [`ControlRange`] that maps code 0 to its minimum and the full-scale code to
//! its maximum. Codes above full scale cannot come from a healthy converter;
//! they map to `None` and the sampler drops that tick.

use crate::params::ControlTarget;

/// Full-scale code of a 10-bit converter.
pub const MAX_CONTROL_CODE: u16 = 1023;

/// Closed output interval addressed by codes `0..=max_code`.
///
/// The map is computed in `f64` and rounded once, so it is monotonically
/// non-decreasing in the code and hits both endpoints exactly.
///
/// # Example
///
/// ```rust
/// use pitchpot_core::ControlRange;
///
/// let freq = ControlRange::new(100.0, 2000.0);
/// assert_eq!(freq.map(0), Some(100.0));
/// assert_eq!(freq.map(1023), Some(2000.0));
/// assert_eq!(freq.map(1024), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    min: f32,
    max: f32,
    max_code: u16,
}

impl ControlRange {
    /// Creates a range over `[min, max]` for a 10-bit converter.
    ///
    /// `min` must not exceed `max`.
    pub fn new(min: f32, max: f32) -> Self {
        debug_assert!(min <= max, "control range min {min} exceeds max {max}");
        Self {
            min,
            max,
            max_code: MAX_CONTROL_CODE,
        }
    }

    /// Overrides the full-scale code. A zero code is raised to 1.
    pub fn with_max_code(mut self, max_code: u16) -> Self {
        self.max_code = max_code.max(1);
        self
    }

    /// Maps `code` into the range, or `None` when it exceeds full scale.
    #[inline]
    pub fn map(&self, code: u16) -> Option<f32> {
        if code > self.max_code {
            return None;
        }
        if code == self.max_code {
            return Some(self.max);
        }
        let fraction = f64::from(code) / f64::from(self.max_code);
        let min = f64::from(self.min);
        let span = f64::from(self.max) - min;
        Some((min + fraction * span) as f32)
    }

    /// Lower bound (value at code 0).
    #[inline]
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound (value at full scale).
    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Full-scale code.
    #[inline]
    pub fn max_code(&self) -> u16 {
        self.max_code
    }
}

/// Frequency and amplitude ranges applied together on each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlMapping {
    /// Frequency range in Hz.
    pub frequency: ControlRange,
    /// Amplitude range (linear gain).
    pub amplitude: ControlRange,
}

impl ControlMapping {
    /// Pairs two ranges.
    pub fn new(frequency: ControlRange, amplitude: ControlRange) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }

    /// Maps one frequency code and one amplitude code. `None` if either is
    /// out of range.
    #[inline]
    pub fn target(&self, frequency_code: u16, amplitude_code: u16) -> Option<ControlTarget> {
        Some(ControlTarget::new(
            self.frequency.map(frequency_code)?,
            self.amplitude.map(amplitude_code)?,
        ))
    }
}

impl Default for ControlMapping {
    /// 100-2000 Hz and 0.0-0.8 gain over a 10-bit converter.
    fn default() -> Self {
        Self::new(
            ControlRange::new(100.0, 2000.0),
            ControlRange::new(0.0, 0.8),
        )
    }
}
