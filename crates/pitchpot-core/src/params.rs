//! Parameter value types shared by the control plane and the render path.

/// Frequency/amplitude pair as seen by the oscillator.
///
/// Produced by the sampler after smoothing and published through a
/// [`ParameterChannel`](crate::ParameterChannel). The render path only ever
/// receives whole values of this type, never a mix of two publications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedParameters {
    /// Oscillator frequency in Hz.
    pub frequency_hz: f32,
    /// Linear output amplitude.
    pub amplitude: f32,
}

impl SmoothedParameters {
    /// Creates a parameter pair.
    #[inline]
    pub const fn new(frequency_hz: f32, amplitude: f32) -> Self {
        Self {
            frequency_hz,
            amplitude,
        }
    }

    /// Packs both fields into one 64-bit word (frequency in the high half).
    #[inline]
    pub(crate) fn to_bits(self) -> u64 {
        (u64::from(self.frequency_hz.to_bits()) << 32) | u64::from(self.amplitude.to_bits())
    }

    /// Inverse of [`to_bits`](Self::to_bits).
    #[inline]
    pub(crate) fn from_bits(bits: u64) -> Self {
        Self {
            frequency_hz: f32::from_bits((bits >> 32) as u32),
            amplitude: f32::from_bits(bits as u32),
        }
    }
}

/// Unsmoothed frequency/amplitude pair mapped from one tick's raw codes.
///
/// Recomputed on every sampler tick and fed straight into the
/// [`ParameterSmoother`](crate::ParameterSmoother); never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlTarget {
    /// Target frequency in Hz.
    pub frequency_hz: f32,
    /// Target linear amplitude.
    pub amplitude: f32,
}

impl ControlTarget {
    /// Creates a target pair.
    #[inline]
    pub const fn new(frequency_hz: f32, amplitude: f32) -> Self {
        Self {
            frequency_hz,
            amplitude,
        }
    }
}
