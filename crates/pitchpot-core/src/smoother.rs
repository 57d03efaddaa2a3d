//! One-pole exponential smoothing of control targets.
//!
//! Raw potentiometer readings are noisy and step in coarse increments. The
//! smoother runs once per sampler tick and moves each parameter a fixed
//! fraction of the way toward its target:
//!
//! ```text
//! α = 1 − exp(−Δt / τ)
//! s ← s + α·(target − s)
//! ```
//!
//! With `τ = 20 ms` and `Δt = 10 ms` (100 Hz polling), α ≈ 0.3935 and the
//! parameter covers 63% of a step within τ.
//!
//! The update is computed in `f64` and rounded once to `f32`, so the result
//! always lies between the previous value and the target.

use crate::params::{ControlTarget, SmoothedParameters};
use libm::exp;

/// Per-tick exponential smoother shared by frequency and amplitude.
///
/// # Example
///
/// ```rust
/// use pitchpot_core::ParameterSmoother;
///
/// let smoother = ParameterSmoother::from_poll_rate(0.02, 100.0);
/// assert!((smoother.alpha() - 0.39346934).abs() < 1e-6);
///
/// let next = smoother.step_value(0.0, 1.0);
/// assert!(next > 0.39 && next < 0.40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSmoother {
    alpha: f64,
    time_constant_s: f32,
    tick_interval_s: f32,
}

impl ParameterSmoother {
    /// Creates a smoother with time constant `tau` seconds, ticked every
    /// `tick_interval` seconds.
    ///
    /// A non-positive or non-finite `tau` disables smoothing (α = 1).
    pub fn new(time_constant_s: f32, tick_interval_s: f32) -> Self {
        Self {
            alpha: coefficient(time_constant_s, tick_interval_s),
            time_constant_s,
            tick_interval_s,
        }
    }

    /// Creates a smoother ticked at `poll_hz` ticks per second.
    pub fn from_poll_rate(time_constant_s: f32, poll_hz: f32) -> Self {
        let interval = if poll_hz > 0.0 { 1.0 / poll_hz } else { 0.0 };
        Self::new(time_constant_s, interval)
    }

    /// Recomputes α for a new tick interval, e.g. a measured one.
    pub fn retime(&mut self, tick_interval_s: f32) {
        if tick_interval_s != self.tick_interval_s {
            self.tick_interval_s = tick_interval_s;
            self.alpha = coefficient(self.time_constant_s, tick_interval_s);
        }
    }

    /// The current smoothing coefficient, in `[0, 1]`.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Time constant in seconds.
    #[inline]
    pub fn time_constant(&self) -> f32 {
        self.time_constant_s
    }

    /// Tick interval α was computed for, in seconds.
    #[inline]
    pub fn tick_interval(&self) -> f32 {
        self.tick_interval_s
    }

    /// Advances a single value one tick toward `target`.
    #[inline]
    pub fn step_value(&self, current: f32, target: f32) -> f32 {
        let current = f64::from(current);
        let target = f64::from(target);
        let next = current + self.alpha * (target - current);
        // Rounding can land one ulp past the target; clamp to the segment.
        let (lo, hi) = if current <= target {
            (current, target)
        } else {
            (target, current)
        };
        next.clamp(lo, hi) as f32
    }

    /// Advances both parameters one tick toward `target`.
    #[inline]
    pub fn step(&self, current: SmoothedParameters, target: ControlTarget) -> SmoothedParameters {
        SmoothedParameters::new(
            self.step_value(current.frequency_hz, target.frequency_hz),
            self.step_value(current.amplitude, target.amplitude),
        )
    }
}

fn coefficient(time_constant_s: f32, tick_interval_s: f32) -> f64 {
    let tau = f64::from(time_constant_s);
    if !(tau.is_finite() && tau > 0.0) {
        return 1.0;
    }
    let dt = f64::from(tick_interval_s).max(0.0);
    (1.0 - exp(-dt / tau)).clamp(0.0, 1.0)
}
