//! Wavetable oscillator for the audio callback.
//!
//! The oscillator keeps a fractional phase measured in table samples. For a
//! block of `B` frames it reads one parameter snapshot, derives the phase
//! increment `step = f·N / sample_rate`, and fills frame `k` with
//!
//! ```text
//! out[k] = table[floor(phase + step·k) mod N] · amplitude
//! ```
//!
//! then advances `phase` by `step·B` modulo `N`. Phase is carried across
//! blocks in `f64`, so the waveform stays continuous at block boundaries and
//! parameter changes take effect without resetting it.
//!
//! Frequency and amplitude are constant within a block; changes become
//! audible at the next block boundary.

use alloc::sync::Arc;
use libm::floor;

use crate::channel::ParameterReader;
use crate::params::SmoothedParameters;
use crate::wavetable::WaveTable;

/// Table-lookup sine oscillator driven by a [`ParameterReader`].
///
/// Owned by the audio callback. [`render`](Self::render) performs no
/// allocation, locking or I/O and completes in time linear in the buffer
/// length.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use pitchpot_core::{Oscillator, SmoothedParameters, WaveTable, parameter_channel};
///
/// let (_tx, rx) = parameter_channel(SmoothedParameters::new(1000.0, 0.5));
/// let mut osc = Oscillator::new(Arc::new(WaveTable::new(4096)), rx, 44100.0);
///
/// let mut stereo = [0.0f32; 2 * 256];
/// osc.render_interleaved(&mut stereo, 2);
/// assert_eq!(stereo[10], stereo[11]);
/// ```
#[derive(Debug)]
pub struct Oscillator {
    table: Arc<WaveTable>,
    params: ParameterReader,
    sample_rate: f32,
    phase: f64,
}

impl Oscillator {
    /// Creates an oscillator at phase zero.
    pub fn new(table: Arc<WaveTable>, params: ParameterReader, sample_rate: f32) -> Self {
        Self {
            table,
            params,
            sample_rate,
            phase: 0.0,
        }
    }

    /// Current phase in table samples, always in `[0, N)`.
    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Output sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The shared wavetable.
    #[inline]
    pub fn table(&self) -> &Arc<WaveTable> {
        &self.table
    }

    /// Resets phase to zero.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Phase increment per output frame for `frequency_hz`.
    #[inline]
    pub fn step_for(&self, frequency_hz: f32) -> f64 {
        if self.sample_rate <= 0.0 {
            return 0.0;
        }
        f64::from(frequency_hz) * self.table.len() as f64 / f64::from(self.sample_rate)
    }

    /// Fills a mono buffer and returns the snapshot it was rendered with.
    #[inline]
    pub fn render(&mut self, out: &mut [f32]) -> SmoothedParameters {
        self.render_interleaved(out, 1)
    }

    /// Fills an interleaved buffer with `channels` copies of each frame.
    ///
    /// Trailing samples that do not form a whole frame are zeroed.
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) -> SmoothedParameters {
        let params = self.params.read();
        self.fill(params, out, channels.max(1));
        params
    }

    fn fill(&mut self, params: SmoothedParameters, out: &mut [f32], channels: usize) {
        let len = self.table.len() as f64;
        let step = self.step_for(params.frequency_hz);
        let amplitude = params.amplitude;

        let mut frames = 0usize;
        for (k, frame) in out.chunks_exact_mut(channels).enumerate() {
            let index = floor(self.phase + step * k as f64) as usize;
            frame.fill(self.table.lookup(index) * amplitude);
            frames = k + 1;
        }
        out[frames * channels..].fill(0.0);

        self.phase = wrap_phase(self.phase + step * frames as f64, len);
    }
}

/// Reduces `phase` into `[0, len)`. Non-finite input resets to zero.
#[inline]
fn wrap_phase(phase: f64, len: f64) -> f64 {
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase - len * floor(phase / len);
    if (0.0..len).contains(&wrapped) {
        wrapped
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::parameter_channel;

    fn osc(freq: f32, amp: f32, size: usize, sr: f32) -> Oscillator {
        let (_tx, rx) = parameter_channel(SmoothedParameters::new(freq, amp));
        Oscillator::new(Arc::new(WaveTable::new(size)), rx, sr)
    }

    #[test]
    fn phase_advances_by_block() {
        let mut o = osc(440.0, 0.2, 4096, 44100.0);
        let mut block = [0.0f32; 512];
        o.render(&mut block);
        let expected = 440.0 * 4096.0 / 44100.0 * 512.0 % 4096.0;
        assert!((o.phase() - expected).abs() < 1e-9);
    }

    #[test]
    fn first_sample_is_zero_at_phase_zero() {
        let mut o = osc(1000.0, 0.8, 4096, 48000.0);
        let mut block = [1.0f32; 4];
        o.render(&mut block);
        assert_eq!(block[0], 0.0);
    }

    #[test]
    fn zero_amplitude_is_silent() {
        let mut o = osc(440.0, 0.0, 4096, 44100.0);
        let mut block = [1.0f32; 256];
        o.render(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn empty_buffer_keeps_phase() {
        let mut o = osc(440.0, 0.2, 4096, 44100.0);
        o.render(&mut []);
        assert_eq!(o.phase(), 0.0);
    }

    #[test]
    fn interleaved_duplicates_frames_and_zeroes_tail() {
        let mut o = osc(1000.0, 0.5, 4096, 44100.0);
        let mut out = [9.0f32; 7];
        o.render_interleaved(&mut out, 2);
        for pair in out[..6].chunks_exact(2) {
            assert_eq!(pair[0], pair[1]);
        }
        assert_eq!(out[6], 0.0);
    }

    #[test]
    fn wrap_phase_handles_edges() {
        assert_eq!(wrap_phase(4096.0, 4096.0), 0.0);
        assert_eq!(wrap_phase(-1.0, 4096.0), 4095.0);
        assert_eq!(wrap_phase(f64::NAN, 4096.0), 0.0);
        assert_eq!(wrap_phase(f64::INFINITY, 4096.0), 0.0);
    }
}
