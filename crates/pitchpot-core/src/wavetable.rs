//! Precomputed single-cycle sine table.
//!
//! Replaces a transcendental call per output sample with one array read.
//! The table is built once at startup and shared read-only between threads
//! (wrap it in an `Arc`); it needs no synchronization.
//!
//! ```rust
//! use pitchpot_core::WaveTable;
//!
//! let table = WaveTable::new(4096);
//! assert!(table.lookup(0).abs() < 1e-6);
//! assert!((table.lookup(1024) - 1.0).abs() < 1e-6);
//! // Indices wrap modulo the table length
//! assert_eq!(table.lookup(4096 + 1024), table.lookup(1024));
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::f64::consts::TAU;
use libm::sin;

/// Table size used when none is configured.
pub const DEFAULT_TABLE_SIZE: usize = 4096;

/// One period of a sine wave sampled at `len()` evenly spaced points.
///
/// # Invariants
///
/// - `samples[i] == sin(2π·i/N)` rounded to `f32`
/// - length is non-zero and never changes after construction
#[derive(Debug, Clone, PartialEq)]
pub struct WaveTable {
    samples: Box<[f32]>,
}

impl WaveTable {
    /// Builds a table of `size` samples.
    ///
    /// Each entry is evaluated in double precision and rounded to `f32`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "wavetable size must be non-zero");
        let n = size as f64;
        let samples: Vec<f32> = (0..size)
            .map(|i| sin(TAU * i as f64 / n) as f32)
            .collect();
        Self {
            samples: samples.into_boxed_slice(),
        }
    }

    /// Returns the sample at `index` reduced modulo the table length.
    #[inline]
    pub fn lookup(&self, index: usize) -> f32 {
        self.samples[index % self.samples.len()]
    }

    /// Number of samples in one period.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`; a table holds at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The raw table contents.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}

impl Default for WaveTable {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE_SIZE)
    }
}
