//! Lock-free single-writer/single-reader parameter hand-off.
//!
//! The sampler thread publishes a [`SmoothedParameters`] snapshot every tick;
//! the audio callback reads the latest one at the top of each block. Both
//! fields travel in one `AtomicU64` (frequency bits high, amplitude bits low),
//! so a reader can never observe the frequency of one publication paired with
//! the amplitude of another. Stores use `Release` and loads use `Acquire`.
//!
//! Neither side blocks, allocates, or retries. A publish that races a read is
//! simply seen on the next block.
//!
//! # Example
//!
//! ```rust
//! use pitchpot_core::{SmoothedParameters, parameter_channel};
//!
//! let (publisher, reader) = parameter_channel(SmoothedParameters::new(440.0, 0.2));
//! assert_eq!(reader.read(), SmoothedParameters::new(440.0, 0.2));
//!
//! std::thread::spawn(move || {
//!     publisher.publish(SmoothedParameters::new(1000.0, 0.5));
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(reader.read(), SmoothedParameters::new(1000.0, 0.5));
//! ```

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::params::SmoothedParameters;

/// Shared cell holding the most recently published snapshot.
///
/// Usually accessed through the halves returned by [`parameter_channel`],
/// which encode the one-writer/one-reader discipline in their types.
#[derive(Debug)]
pub struct ParameterChannel {
    bits: AtomicU64,
}

impl ParameterChannel {
    /// Creates a channel holding `initial`.
    pub fn new(initial: SmoothedParameters) -> Self {
        Self {
            bits: AtomicU64::new(initial.to_bits()),
        }
    }

    /// Replaces the current snapshot.
    #[inline]
    pub fn publish(&self, params: SmoothedParameters) {
        self.bits.store(params.to_bits(), Ordering::Release);
    }

    /// Returns the latest complete snapshot.
    #[inline]
    pub fn read(&self) -> SmoothedParameters {
        SmoothedParameters::from_bits(self.bits.load(Ordering::Acquire))
    }
}

/// Write half of a parameter channel. Owned by the sampler.
#[derive(Debug)]
pub struct ParameterPublisher {
    shared: Arc<ParameterChannel>,
}

impl ParameterPublisher {
    /// Publishes a new snapshot, overwriting the previous one.
    #[inline]
    pub fn publish(&self, params: SmoothedParameters) {
        self.shared.publish(params);
    }

    /// The snapshot most recently published (or the initial value).
    #[inline]
    pub fn current(&self) -> SmoothedParameters {
        self.shared.read()
    }
}

/// Read half of a parameter channel. Owned by the oscillator.
#[derive(Debug)]
pub struct ParameterReader {
    shared: Arc<ParameterChannel>,
}

impl ParameterReader {
    /// Returns the latest complete snapshot. Wait-free.
    #[inline]
    pub fn read(&self) -> SmoothedParameters {
        self.shared.read()
    }
}

/// Creates a channel initialized to `initial` and splits it into its
/// writer and reader halves.
pub fn parameter_channel(initial: SmoothedParameters) -> (ParameterPublisher, ParameterReader) {
    let shared = Arc::new(ParameterChannel::new(initial));
    (
        ParameterPublisher {
            shared: Arc::clone(&shared),
        },
        ParameterReader { shared },
    )
}
