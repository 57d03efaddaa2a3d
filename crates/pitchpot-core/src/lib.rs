//! Pitchpot Core - real-time sine synthesis driven by slow control inputs
//!
//! This crate holds everything that runs on, or feeds, the audio render path:
//! a precomputed sine table, the one-pole smoother that slews control targets,
//! the lock-free channel that carries smoothed parameters from the control
//! thread to the audio thread, and the table-lookup oscillator itself.
//!
//! # Core Abstractions
//!
//! ## Synthesis
//!
//! - [`WaveTable`] - One sine period, built once and shared read-only
//! - [`Oscillator`] - Fractional phase accumulator that fills output buffers
//!
//! ## Control Plane
//!
//! - [`ControlRange`] / [`ControlMapping`] - Linear raw-code to engineering-unit mapping
//! - [`ParameterSmoother`] - Exponential smoothing at the sampler's tick rate
//!
//! ## Thread Hand-off
//!
//! - [`parameter_channel`] - Splits a [`ParameterChannel`] into a single
//!   [`ParameterPublisher`] and a single [`ParameterReader`]
//!
//! # Data Flow
//!
//! ```text
//! raw code ─► ControlMapping ─► ParameterSmoother ─► ParameterPublisher
//!                                                          │ (atomic snapshot)
//!                               output buffer ◄─ Oscillator ◄─ ParameterReader
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pitchpot_core::{Oscillator, SmoothedParameters, WaveTable, parameter_channel};
//!
//! let table = Arc::new(WaveTable::new(4096));
//! let (publisher, reader) = parameter_channel(SmoothedParameters::new(440.0, 0.2));
//! let mut osc = Oscillator::new(table, reader, 44100.0);
//!
//! // Control thread
//! publisher.publish(SmoothedParameters::new(880.0, 0.5));
//!
//! // Audio thread
//! let mut block = [0.0f32; 512];
//! osc.render(&mut block);
//! assert!(block.iter().all(|s| s.abs() <= 0.5));
//! ```
//!
//! # no_std Support
//!
//! The crate is `no_std` compatible (it needs `alloc` and 64-bit atomics).
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! pitchpot-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocation, locking or I/O in [`Oscillator::render`]
//! - **One writer, one reader**: the publisher and reader halves are not `Clone`
//! - **No torn reads**: a snapshot is published as a single 64-bit atomic word

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod channel;
pub mod mapping;
pub mod oscillator;
pub mod params;
pub mod smoother;
pub mod wavetable;

pub use channel::{ParameterChannel, ParameterPublisher, ParameterReader, parameter_channel};
pub use mapping::{ControlMapping, ControlRange, MAX_CONTROL_CODE};
pub use oscillator::Oscillator;
pub use params::{ControlTarget, SmoothedParameters};
pub use smoother::ParameterSmoother;
pub use wavetable::{DEFAULT_TABLE_SIZE, WaveTable};
