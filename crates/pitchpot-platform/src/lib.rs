//! Pitchpot Platform - control inputs and the parameter sampler
//!
//! This crate connects physical (or simulated) knobs to the render path in
//! [`pitchpot_core`]. It owns everything on the control side of the
//! [`ParameterChannel`](pitchpot_core::ParameterChannel): reading raw codes,
//! mapping and smoothing them, and publishing snapshots at a fixed rate.
//!
//! # Core Abstractions
//!
//! ## Control Inputs
//!
//! - [`ChannelId`] - Converter input index (0-7 on an MCP3008)
//! - [`ControlInput`] - Trait for anything that yields raw 10-bit codes
//! - [`ControlError`] - Transient vs. fatal input failures
//!
//! ## Implementations
//!
//! - [`Mcp3008`] - MCP3008 framing over any [`SpiTransfer`]
//! - [`open_mcp3008`] - Opens the converter on a Linux spidev node (`spi` feature)
//! - [`ConstantInput`], [`SweepInput`], [`ScriptedInput`] - Inputs that need no hardware
//!
//! ## Sampler
//!
//! - [`Sampler`] - One read → map → smooth → publish step per tick
//! - [`SamplerHandle`] - The sampler running on its own thread at the poll rate
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use pitchpot_core::{ControlMapping, SmoothedParameters, parameter_channel};
//! use pitchpot_platform::{ChannelId, ConstantInput, Sampler, SamplerSettings};
//!
//! let (publisher, reader) = parameter_channel(SmoothedParameters::new(440.0, 0.2));
//! let input = ConstantInput::new().with_code(ChannelId::CH5, 1023).with_code(ChannelId::CH6, 0);
//! let settings = SamplerSettings::default();
//!
//! let mut sampler = Sampler::new(Box::new(input), publisher, settings);
//! sampler.tick();
//! assert!(reader.read().frequency_hz > 440.0);
//! ```

pub mod input;
pub mod mcp3008;
pub mod sampler;
pub mod sim;

#[cfg(all(feature = "spi", target_os = "linux"))]
mod spi;

pub use input::{ChannelId, ControlError, ControlInput};
pub use mcp3008::{MCP3008_CHANNELS, Mcp3008, SpiTransfer, decode_response, request_frame};
pub use sampler::{
    Sampler, SamplerHandle, SamplerSettings, SamplerStats, SkipReason, SmoothingInterval,
    TickOutcome,
};
pub use sim::{ConstantInput, SCRIPT_READ_LOG, ScriptStep, ScriptedInput, SweepInput};

#[cfg(all(feature = "spi", target_os = "linux"))]
pub use spi::SpidevTransport;

/// Default spidev node for bus 0, chip-select 0.
pub const DEFAULT_SPI_DEVICE: &str = "/dev/spidev0.0";

/// Default SPI clock for an MCP3008 powered from 3.3 V.
pub const DEFAULT_SPI_SPEED_HZ: u32 = 1_350_000;

/// Opens an MCP3008 on the given spidev node.
///
/// Fails with [`ControlError::Open`] when the device node cannot be opened or
/// configured, and with [`ControlError::Unsupported`] when this build has no
/// SPI transport.
#[cfg(all(feature = "spi", target_os = "linux"))]
pub fn open_mcp3008(path: &str, speed_hz: u32) -> Result<Box<dyn ControlInput>, ControlError> {
    let transport = SpidevTransport::open(path, speed_hz)?;
    tracing::info!(device = path, speed_hz, "MCP3008 opened");
    Ok(Box::new(Mcp3008::new(transport)))
}

/// Opens an MCP3008 on the given spidev node.
///
/// This build was compiled without the `spi` feature (or not for Linux), so
/// this always fails with [`ControlError::Unsupported`].
#[cfg(not(all(feature = "spi", target_os = "linux")))]
pub fn open_mcp3008(path: &str, _speed_hz: u32) -> Result<Box<dyn ControlInput>, ControlError> {
    Err(ControlError::Unsupported(format!(
        "cannot open {path}: built without SPI support (enable the `spi` feature on Linux)"
    )))
}
