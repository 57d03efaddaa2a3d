//! Linux spidev transport.

use std::io;

use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};

use crate::input::ControlError;
use crate::mcp3008::SpiTransfer;

/// An opened `/dev/spidevB.C` node in SPI mode 0, 8 bits per word.
///
/// The file descriptor is closed when the transport is dropped.
pub struct SpidevTransport {
    spi: Spidev,
    path: String,
}

impl SpidevTransport {
    /// Opens and configures the device node.
    pub fn open(path: &str, speed_hz: u32) -> Result<Self, ControlError> {
        let open_err = |source: io::Error| ControlError::Open {
            path: path.to_string(),
            source,
        };
        let mut spi = Spidev::open(path).map_err(open_err)?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options).map_err(open_err)?;
        Ok(Self {
            spi,
            path: path.to_string(),
        })
    }

    /// Device node path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for SpidevTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpidevTransport")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SpiTransfer for SpidevTransport {
    fn transfer(&mut self, tx: &[u8; 3], rx: &mut [u8; 3]) -> io::Result<()> {
        let mut transfer = SpidevTransfer::read_write(tx, rx);
        self.spi.transfer(&mut transfer)
    }
}

impl Drop for SpidevTransport {
    fn drop(&mut self) {
        tracing::debug!(device = %self.path, "SPI device released");
    }
}
