//! MCP3008 10-bit ADC framing.
//!
//! One conversion is a three-byte full-duplex transfer:
//!
//! ```text
//! tx: 0000_0001  SGL D2 D1 D0 xxxx  xxxx_xxxx
//! rx: xxxx_xxxx  xxxx_x0 B9 B8      B7 .. B0
//! ```
//!
//! The start bit sits in the first byte, the single-ended flag and channel
//! select in the high nibble of the second. The result is the low two bits of
//! the second reply byte followed by the whole third byte.

use std::io;

use crate::input::{ChannelId, ControlError, ControlInput};

/// Number of single-ended inputs on the converter.
pub const MCP3008_CHANNELS: u8 = ChannelId::COUNT;

/// A full-duplex byte transport (an SPI bus with chip select handled).
pub trait SpiTransfer: Send {
    /// Clocks `tx` out while clocking the same number of bytes into `rx`.
    fn transfer(&mut self, tx: &[u8; 3], rx: &mut [u8; 3]) -> io::Result<()>;
}

/// Builds the request for a single-ended conversion on `channel`.
#[inline]
pub fn request_frame(channel: ChannelId) -> [u8; 3] {
    [0x01, (0x08 | channel.index()) << 4, 0x00]
}

/// Extracts the 10-bit result from a reply.
#[inline]
pub fn decode_response(rx: &[u8; 3]) -> u16 {
    (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2])
}

/// MCP3008 converter on an SPI transport.
///
/// ```rust
/// use std::io;
/// use pitchpot_platform::{ChannelId, ControlInput, Mcp3008, SpiTransfer};
///
/// struct Loopback;
/// impl SpiTransfer for Loopback {
///     fn transfer(&mut self, _tx: &[u8; 3], rx: &mut [u8; 3]) -> io::Result<()> {
///         *rx = [0x00, 0x02, 0x00];
///         Ok(())
///     }
/// }
///
/// let mut adc = Mcp3008::new(Loopback);
/// assert_eq!(adc.read_channel(ChannelId::CH5).unwrap(), 512);
/// ```
#[derive(Debug)]
pub struct Mcp3008<T> {
    transport: T,
}

impl<T: SpiTransfer> Mcp3008<T> {
    /// Wraps a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrows the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport, releasing the converter.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: SpiTransfer> ControlInput for Mcp3008<T> {
    fn read_channel(&mut self, channel: ChannelId) -> Result<u16, ControlError> {
        let tx = request_frame(channel);
        let mut rx = [0u8; 3];
        self.transport
            .transfer(&tx, &mut rx)
            .map_err(ControlError::Transfer)?;
        Ok(decode_response(&rx))
    }

    fn describe(&self) -> String {
        String::from("MCP3008")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records requests and answers with a fixed code per channel.
    struct FakeBus {
        codes: [u16; 8],
        sent: Vec<[u8; 3]>,
        fail_next: bool,
    }

    impl SpiTransfer for FakeBus {
        fn transfer(&mut self, tx: &[u8; 3], rx: &mut [u8; 3]) -> io::Result<()> {
            self.sent.push(*tx);
            if std::mem::take(&mut self.fail_next) {
                return Err(io::Error::other("bus glitch"));
            }
            let channel = usize::from((tx[1] >> 4) & 0x07);
            let code = self.codes[channel];
            // High bits of rx[1] are undefined on the wire; set them to check masking.
            *rx = [0xFF, 0xF8 | (code >> 8) as u8, code as u8];
            Ok(())
        }
    }

    fn bus() -> FakeBus {
        FakeBus {
            codes: [0, 1, 255, 256, 511, 700, 1023, 42],
            sent: Vec::new(),
            fail_next: false,
        }
    }

    #[test]
    fn request_frames_match_datasheet() {
        assert_eq!(request_frame(ChannelId::CH0), [0x01, 0x80, 0x00]);
        assert_eq!(request_frame(ChannelId::CH5), [0x01, 0xD0, 0x00]);
        assert_eq!(request_frame(ChannelId::CH6), [0x01, 0xE0, 0x00]);
        assert_eq!(request_frame(ChannelId::CH7), [0x01, 0xF0, 0x00]);
    }

    #[test]
    fn decode_masks_undefined_bits() {
        assert_eq!(decode_response(&[0xFF, 0xFF, 0xFF]), 1023);
        assert_eq!(decode_response(&[0xFF, 0xFC, 0x00]), 0);
        assert_eq!(decode_response(&[0x00, 0x01, 0x2C]), 300);
    }

    #[test]
    fn reads_every_channel() {
        let mut adc = Mcp3008::new(bus());
        for i in 0..MCP3008_CHANNELS {
            let ch = ChannelId::new(i).unwrap();
            assert_eq!(adc.read_channel(ch).unwrap(), adc.transport().codes[usize::from(i)]);
        }
        assert_eq!(adc.into_inner().sent.len(), 8);
    }

    #[test]
    fn transfer_failure_is_transient() {
        let mut adc = Mcp3008::new(FakeBus {
            fail_next: true,
            ..bus()
        });
        let err = adc.read_channel(ChannelId::CH5).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(adc.read_channel(ChannelId::CH5).unwrap(), 700);
    }
}
