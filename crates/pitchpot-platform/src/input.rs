//! The control-input seam between the sampler and a converter.

use std::io;

/// Input index on the converter.
///
/// An MCP3008 has eight single-ended inputs, so valid indices are `0..=7`.
/// Out-of-range indices are rejected here rather than at read time.
///
/// ```rust
/// use pitchpot_platform::ChannelId;
///
/// assert_eq!(ChannelId::new(5), Some(ChannelId::CH5));
/// assert_eq!(ChannelId::new(8), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Number of addressable channels.
    pub const COUNT: u8 = 8;

    /// Channel 0.
    pub const CH0: Self = Self(0);
    /// Channel 1.
    pub const CH1: Self = Self(1);
    /// Channel 2.
    pub const CH2: Self = Self(2);
    /// Channel 3.
    pub const CH3: Self = Self(3);
    /// Channel 4.
    pub const CH4: Self = Self(4);
    /// Channel 5 (default frequency knob).
    pub const CH5: Self = Self(5);
    /// Channel 6 (default amplitude knob).
    pub const CH6: Self = Self(6);
    /// Channel 7.
    pub const CH7: Self = Self(7);

    /// Returns the channel for `index`, or `None` if it is not `0..=7`.
    #[inline]
    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The raw index.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CH{}", self.0)
    }
}

/// Errors from a control input.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The input device could not be opened or configured.
    #[error("failed to open control input {path}: {source}")]
    Open {
        /// Device path.
        path: String,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A single transfer failed. The next read may succeed.
    #[error("control input transfer failed: {0}")]
    Transfer(#[source] io::Error),

    /// The input has no more data (scripted inputs only).
    #[error("control input exhausted")]
    Exhausted,

    /// This build cannot provide the requested input.
    #[error("{0}")]
    Unsupported(String),
}

impl ControlError {
    /// Returns true if a later read may succeed.
    ///
    /// The sampler skips the tick on any error. Transient errors are only
    /// reported after a second of consecutive failures; any other error is
    /// reported at once and counted in
    /// [`SamplerStats::persistent`](crate::SamplerStats::persistent).
    pub fn is_transient(&self) -> bool {
        matches!(self, ControlError::Transfer(_) | ControlError::Exhausted)
    }

    /// Operator guidance for setup failures, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ControlError::Open { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => Some(
                    "Enable SPI (sudo raspi-config -> Interface Options -> SPI) and reboot.",
                ),
                io::ErrorKind::PermissionDenied => {
                    Some("Add your user to the `spi` group or run with sufficient privileges.")
                }
                _ => None,
            },
            ControlError::Unsupported(_) => {
                Some("Use `--input sim` or `--input fixed` to run without hardware.")
            }
            _ => None,
        }
    }
}

/// A source of raw converter codes.
///
/// Implementations block for at most one transfer and return the latest code
/// for the channel, in `0..=1023` for a healthy 10-bit converter. Values
/// above that are possible on a garbled transfer; the sampler rejects them.
///
/// Dropping the input releases the underlying device.
pub trait ControlInput: Send {
    /// Reads one raw code from `channel`.
    fn read_channel(&mut self, channel: ChannelId) -> Result<u16, ControlError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String {
        String::from("control input")
    }
}

impl<T: ControlInput + ?Sized> ControlInput for Box<T> {
    fn read_channel(&mut self, channel: ChannelId) -> Result<u16, ControlError> {
        (**self).read_channel(channel)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_bounds() {
        for i in 0..8 {
            assert_eq!(ChannelId::new(i).map(ChannelId::index), Some(i));
        }
        assert!(ChannelId::new(8).is_none());
        assert!(ChannelId::new(255).is_none());
    }

    #[test]
    fn channel_display() {
        assert_eq!(ChannelId::CH6.to_string(), "CH6");
    }

    #[test]
    fn transfer_is_transient_open_is_not() {
        let transfer = ControlError::Transfer(io::Error::other("glitch"));
        assert!(transfer.is_transient());

        let open = ControlError::Open {
            path: "/dev/spidev0.0".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!open.is_transient());
        assert!(open.hint().is_some_and(|h| h.contains("raspi-config")));
    }

    #[test]
    fn unsupported_has_hint() {
        let err = ControlError::Unsupported("no spi".into());
        assert!(!err.is_transient());
        assert!(err.hint().is_some());
    }
}
