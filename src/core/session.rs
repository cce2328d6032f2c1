use crate::domain::model::{ConnectionState, FramingTiming, PlateCode};
use crate::domain::ports::{Delay, SerialConnector, SerialLink, ThreadSleep};
use crate::utils::error::{LinkError, Result, TransferStage};

/// Tells the receiver to blank its display before a new code arrives.
pub const RESET_BYTE: u8 = b'R';

struct OpenLink<L> {
    port: String,
    link: L,
}

/// Owns at most one open link to the display device.
///
/// All calls block the current thread for the configured pacing delays. The
/// session takes `&mut self` everywhere and does not lock internally; share it
/// across threads behind a mutex. The link is closed on `disconnect` or drop.
pub struct DeviceSession<C: SerialConnector, D: Delay = ThreadSleep> {
    connector: C,
    delay: D,
    timing: FramingTiming,
    open: Option<OpenLink<C::Link>>,
}

impl<C: SerialConnector> DeviceSession<C> {
    pub fn new(connector: C, timing: FramingTiming) -> Self {
        Self::with_delay(connector, timing, ThreadSleep)
    }
}

impl<C: SerialConnector, D: Delay> DeviceSession<C, D> {
    pub fn with_delay(connector: C, timing: FramingTiming, delay: D) -> Self {
        Self {
            connector,
            delay,
            timing,
            open: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.open.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.open.is_some()
    }

    pub fn port(&self) -> Option<&str> {
        self.open.as_ref().map(|open| open.port.as_str())
    }

    pub fn timing(&self) -> &FramingTiming {
        &self.timing
    }

    pub fn set_timing(&mut self, timing: FramingTiming) {
        self.timing = timing;
    }

    pub fn connect(&mut self, port: &str, baud_rate: u32) -> Result<()> {
        if let Some(open) = &self.open {
            return Err(LinkError::AlreadyConnected {
                port: open.port.clone(),
            });
        }

        let port = port.trim();
        tracing::debug!("Opening {} at {} baud", port, baud_rate);

        let link = self
            .connector
            .open(port, baud_rate, self.timing.read_timeout)
            .map_err(|source| LinkError::Connect {
                port: port.to_string(),
                source,
            })?;

        // Boards that reset on DTR need a moment before they accept bytes
        self.delay.pause(self.timing.settle_delay);

        self.open = Some(OpenLink {
            port: port.to_string(),
            link,
        });
        tracing::info!("Connected to {} at {} baud", port, baud_rate);
        Ok(())
    }

    /// Never fails; close errors are logged and dropped.
    pub fn disconnect(&mut self) {
        let Some(mut open) = self.open.take() else {
            tracing::debug!("Disconnect requested while already disconnected");
            return;
        };

        match open.link.close() {
            Ok(()) => tracing::info!("Disconnected from {}", open.port),
            Err(e) => tracing::warn!("Error while closing {}: {}", open.port, e),
        }
    }

    /// Writes the reset byte, then each digit of `code` as its own paced
    /// byte, then flushes. A failed write stops the stream; bytes already
    /// written are not recalled.
    pub fn send(&mut self, code: &PlateCode) -> Result<()> {
        let open = self.open.as_mut().ok_or(LinkError::NotConnected)?;

        if code.is_empty() {
            return Err(LinkError::EmptyPayload);
        }

        tracing::debug!("Sending reset to {}", open.port);
        open.link
            .write_all(&[RESET_BYTE])
            .map_err(|source| LinkError::Transport {
                stage: TransferStage::Reset,
                source,
            })?;
        self.delay.pause(self.timing.reset_delay);

        for (index, byte) in code.as_bytes().iter().enumerate() {
            if index > 0 {
                self.delay.pause(self.timing.inter_byte_delay);
            }
            open.link
                .write_all(std::slice::from_ref(byte))
                .map_err(|source| LinkError::Transport {
                    stage: TransferStage::Payload { index },
                    source,
                })?;
        }

        open.link.flush().map_err(|source| LinkError::Transport {
            stage: TransferStage::Flush,
            source,
        })?;

        tracing::info!("Sent {} to {}", code, open.port);
        Ok(())
    }
}

impl<C: SerialConnector, D: Delay> Drop for DeviceSession<C, D> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
