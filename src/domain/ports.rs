use crate::domain::model::FramingTiming;
use std::io;
use std::time::Duration;

/// An open byte link to the receiving device.
pub trait SerialLink: Send {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
    /// Releases the underlying handle. Called at most once per link.
    fn close(&mut self) -> io::Result<()>;
}

/// Opens links; the only way a session acquires a transport handle.
pub trait SerialConnector: Send {
    type Link: SerialLink;

    fn open(&self, port: &str, baud_rate: u32, read_timeout: Duration) -> io::Result<Self::Link>;
}

/// Blocking wait used for protocol pacing.
pub trait Delay: Send {
    fn pause(&mut self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Delay for ThreadSleep {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

pub trait LinkSettings {
    fn port(&self) -> Option<&str>;
    fn baud_rate(&self) -> u32;
    fn timing(&self) -> FramingTiming;
    fn min_confidence(&self) -> f32;
}
