#![allow(dead_code)]

use plate_link::domain::ports::{Delay, SerialConnector, SerialLink};
use plate_link::FramingTiming;
use plate_link::{DeviceSession, PlateCode};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything that reached the fake wire, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum WireEvent {
    Open { port: String, baud_rate: u32 },
    Byte(u8),
    Pause(Duration),
    Flush,
    Close { port: String },
}

#[derive(Clone, Default)]
pub struct Wire {
    events: Arc<Mutex<Vec<WireEvent>>>,
}

impl Wire {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: WireEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<WireEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                WireEvent::Byte(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&WireEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

pub struct FakeLink {
    wire: Wire,
    port: String,
    /// Fail the write with this zero-based index.
    fail_write_at: Option<usize>,
    writes: usize,
}

impl SerialLink for FakeLink {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.fail_write_at == Some(self.writes) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        self.writes += 1;
        for b in bytes {
            self.wire.push(WireEvent::Byte(*b));
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.wire.push(WireEvent::Flush);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.wire.push(WireEvent::Close {
            port: self.port.clone(),
        });
        Err(io::Error::new(io::ErrorKind::Other, "close reported an error"))
    }
}

pub struct FakeConnector {
    pub wire: Wire,
    pub available: Vec<String>,
    pub fail_write_at: Option<usize>,
}

impl FakeConnector {
    pub fn new(wire: &Wire) -> Self {
        Self {
            wire: wire.clone(),
            available: vec!["COM5".to_string(), "/dev/ttyUSB0".to_string()],
            fail_write_at: None,
        }
    }
}

impl SerialConnector for FakeConnector {
    type Link = FakeLink;

    fn open(&self, port: &str, baud_rate: u32, _read_timeout: Duration) -> io::Result<FakeLink> {
        if !self.available.iter().any(|p| p == port) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such port"));
        }
        self.wire.push(WireEvent::Open {
            port: port.to_string(),
            baud_rate,
        });
        Ok(FakeLink {
            wire: self.wire.clone(),
            port: port.to_string(),
            fail_write_at: self.fail_write_at,
            writes: 0,
        })
    }
}

pub struct WireDelay(pub Wire);

impl Delay for WireDelay {
    fn pause(&mut self, duration: Duration) {
        self.0.push(WireEvent::Pause(duration));
    }
}

pub fn fake_session(wire: &Wire) -> DeviceSession<FakeConnector, WireDelay> {
    DeviceSession::with_delay(
        FakeConnector::new(wire),
        FramingTiming::default(),
        WireDelay(wire.clone()),
    )
}

pub fn code(s: &str) -> PlateCode {
    PlateCode::parse(s).unwrap()
}
