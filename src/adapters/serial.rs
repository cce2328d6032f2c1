use crate::domain::ports::{SerialConnector, SerialLink};
use serialport::SerialPort;
use std::io::{self, Write};
use std::time::Duration;

/// Opens real serial devices through the `serialport` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSerial;

pub struct NativeLink {
    port: Option<Box<dyn SerialPort>>,
}

impl NativeLink {
    fn port(&mut self) -> io::Result<&mut Box<dyn SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port already closed"))
    }
}

impl SerialConnector for NativeSerial {
    type Link = NativeLink;

    fn open(&self, port: &str, baud_rate: u32, read_timeout: Duration) -> io::Result<NativeLink> {
        let port = serialport::new(port, baud_rate)
            .timeout(read_timeout)
            .open()?;
        Ok(NativeLink { port: Some(port) })
    }
}

impl SerialLink for NativeLink {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port()?.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port()?.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        // The OS handle is released when the boxed port drops
        match self.port.take() {
            Some(mut port) => port.flush(),
            None => Ok(()),
        }
    }
}

/// Names of serial devices the OS currently reports.
pub fn list_ports() -> io::Result<Vec<String>> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
