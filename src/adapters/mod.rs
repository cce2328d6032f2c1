// Adapters layer: concrete implementations of the domain ports for real devices
// and for the detector's JSON output.

pub mod detections;
pub mod serial;

pub use serial::{NativeLink, NativeSerial};
