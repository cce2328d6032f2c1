// Domain layer: plate models and the ports (interfaces) to the serial transport.
// No I/O here beyond the blocking sleep behind `Delay`.

pub mod model;
pub mod ports;
