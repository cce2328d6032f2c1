pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::NativeSerial;
pub use crate::core::{
    normalizer::{derive_plate_code, extract_digits, normalize, normalize_and_extract},
    relay::PlateRelay,
    session::DeviceSession,
};
pub use domain::model::{ConnectionState, FramingTiming, NormalizedPlate, PlateCode};
pub use utils::error::{LinkError, Result};
