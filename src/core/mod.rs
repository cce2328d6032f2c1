pub mod normalizer;
pub mod relay;
pub mod session;

pub use crate::domain::model::{
    ConnectionState, FramingTiming, NormalizedPlate, PlateCode, PlateDetection, PlateReading,
};
pub use crate::domain::ports::{Delay, LinkSettings, SerialConnector, SerialLink, ThreadSleep};
pub use crate::utils::error::Result;
