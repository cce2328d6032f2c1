use crate::domain::model::{FramingTiming, DEFAULT_BAUD_RATE, DEFAULT_MIN_CONFIDENCE};
use crate::domain::ports::LinkSettings;
use crate::utils::error::{LinkError, Result};
use crate::utils::validation::{
    validate_port_name, validate_positive_number, validate_range, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "plate-link")]
#[command(about = "Extract the numeric code from a plate reading and send it to the display FPGA")]
pub struct CliConfig {
    /// Raw OCR text of a single plate
    #[arg(long, conflicts_with = "detections")]
    pub text: Option<String>,

    /// Detector output: JSON array or JSON lines, "-" for stdin
    #[arg(long)]
    pub detections: Option<String>,

    /// Serial port of the FPGA (e.g. COM5, /dev/ttyUSB0); omit to only print the code
    #[arg(long)]
    pub port: Option<String>,

    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud_rate: u32,

    #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE)]
    pub min_confidence: f32,

    #[arg(long, default_value = "1000")]
    pub read_timeout_ms: u64,

    #[arg(long, default_value = "100")]
    pub settle_delay_ms: u64,

    #[arg(long, default_value = "50")]
    pub reset_delay_ms: u64,

    #[arg(long, default_value = "10")]
    pub inter_byte_delay_ms: u64,

    #[arg(long, help = "List available serial ports and exit")]
    pub list_ports: bool,

    #[arg(long, help = "Print the reading without opening the port")]
    pub dry_run: bool,

    #[arg(long, help = "Print the reading as JSON")]
    pub json: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl LinkSettings for CliConfig {
    fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn timing(&self) -> FramingTiming {
        FramingTiming {
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            reset_delay: Duration::from_millis(self.reset_delay_ms),
            inter_byte_delay: Duration::from_millis(self.inter_byte_delay_ms),
        }
    }

    fn min_confidence(&self) -> f32 {
        self.min_confidence
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.list_ports {
            return Ok(());
        }

        if self.text.is_none() && self.detections.is_none() {
            return Err(LinkError::MissingConfigError {
                field: "--text or --detections".to_string(),
            });
        }

        if let Some(port) = &self.port {
            validate_port_name("port", port)?;
        }
        validate_positive_number("baud_rate", self.baud_rate as u64, 1)?;
        validate_positive_number("read_timeout_ms", self.read_timeout_ms, 1)?;
        validate_range("min_confidence", self.min_confidence, 0.0, 1.0)?;
        Ok(())
    }
}
