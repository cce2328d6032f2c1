use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// OCR text after cleanup: uppercase ASCII letters and digits, no "IND" prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedPlate(String);

impl NormalizedPlate {
    pub(crate) fn from_clean(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for NormalizedPlate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digits-only code sent to the display device. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PlateCode(String);

impl PlateCode {
    pub(crate) fn from_digits(digits: String) -> Self {
        debug_assert!(digits.bytes().all(|b| b.is_ascii_digit()));
        Self(digits)
    }

    /// Accepts an already-extracted code; `None` if anything but ASCII digits is present.
    pub fn parse(value: &str) -> Option<Self> {
        value
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for PlateCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connected => f.write_str("connected"),
        }
    }
}

/// One plate candidate reported by the external detector + OCR step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateDetection {
    pub text: String,
    pub confidence: f32,
    /// Crop rectangle as `[x1, y1, x2, y2]` in source-image pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<[i32; 4]>,
}

impl PlateDetection {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateReading {
    pub raw_text: String,
    pub plate: NormalizedPlate,
    pub code: PlateCode,
    pub confidence: f32,
}

pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.4;

/// Delays of the reset-then-payload protocol. The receiving firmware samples
/// slower than the line rate, so these are tuned per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingTiming {
    /// Bounded read timeout handed to the transport on open.
    pub read_timeout: Duration,
    /// Wait after opening the port while the device resets.
    pub settle_delay: Duration,
    /// Wait after the reset byte before the first payload byte.
    pub reset_delay: Duration,
    /// Wait between consecutive payload bytes.
    pub inter_byte_delay: Duration,
}

impl Default for FramingTiming {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(1),
            settle_delay: Duration::from_millis(100),
            reset_delay: Duration::from_millis(50),
            inter_byte_delay: Duration::from_millis(10),
        }
    }
}

impl FramingTiming {
    /// All waits zeroed; for loopback testing against a fast receiver.
    pub fn immediate() -> Self {
        Self {
            read_timeout: Duration::from_secs(1),
            settle_delay: Duration::ZERO,
            reset_delay: Duration::ZERO,
            inter_byte_delay: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plate_code_parse() {
        assert_eq!(PlateCode::parse("207602").unwrap().as_str(), "207602");
        assert!(PlateCode::parse("").unwrap().is_empty());
        assert!(PlateCode::parse("20A").is_none());
        assert!(PlateCode::parse("٣").is_none());
    }

    #[test]
    fn test_detection_deserialization() {
        let detection: PlateDetection =
            serde_json::from_str(r#"{"text": "MH 20 EE 7602", "confidence": 0.91}"#).unwrap();
        assert_eq!(detection.text, "MH 20 EE 7602");
        assert!(detection.bbox.is_none());

        let with_box: PlateDetection = serde_json::from_str(
            r#"{"text": "AB12", "confidence": 0.5, "bbox": [10, 20, 110, 60]}"#,
        )
        .unwrap();
        assert_eq!(with_box.bbox, Some([10, 20, 110, 60]));
    }

    #[test]
    fn test_default_timing() {
        let timing = FramingTiming::default();
        assert_eq!(timing.reset_delay, Duration::from_millis(50));
        assert_eq!(timing.inter_byte_delay, Duration::from_millis(10));
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }
}
