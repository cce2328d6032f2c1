use crate::core::normalizer::{derive_plate_code, normalize};
use crate::core::session::DeviceSession;
use crate::domain::model::{PlateCode, PlateDetection, PlateReading, DEFAULT_MIN_CONFIDENCE};
use crate::domain::ports::{Delay, SerialConnector, ThreadSleep};
use crate::utils::error::{LinkError, Result};

/// Highest-confidence candidate at or above `min_confidence`. On ties the
/// earlier candidate wins.
pub fn select_best(detections: &[PlateDetection], min_confidence: f32) -> Option<&PlateDetection> {
    detections
        .iter()
        .filter(|d| d.confidence >= min_confidence)
        .fold(None, |best: Option<&PlateDetection>, d| match best {
            Some(b) if b.confidence >= d.confidence => Some(b),
            _ => Some(d),
        })
}

pub fn read_plate(raw_text: &str, confidence: f32) -> PlateReading {
    let plate = normalize(raw_text);
    let code = derive_plate_code(&plate);
    PlateReading {
        raw_text: raw_text.to_string(),
        plate,
        code,
        confidence,
    }
}

/// Glues detection output to the device: remembers the code from the most
/// recent image and sends it on request.
pub struct PlateRelay<C: SerialConnector, D: Delay = ThreadSleep> {
    session: DeviceSession<C, D>,
    min_confidence: f32,
    last: Option<PlateReading>,
}

impl<C: SerialConnector, D: Delay> PlateRelay<C, D> {
    pub fn new(session: DeviceSession<C, D>, min_confidence: f32) -> Self {
        Self {
            session,
            min_confidence,
            last: None,
        }
    }

    pub fn with_default_confidence(session: DeviceSession<C, D>) -> Self {
        Self::new(session, DEFAULT_MIN_CONFIDENCE)
    }

    pub fn session(&self) -> &DeviceSession<C, D> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DeviceSession<C, D> {
        &mut self.session
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    /// Processes one image's worth of candidates. The previous result is
    /// replaced even when nothing usable was found.
    pub fn ingest(&mut self, detections: &[PlateDetection]) -> Option<&PlateReading> {
        self.last = match select_best(detections, self.min_confidence) {
            Some(best) => {
                let reading = read_plate(&best.text, best.confidence);
                tracing::info!(
                    "Plate {} -> code '{}' (conf {:.1}%)",
                    reading.plate,
                    reading.code,
                    reading.confidence * 100.0
                );
                Some(reading)
            }
            None => {
                tracing::info!(
                    "No plate above {:.0}% confidence among {} candidates",
                    self.min_confidence * 100.0,
                    detections.len()
                );
                None
            }
        };
        self.last.as_ref()
    }

    /// Treats `raw_text` as a single fully-trusted OCR reading.
    pub fn ingest_text(&mut self, raw_text: &str) -> &PlateReading {
        let reading = read_plate(raw_text, 1.0);
        tracing::info!("Plate {} -> code '{}'", reading.plate, reading.code);
        self.last.insert(reading)
    }

    pub fn last_reading(&self) -> Option<&PlateReading> {
        self.last.as_ref()
    }

    pub fn last_code(&self) -> Option<&PlateCode> {
        self.last.as_ref().map(|r| &r.code)
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn send_last(&mut self) -> Result<()> {
        if !self.session.is_connected() {
            return Err(LinkError::NotConnected);
        }

        let code = self.last_code().ok_or(LinkError::EmptyPayload)?.clone();
        self.session.send(&code)
    }
}
