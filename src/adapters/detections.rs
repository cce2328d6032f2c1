use crate::domain::model::PlateDetection;
use crate::utils::error::Result;
use std::io::Read;
use std::path::Path;

/// Accepts either a JSON array of detections or one JSON object per line.
pub fn parse_detections(content: &str) -> Result<Vec<PlateDetection>> {
    let trimmed = content.trim_start();

    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    let mut detections = Vec::new();
    for line in trimmed.lines().map(str::trim).filter(|l| !l.is_empty()) {
        detections.push(serde_json::from_str(line)?);
    }
    Ok(detections)
}

/// Reads detections from `path`, or from stdin when `path` is `-`.
pub fn load_detections<P: AsRef<Path>>(path: P) -> Result<Vec<PlateDetection>> {
    let path = path.as_ref();
    let content = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(path)?
    };

    let detections = parse_detections(&content)?;
    tracing::debug!("Loaded {} detections from {}", detections.len(), path.display());
    Ok(detections)
}
