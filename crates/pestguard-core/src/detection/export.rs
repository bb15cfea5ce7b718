use super::{Detection, DetectionReport, DetectionSource};
use crate::error::PestGuardError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Detector output saved alongside an image, as written by the detection tooling.
///
/// ```json
/// { "image_width": 640, "image_height": 480,
///   "detections": [{ "class_name": "aphid", "confidence": 0.91,
///                    "bbox": { "xmin": 1, "ymin": 2, "xmax": 30, "ymax": 40 } }] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionExport {
    pub image_width: u32,
    pub image_height: u32,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl DetectionExport {
    pub fn from_json(bytes: &[u8]) -> Result<Self, PestGuardError> {
        serde_json::from_slice(bytes)
            .map_err(|e| PestGuardError::Detection(format!("invalid detection export: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, PestGuardError> {
        let bytes = std::fs::read(path).map_err(|e| PestGuardError::unreadable(path, e))?;
        Self::from_json(&bytes)
    }

    pub fn report(&self) -> DetectionReport {
        DetectionReport::analyze(&self.detections, self.image_width, self.image_height)
    }
}

/// Replays a detection export instead of running a model.
/// The image bytes are ignored.
pub struct RecordedSource {
    export: DetectionExport,
}

impl RecordedSource {
    pub fn new(export: DetectionExport) -> Self {
        Self { export }
    }

    pub fn export(&self) -> &DetectionExport {
        &self.export
    }
}

impl DetectionSource for RecordedSource {
    fn detect(&mut self, _image: &[u8]) -> Result<Vec<Detection>, PestGuardError> {
        Ok(self.export.detections.clone())
    }
}
