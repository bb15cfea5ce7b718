use super::{BoundingBox, Detection, DetectionCounts};
use crate::constants::assistant::HIGH_CONFIDENCE;
use serde::Serialize;

/// Statistics over one image's detections, the input of the image-analysis prompt.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub total_objects: usize,
    pub image_width: u32,
    pub image_height: u32,
    pub confidence: ConfidenceStats,
    pub distribution: DetectionCounts,
    pub unique_classes: usize,
    pub detections: Vec<DetailedDetection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceStats {
    pub average: f32,
    pub max: f32,
    pub min: f32,
    pub high_confidence_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailedDetection {
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub area: f32,
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

impl ConfidenceStats {
    fn from_detections(detections: &[Detection]) -> Self {
        if detections.is_empty() {
            return Self::default();
        }
        let confidences = detections.iter().map(|d| d.confidence);
        let sum: f32 = confidences.clone().sum();
        Self {
            average: round3(sum / detections.len() as f32),
            max: round3(confidences.clone().fold(f32::MIN, f32::max)),
            min: round3(confidences.clone().fold(f32::MAX, f32::min)),
            high_confidence_count: confidences.filter(|c| *c > HIGH_CONFIDENCE).count(),
        }
    }
}

impl DetectionReport {
    pub fn analyze(detections: &[Detection], image_width: u32, image_height: u32) -> Self {
        let distribution = DetectionCounts::from_detections(detections);
        Self {
            total_objects: detections.len(),
            image_width,
            image_height,
            confidence: ConfidenceStats::from_detections(detections),
            unique_classes: distribution.len(),
            distribution,
            detections: detections
                .iter()
                .map(|d| DetailedDetection {
                    class_name: d.class_name.clone(),
                    confidence: round3(d.confidence),
                    bbox: d.bbox,
                    area: d.bbox.area(),
                })
                .collect(),
        }
    }

    /// Prompt asking the model to review this report.
    pub fn analysis_prompt(&self) -> String {
        let distribution = self
            .distribution
            .iter()
            .map(|(name, count)| format!("{name}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        let details = serde_json::to_string_pretty(&self.detections).unwrap_or_default();

        format!(
            "Analyse the following object detection results.\n\
             Detection statistics:\n\
             - total objects: {}\n\
             - average confidence: {:.3}\n\
             - class distribution: {}\n\
             Detailed detections:\n{}\n\
             Cover: scene understanding, detection quality, anomalies, \
             suggested improvements and practical applications.",
            self.total_objects, self.confidence.average, distribution, details
        )
    }
}
