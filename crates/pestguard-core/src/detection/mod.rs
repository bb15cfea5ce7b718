//! Reduction of raw detector output into what the assistant consumes.
//!
//! The detector itself stays behind [`DetectionSource`]; this module only
//! counts and summarises its output.

mod export;
mod report;

pub use export::{DetectionExport, RecordedSource};
pub use report::{ConfidenceStats, DetailedDetection, DetectionReport};

use crate::error::PestGuardError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BoundingBox {
    pub fn area(&self) -> f32 {
        (self.xmax - self.xmin).max(0.0) * (self.ymax - self.ymin).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Object-detection backend. Implement this to connect a model.
pub trait DetectionSource {
    /// Run inference on an encoded image.
    fn detect(&mut self, image: &[u8]) -> Result<Vec<Detection>, PestGuardError>;
}

/// Ordered `category → count` mapping. Categories keep first-seen order,
/// which is the order they appear in prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionCounts(Vec<(String, u32)>);

impl DetectionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_detections(detections: &[Detection]) -> Self {
        let mut counts = Self::new();
        for detection in detections {
            counts.increment(&detection.class_name);
        }
        counts
    }

    pub fn increment(&mut self, category: &str) {
        match self.0.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => self.0.push((category.to_string(), 1)),
        }
    }

    /// Set a category's count, replacing any previous value in place.
    pub fn set(&mut self, category: impl Into<String>, count: u32) {
        let category = category.into();
        match self.0.iter_mut().find(|(name, _)| *name == category) {
            Some((_, existing)) => *existing = count,
            None => self.0.push((category, count)),
        }
    }

    pub fn get(&self, category: &str) -> Option<u32> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts. Widened so large counts cannot overflow.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| u64::from(*count)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    /// Parse `name=count` pairs separated by commas, e.g. `aphid=3, mite=1`.
    pub fn parse(input: &str) -> Result<Self, PestGuardError> {
        let mut counts = Self::new();
        for pair in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, count) = pair.split_once('=').ok_or_else(|| {
                PestGuardError::InvalidInput(format!("expected name=count, got '{pair}'"))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(PestGuardError::InvalidInput(format!(
                    "missing category name in '{pair}'"
                )));
            }
            let count: u32 = count.trim().parse().map_err(|_| {
                PestGuardError::InvalidInput(format!("count for '{name}' is not a whole number"))
            })?;
            counts.set(name, count);
        }
        Ok(counts)
    }
}

impl<K: Into<String>> FromIterator<(K, u32)> for DetectionCounts {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (name, count) in iter {
            counts.set(name, count);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class_name: &str, confidence: f32) -> Detection {
        Detection {
            class_name: class_name.to_string(),
            confidence,
            bbox: BoundingBox {
                xmin: 0.0,
                ymin: 0.0,
                xmax: 10.0,
                ymax: 5.0,
            },
        }
    }

    #[test]
    fn test_counts_keep_first_seen_order() {
        let counts = DetectionCounts::from_detections(&[
            det("stink bug", 0.9),
            det("aphid", 0.8),
            det("stink bug", 0.6),
        ]);
        let pairs: Vec<_> = counts.iter().collect();
        assert_eq!(pairs, vec![("stink bug", 2), ("aphid", 1)]);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_total_does_not_overflow() {
        let counts: DetectionCounts = [("aphid", u32::MAX), ("mite", u32::MAX)].into_iter().collect();
        assert_eq!(counts.total(), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut counts: DetectionCounts = [("aphid", 3u32), ("mite", 1)].into_iter().collect();
        counts.set("aphid", 5);
        assert_eq!(counts.categories().collect::<Vec<_>>(), vec!["aphid", "mite"]);
        assert_eq!(counts.get("aphid"), Some(5));
    }

    #[test]
    fn test_parse_pairs() {
        let counts = DetectionCounts::parse("aphid=3, fruit fly = 2,").unwrap();
        assert_eq!(counts.get("aphid"), Some(3));
        assert_eq!(counts.get("fruit fly"), Some(2));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(DetectionCounts::parse("aphid").is_err());
        assert!(DetectionCounts::parse("aphid=-1").is_err());
        assert!(DetectionCounts::parse("=4").is_err());
        assert!(DetectionCounts::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_bbox_area_clamps_inverted_boxes() {
        let bbox = BoundingBox {
            xmin: 10.0,
            ymin: 0.0,
            xmax: 5.0,
            ymax: 4.0,
        };
        assert_eq!(bbox.area(), 0.0);
    }
}
