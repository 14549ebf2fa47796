//! DetectionResult - detector output consumed by the results stage

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// One model output: bounding box, confidence score, class identifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BBox,
    pub score: f32,
    pub class_id: u32,
}

/// Result record produced once per frame by the detector
///
/// Consumed by the dispatch router, the audit logger and the event
/// broadcaster; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Frame this result was produced for
    pub frame_id: u64,

    /// Detections ordered as emitted by the model
    pub detections: Vec<Detection>,

    /// UTC ISO-8601 production timestamp
    pub produced_at: String,

    /// Provenance: hash of the model weights
    pub model_hash: String,

    /// Provenance: digest of the inference configuration
    pub config_digest: String,

    /// Measured end-to-end latency for this frame, if available
    #[serde(default)]
    pub latency_ms: Option<f64>,
}

impl DetectionResult {
    /// Highest detection score, or None for an empty result
    pub fn max_score(&self) -> Option<f32> {
        self.detections
            .iter()
            .map(|d| d.score)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Whether any detection meets the alert threshold
    pub fn fires_at(&self, threshold: f32) -> bool {
        self.detections.iter().any(|d| d.score >= threshold)
    }
}

/// Event payload pushed to live subscribers, one per processed result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEvent {
    /// UTC ISO-8601 timestamp (copied from the result)
    pub ts: String,

    /// Frame the event refers to
    pub frame_id: u64,

    /// Detections carried verbatim for dashboard rendering
    pub detections: Vec<Detection>,
}

impl ResultEvent {
    /// Build the broadcast payload for a processed result
    pub fn from_result(result: &DetectionResult) -> Self {
        Self {
            ts: result.produced_at.clone(),
            frame_id: result.frame_id,
            detections: result.detections.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(score: f32) -> Detection {
        Detection {
            bbox: BBox {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 10.0,
            },
            score,
            class_id: 0,
        }
    }

    #[test]
    fn test_fires_at_threshold() {
        let result = DetectionResult {
            frame_id: 1,
            detections: vec![detection(0.3), detection(0.7)],
            produced_at: "2026-01-01T00:00:00Z".into(),
            model_hash: "m".into(),
            config_digest: "c".into(),
            latency_ms: None,
        };
        assert!(result.fires_at(0.5));
        assert!(result.fires_at(0.7));
        assert!(!result.fires_at(0.71));
    }

    #[test]
    fn test_max_score_empty() {
        let result = DetectionResult {
            frame_id: 1,
            detections: vec![],
            produced_at: "2026-01-01T00:00:00Z".into(),
            model_hash: "m".into(),
            config_digest: "c".into(),
            latency_ms: None,
        };
        assert!(result.max_score().is_none());
        assert!(!result.fires_at(0.0));
    }
}
