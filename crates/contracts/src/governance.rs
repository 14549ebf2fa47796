//! Governance records - the durable, signed projection of detection decisions

use serde::{Deserialize, Serialize};

use crate::{Detection, DetectionResult};

/// Immutable projection of a `DetectionResult` plus the threshold active at
/// write time
///
/// Identity is `(frame_id, produced_at)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceRecord {
    pub frame_id: u64,
    pub produced_at: String,
    pub detections: Vec<Detection>,
    pub model_hash: String,
    pub config_digest: String,
    /// Alert threshold in effect when the decision was recorded
    pub threshold: f32,
    #[serde(default)]
    pub latency_ms: Option<f64>,
}

impl GovernanceRecord {
    /// Project a detection result into its audit record
    pub fn from_result(result: &DetectionResult, threshold: f32) -> Self {
        Self {
            frame_id: result.frame_id,
            produced_at: result.produced_at.clone(),
            detections: result.detections.clone(),
            model_hash: result.model_hash.clone(),
            config_digest: result.config_digest.clone(),
            threshold,
            latency_ms: result.latency_ms,
        }
    }
}

/// One append-only audit log line: a record and its detached signature
///
/// Written once, never updated or reordered. The signature is an ed25519
/// signature over the record's canonical JSON bytes, hex-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedEntry {
    pub record: GovernanceRecord,
    pub sig: String,
}
