//! Canonical record encoding
//!
//! Signing and verification must agree byte-for-byte, so records are
//! serialized through `serde_json::Value`, whose object representation
//! orders keys lexicographically. The same record therefore always encodes
//! to the same bytes regardless of struct field order.

use contracts::{GovernanceRecord, PipelineError};

/// Deterministic JSON bytes for signing and verification
pub fn canonical_bytes(record: &GovernanceRecord) -> Result<Vec<u8>, PipelineError> {
    let value = serde_json::to_value(record).map_err(|e| PipelineError::AuditEncode {
        message: e.to_string(),
    })?;
    serde_json::to_vec(&value).map_err(|e| PipelineError::AuditEncode {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BBox, Detection};

    fn sample_record() -> GovernanceRecord {
        GovernanceRecord {
            frame_id: 42,
            produced_at: "2026-02-03T04:05:06Z".into(),
            detections: vec![Detection {
                bbox: BBox {
                    x1: 1.0,
                    y1: 2.0,
                    x2: 3.0,
                    y2: 4.0,
                },
                score: 0.9,
                class_id: 1,
            }],
            model_hash: "abc".into(),
            config_digest: "def".into(),
            threshold: 0.5,
            latency_ms: Some(12.5),
        }
    }

    #[test]
    fn test_encoding_is_reproducible() {
        let record = sample_record();
        let a = canonical_bytes(&record).unwrap();
        let b = canonical_bytes(&record).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_keys_are_sorted() {
        let bytes = canonical_bytes(&sample_record()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let config_pos = text.find("\"config_digest\"").unwrap();
        let detections_pos = text.find("\"detections\"").unwrap();
        let frame_pos = text.find("\"frame_id\"").unwrap();
        let threshold_pos = text.find("\"threshold\"").unwrap();
        assert!(config_pos < detections_pos);
        assert!(detections_pos < frame_pos);
        assert!(frame_pos < threshold_pos);
    }

    #[test]
    fn test_field_change_alters_bytes() {
        let record = sample_record();
        let mut tampered = record.clone();
        tampered.threshold = 0.51;

        assert_ne!(
            canonical_bytes(&record).unwrap(),
            canonical_bytes(&tampered).unwrap()
        );
    }
}
