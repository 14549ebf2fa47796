//! Frame - capture edge output

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// One captured image unit
///
/// Produced by the capture loop, immutable afterwards. `id` is a per-session
/// monotonic counter; `captured_at_ns` comes from a monotonic clock so frame
/// spacing is unaffected by wall-clock adjustments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Monotonic frame counter (per capture session)
    pub id: u64,

    /// Monotonic capture timestamp (nanoseconds)
    pub captured_at_ns: u64,

    /// Encoded image bytes, typically JPEG (zero-copy)
    pub payload: Bytes,
}

impl Frame {
    /// Payload size in bytes
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_round_trips_through_json() {
        let frame = Frame {
            id: 17,
            captured_at_ns: 123_456_789,
            payload: Bytes::from_static(&[0xFF, 0xD8, 0x01, 0xFF, 0xD9]),
        };

        let json = serde_json::to_string(&frame).unwrap();
        let parsed: Frame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, 17);
        assert_eq!(parsed.captured_at_ns, 123_456_789);
        assert_eq!(parsed.payload, frame.payload);
        assert_eq!(parsed.payload_len(), 5);
    }
}
