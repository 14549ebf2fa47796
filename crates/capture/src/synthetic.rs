//! Synthetic frame source
//!
//! Implements `FrameSource` without camera hardware, generating deterministic
//! JPEG-framed payloads at a paced rate. Used for tests and demo mode.

use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{Frame, FrameSource, PipelineError};
use tracing::debug;

/// Synthetic source configuration
#[derive(Debug, Clone)]
pub struct SyntheticSourceConfig {
    /// Frame rate (Hz)
    pub fps: f64,
    /// Generated payload size in bytes (including JPEG markers)
    pub payload_size: usize,
}

impl Default for SyntheticSourceConfig {
    fn default() -> Self {
        Self {
            fps: 10.0,
            payload_size: 4096,
        }
    }
}

/// Deterministic paced frame generator
pub struct SyntheticSource {
    source_id: String,
    config: SyntheticSourceConfig,
    next_id: u64,
    started_at: Instant,
    last_frame_at: Option<Instant>,
}

impl SyntheticSource {
    /// Create a new synthetic source
    pub fn new(config: SyntheticSourceConfig) -> Self {
        debug!(fps = config.fps, "synthetic source created");
        Self {
            source_id: "synthetic:".to_string(),
            config,
            next_id: 0,
            started_at: Instant::now(),
            last_frame_at: None,
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(SyntheticSourceConfig::default())
    }

    fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.config.fps.max(0.1))
    }

    /// Deterministic payload: JPEG SOI/EOI markers around patterned bytes
    fn generate_payload(&self, frame_id: u64) -> Bytes {
        let body_len = self.config.payload_size.saturating_sub(4).max(4);
        let mut payload = Vec::with_capacity(body_len + 4);
        payload.extend_from_slice(&[0xFF, 0xD8]);
        for i in 0..body_len {
            payload.push(((frame_id as usize + i) % 251) as u8);
        }
        payload.extend_from_slice(&[0xFF, 0xD9]);
        Bytes::from(payload)
    }
}

impl FrameSource for SyntheticSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn next_frame(&mut self) -> Result<Frame, PipelineError> {
        // Pace to the configured rate
        if let Some(last) = self.last_frame_at {
            let elapsed = last.elapsed();
            let interval = self.interval();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        self.last_frame_at = Some(Instant::now());

        let id = self.next_id;
        self.next_id += 1;

        Ok(Frame {
            id,
            captured_at_ns: self.started_at.elapsed().as_nanos() as u64,
            payload: self.generate_payload(id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_ids_and_timestamps() {
        let mut source = SyntheticSource::new(SyntheticSourceConfig {
            fps: 1000.0,
            payload_size: 64,
        });

        let a = source.next_frame().unwrap();
        let b = source.next_frame().unwrap();

        assert_eq!(a.id, 0);
        assert_eq!(b.id, 1);
        assert!(b.captured_at_ns >= a.captured_at_ns);
    }

    #[test]
    fn test_payload_has_jpeg_markers() {
        let mut source = SyntheticSource::new(SyntheticSourceConfig {
            fps: 1000.0,
            payload_size: 128,
        });

        let frame = source.next_frame().unwrap();
        assert_eq!(&frame.payload[..2], &[0xFF, 0xD8]);
        assert_eq!(&frame.payload[frame.payload.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_pacing_delays_successive_frames() {
        let mut source = SyntheticSource::new(SyntheticSourceConfig {
            fps: 100.0,
            payload_size: 32,
        });

        let start = Instant::now();
        source.next_frame().unwrap();
        source.next_frame().unwrap();
        source.next_frame().unwrap();

        // Two intervals at 100 Hz is at least 20 ms
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
