//! Frame reliability buffer with FIFO ordering and drop-oldest overflow.
//!
//! Uses index-based separation for better performance:
//! - HeapRb stores lightweight metadata (frame id + slab key)
//! - Slab stores the actual Frame data
//!
//! This avoids moving encoded image payloads during buffer operations.

use std::fmt;

use contracts::Frame;
use ringbuf::{traits::*, HeapRb};
use slab::Slab;

/// Lightweight metadata stored in the ring buffer
#[derive(Debug, Clone, Copy)]
struct FrameMeta {
    /// Frame id, for diagnostics
    frame_id: u64,
    /// Key into the slab storage
    slab_key: usize,
}

/// Bounded FIFO of frames awaiting delivery
///
/// Capacity is fixed at construction. When full, `push` evicts the oldest
/// entry and counts the drop; it never blocks. Head access preserves
/// insertion (frame id) order, so delivery retries always see the same head
/// until it is either delivered or evicted by capacity pressure.
pub struct FrameBuffer {
    /// Ring buffer of metadata (frame id + slab key)
    index: HeapRb<FrameMeta>,
    /// Actual frame storage
    storage: Slab<Frame>,
    capacity: usize,
    dropped_count: u64,
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("len", &self.index.occupied_len())
            .field("capacity", &self.capacity)
            .field("dropped", &self.dropped_count)
            .finish()
    }
}

impl FrameBuffer {
    /// Create a new frame buffer with the given capacity
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HeapRb::new(capacity),
            storage: Slab::with_capacity(capacity),
            capacity,
            dropped_count: 0,
        }
    }

    /// Append a frame
    ///
    /// If the buffer is full, the oldest frame is evicted and counted.
    #[inline]
    pub fn push(&mut self, frame: Frame) {
        if self.index.is_full() {
            if let Some(old_meta) = self.index.try_pop() {
                self.storage.remove(old_meta.slab_key);
            }
            self.dropped_count += 1;
        }

        let meta = FrameMeta {
            frame_id: frame.id,
            slab_key: self.storage.insert(frame),
        };
        let _ = self.index.try_push(meta);
    }

    /// Peek at the oldest frame without removing it
    #[inline]
    pub fn peek_head(&self) -> Option<&Frame> {
        self.index
            .iter()
            .next()
            .and_then(|meta| self.storage.get(meta.slab_key))
    }

    /// Remove and return the oldest frame
    #[inline]
    pub fn pop_head(&mut self) -> Option<Frame> {
        self.index
            .try_pop()
            .map(|meta| self.storage.remove(meta.slab_key))
    }

    /// Frame id at the head, if any
    #[inline]
    pub fn head_id(&self) -> Option<u64> {
        self.index.iter().next().map(|meta| meta.frame_id)
    }

    /// Number of buffered frames
    #[inline]
    pub fn len(&self) -> usize {
        self.index.occupied_len()
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Configured capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total frames evicted by capacity pressure
    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn make_frame(id: u64) -> Frame {
        Frame {
            id,
            captured_at_ns: id * 1_000_000,
            payload: Bytes::from(vec![0xFFu8; 16]),
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut buffer = FrameBuffer::new(10);

        buffer.push(make_frame(1));
        buffer.push(make_frame(2));
        buffer.push(make_frame(3));

        assert_eq!(buffer.pop_head().unwrap().id, 1);
        assert_eq!(buffer.pop_head().unwrap().id, 2);
        assert_eq!(buffer.pop_head().unwrap().id, 3);
        assert!(buffer.pop_head().is_none());
    }

    #[test]
    fn test_eviction_drops_exactly_one() {
        let mut buffer = FrameBuffer::new(3);

        for id in 1..=4 {
            buffer.push(make_frame(id));
        }

        // Capacity 3, 4 pushes: one drop, the 3 most recent remain in order
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.dropped_count(), 1);
        assert_eq!(buffer.pop_head().unwrap().id, 2);
        assert_eq!(buffer.pop_head().unwrap().id, 3);
        assert_eq!(buffer.pop_head().unwrap().id, 4);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut buffer = FrameBuffer::new(4);
        buffer.push(make_frame(7));

        assert_eq!(buffer.peek_head().unwrap().id, 7);
        assert_eq!(buffer.peek_head().unwrap().id, 7);
        assert_eq!(buffer.head_id(), Some(7));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_payloads_survive_eviction_churn() {
        let mut buffer = FrameBuffer::new(2);

        for id in 0..100 {
            buffer.push(make_frame(id));
        }

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.dropped_count(), 98);
        let head = buffer.pop_head().unwrap();
        assert_eq!(head.id, 98);
        assert_eq!(head.payload.len(), 16);
    }
}
