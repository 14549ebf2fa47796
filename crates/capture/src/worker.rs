//! Capture session worker
//!
//! One dedicated thread per active capture session performs frame
//! acquisition and delivery sequentially. Control operations communicate
//! with the worker only through a cooperative cancel token; the running
//! indicator is cleared on every exit path by a drop guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use contracts::{CaptureConfig, FrameSource};
use metrics::{counter, histogram};
use tracing::{debug, info, instrument, warn};

use crate::backoff::Backoff;
use crate::buffer::FrameBuffer;
use crate::metrics::CaptureMetrics;
use crate::transport::TransformClient;

/// Cooperative cancellation token
///
/// Checked by the worker at the loop head and before each retry sleep.
/// Cancellation is never preemptive; an in-flight delivery attempt runs to
/// its own timeout.
#[derive(Debug, Default)]
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Outcome of `CaptureSession::start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartStatus {
    Started,
    AlreadyRunning,
}

/// Clears the running indicator when the worker exits, on any path
struct RunningGuard {
    metrics: Arc<CaptureMetrics>,
}

impl RunningGuard {
    fn engage(metrics: Arc<CaptureMetrics>) -> Self {
        metrics.set_running(true);
        Self { metrics }
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.metrics.set_running(false);
    }
}

/// A capture session: bounded frame buffer plus its delivery worker
///
/// `start` is idempotent while the worker thread is alive; `stop` requests
/// cooperative shutdown and returns immediately.
pub struct CaptureSession {
    config: CaptureConfig,
    buffer: Arc<Mutex<FrameBuffer>>,
    metrics: Arc<CaptureMetrics>,
    cancel: Arc<CancelToken>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl CaptureSession {
    /// Create a session from capture configuration
    pub fn new(config: CaptureConfig) -> Self {
        let buffer = Arc::new(Mutex::new(FrameBuffer::new(config.buffer_capacity)));
        Self {
            config,
            buffer,
            metrics: Arc::new(CaptureMetrics::new()),
            cancel: Arc::new(CancelToken::new()),
            worker: Mutex::new(None),
        }
    }

    /// Start the capture worker
    ///
    /// Returns `AlreadyRunning` without side effects if the worker thread is
    /// still alive.
    #[instrument(name = "capture_session_start", skip_all)]
    pub fn start(
        &self,
        source: Box<dyn FrameSource>,
        client: Arc<dyn TransformClient>,
    ) -> StartStatus {
        let mut slot = lock_unpoisoned(&self.worker);
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("capture worker already running");
            return StartStatus::AlreadyRunning;
        }

        self.cancel.reset();

        let buffer = Arc::clone(&self.buffer);
        let metrics = Arc::clone(&self.metrics);
        let cancel = Arc::clone(&self.cancel);
        let backoff = Backoff::new(
            Duration::from_millis(self.config.backoff_floor_ms),
            Duration::from_millis(self.config.backoff_ceiling_ms),
        );

        let handle = thread::spawn(move || {
            worker_loop(source, client, buffer, metrics, cancel, backoff);
        });

        *slot = Some(handle);
        info!("capture worker started");
        StartStatus::Started
    }

    /// Request cooperative shutdown
    ///
    /// Returns `false` if no worker is running. The worker observes the
    /// cancel token at its next checkpoint.
    pub fn stop(&self) -> bool {
        let running = self.is_running();
        if running {
            info!("capture worker stop requested");
            self.cancel.cancel();
        }
        running
    }

    /// Whether the worker thread is alive
    pub fn is_running(&self) -> bool {
        lock_unpoisoned(&self.worker)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Wait for the worker thread to exit
    pub fn join(&self) {
        let handle = lock_unpoisoned(&self.worker).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("capture worker terminated abnormally");
            }
        }
    }

    /// Session metrics
    pub fn metrics(&self) -> Arc<CaptureMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Current buffered frame count
    pub fn buffer_depth(&self) -> usize {
        lock_unpoisoned(&self.buffer).len()
    }
}

/// Lock a mutex, taking the inner value even if a holder panicked
fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The worker loop: acquire → buffer → preview → drain-until-failure
fn worker_loop(
    mut source: Box<dyn FrameSource>,
    client: Arc<dyn TransformClient>,
    buffer: Arc<Mutex<FrameBuffer>>,
    metrics: Arc<CaptureMetrics>,
    cancel: Arc<CancelToken>,
    mut backoff: Backoff,
) {
    let _guard = RunningGuard::engage(Arc::clone(&metrics));
    let mut evicted_seen = lock_unpoisoned(&buffer).dropped_count();

    debug!(source = source.source_id(), "capture loop entered");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "frame acquisition failed");
                metrics.add_frames_dropped(1);
                counter!("edgesight_capture_frames_dropped_total").increment(1);
                continue;
            }
        };

        metrics.inc_frames_captured();
        counter!("edgesight_capture_frames_total").increment(1);

        let preview_payload = frame.payload.clone();
        {
            let mut buf = lock_unpoisoned(&buffer);
            buf.push(frame);

            let evicted = buf.dropped_count();
            if evicted > evicted_seen {
                let delta = evicted - evicted_seen;
                metrics.add_frames_dropped(delta);
                counter!("edgesight_capture_frames_dropped_total").increment(delta);
                evicted_seen = evicted;
            }
        }

        // Opportunistic preview of the newest frame; outcome deliberately unused
        let _ = client.push_preview(&preview_payload);

        drain_buffer(&client, &buffer, &metrics, &cancel, &mut backoff);
    }

    debug!("capture loop exited");
}

/// Deliver buffered frames head-first until empty or the first failure
///
/// On failure the head stays in place: the next drain retries the same
/// frame, preserving order and at-least-once delivery while it remains
/// buffered. At most one delivery attempt is ever in flight.
fn drain_buffer(
    client: &Arc<dyn TransformClient>,
    buffer: &Arc<Mutex<FrameBuffer>>,
    metrics: &Arc<CaptureMetrics>,
    cancel: &Arc<CancelToken>,
    backoff: &mut Backoff,
) {
    loop {
        if cancel.is_cancelled() {
            return;
        }

        let head = match lock_unpoisoned(buffer).peek_head() {
            Some(frame) => frame.clone(),
            None => return,
        };

        let attempt_start = Instant::now();
        match client.deliver(&head) {
            Ok(()) => {
                lock_unpoisoned(buffer).pop_head();
                metrics.inc_frames_sent();
                counter!("edgesight_capture_frames_sent_total").increment(1);
                histogram!("edgesight_capture_send_latency_ms")
                    .record(attempt_start.elapsed().as_secs_f64() * 1000.0);
                backoff.reset();
            }
            Err(e) => {
                metrics.inc_send_failures();
                counter!("edgesight_capture_send_failures_total").increment(1);
                debug!(frame_id = head.id, error = %e, "delivery failed, backing off");

                // Pre-retry checkpoint
                if cancel.is_cancelled() {
                    return;
                }
                thread::sleep(backoff.next_delay());
                return;
            }
        }
    }
}
