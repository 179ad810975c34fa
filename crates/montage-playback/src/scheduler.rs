//! Display-tick scheduling.
//!
//! The engine's advance loop runs once per display refresh. Hosts with
//! their own redraw loop call [`PlaybackEngine::advance`](crate::engine::PlaybackEngine::advance)
//! directly; hosts without one can spawn a [`FrameTicker`] and forward its
//! deltas. Tests drive `advance` manually with synthetic deltas.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};
use tracing::debug;

/// A thread emitting elapsed-time deltas (seconds) at a fixed interval.
///
/// Deltas that the receiver is too slow to take are carried into the next
/// tick rather than dropped, so no elapsed time is ever lost.
pub struct FrameTicker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FrameTicker {
    /// Spawn a ticker emitting roughly every `interval`.
    pub fn spawn(interval: Duration) -> (Self, Receiver<f64>) {
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = bounded::<f64>(1);

        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let mut last = Instant::now();
            let mut carry = 0.0;
            while !flag.load(Ordering::Relaxed) {
                thread::sleep(interval);
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f64() + carry;
                last = now;
                carry = match tx.try_send(dt) {
                    Ok(()) => 0.0,
                    Err(_) => dt,
                };
            }
            debug!("frame ticker stopped");
        });

        (
            Self {
                stop,
                handle: Some(handle),
            },
            rx,
        )
    }

    /// Stop the ticker thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
