// Readiness handshake between the worker thread and the presentation surface.
//
// The worker must not start publishing before the surface exists and can
// accept marshaled calls. The consumer side signals the gate exactly once
// per session; waiting after the signal returns immediately.

use std::sync::{Condvar, Mutex};

/// One-shot readiness signal.
///
/// The producer parks in [`wait_ready`](Self::wait_ready) until the consumer
/// calls [`signal_ready`](Self::signal_ready). Signaling is idempotent and
/// cannot be undone. There is deliberately no timeout: the surface's own
/// construction sequence either runs to completion or fails fast.
#[derive(Debug, Default)]
pub struct ReadinessGate {
    ready: Mutex<bool>,
    signal: Condvar,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the surface as ready. Safe to call more than once.
    pub fn signal_ready(&self) {
        let mut ready = self.ready.lock().unwrap();
        *ready = true;
        self.signal.notify_all();
    }

    /// Block until the surface is ready. Returns immediately if the gate has
    /// already been signaled.
    pub fn wait_ready(&self) {
        let guard = self.ready.lock().unwrap();
        let _released = self.signal.wait_while(guard, |ready| !*ready).unwrap();
    }

    /// Non-blocking observation, for diagnostics and tests.
    pub fn is_ready(&self) -> bool {
        *self.ready.lock().unwrap()
    }
}
