// Session lifecycle - composes the gate, channel, worker and surface loop
//
// A session coordinates exactly one producer (the workload on its worker
// thread) and one consumer (the surface loop). The controller is the external
// caller's view; the handle is what the workload and any interested thread
// use to publish updates or request a close.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::bridge::{self, SurfaceInvoker};
use crate::channel::UpdateChannel;
use crate::gate::ReadinessGate;
use crate::metrics::SessionMetrics;
use crate::placement::PlacementOptions;
use crate::runner;
use crate::surface::{ProgressSurface, SurfaceInit};

/// Lifecycle of a session. Transitions only move forward; `Closed` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Created = 0,
    Started = 1,
    Ready = 2,
    Closing = 3,
    Closed = 4,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Created,
            1 => SessionState::Started,
            2 => SessionState::Ready,
            3 => SessionState::Closing,
            _ => SessionState::Closed,
        }
    }
}

/// The only failure visible to external callers, readable once the session
/// reaches `Closed`. Nothing the workload raises ever crosses the thread
/// boundary as an unwinding panic.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The workload returned an error.
    #[error("workload failed: {0}")]
    Workload(anyhow::Error),

    /// The workload panicked; the panic was caught and converted to data.
    #[error("workload panicked: {0}")]
    Panicked(String),
}

/// State shared between the worker thread, the surface loop and any handle
/// clones. The channel is the sole hot-path object mutated by both threads;
/// everything else is cold control state.
#[derive(Debug)]
pub(crate) struct SessionShared {
    gate: ReadinessGate,
    channel: UpdateChannel,
    abort: AtomicBool,
    close_requested: AtomicBool,
    state: AtomicU8,
    error: Mutex<Option<SessionError>>,
    metrics: Arc<SessionMetrics>,
}

impl SessionShared {
    fn new() -> Self {
        Self {
            gate: ReadinessGate::new(),
            channel: UpdateChannel::new(),
            abort: AtomicBool::new(false),
            close_requested: AtomicBool::new(false),
            state: AtomicU8::new(SessionState::Created as u8),
            error: Mutex::new(None),
            metrics: Arc::new(SessionMetrics::new()),
        }
    }

    pub(crate) fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    pub(crate) fn channel(&self) -> &UpdateChannel {
        &self.channel
    }

    pub(crate) fn metrics(&self) -> &Arc<SessionMetrics> {
        &self.metrics
    }

    pub(crate) fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Advance the state machine; only the exact `from → to` arc succeeds,
    /// so no transition can skip a state or run twice.
    pub(crate) fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn set_abort(&self) {
        self.abort.store(true, Ordering::Release);
    }

    pub(crate) fn abort_requested(&self) -> bool {
        self.abort.load(Ordering::Acquire)
    }

    pub(crate) fn capture_error(&self, error: SessionError) {
        *self.error.lock().unwrap() = Some(error);
    }

    pub(crate) fn clear_error(&self) {
        *self.error.lock().unwrap() = None;
    }

    fn take_error(&self) -> Option<SessionError> {
        self.error.lock().unwrap().take()
    }
}

/// Cloneable, thread-safe handle to a running session.
///
/// Publish operations never block and never fail. `set_title` marshals onto
/// the UI loop and blocks only for the duration of the marshal.
/// Cancellation is cooperative and best-effort: [`request_close`] sets the
/// abort flag, but the workload must poll [`abort_requested`] voluntarily -
/// nothing force-terminates the worker thread.
///
/// [`request_close`]: Self::request_close
/// [`abort_requested`]: Self::abort_requested
#[derive(Debug, Clone)]
pub struct SessionHandle {
    shared: Arc<SessionShared>,
    invoker: SurfaceInvoker,
}

impl SessionHandle {
    pub(crate) fn shared(&self) -> &Arc<SessionShared> {
        &self.shared
    }

    pub(crate) fn invoker(&self) -> &SurfaceInvoker {
        &self.invoker
    }

    /// Publish a progress value. With `suppress_animation` the indicator
    /// jumps instantly instead of animating the fill.
    pub fn set_progress(&self, value: i32, suppress_animation: bool) {
        let overwrote = self.shared.channel.publish_progress(value, suppress_animation);
        self.shared.metrics.record_publish(overwrote);
    }

    pub fn set_minimum(&self, value: i32) {
        let overwrote = self.shared.channel.publish_minimum(value);
        self.shared.metrics.record_publish(overwrote);
    }

    pub fn set_maximum(&self, value: i32) {
        let overwrote = self.shared.channel.publish_maximum(value);
        self.shared.metrics.record_publish(overwrote);
    }

    /// Update the surface title. Titles are rare and must not be dropped, so
    /// they bypass the coalescing channel and are marshaled directly onto
    /// the UI loop; the call blocks until the loop services it. Once
    /// teardown has begun this is a no-op.
    ///
    /// Must not be called from the UI-loop thread itself (surface
    /// implementations, the surface factory): the call waits for the loop
    /// to service it, and the loop cannot do so while it is the caller.
    /// Workload and external-caller threads are always safe.
    pub fn set_title(&self, text: impl Into<String>) {
        match self.state() {
            SessionState::Closing | SessionState::Closed => return,
            _ => {}
        }
        if !self.invoker.invoke_title(text.into()) {
            self.shared.metrics.record_dropped_marshal();
        }
    }

    /// Request the session to close. Sets the abort flag for the workload to
    /// observe and posts a close command to the surface loop. No-op once the
    /// session is closing or closed, and on repeat calls.
    pub fn request_close(&self) {
        if self.shared.close_requested.swap(true, Ordering::AcqRel) {
            return;
        }
        match self.state() {
            SessionState::Closing | SessionState::Closed => return,
            _ => {}
        }
        tracing::debug!("external close requested, setting abort flag");
        self.shared.set_abort();
        self.invoker.post_close();
    }

    /// Whether a close was requested before the workload finished. Polled
    /// voluntarily by cooperative workloads.
    pub fn abort_requested(&self) -> bool {
        self.shared.abort_requested()
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.shared.metrics
    }
}

/// The external caller's view of a modeless session.
///
/// Dropping the controller detaches the session; it still runs to
/// completion on its own threads.
#[derive(Debug)]
pub struct SessionController {
    handle: SessionHandle,
    ui_thread: Option<JoinHandle<()>>,
}

impl SessionController {
    /// A handle usable from any thread.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> SessionState {
        self.handle.state()
    }

    pub fn request_close(&self) {
        self.handle.request_close();
    }

    pub fn metrics(&self) -> &SessionMetrics {
        self.handle.metrics()
    }

    /// The captured workload failure, available at most once and only after
    /// the session reached `Closed`.
    pub fn take_error(&self) -> Option<SessionError> {
        if self.state() != SessionState::Closed {
            return None;
        }
        self.handle.shared.take_error()
    }

    /// Block until the session is fully closed (surface torn down, worker
    /// joined) and return the captured failure, if any.
    pub fn join(mut self) -> Option<SessionError> {
        if let Some(ui_thread) = self.ui_thread.take() {
            if ui_thread.join().is_err() {
                tracing::error!("surface loop thread panicked");
            }
        }
        self.handle.shared.take_error()
    }
}

/// Start a non-blocking session: the surface loop runs on a dedicated
/// thread, the workload on another. The returned controller inspects and
/// closes the session; the caller's thread is never blocked.
///
/// `surface_factory` runs on the UI loop thread once, before the readiness
/// gate opens; the workload starts only after the surface exists.
pub fn run_modeless<S, F, W>(
    title: impl Into<String>,
    placement: PlacementOptions,
    surface_factory: F,
    workload: W,
) -> SessionController
where
    S: ProgressSurface + 'static,
    F: FnOnce(SurfaceInit) -> S + Send + 'static,
    W: FnOnce(&SessionHandle) -> anyhow::Result<()> + Send + 'static,
{
    let (handle, worker, commands, init) = start_session(title.into(), placement, workload);

    let loop_handle = handle.clone();
    let ui_thread = thread::Builder::new()
        .name("bridge-ui".into())
        .spawn(move || {
            bridge::run_surface_loop(&loop_handle, commands, init, surface_factory);
            finish_session(&loop_handle, worker);
        })
        .expect("failed to spawn bridge-ui thread");

    SessionController {
        handle,
        ui_thread: Some(ui_thread),
    }
}

/// Start a session and run its surface loop on the calling thread, blocking
/// until the session closes. Returns the captured workload failure, if any.
pub fn run_modal<S, F, W>(
    title: impl Into<String>,
    placement: PlacementOptions,
    surface_factory: F,
    workload: W,
) -> Option<SessionError>
where
    S: ProgressSurface + 'static,
    F: FnOnce(SurfaceInit) -> S,
    W: FnOnce(&SessionHandle) -> anyhow::Result<()> + Send + 'static,
{
    let (handle, worker, commands, init) = start_session(title.into(), placement, workload);

    bridge::run_surface_loop(&handle, commands, init, surface_factory);
    finish_session(&handle, worker);
    handle.shared.take_error()
}

type CommandReceiver = mpsc::Receiver<bridge::SurfaceCommand>;

fn start_session<W>(
    title: String,
    placement: PlacementOptions,
    workload: W,
) -> (SessionHandle, JoinHandle<()>, CommandReceiver, SurfaceInit)
where
    W: FnOnce(&SessionHandle) -> anyhow::Result<()> + Send + 'static,
{
    let shared = Arc::new(SessionShared::new());
    let (tx, rx) = mpsc::channel();
    let invoker = SurfaceInvoker::new(tx);
    let handle = SessionHandle { shared, invoker };

    handle
        .shared
        .transition(SessionState::Created, SessionState::Started);
    tracing::info!(title = %title, "session started");

    // The worker parks on the readiness gate until the surface loop opens it
    let worker = runner::spawn_worker(handle.clone(), workload);

    (handle, worker, rx, SurfaceInit { title, placement })
}

/// Joins the worker and moves the state machine to its terminal state. The
/// session is `Closed` only once the worker thread has actually returned;
/// there is no forced termination.
fn finish_session(handle: &SessionHandle, worker: JoinHandle<()>) {
    if worker.join().is_err() {
        // spawn_worker catches workload panics itself; reaching this means
        // the capture machinery panicked
        tracing::error!("worker thread terminated abnormally");
    }
    handle
        .shared
        .transition(SessionState::Closing, SessionState::Closed);
    tracing::info!("session closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_transitions_in_order() {
        let shared = SessionShared::new();
        assert_eq!(shared.state(), SessionState::Created);

        assert!(shared.transition(SessionState::Created, SessionState::Started));
        assert!(shared.transition(SessionState::Started, SessionState::Ready));
        assert!(shared.transition(SessionState::Ready, SessionState::Closing));
        assert!(shared.transition(SessionState::Closing, SessionState::Closed));
        assert_eq!(shared.state(), SessionState::Closed);
    }

    #[test]
    fn test_no_transition_skips_states() {
        let shared = SessionShared::new();
        assert!(!shared.transition(SessionState::Created, SessionState::Ready));
        assert!(!shared.transition(SessionState::Ready, SessionState::Closing));
        assert_eq!(shared.state(), SessionState::Created);
    }

    #[test]
    fn test_closed_is_terminal() {
        let shared = SessionShared::new();
        shared.transition(SessionState::Created, SessionState::Started);
        shared.transition(SessionState::Started, SessionState::Ready);
        shared.transition(SessionState::Ready, SessionState::Closing);
        shared.transition(SessionState::Closing, SessionState::Closed);

        assert!(!shared.transition(SessionState::Closed, SessionState::Created));
        assert_eq!(shared.state(), SessionState::Closed);
    }

    #[test]
    fn test_transition_runs_once() {
        let shared = SessionShared::new();
        assert!(shared.transition(SessionState::Created, SessionState::Started));
        assert!(!shared.transition(SessionState::Created, SessionState::Started));
    }

    #[test]
    fn test_error_capture_and_take() {
        let shared = SessionShared::new();
        shared.capture_error(SessionError::Panicked("boom".into()));

        let error = shared.take_error();
        assert!(matches!(error, Some(SessionError::Panicked(msg)) if msg == "boom"));
        assert!(shared.take_error().is_none());
    }

    #[test]
    fn test_clear_error() {
        let shared = SessionShared::new();
        shared.capture_error(SessionError::Panicked("boom".into()));
        shared.clear_error();
        assert!(shared.take_error().is_none());
    }

    #[test]
    fn test_workload_error_display() {
        let error = SessionError::Workload(anyhow::anyhow!("disk full"));
        assert_eq!(error.to_string(), "workload failed: disk full");
    }
}
