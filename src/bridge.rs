// Surface loop and marshaling - the UI thread side of the bridge
//
// The loop is a blocking receive with a tick deadline: between ticks it
// services marshaled commands (title updates, close requests), and on each
// tick it drains the channel through the presenter. Progress traffic never
// flows through the command channel; only rare control messages do, so the
// worker is never blocked by ordinary publication and the loop's tick is
// never starved by it.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::presenter::Presenter;
use crate::session::{SessionHandle, SessionState};
use crate::surface::{ProgressSurface, SurfaceInit};

/// Drain cadence of the surface loop.
pub(crate) const TICK_PERIOD: Duration = Duration::from_millis(35);

/// Control traffic into the surface loop. Titles carry an ack channel so the
/// sender can block for exactly the duration of the marshal.
#[derive(Debug)]
pub(crate) enum SurfaceCommand {
    SetTitle { text: String, ack: mpsc::Sender<()> },
    Close,
}

/// Cloneable dispatcher into the surface loop.
///
/// Sends are fire-and-forget for closes and blocking-until-serviced for
/// titles. Once the loop has stopped, both become no-ops: a command posted
/// into a dead loop is dropped, never an error the caller must handle.
#[derive(Debug, Clone)]
pub struct SurfaceInvoker {
    tx: mpsc::Sender<SurfaceCommand>,
}

impl SurfaceInvoker {
    pub(crate) fn new(tx: mpsc::Sender<SurfaceCommand>) -> Self {
        Self { tx }
    }

    /// Post a close request. Never blocks.
    pub(crate) fn post_close(&self) {
        if self.tx.send(SurfaceCommand::Close).is_err() {
            tracing::debug!("surface loop already stopped, close request dropped");
        }
    }

    /// Marshal a title update and wait until the loop has applied it.
    /// Returns false if the loop was gone and the update was dropped.
    pub(crate) fn invoke_title(&self, text: String) -> bool {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self
            .tx
            .send(SurfaceCommand::SetTitle { text, ack: ack_tx })
            .is_err()
        {
            tracing::warn!("surface loop already stopped, title update dropped");
            return false;
        }
        // An Err here means the loop exited after accepting the command but
        // before servicing it; the update is dropped, the caller unblocks
        ack_rx.recv().is_ok()
    }
}

/// Run one session's UI loop to completion on the current thread.
///
/// Constructs the surface, opens the readiness gate, then ticks until a
/// close command arrives or the host closes the surface out-of-band. On
/// exit the session is moved to `Closing` and the surface torn down; the
/// caller is responsible for joining the worker and finishing the session.
pub(crate) fn run_surface_loop<S, F>(
    handle: &SessionHandle,
    commands: mpsc::Receiver<SurfaceCommand>,
    init: SurfaceInit,
    surface_factory: F,
) where
    S: ProgressSurface,
    F: FnOnce(SurfaceInit) -> S,
{
    let shared = handle.shared();
    let surface = surface_factory(init);
    let mut presenter = Presenter::new(surface, shared.metrics().clone());

    shared.transition(SessionState::Started, SessionState::Ready);
    shared.gate().signal_ready();
    tracing::debug!("surface ready, readiness gate opened");

    let mut deadline = Instant::now() + TICK_PERIOD;
    loop {
        let wait = deadline.saturating_duration_since(Instant::now());
        match commands.recv_timeout(wait) {
            Ok(SurfaceCommand::SetTitle { text, ack }) => {
                shared.metrics().record_title_marshal();
                presenter.set_title(&text);
                let _ = ack.send(());
            }
            Ok(SurfaceCommand::Close) => {
                tracing::debug!("close command received");
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                let batch = shared.channel().drain();
                let applied = !batch.is_empty();
                shared.metrics().record_tick(applied);
                if applied {
                    presenter.apply_batch(batch);
                }
                if presenter.surface_closed() {
                    // Host closed the surface out-of-band; abort the
                    // workload cooperatively and stop the loop
                    tracing::info!("surface closed by host, aborting session");
                    shared.set_abort();
                    break;
                }
                deadline = Instant::now() + TICK_PERIOD;
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::debug!("all command senders dropped, stopping surface loop");
                break;
            }
        }
    }

    shared.transition(SessionState::Ready, SessionState::Closing);
    presenter.teardown();
    tracing::debug!("surface torn down");
}
