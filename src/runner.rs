// Worker thread - runs the user workload and captures its outcome
//
// The worker parks on the readiness gate until the surface exists, runs the
// workload, and converts its outcome (return value or panic) into captured
// session data. The close request is issued by a drop guard so that every
// exit path - normal return, error, panic - requests close exactly once.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crate::bridge::SurfaceInvoker;
use crate::session::{SessionError, SessionHandle};

/// Posts the close request when dropped, the `finally` of the worker thread.
struct CloseGuard {
    invoker: SurfaceInvoker,
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.invoker.post_close();
    }
}

pub(crate) fn spawn_worker<W>(handle: SessionHandle, workload: W) -> JoinHandle<()>
where
    W: FnOnce(&SessionHandle) -> anyhow::Result<()> + Send + 'static,
{
    thread::Builder::new()
        .name("bridge-worker".into())
        .spawn(move || {
            let _close = CloseGuard {
                invoker: handle.invoker().clone(),
            };

            handle.shared().gate().wait_ready();
            tracing::debug!("readiness gate open, running workload");

            match panic::catch_unwind(AssertUnwindSafe(|| workload(&handle))) {
                Ok(Ok(())) => {
                    handle.shared().clear_error();
                    tracing::debug!("workload completed");
                }
                Ok(Err(error)) => {
                    tracing::warn!("workload failed: {error:#}");
                    handle.shared().capture_error(SessionError::Workload(error));
                }
                Err(payload) => {
                    let message = panic_message(payload);
                    tracing::error!("workload panicked: {message}");
                    handle
                        .shared()
                        .capture_error(SessionError::Panicked(message));
                }
            }
        })
        .expect("failed to spawn bridge-worker thread")
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_str() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload), "boom");
    }

    #[test]
    fn test_panic_message_from_string() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("went wrong"));
        assert_eq!(panic_message(payload), "went wrong");
    }

    #[test]
    fn test_panic_message_opaque() {
        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload), "opaque panic payload");
    }
}
