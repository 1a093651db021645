//! progress-bridge demo
//!
//! Runs one bridge session against the terminal surface with a simulated
//! stepped workload: the worker thread publishes progress on every step
//! while the calling thread runs the surface loop, exactly the modal shape
//! an embedding GUI would use.
//!
//! # Execution Flow
//!
//! 1. Load `config/progress-bridge.yaml` (defaults if absent)
//! 2. Initialize logging → logs/progress-bridge.<date>
//! 3. Run a modeless session with [`ConsoleSurface`] and join it
//! 4. Log the session metrics summary and the captured outcome
//!
//! The workload polls the abort flag each step, changes the title at the
//! halfway point, and optionally defeats the fill animation on the final
//! step so the bar snaps to full instead of sweeping.

use anyhow::Result;
use progress_bridge::{APP_NAME, ConfigManager, ConsoleSurface, VERSION, run_modeless};
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new("config")?;
    let config = config_manager.load()?;

    // Console logging interleaves with the progress bar; off by default
    let _guard = progress_bridge::logging::setup_logging_with_console(
        &config.log_dir,
        "progress-bridge",
        config.debug_mode,
        config.console_log,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let steps = config.steps.max(1);
    let step_delay = Duration::from_millis(config.step_delay_ms);
    let suppress_final = config.suppress_final_animation;

    let controller = run_modeless(
        config.title.clone(),
        config.placement,
        ConsoleSurface::new,
        move |session| {
            session.set_minimum(0);
            session.set_maximum(steps);

            for step in 0..=steps {
                if session.abort_requested() {
                    tracing::info!("Abort requested at step {}/{}, stopping early", step, steps);
                    return Ok(());
                }
                if step == steps / 2 {
                    session.set_title("More than halfway there...");
                }
                session.set_progress(step, suppress_final && step == steps);
                thread::sleep(step_delay);
            }
            Ok(())
        },
    );

    let handle = controller.handle();
    let error = controller.join();

    handle.metrics().log_summary();

    match error {
        Some(error) => {
            tracing::error!("Session failed: {}", error);
            Err(anyhow::anyhow!(error))
        }
        None => {
            tracing::info!("Session completed successfully");
            Ok(())
        }
    }
}
