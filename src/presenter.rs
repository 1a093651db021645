// Presenter - applies drained update batches to the progress surface
//
// Owns the consumer-side rendering state and the determinate/indeterminate
// decision. Runs entirely on the UI thread; the only cross-thread object it
// touches is the channel's drained output, handed to it by the surface loop.

use std::sync::Arc;

use crate::channel::{ProgressUpdate, UpdateBatch};
use crate::metrics::SessionMetrics;
use crate::surface::{IndicatorMode, ProgressSurface, SurfaceUnavailable};

/// Rendering state mirrored from the surface. Mutated only by the presenter,
/// created when the surface is realized, destroyed at teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressState {
    pub minimum: i32,
    pub maximum: i32,
    pub current: i32,
    pub mode: IndicatorMode,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            minimum: 0,
            maximum: 100,
            current: 0,
            mode: IndicatorMode::Determinate,
        }
    }
}

/// Drives a [`ProgressSurface`] from drained [`UpdateBatch`]es.
///
/// Surface failures are absorbed here: a `SurfaceUnavailable` while applying
/// a value degrades the display to indeterminate mode and is never
/// propagated. The workload and the host must not be affected by a
/// presentation glitch.
pub struct Presenter<S: ProgressSurface> {
    state: ProgressState,
    surface: S,
    torn_down: bool,
    metrics: Arc<SessionMetrics>,
}

impl<S: ProgressSurface> Presenter<S> {
    pub fn new(surface: S, metrics: Arc<SessionMetrics>) -> Self {
        Self {
            state: ProgressState::default(),
            surface,
            torn_down: false,
            metrics,
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    /// Apply one drained batch. Empty batches cost nothing; batches arriving
    /// after teardown are discarded.
    ///
    /// Bounds are applied first, then the progress value; when a tick carries
    /// only bounds, the mode is recomputed against the new range so a current
    /// value that fell out of (or back into) range re-renders correctly.
    pub fn apply_batch(&mut self, batch: UpdateBatch) {
        if batch.is_empty() || self.torn_down {
            return;
        }

        let mut bounds_changed = false;
        if let Some(minimum) = batch.minimum {
            self.state.minimum = minimum;
            self.absorb(|surface| surface.set_minimum(minimum));
            bounds_changed = true;
        }
        if let Some(maximum) = batch.maximum {
            self.state.maximum = maximum;
            self.absorb(|surface| surface.set_maximum(maximum));
            bounds_changed = true;
        }

        if let Some(update) = batch.progress {
            self.apply_progress(update);
        } else if bounds_changed {
            self.recompute_mode();
        }
    }

    fn apply_progress(&mut self, update: ProgressUpdate) {
        if update.value == self.state.current {
            return;
        }
        if update.value < self.state.minimum || update.value > self.state.maximum {
            // Out of the known range: a concrete bar would be meaningless
            self.switch_mode(IndicatorMode::Indeterminate);
            return;
        }

        let result = Self::push_value(&mut self.surface, &self.state, update);
        match result {
            Ok(()) => {
                self.state.mode = IndicatorMode::Determinate;
                self.state.current = update.value;
            }
            Err(SurfaceUnavailable) => self.degrade(),
        }
    }

    fn push_value(
        surface: &mut S,
        state: &ProgressState,
        update: ProgressUpdate,
    ) -> Result<(), SurfaceUnavailable> {
        surface.set_mode(IndicatorMode::Determinate)?;
        if update.suppress_animation && update.value < state.maximum {
            // Backward-then-forward transition defeats the platform bar's
            // fill animation, producing an instantaneous jump
            surface.set_value(update.value + 1)?;
        }
        surface.set_value(update.value)
    }

    fn recompute_mode(&mut self) {
        let mode = if self.state.current < self.state.minimum
            || self.state.current > self.state.maximum
        {
            IndicatorMode::Indeterminate
        } else {
            IndicatorMode::Determinate
        };
        self.switch_mode(mode);
    }

    fn switch_mode(&mut self, mode: IndicatorMode) {
        self.state.mode = mode;
        self.absorb(|surface| surface.set_mode(mode));
    }

    fn degrade(&mut self) {
        tracing::warn!("surface unavailable while applying value, degrading to indeterminate");
        self.metrics.record_degrade();
        self.state.mode = IndicatorMode::Indeterminate;
        let _ = self.surface.set_mode(IndicatorMode::Indeterminate);
    }

    fn absorb(&mut self, op: impl FnOnce(&mut S) -> Result<(), SurfaceUnavailable>) {
        if op(&mut self.surface).is_err() {
            self.degrade();
        }
    }

    /// Forward a marshaled title update. No-op once teardown has begun.
    pub fn set_title(&mut self, title: &str) {
        if self.torn_down {
            return;
        }
        self.surface.set_title(title);
    }

    /// Whether the host closed the surface out-of-band.
    pub fn surface_closed(&self) -> bool {
        !self.torn_down && self.surface.is_closed()
    }

    /// Close the surface; subsequent batches and titles are discarded.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.surface.close();
        self.torn_down = true;
    }
}
