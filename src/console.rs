// ConsoleSurface - terminal progress indicator backed by indicatif
//
// Reference adapter for headless hosts and the demo binary. Determinate mode
// renders a bar; indeterminate mode renders a spinner with a steady tick.
// Placement options are ignored: a terminal has no owner window.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::surface::{IndicatorMode, ProgressSurface, SurfaceInit, SurfaceUnavailable};

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap()
        .progress_chars("█▓░")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
        .unwrap()
}

/// Terminal progress surface.
///
/// The bridge publishes `i32` values in an arbitrary `[minimum, maximum]`
/// range; indicatif positions are `u64` offsets from zero, so values are
/// rebased against the current minimum.
pub struct ConsoleSurface {
    bar: ProgressBar,
    mode: IndicatorMode,
    minimum: i32,
    maximum: i32,
    closed: bool,
}

impl ConsoleSurface {
    pub fn new(init: SurfaceInit) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(bar_style());
        bar.set_message(init.title);
        Self {
            bar,
            mode: IndicatorMode::Determinate,
            minimum: 0,
            maximum: 100,
            closed: false,
        }
    }

    /// A surface that renders nowhere, for tests and quiet hosts.
    pub fn hidden(init: SurfaceInit) -> Self {
        let mut surface = Self::new(init);
        surface
            .bar
            .set_draw_target(indicatif::ProgressDrawTarget::hidden());
        surface
    }

    fn guard(&self) -> Result<(), SurfaceUnavailable> {
        if self.closed {
            Err(SurfaceUnavailable)
        } else {
            Ok(())
        }
    }

    fn span(&self) -> u64 {
        (self.maximum - self.minimum).max(0) as u64
    }

    fn rebase(&self, value: i32) -> u64 {
        (value - self.minimum).max(0) as u64
    }
}

impl ProgressSurface for ConsoleSurface {
    fn set_title(&mut self, title: &str) {
        if self.closed {
            return;
        }
        self.bar.set_message(title.to_string());
    }

    fn set_minimum(&mut self, value: i32) -> Result<(), SurfaceUnavailable> {
        self.guard()?;
        self.minimum = value;
        self.bar.set_length(self.span());
        Ok(())
    }

    fn set_maximum(&mut self, value: i32) -> Result<(), SurfaceUnavailable> {
        self.guard()?;
        self.maximum = value;
        self.bar.set_length(self.span());
        Ok(())
    }

    fn set_value(&mut self, value: i32) -> Result<(), SurfaceUnavailable> {
        self.guard()?;
        self.bar.set_position(self.rebase(value));
        Ok(())
    }

    fn set_mode(&mut self, mode: IndicatorMode) -> Result<(), SurfaceUnavailable> {
        self.guard()?;
        if self.mode == mode {
            return Ok(());
        }
        self.mode = mode;
        match mode {
            IndicatorMode::Determinate => {
                self.bar.disable_steady_tick();
                self.bar.set_style(bar_style());
            }
            IndicatorMode::Indeterminate => {
                self.bar.set_style(spinner_style());
                self.bar.enable_steady_tick(Duration::from_millis(80));
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.bar.finish_and_clear();
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::PlacementOptions;

    fn surface() -> ConsoleSurface {
        ConsoleSurface::hidden(SurfaceInit {
            title: "test".into(),
            placement: PlacementOptions::default(),
        })
    }

    #[test]
    fn test_value_rebased_against_minimum() {
        let mut s = surface();
        s.set_minimum(50).unwrap();
        s.set_maximum(150).unwrap();
        s.set_value(75).unwrap();
        assert_eq!(s.bar.position(), 25);
        assert_eq!(s.bar.length(), Some(100));
    }

    #[test]
    fn test_mode_round_trip() {
        let mut s = surface();
        s.set_mode(IndicatorMode::Indeterminate).unwrap();
        s.set_mode(IndicatorMode::Indeterminate).unwrap();
        s.set_mode(IndicatorMode::Determinate).unwrap();
    }

    #[test]
    fn test_closed_surface_reports_unavailable() {
        let mut s = surface();
        s.close();
        assert!(s.is_closed());
        assert_eq!(s.set_value(10), Err(SurfaceUnavailable));
        assert_eq!(s.set_maximum(10), Err(SurfaceUnavailable));
        assert_eq!(s.set_mode(IndicatorMode::Indeterminate), Err(SurfaceUnavailable));
        // Titles and repeat closes are silent no-ops
        s.set_title("late");
        s.close();
    }

    #[test]
    fn test_inverted_bounds_clamp_to_zero_span() {
        let mut s = surface();
        s.set_minimum(100).unwrap();
        s.set_maximum(0).unwrap();
        assert_eq!(s.bar.length(), Some(0));
    }
}
