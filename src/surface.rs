// ProgressSurface - the seam between the bridge core and the host's visual
// progress indicator.
//
// The bridge never renders anything itself. Hosts implement this trait for
// their toolkit's progress widget; the crate ships a no-op surface for
// headless use and tests, and a terminal surface (see console.rs).

use thiserror::Error;

use crate::placement::PlacementOptions;

/// The widgets behind a surface are gone (disposed, dropped, window closed
/// mid-tick). Absorbed by the presenter, never surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("progress surface is no longer available")]
pub struct SurfaceUnavailable;

/// How the indicator renders: a concrete fill fraction, or a busy/marquee
/// style when progress is unknown or out of the known range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorMode {
    #[default]
    Determinate,
    Indeterminate,
}

/// Initial parameters handed to the surface factory on the UI thread.
#[derive(Debug, Clone)]
pub struct SurfaceInit {
    pub title: String,
    pub placement: PlacementOptions,
}

/// A visual progress indicator driven by the bridge's UI loop.
///
/// All methods are called on the UI thread only. Value operations are
/// fallible: once the underlying widgets are gone they return
/// [`SurfaceUnavailable`] and the presenter degrades the display instead of
/// propagating. A presentation fault must never crash the workload or the
/// host application.
pub trait ProgressSurface {
    /// Update the displayed title. Rare, never coalesced, no-op once
    /// teardown has begun.
    fn set_title(&mut self, title: &str);

    fn set_minimum(&mut self, value: i32) -> Result<(), SurfaceUnavailable>;
    fn set_maximum(&mut self, value: i32) -> Result<(), SurfaceUnavailable>;
    fn set_value(&mut self, value: i32) -> Result<(), SurfaceUnavailable>;
    fn set_mode(&mut self, mode: IndicatorMode) -> Result<(), SurfaceUnavailable>;

    /// Tear the surface down. Called exactly once, at the end of the
    /// session's UI loop.
    fn close(&mut self);

    /// Whether the host closed the surface out-of-band (e.g. the user
    /// dismissed the window). The loop polls this each tick and aborts the
    /// session cooperatively when it turns true.
    fn is_closed(&self) -> bool {
        false
    }
}

/// No-op surface for headless sessions and tests.
#[derive(Debug, Default)]
pub struct NullSurface;

impl NullSurface {
    pub fn new(_init: SurfaceInit) -> Self {
        Self
    }
}

impl ProgressSurface for NullSurface {
    fn set_title(&mut self, _title: &str) {}

    fn set_minimum(&mut self, _value: i32) -> Result<(), SurfaceUnavailable> {
        Ok(())
    }

    fn set_maximum(&mut self, _value: i32) -> Result<(), SurfaceUnavailable> {
        Ok(())
    }

    fn set_value(&mut self, _value: i32) -> Result<(), SurfaceUnavailable> {
        Ok(())
    }

    fn set_mode(&mut self, _mode: IndicatorMode) -> Result<(), SurfaceUnavailable> {
        Ok(())
    }

    fn close(&mut self) {}
}
