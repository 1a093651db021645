// progress-bridge - Lock-free progress reporting between a background worker
// and a single-threaded UI event loop
//
// This is the library crate containing the bridge core: the coalescing
// update channel, the readiness handshake, the presenter, the session
// lifecycle, and the reference surfaces. The binary crate (main.rs) is a
// terminal demo.

pub mod bridge;
pub mod channel;
pub mod config;
pub mod console;
pub mod gate;
pub mod logging;
pub mod metrics;
pub mod placement;
pub mod presenter;
mod runner;
pub mod session;
pub mod surface;

// Re-export commonly used types for convenience
pub use bridge::SurfaceInvoker;
pub use channel::{ProgressUpdate, UpdateBatch, UpdateChannel};
pub use config::{BridgeConfig, ConfigManager};
pub use console::ConsoleSurface;
pub use gate::ReadinessGate;
pub use metrics::SessionMetrics;
pub use placement::{Anchor, OwnerRect, PlacementOptions};
pub use presenter::{Presenter, ProgressState};
pub use session::{
    SessionController, SessionError, SessionHandle, SessionState, run_modal, run_modeless,
};
pub use surface::{IndicatorMode, NullSurface, ProgressSurface, SurfaceInit, SurfaceUnavailable};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
