// Session metrics
//
// Lightweight counters for observing a bridge session's traffic

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Per-session performance metrics
///
/// Uses atomic operations for thread-safe tracking without locks; counters
/// are bumped from both the worker thread (publish side) and the UI loop
/// (drain side). Collected over the session lifetime and loggable on
/// shutdown for analysis.
#[derive(Debug)]
pub struct SessionMetrics {
    /// Updates published through the channel (all kinds)
    pub publishes: AtomicU64,

    /// Publishes that overwrote an undrained update (coalesced away)
    pub coalesced: AtomicU64,

    /// UI loop ticks executed
    pub ticks: AtomicU64,

    /// Ticks that drained an empty batch (no visual work done)
    pub empty_ticks: AtomicU64,

    /// Non-empty batches applied to the surface
    pub batches_applied: AtomicU64,

    /// Title updates marshaled onto the UI loop
    pub title_marshals: AtomicU64,

    /// Marshaled commands dropped because the UI loop was gone
    pub dropped_marshals: AtomicU64,

    /// Surface failures absorbed by degrading to indeterminate mode
    pub degrades: AtomicU64,

    /// Session start time
    start_time: Instant,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            publishes: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
            empty_ticks: AtomicU64::new(0),
            batches_applied: AtomicU64::new(0),
            title_marshals: AtomicU64::new(0),
            dropped_marshals: AtomicU64::new(0),
            degrades: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a publish; `overwrote` is the channel's coalescing report.
    pub fn record_publish(&self, overwrote: bool) {
        self.publishes.fetch_add(1, Ordering::Relaxed);
        if overwrote {
            self.coalesced.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a UI loop tick; `applied` is whether the drained batch held
    /// anything.
    pub fn record_tick(&self, applied: bool) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        if applied {
            self.batches_applied.fetch_add(1, Ordering::Relaxed);
        } else {
            self.empty_ticks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a title update marshaled onto the UI loop
    pub fn record_title_marshal(&self) {
        self.title_marshals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a marshaled command dropped because the loop has stopped
    pub fn record_dropped_marshal(&self) {
        self.dropped_marshals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a surface failure absorbed as a degrade to indeterminate
    pub fn record_degrade(&self) {
        self.degrades.fetch_add(1, Ordering::Relaxed);
    }

    /// Session uptime so far
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Fraction of publishes that were coalesced away before a drain saw them
    pub fn coalesce_ratio(&self) -> f64 {
        let publishes = self.publishes.load(Ordering::Relaxed);
        let coalesced = self.coalesced.load(Ordering::Relaxed);
        if publishes > 0 {
            coalesced as f64 / publishes as f64
        } else {
            0.0
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Publishes: {} ({} coalesced, ratio {:.2})",
            self.publishes.load(Ordering::Relaxed),
            self.coalesced.load(Ordering::Relaxed),
            self.coalesce_ratio()
        );
        tracing::info!(
            "Ticks: {} ({} empty, {} batches applied)",
            self.ticks.load(Ordering::Relaxed),
            self.empty_ticks.load(Ordering::Relaxed),
            self.batches_applied.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Marshals: {} titles, {} dropped; degrades: {}",
            self.title_marshals.load(Ordering::Relaxed),
            self.dropped_marshals.load(Ordering::Relaxed),
            self.degrades.load(Ordering::Relaxed)
        );
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_metrics_creation() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.publishes.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.ticks.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_publish_and_coalesce() {
        let metrics = SessionMetrics::new();

        metrics.record_publish(false);
        metrics.record_publish(true);
        metrics.record_publish(true);

        assert_eq!(metrics.publishes.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.coalesced.load(Ordering::Relaxed), 2);
        assert!((metrics.coalesce_ratio() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_coalesce_ratio_no_publishes() {
        let metrics = SessionMetrics::new();
        assert_eq!(metrics.coalesce_ratio(), 0.0);
    }

    #[test]
    fn test_record_ticks() {
        let metrics = SessionMetrics::new();

        metrics.record_tick(true);
        metrics.record_tick(false);
        metrics.record_tick(false);

        assert_eq!(metrics.ticks.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.empty_ticks.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.batches_applied.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_marshal_and_degrade_counters() {
        let metrics = SessionMetrics::new();

        metrics.record_title_marshal();
        metrics.record_dropped_marshal();
        metrics.record_degrade();

        assert_eq!(metrics.title_marshals.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.dropped_marshals.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.degrades.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_uptime() {
        let metrics = SessionMetrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.uptime().as_millis() >= 10);
    }
}
