// UpdateChannel - Lock-free coalescing cell for cross-thread progress updates
//
// One background worker publishes progress/bounds updates; the UI loop drains
// them on its tick cadence. Intermediate values are overwritten rather than
// queued (last-write-wins per kind), so a slow consumer never builds backlog
// and a fast producer never blocks.

use std::sync::atomic::{AtomicU64, Ordering};

// Cell layout: bit 63 = pending flag, bit 32 = suppress-animation flag
// (progress cell only), bits 0..32 = the i32 payload as its raw bit pattern.
// Packing flag and payload into one word makes every publish and every drain
// a single atomic swap, so a drain can never observe the flag from one
// publish paired with the payload of another, and no publish can be lost
// between a read and a reset.
const PENDING: u64 = 1 << 63;
const SUPPRESS: u64 = 1 << 32;
const EMPTY: u64 = 0;

fn pack(value: i32) -> u64 {
    value as u32 as u64
}

fn unpack(word: u64) -> i32 {
    word as u32 as i32
}

/// A pending progress update: the value plus whether the platform fill
/// animation should be defeated when it is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub value: i32,
    pub suppress_animation: bool,
}

/// Everything pending at the moment of a drain, taken atomically per kind.
///
/// A minimum and a maximum published before one drain both appear in the same
/// batch; the relative apply order across kinds is unspecified (they mutate
/// disjoint state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateBatch {
    pub minimum: Option<i32>,
    pub maximum: Option<i32>,
    pub progress: Option<ProgressUpdate>,
}

impl UpdateBatch {
    /// True when nothing was pending - the consumer can skip all visual work.
    pub fn is_empty(&self) -> bool {
        self.minimum.is_none() && self.maximum.is_none() && self.progress.is_none()
    }
}

/// Latest-pending-update state shared between exactly one producer and one
/// consumer.
///
/// Publish operations are callable from any thread, never block, and never
/// fail; each overwrites the pending update of its own kind. [`drain`] is
/// consumer-side, O(1), and never blocks. No blocking primitive exists
/// anywhere in this type: each kind is a single `AtomicU64` and every
/// operation is one `swap`.
///
/// [`drain`]: Self::drain
#[derive(Debug, Default)]
pub struct UpdateChannel {
    progress: AtomicU64,
    maximum: AtomicU64,
    minimum: AtomicU64,
}

impl UpdateChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a progress value. Returns true if an undrained progress update
    /// was overwritten (the update was coalesced away).
    pub fn publish_progress(&self, value: i32, suppress_animation: bool) -> bool {
        let mut word = PENDING | pack(value);
        if suppress_animation {
            word |= SUPPRESS;
        }
        self.progress.swap(word, Ordering::AcqRel) & PENDING != 0
    }

    /// Publish a new upper bound. Returns true if an undrained bound was
    /// overwritten.
    pub fn publish_maximum(&self, value: i32) -> bool {
        self.maximum.swap(PENDING | pack(value), Ordering::AcqRel) & PENDING != 0
    }

    /// Publish a new lower bound. Returns true if an undrained bound was
    /// overwritten.
    pub fn publish_minimum(&self, value: i32) -> bool {
        self.minimum.swap(PENDING | pack(value), Ordering::AcqRel) & PENDING != 0
    }

    /// Take every pending update and reset the channel to empty.
    ///
    /// Consumer-side only. Per kind, the update observed is the last one
    /// published before the swap.
    pub fn drain(&self) -> UpdateBatch {
        let progress = self.progress.swap(EMPTY, Ordering::AcqRel);
        let maximum = self.maximum.swap(EMPTY, Ordering::AcqRel);
        let minimum = self.minimum.swap(EMPTY, Ordering::AcqRel);

        UpdateBatch {
            minimum: (minimum & PENDING != 0).then(|| unpack(minimum)),
            maximum: (maximum & PENDING != 0).then(|| unpack(maximum)),
            progress: (progress & PENDING != 0).then(|| ProgressUpdate {
                value: unpack(progress),
                suppress_animation: progress & SUPPRESS != 0,
            }),
        }
    }
}
