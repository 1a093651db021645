// Placement options for a progress surface relative to an owner window.
//
// The bridge core never positions anything; it only carries these options
// through to the host's surface factory and provides the pure anchor
// arithmetic. Applying the resolved position is the host's job.

use serde::{Deserialize, Serialize};

/// The nine anchor points of an owner rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    #[default]
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    // (horizontal, vertical): 0 = leading edge, 1 = centered, 2 = trailing edge
    fn factors(self) -> (i32, i32) {
        match self {
            Anchor::TopLeft => (0, 0),
            Anchor::TopCenter => (1, 0),
            Anchor::TopRight => (2, 0),
            Anchor::MiddleLeft => (0, 1),
            Anchor::MiddleCenter => (1, 1),
            Anchor::MiddleRight => (2, 1),
            Anchor::BottomLeft => (0, 2),
            Anchor::BottomCenter => (1, 2),
            Anchor::BottomRight => (2, 2),
        }
    }
}

/// Owner window bounds in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Where to place a surface relative to its owner: an anchor point plus a
/// pixel offset. Default is centered with no offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementOptions {
    pub offset: (i32, i32),
    pub anchor: Anchor,
}

impl PlacementOptions {
    /// Resolve the top-left position of a surface of the given size against
    /// an owner rectangle.
    pub fn resolve(&self, owner: OwnerRect, size: (i32, i32)) -> (i32, i32) {
        let (w, h) = size;
        let (fh, fv) = self.anchor.factors();
        let x = match fh {
            0 => owner.x,
            1 => owner.x + (owner.width - w) / 2,
            _ => owner.x + owner.width - w,
        };
        let y = match fv {
            0 => owner.y,
            1 => owner.y + (owner.height - h) / 2,
            _ => owner.y + owner.height - h,
        };
        (x + self.offset.0, y + self.offset.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: OwnerRect = OwnerRect {
        x: 100,
        y: 200,
        width: 400,
        height: 300,
    };
    const SIZE: (i32, i32) = (40, 30);

    fn resolve(anchor: Anchor) -> (i32, i32) {
        PlacementOptions {
            offset: (0, 0),
            anchor,
        }
        .resolve(OWNER, SIZE)
    }

    #[test]
    fn test_all_nine_anchors() {
        assert_eq!(resolve(Anchor::TopLeft), (100, 200));
        assert_eq!(resolve(Anchor::TopCenter), (280, 200));
        assert_eq!(resolve(Anchor::TopRight), (460, 200));
        assert_eq!(resolve(Anchor::MiddleLeft), (100, 335));
        assert_eq!(resolve(Anchor::MiddleCenter), (280, 335));
        assert_eq!(resolve(Anchor::MiddleRight), (460, 335));
        assert_eq!(resolve(Anchor::BottomLeft), (100, 470));
        assert_eq!(resolve(Anchor::BottomCenter), (280, 470));
        assert_eq!(resolve(Anchor::BottomRight), (460, 470));
    }

    #[test]
    fn test_offset_applied_after_anchor() {
        let placement = PlacementOptions {
            offset: (-10, 25),
            anchor: Anchor::TopLeft,
        };
        assert_eq!(placement.resolve(OWNER, SIZE), (90, 225));
    }

    #[test]
    fn test_default_is_centered_no_offset() {
        let placement = PlacementOptions::default();
        assert_eq!(placement.anchor, Anchor::MiddleCenter);
        assert_eq!(placement.resolve(OWNER, SIZE), (280, 335));
    }

    #[test]
    fn test_surface_larger_than_owner() {
        let placement = PlacementOptions::default();
        // Centering still holds when the surface overhangs the owner
        let pos = placement.resolve(OWNER, (600, 400));
        assert_eq!(pos, (100 + (400 - 600) / 2, 200 + (300 - 400) / 2));
    }
}
