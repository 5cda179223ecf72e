//! Viewport geometry and viewport-relative coordinates.

use serde::{Deserialize, Serialize};

/// Browser viewport dimensions in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Page scroll offsets at capture time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl ScrollOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A screen position expressed as a fraction of the viewport it was captured
/// in, together with that viewport's dimensions so it can be rescaled later.
///
/// `rel_x`/`rel_y` are meaningless without `viewport_width`/`viewport_height`;
/// never interpret them as absolute pixels. Scroll offsets are carried along
/// for the record but are not applied when resolving the position at replay
/// time — callers that care about scroll are expected to restore it first.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelativePosition {
    pub rel_x: f64,
    pub rel_y: f64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl RelativePosition {
    /// Re-anchor this position to a different viewport, keeping the relative
    /// fractions intact.
    pub fn rescaled_to(&self, viewport: Viewport) -> Self {
        Self {
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            ..*self
        }
    }
}

/// Convert an absolute viewport pixel position to a relative one.
pub fn to_relative(
    abs_x: f64,
    abs_y: f64,
    viewport: Viewport,
    scroll: ScrollOffset,
) -> RelativePosition {
    RelativePosition {
        rel_x: abs_x / viewport.width as f64,
        rel_y: abs_y / viewport.height as f64,
        viewport_width: viewport.width,
        viewport_height: viewport.height,
        scroll_x: scroll.x,
        scroll_y: scroll.y,
    }
}

/// Resolve a stored relative position against the current viewport.
///
/// Under the original viewport this returns the original pixel coordinate up
/// to rounding; under a different viewport it preserves the relative position
/// on screen, not the absolute one.
pub fn to_absolute(pos: &RelativePosition, viewport: Viewport) -> (i64, i64) {
    let x = (pos.rel_x * viewport.width as f64).round() as i64;
    let y = (pos.rel_y * viewport.height as f64).round() as i64;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_within_one_pixel() {
        let viewport = Viewport::new(1440, 900);
        for &(x, y) in &[(0.0, 0.0), (719.0, 451.0), (1439.0, 899.0), (333.0, 87.0)] {
            let rel = to_relative(x, y, viewport, ScrollOffset::default());
            let (rx, ry) = to_absolute(&rel, viewport);
            assert!((rx - x as i64).abs() <= 1, "x drifted: {} -> {}", x, rx);
            assert!((ry - y as i64).abs() <= 1, "y drifted: {} -> {}", y, ry);
        }
    }

    #[test]
    fn center_stays_center_across_viewports() {
        let recorded = Viewport::new(1440, 900);
        let rel = to_relative(720.0, 450.0, recorded, ScrollOffset::default());

        let replay = Viewport::new(1280, 800);
        let (x, y) = to_absolute(&rel.rescaled_to(replay), replay);
        assert_eq!((x, y), (640, 400));
    }

    #[test]
    fn rescaled_keeps_fractions_and_scroll() {
        let rel = to_relative(100.0, 200.0, Viewport::new(1000, 500), ScrollOffset::new(0.0, 42.0));
        let moved = rel.rescaled_to(Viewport::new(2000, 1000));
        assert_eq!(moved.rel_x, rel.rel_x);
        assert_eq!(moved.rel_y, rel.rel_y);
        assert_eq!(moved.scroll_y, 42.0);
        assert_eq!(moved.viewport_width, 2000);
    }
}
