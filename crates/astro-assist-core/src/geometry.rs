use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Width of the logical screen space every region is expressed in.
pub const LOGICAL_WIDTH: i32 = 720;
/// Height of the logical screen space every region is expressed in.
pub const LOGICAL_HEIGHT: i32 = 480;

/// Square sampling window around `center`, `2 * radius + 1` pixels on a side.
///
/// The region is called "circular" by the UI (it is drawn as a circle) but
/// every pass of the signature engine walks the full bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRegion {
    pub center: Point2<i32>,
    pub radius: i32,
}

impl SampleRegion {
    pub fn new(x: i32, y: i32, radius: i32) -> Self {
        Self {
            center: Point2::new(x, y),
            radius,
        }
    }

    /// Side length of the bounding box in pixels.
    pub fn side(&self) -> usize {
        self.radius.max(0) as usize * 2 + 1
    }

    /// Inclusive bounds `(x0, y0, x1, y1)` of the bounding box.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        let r = self.radius.max(0);
        (
            self.center.x.saturating_sub(r),
            self.center.y.saturating_sub(r),
            self.center.x.saturating_add(r),
            self.center.y.saturating_add(r),
        )
    }

    /// Iterate the bounding box row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x0, y0, x1, y1) = self.bounds();
        (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| (x, y)))
    }
}

/// Keep `p` at least `margin` pixels inside the logical screen.
pub fn clamp_to_screen(p: Point2<i32>, margin: i32) -> Point2<i32> {
    Point2::new(
        p.x.clamp(margin, LOGICAL_WIDTH - margin),
        p.y.clamp(margin, LOGICAL_HEIGHT - margin),
    )
}
