//! Fixed sampling regions in the 720×480 logical screen.
//!
//! The start and end checkpoints sit 50 px in from the right edge, the turn
//! checkpoint 50 px in from the left edge, all at mid-height. The sky
//! background is read at the four thirds-grid intersections.

use astro_assist_core::{SampleRegion, LOGICAL_HEIGHT, LOGICAL_WIDTH};

pub const CHECKPOINT_RADIUS: i32 = 10;
/// Number of candidate regions on the end column.
pub const END_COLUMN_LEN: usize = 23;
/// Vertical distance between two end-column candidates.
pub const END_COLUMN_SPACING: i32 = 20;

const RIGHT_X: i32 = LOGICAL_WIDTH - 40 - CHECKPOINT_RADIUS;
const LEFT_X: i32 = 60 - CHECKPOINT_RADIUS;
const MID_Y: i32 = LOGICAL_HEIGHT / 2;

pub fn start_region() -> SampleRegion {
    SampleRegion::new(RIGHT_X, MID_Y, CHECKPOINT_RADIUS)
}

pub fn turn_region() -> SampleRegion {
    SampleRegion::new(LEFT_X, MID_Y, CHECKPOINT_RADIUS)
}

/// End-column candidates, top to bottom.
pub fn end_column() -> impl Iterator<Item = SampleRegion> {
    (0..END_COLUMN_LEN as i32).map(|i| {
        SampleRegion::new(
            RIGHT_X,
            CHECKPOINT_RADIUS + i * END_COLUMN_SPACING,
            CHECKPOINT_RADIUS,
        )
    })
}

/// Upper-left, upper-right, lower-left, lower-right sky samples.
pub fn background_regions() -> [SampleRegion; 4] {
    let (x1, x2) = (LOGICAL_WIDTH / 3, LOGICAL_WIDTH / 3 * 2);
    let (y1, y2) = (LOGICAL_HEIGHT / 3, LOGICAL_HEIGHT / 3 * 2);
    [
        SampleRegion::new(x1, y1, CHECKPOINT_RADIUS),
        SampleRegion::new(x2, y1, CHECKPOINT_RADIUS),
        SampleRegion::new(x1, y2, CHECKPOINT_RADIUS),
        SampleRegion::new(x2, y2, CHECKPOINT_RADIUS),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoints_sit_at_screen_edges() {
        assert_eq!((start_region().center.x, start_region().center.y), (670, 240));
        assert_eq!((turn_region().center.x, turn_region().center.y), (50, 240));
    }

    #[test]
    fn end_column_spans_screen_height() {
        let ys: Vec<i32> = end_column().map(|r| r.center.y).collect();
        assert_eq!(ys.len(), END_COLUMN_LEN);
        assert_eq!(ys[0], 10);
        assert_eq!(ys[5], 110);
        assert_eq!(*ys.last().unwrap(), 450);
        assert!(end_column().all(|r| r.center.x == 670));
    }

    #[test]
    fn background_regions_on_thirds_grid() {
        let centers: Vec<(i32, i32)> = background_regions()
            .iter()
            .map(|r| (r.center.x, r.center.y))
            .collect();
        assert_eq!(centers, vec![(240, 160), (480, 160), (240, 320), (480, 320)]);
    }
}
