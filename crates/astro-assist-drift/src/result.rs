use astro_assist_hfd::StarSignature;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{Axis, Hemisphere};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Within tolerance; at most a small tweak is suggested.
    Aligned,
    Misaligned,
}

/// Where the telescope is pointing relative to the pole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointingError {
    TooFarEast,
    TooFarWest,
    TooHigh,
    TooLow,
}

/// What the operator should do to the mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    MoveEast,
    MoveWest,
    Raise,
    Lower,
}

/// Outcome of one captured drift leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftResult {
    pub axis: Axis,
    pub start: StarSignature,
    pub turn: StarSignature,
    pub end: StarSignature,
    /// `start.y - end.y` in logical pixels.
    pub diff: i32,
    pub abs_diff: i32,
    pub verdict: Verdict,
    /// `None` when the star came back to exactly the same row.
    pub pointing: Option<PointingError>,
    pub correction: Option<Correction>,
}

impl DriftResult {
    pub fn evaluate(
        axis: Axis,
        hemisphere: Hemisphere,
        [start, turn, end]: [StarSignature; 3],
        aligned_limit_px: i32,
    ) -> Self {
        let diff = start.y - end.y;
        let abs_diff = diff.abs();
        let verdict = if abs_diff <= aligned_limit_px {
            Verdict::Aligned
        } else {
            Verdict::Misaligned
        };

        // A star ending above its start row in the northern hemisphere means
        // the mount points west (azimuth leg) or high (altitude leg).
        let drifted_up = match hemisphere {
            Hemisphere::Northern => diff > 0,
            Hemisphere::Southern => diff < 0,
        };
        let (pointing, correction) = match (diff == 0, axis, drifted_up) {
            (true, _, _) => (None, None),
            (false, Axis::Azimuth, true) => (Some(PointingError::TooFarWest), Some(Correction::MoveEast)),
            (false, Axis::Azimuth, false) => (Some(PointingError::TooFarEast), Some(Correction::MoveWest)),
            (false, Axis::Altitude, true) => (Some(PointingError::TooHigh), Some(Correction::Lower)),
            (false, Axis::Altitude, false) => (Some(PointingError::TooLow), Some(Correction::Raise)),
        };

        Self {
            axis,
            start,
            turn,
            end,
            diff,
            abs_diff,
            verdict,
            pointing,
            correction,
        }
    }

    /// The start→turn and turn→end segments of the drift triangle.
    pub fn segments(&self) -> [(Point2<i32>, Point2<i32>); 2] {
        [
            (self.start.position(), self.turn.position()),
            (self.turn.position(), self.end.position()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(x: i32, y: i32) -> StarSignature {
        StarSignature {
            x,
            y,
            hfd: 180,
            maxpixel: 255,
        }
    }

    fn leg(start_y: i32, end_y: i32) -> [StarSignature; 3] {
        [sig(670, start_y), sig(50, 238), sig(670, end_y)]
    }

    #[test]
    fn small_drift_is_aligned() {
        let r = DriftResult::evaluate(Axis::Azimuth, Hemisphere::Northern, leg(240, 236), 5);
        assert_eq!(r.diff, 4);
        assert_eq!(r.verdict, Verdict::Aligned);
        assert_eq!(r.correction, Some(Correction::MoveEast));
    }

    #[test]
    fn boundary_of_five_pixels_is_aligned() {
        let r = DriftResult::evaluate(Axis::Altitude, Hemisphere::Northern, leg(240, 245), 5);
        assert_eq!(r.abs_diff, 5);
        assert_eq!(r.verdict, Verdict::Aligned);
        let r = DriftResult::evaluate(Axis::Altitude, Hemisphere::Northern, leg(240, 246), 5);
        assert_eq!(r.verdict, Verdict::Misaligned);
    }

    #[test]
    fn azimuth_direction_flips_with_hemisphere() {
        let north = DriftResult::evaluate(Axis::Azimuth, Hemisphere::Northern, leg(240, 200), 5);
        assert_eq!(north.pointing, Some(PointingError::TooFarWest));
        assert_eq!(north.correction, Some(Correction::MoveEast));

        let south = DriftResult::evaluate(Axis::Azimuth, Hemisphere::Southern, leg(240, 200), 5);
        assert_eq!(south.pointing, Some(PointingError::TooFarEast));
        assert_eq!(south.correction, Some(Correction::MoveWest));
    }

    #[test]
    fn altitude_direction_follows_sign() {
        let high = DriftResult::evaluate(Axis::Altitude, Hemisphere::Northern, leg(240, 200), 5);
        assert_eq!(high.pointing, Some(PointingError::TooHigh));
        assert_eq!(high.correction, Some(Correction::Lower));

        let low = DriftResult::evaluate(Axis::Altitude, Hemisphere::Northern, leg(240, 280), 5);
        assert_eq!(low.pointing, Some(PointingError::TooLow));
        assert_eq!(low.correction, Some(Correction::Raise));

        let south = DriftResult::evaluate(Axis::Altitude, Hemisphere::Southern, leg(240, 280), 5);
        assert_eq!(south.correction, Some(Correction::Lower));
    }

    #[test]
    fn zero_drift_has_no_direction() {
        let r = DriftResult::evaluate(Axis::Azimuth, Hemisphere::Southern, leg(240, 240), 5);
        assert_eq!(r.verdict, Verdict::Aligned);
        assert_eq!(r.pointing, None);
        assert_eq!(r.correction, None);
    }

    #[test]
    fn segments_link_the_three_points() {
        let r = DriftResult::evaluate(Axis::Azimuth, Hemisphere::Northern, leg(240, 200), 5);
        let [a, b] = r.segments();
        assert_eq!(a, (Point2::new(670, 240), Point2::new(50, 238)));
        assert_eq!(b, (Point2::new(50, 238), Point2::new(670, 200)));
    }
}
