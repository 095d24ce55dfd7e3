use astro_assist_hfd::StarSignature;
use serde::{Deserialize, Serialize};

use crate::{Axis, DriftResult, Hemisphere};

/// Signatures frozen during one drift leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftSession {
    pub start: Option<StarSignature>,
    pub turn: Option<StarSignature>,
    pub end: Option<StarSignature>,
    /// Mean of the four sky samples taken while waiting for the start star.
    pub background: Option<StarSignature>,
    pub result: Option<DriftResult>,
}

impl DriftSession {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Classify the leg once all three points are frozen.
    pub fn evaluate(
        &self,
        axis: Axis,
        hemisphere: Hemisphere,
        aligned_limit_px: i32,
    ) -> Option<DriftResult> {
        let points = [self.start?, self.turn?, self.end?];
        Some(DriftResult::evaluate(
            axis,
            hemisphere,
            points,
            aligned_limit_px,
        ))
    }
}

/// Integer mean of HFD and peak; the position is left at the origin.
pub fn average_signatures(samples: &[StarSignature]) -> Option<StarSignature> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as i64;
    let hfd = samples.iter().map(|s| s.hfd as i64).sum::<i64>() / n;
    let maxpixel = samples.iter().map(|s| s.maxpixel as i64).sum::<i64>() / n;
    Some(StarSignature {
        x: 0,
        y: 0,
        hfd: hfd as i32,
        maxpixel: maxpixel as i32,
    })
}
