use serde::{Deserialize, Serialize};

/// How far below the peak a pixel may be and still count towards the centroid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarThreshold {
    /// Percentage of the source's full scale (`255 * pct / 100` for 8-bit data).
    FullScalePercent(u8),
    /// Absolute number of intensity levels. The resulting cut-off never
    /// drops below 1, so an all-black region has no star.
    Levels(i32),
}

impl StarThreshold {
    /// Lowest intensity that still counts as a bright pixel.
    pub fn cutoff(self, brightest: i32, full_scale: i32) -> i32 {
        match self {
            StarThreshold::FullScalePercent(pct) => {
                let threshold = full_scale as i64 * pct as i64 / 100;
                (brightest as i64 - threshold).clamp(i32::MIN as i64, i32::MAX as i64) as i32
            }
            StarThreshold::Levels(levels) => brightest.saturating_sub(levels).max(1),
        }
    }
}

/// Parameters of one signature measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParams {
    pub star_threshold: StarThreshold,
    /// Pixels at or below `brightest * background_pct / 100` are treated as
    /// sky and left out of the flux pass.
    pub background_pct: u8,
}

impl Default for SignatureParams {
    fn default() -> Self {
        Self {
            star_threshold: StarThreshold::FullScalePercent(15),
            background_pct: 60,
        }
    }
}

impl SignatureParams {
    /// Build parameters from the two user-facing percentages.
    pub fn from_percentages(star_threshold_pct: u8, background_pct: u8) -> Self {
        Self {
            star_threshold: StarThreshold::FullScalePercent(star_threshold_pct),
            background_pct,
        }
    }

    /// Fixed settings used at drift-alignment checkpoints.
    pub fn checkpoint() -> Self {
        Self {
            star_threshold: StarThreshold::Levels(20),
            background_pct: 60,
        }
    }
}
