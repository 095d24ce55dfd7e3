use std::fs;
use std::path::Path;

use astro_assist_drift::{DriftParams, Hemisphere};
use astro_assist_hfd::{FocusMode, FocusParams, SignatureParams};
use serde::{Deserialize, Serialize};

const STAR_THRESHOLD_RANGE: (u8, u8) = (1, 15);
const BACKGROUND_RANGE: (u8, u8) = (1, 70);

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Host-owned settings. Missing JSON fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
    pub focus_enabled: bool,
    pub alignment_enabled: bool,
    pub focus_mode: FocusMode,
    /// Bright-pixel band below the peak, in percent of full scale (1..=15).
    pub star_threshold_pct: u8,
    /// Noise floor in percent of the peak (1..=70).
    pub background_pct: u8,
    pub hemisphere: Hemisphere,
    /// Show the info screens of the drift wizard.
    pub tutorial: bool,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            focus_enabled: false,
            alignment_enabled: false,
            focus_mode: FocusMode::Preview,
            star_threshold_pct: 15,
            background_pct: 60,
            hemisphere: Hemisphere::Northern,
            tutorial: true,
        }
    }
}

fn check_range(field: &'static str, value: u8, (min, max): (u8, u8)) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value: value as i64,
            min: min as i64,
            max: max as i64,
        });
    }
    Ok(())
}

/// Step `value` by `delta`; past the top it restarts at the bottom, at or
/// below zero it restarts at the top.
fn wrap_step(value: u8, delta: i32, (min, max): (u8, u8)) -> u8 {
    let next = value as i32 + delta;
    if next > max as i32 {
        min
    } else if next <= 0 {
        max
    } else {
        next as u8
    }
}

impl AssistConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = Self::from_json_str(&fs::read_to_string(path)?)?;
        log::debug!("loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "star_threshold_pct",
            self.star_threshold_pct,
            STAR_THRESHOLD_RANGE,
        )?;
        check_range("background_pct", self.background_pct, BACKGROUND_RANGE)?;
        if self.focus_enabled && self.alignment_enabled {
            log::warn!("focus assist and alignment both enabled; alignment wins");
        }
        Ok(())
    }

    pub fn adjust_star_threshold(&mut self, delta: i32) -> u8 {
        self.star_threshold_pct = wrap_step(self.star_threshold_pct, delta, STAR_THRESHOLD_RANGE);
        self.star_threshold_pct
    }

    pub fn adjust_background_level(&mut self, delta: i32) -> u8 {
        self.background_pct = wrap_step(self.background_pct, delta, BACKGROUND_RANGE);
        self.background_pct
    }

    pub fn signature_params(&self) -> SignatureParams {
        SignatureParams::from_percentages(self.star_threshold_pct, self.background_pct)
    }

    pub fn focus_params(&self) -> FocusParams {
        FocusParams {
            mode: self.focus_mode,
            signature: self.signature_params(),
            ..FocusParams::default()
        }
    }

    /// Drift checkpoints keep their fixed thresholds; only the hemisphere
    /// and tutorial flag come from the user.
    pub fn drift_params(&self) -> DriftParams {
        DriftParams {
            hemisphere: self.hemisphere,
            tutorial: self.tutorial,
            ..DriftParams::default()
        }
    }
}
