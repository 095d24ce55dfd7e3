//! Polling driver for hosts.
//!
//! The host calls [`AssistDriver::tick`] on its own timer and sleeps for the
//! returned [`TickReport::next_delay`]. Only one feature samples at a time.

use std::time::Duration;

use astro_assist_core::PixelSource;
use astro_assist_drift::{DriftEvent, DriftParams, PolarAlignWizard, WizardInput};
use astro_assist_hfd::{FocusAssist, FocusReading};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::AssistConfig;

#[cfg(feature = "tracing")]
use tracing::instrument;

pub const FOCUS_CADENCE: Duration = Duration::from_millis(100);
pub const ALIGNMENT_CADENCE: Duration = Duration::from_millis(80);
/// Used while disabled or while the view cannot be sampled.
pub const IDLE_CADENCE: Duration = Duration::from_millis(300);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Focus,
    Alignment,
}

/// At most one feature enabled; enabling one disables the other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSwitch {
    active: Option<Feature>,
}

impl FeatureSwitch {
    pub fn active(&self) -> Option<Feature> {
        self.active
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.active == Some(feature)
    }

    /// Turn `feature` on or off. Returns the feature that was switched off
    /// as a side effect, if any.
    pub fn set(&mut self, feature: Feature, enabled: bool) -> Option<Feature> {
        let previous = self.active;
        if enabled {
            self.active = Some(feature);
            previous.filter(|p| *p != feature)
        } else {
            if previous == Some(feature) {
                self.active = None;
            }
            None
        }
    }
}

/// State of the host's live view, reported each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConditions {
    pub live_view: bool,
    pub menu_shown: bool,
    pub overlays_enabled: bool,
    pub zoom_10x: bool,
    pub digital_zoom_overlay: bool,
    /// False while the preview luma is still being equalized.
    pub luma_accurate: bool,
}

impl Default for ViewConditions {
    fn default() -> Self {
        Self {
            live_view: true,
            menu_shown: false,
            overlays_enabled: true,
            zoom_10x: false,
            digital_zoom_overlay: false,
            luma_accurate: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    NotLiveView,
    MenuShown,
    OverlaysDisabled,
    Zoomed,
    DigitalZoomOverlay,
    LumaInaccurate,
    SourceUnavailable,
}

impl ViewConditions {
    /// First condition that forbids sampling, if any.
    pub fn blocked_by(&self) -> Option<BlockReason> {
        if !self.live_view {
            Some(BlockReason::NotLiveView)
        } else if self.menu_shown {
            Some(BlockReason::MenuShown)
        } else if !self.overlays_enabled {
            Some(BlockReason::OverlaysDisabled)
        } else if self.zoom_10x {
            Some(BlockReason::Zoomed)
        } else if self.digital_zoom_overlay {
            Some(BlockReason::DigitalZoomOverlay)
        } else if !self.luma_accurate {
            Some(BlockReason::LumaInaccurate)
        } else {
            None
        }
    }
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TickReport {
    pub feature: Option<Feature>,
    pub focus: Option<FocusReading>,
    pub drift_event: Option<DriftEvent>,
    pub blocked: Option<BlockReason>,
    #[serde(with = "millis")]
    pub next_delay: Duration,
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

impl TickReport {
    fn idle(feature: Option<Feature>, blocked: Option<BlockReason>) -> Self {
        Self {
            feature,
            focus: None,
            drift_event: None,
            blocked,
            next_delay: IDLE_CADENCE,
        }
    }
}

/// Owns both features and runs whichever one is enabled.
#[derive(Clone, Debug, Default)]
pub struct AssistDriver {
    switch: FeatureSwitch,
    focus: FocusAssist,
    wizard: PolarAlignWizard,
}

impl AssistDriver {
    pub fn new(config: &AssistConfig) -> Self {
        let mut driver = Self {
            switch: FeatureSwitch::default(),
            focus: FocusAssist::new(config.focus_params()),
            wizard: PolarAlignWizard::new(config.drift_params()),
        };
        if config.alignment_enabled {
            driver.enable_alignment();
        } else if config.focus_enabled {
            driver.enable_focus();
        }
        driver
    }

    /// Push new settings. Focus smoothing restarts; the wizard restarts only
    /// if its parameters changed.
    pub fn apply_config(&mut self, config: &AssistConfig) {
        self.focus.set_params(config.focus_params());
        let drift: DriftParams = config.drift_params();
        if *self.wizard.params() != drift {
            self.wizard = PolarAlignWizard::new(drift);
        }
    }

    pub fn active(&self) -> Option<Feature> {
        self.switch.active()
    }

    pub fn focus(&self) -> &FocusAssist {
        &self.focus
    }

    pub fn wizard(&self) -> &PolarAlignWizard {
        &self.wizard
    }

    pub fn enable_focus(&mut self) {
        if self.switch.set(Feature::Focus, true) == Some(Feature::Alignment) {
            self.wizard.interrupt_leg();
        }
        self.focus.reset();
        log::info!("focus assist enabled");
    }

    /// Switch to drift alignment. Re-enabling while already active keeps
    /// the leg in progress.
    pub fn enable_alignment(&mut self) {
        if self.switch.is_enabled(Feature::Alignment) {
            return;
        }
        self.switch.set(Feature::Alignment, true);
        self.wizard.interrupt_leg();
        log::info!("drift alignment enabled");
    }

    pub fn disable(&mut self, feature: Feature) {
        self.switch.set(feature, false);
        if feature == Feature::Alignment {
            self.wizard.interrupt_leg();
        }
    }

    /// Forward operator input to the wizard, when alignment is active.
    pub fn input(&mut self, input: WizardInput) -> Option<DriftEvent> {
        if !self.switch.is_enabled(Feature::Alignment) {
            return None;
        }
        self.wizard.input(input)
    }

    /// Run the active feature on one frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, source, view), fields(feature = ?self.switch.active()))
    )]
    pub fn tick<S: PixelSource + ?Sized>(
        &mut self,
        source: &S,
        view: &ViewConditions,
        af_point: Point2<i32>,
    ) -> TickReport {
        let Some(feature) = self.switch.active() else {
            return TickReport::idle(None, None);
        };

        if let Some(reason) = view.blocked_by() {
            log::debug!("{feature:?} tick blocked: {reason:?}");
            if feature == Feature::Alignment {
                self.wizard.interrupt_leg();
            }
            return TickReport::idle(Some(feature), Some(reason));
        }

        match feature {
            Feature::Focus => match self.focus.poll(source, af_point) {
                Ok(reading) => TickReport {
                    feature: Some(feature),
                    focus: Some(reading),
                    drift_event: None,
                    blocked: None,
                    next_delay: FOCUS_CADENCE,
                },
                Err(e) => {
                    log::warn!("focus tick skipped: {e}");
                    TickReport::idle(Some(feature), Some(BlockReason::SourceUnavailable))
                }
            },
            Feature::Alignment => match self.wizard.poll(source) {
                Ok(drift_event) => TickReport {
                    feature: Some(feature),
                    focus: None,
                    drift_event,
                    blocked: None,
                    next_delay: ALIGNMENT_CADENCE,
                },
                Err(e) => {
                    log::warn!("alignment tick skipped: {e}");
                    TickReport::idle(Some(feature), Some(BlockReason::SourceUnavailable))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astro_assist_core::{GrayImage, GrayImageView, LOGICAL_HEIGHT, LOGICAL_WIDTH};
    use astro_assist_drift::{DriftStep, OuterStep};

    fn star_frame(x: i32, y: i32) -> GrayImage {
        let mut img = GrayImage::filled(LOGICAL_WIDTH as usize, LOGICAL_HEIGHT as usize, 50);
        img.fill_disk(x, y, 3, 255);
        img
    }

    fn alignment_driver() -> AssistDriver {
        let cfg = AssistConfig {
            alignment_enabled: true,
            tutorial: false,
            ..AssistConfig::default()
        };
        let mut driver = AssistDriver::new(&cfg);
        driver.input(WizardInput::Confirm);
        assert_eq!(driver.wizard().state().step, OuterStep::Azimuth);
        driver
    }

    #[test]
    fn switch_is_mutually_exclusive() {
        let mut switch = FeatureSwitch::default();
        assert_eq!(switch.set(Feature::Focus, true), None);
        assert_eq!(switch.set(Feature::Alignment, true), Some(Feature::Focus));
        assert!(!switch.is_enabled(Feature::Focus));
        assert_eq!(switch.set(Feature::Focus, true), Some(Feature::Alignment));
        assert!(!switch.is_enabled(Feature::Alignment));
        // Disabling the inactive feature leaves the active one alone.
        switch.set(Feature::Alignment, false);
        assert_eq!(switch.active(), Some(Feature::Focus));
        switch.set(Feature::Focus, false);
        assert_eq!(switch.active(), None);
    }

    #[test]
    fn idle_driver_ticks_slowly() {
        let mut driver = AssistDriver::new(&AssistConfig::default());
        let frame = star_frame(360, 240);
        let report = driver.tick(&frame.view(), &ViewConditions::default(), Point2::new(360, 240));
        assert_eq!(report.feature, None);
        assert_eq!(report.next_delay, IDLE_CADENCE);
    }

    #[test]
    fn focus_tick_reports_reading() {
        let mut driver = AssistDriver::new(&AssistConfig {
            focus_enabled: true,
            ..AssistConfig::default()
        });
        let frame = star_frame(360, 240);
        let report = driver.tick(&frame.view(), &ViewConditions::default(), Point2::new(362, 241));
        assert_eq!(report.next_delay, FOCUS_CADENCE);
        let reading = report.focus.expect("reading");
        assert!(reading.detected);
        assert_eq!(reading.brightest, 255);
        assert_eq!(reading.samples, 1);
    }

    #[test]
    fn blocked_view_uses_idle_cadence() {
        let mut driver = AssistDriver::new(&AssistConfig {
            focus_enabled: true,
            ..AssistConfig::default()
        });
        let frame = star_frame(360, 240);
        let view = ViewConditions {
            zoom_10x: true,
            ..ViewConditions::default()
        };
        let report = driver.tick(&frame.view(), &view, Point2::new(360, 240));
        assert_eq!(report.blocked, Some(BlockReason::Zoomed));
        assert_eq!(report.next_delay, IDLE_CADENCE);
        assert_eq!(driver.focus().average().count(), 0);
    }

    #[test]
    fn alignment_ticks_at_alignment_cadence() {
        let mut driver = alignment_driver();
        let frame = star_frame(670, 240);
        let report = driver.tick(&frame.view(), &ViewConditions::default(), Point2::new(0, 0));
        assert_eq!(report.next_delay, ALIGNMENT_CADENCE);
        assert_eq!(driver.wizard().state().hysteresis, 1);
    }

    #[test]
    fn blocking_mid_leg_restarts_it() {
        let mut driver = alignment_driver();
        let frame = star_frame(670, 240);
        let mut acquired = false;
        for _ in 0..8 {
            let report = driver.tick(&frame.view(), &ViewConditions::default(), Point2::new(0, 0));
            acquired |= matches!(report.drift_event, Some(DriftEvent::StarAcquired { .. }));
        }
        assert!(acquired);
        assert_eq!(driver.wizard().state().drift_step, DriftStep::WaitTurn);

        let menu = ViewConditions {
            menu_shown: true,
            ..ViewConditions::default()
        };
        let report = driver.tick(&frame.view(), &menu, Point2::new(0, 0));
        assert_eq!(report.blocked, Some(BlockReason::MenuShown));
        assert_eq!(driver.wizard().state().drift_step, DriftStep::WaitStart);
        assert_eq!(driver.wizard().session().start, None);
    }

    #[test]
    fn unavailable_source_is_a_skipped_tick() {
        let mut driver = alignment_driver();
        let missing = GrayImageView {
            width: 720,
            height: 480,
            data: &[],
        };
        let report = driver.tick(&missing, &ViewConditions::default(), Point2::new(0, 0));
        assert_eq!(report.blocked, Some(BlockReason::SourceUnavailable));
        assert_eq!(report.next_delay, IDLE_CADENCE);
        assert_eq!(driver.wizard().state().step, OuterStep::Azimuth);
    }

    #[test]
    fn re_enabling_alignment_keeps_the_streak() {
        let mut driver = alignment_driver();
        let frame = star_frame(670, 240);
        driver.tick(&frame.view(), &ViewConditions::default(), Point2::new(0, 0));
        assert_eq!(driver.wizard().state().hysteresis, 1);

        driver.enable_alignment();
        assert_eq!(driver.active(), Some(Feature::Alignment));
        assert_eq!(driver.wizard().state().hysteresis, 1);
    }

    #[test]
    fn switching_to_focus_drops_partial_leg() {
        let mut driver = alignment_driver();
        let frame = star_frame(670, 240);
        driver.tick(&frame.view(), &ViewConditions::default(), Point2::new(0, 0));
        driver.enable_focus();
        assert_eq!(driver.active(), Some(Feature::Focus));
        assert_eq!(driver.wizard().state().hysteresis, 0);
        assert_eq!(driver.input(WizardInput::Confirm), None);
    }

    #[test]
    fn report_serializes_delay_in_millis() {
        let report = TickReport::idle(Some(Feature::Focus), Some(BlockReason::MenuShown));
        let json = serde_json::to_value(report).expect("json");
        assert_eq!(json["next_delay"], 300);
        assert_eq!(json["blocked"], "menu_shown");
    }
}
