use serde::{Deserialize, Serialize};

/// Outer wizard step. Linear; wraps back to the first step after the last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OuterStep {
    #[default]
    CameraAlignInfo,
    CameraAlign,
    AzimuthInfo,
    Azimuth,
    AltitudeInfo,
    Altitude,
}

impl OuterStep {
    pub const ALL: [OuterStep; 6] = [
        OuterStep::CameraAlignInfo,
        OuterStep::CameraAlign,
        OuterStep::AzimuthInfo,
        OuterStep::Azimuth,
        OuterStep::AltitudeInfo,
        OuterStep::Altitude,
    ];

    pub fn next(self) -> Self {
        match self {
            OuterStep::CameraAlignInfo => OuterStep::CameraAlign,
            OuterStep::CameraAlign => OuterStep::AzimuthInfo,
            OuterStep::AzimuthInfo => OuterStep::Azimuth,
            OuterStep::Azimuth => OuterStep::AltitudeInfo,
            OuterStep::AltitudeInfo => OuterStep::Altitude,
            OuterStep::Altitude => OuterStep::CameraAlignInfo,
        }
    }

    /// Tutorial screens, skipped when tutorials are off.
    pub fn is_info(self) -> bool {
        matches!(
            self,
            OuterStep::CameraAlignInfo | OuterStep::AzimuthInfo | OuterStep::AltitudeInfo
        )
    }

    /// Mount axis measured by this step's drift leg, if it runs one.
    pub fn axis(self) -> Option<Axis> {
        match self {
            OuterStep::Azimuth => Some(Axis::Azimuth),
            OuterStep::Altitude => Some(Axis::Altitude),
            _ => None,
        }
    }
}

/// Inner step of one drift leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStep {
    #[default]
    WaitStart,
    WaitTurn,
    WaitEnd,
    ShowResult,
}

impl DriftStep {
    /// Following step; `ShowResult` is terminal.
    pub fn next(self) -> Self {
        match self {
            DriftStep::WaitStart => DriftStep::WaitTurn,
            DriftStep::WaitTurn => DriftStep::WaitEnd,
            DriftStep::WaitEnd | DriftStep::ShowResult => DriftStep::ShowResult,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Azimuth,
    Altitude,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hemisphere {
    #[default]
    Northern,
    Southern,
}

/// Position of the wizard plus the debounce counter of the current leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: OuterStep,
    pub drift_step: DriftStep,
    /// Consecutive qualifying polls of the current drift step.
    pub hysteresis: u32,
}

impl WizardState {
    /// Starting state; skips the first info screen when tutorials are off.
    pub fn initial(tutorial: bool) -> Self {
        let mut state = Self::default();
        if !tutorial {
            state.step = state.step.next();
        }
        state
    }

    /// Jump to `step` with a fresh drift leg.
    pub fn enter(&mut self, step: OuterStep) {
        self.step = step;
        self.restart_leg();
    }

    /// Back to `WaitStart` without leaving the outer step.
    pub fn restart_leg(&mut self) {
        self.drift_step = DriftStep::WaitStart;
        self.hysteresis = 0;
    }

    /// Advance the outer step, wrapping, skipping info screens unless
    /// `tutorial` is set.
    pub fn advance(&mut self, tutorial: bool) {
        let mut step = self.step.next();
        while !tutorial && step.is_info() {
            step = step.next();
        }
        self.enter(step);
    }
}
