use astro_assist_core::PixelSource;
use serde::{Deserialize, Serialize};

use crate::machine::{poll, DriftError, DriftEvent, DriftParams};
use crate::{DriftSession, DriftStep, OuterStep, WizardState};

/// Operator input forwarded by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardInput {
    /// Acknowledge the current screen.
    Confirm,
    /// Throw away the current leg.
    Restart,
    /// Skip to the next outer step.
    NextOuterStep,
    /// Go back and redo the azimuth leg.
    RealignAzimuth,
}

fn advanced(state: &WizardState) -> Option<DriftEvent> {
    Some(DriftEvent::StepAdvanced {
        step: state.step,
        drift_step: state.drift_step,
    })
}

/// Apply one operator input to the wizard.
pub fn apply_input(
    input: WizardInput,
    state: &mut WizardState,
    session: &mut DriftSession,
    params: &DriftParams,
) -> Option<DriftEvent> {
    log::debug!("input {input:?} at {:?}/{:?}", state.step, state.drift_step);
    match input {
        WizardInput::Confirm => match (state.step.axis(), state.drift_step) {
            (Some(axis), step) if step < DriftStep::ShowResult => {
                state.drift_step = step.next();
                state.hysteresis = 0;
                if state.drift_step == DriftStep::ShowResult {
                    session.result =
                        session.evaluate(axis, params.hemisphere, params.aligned_limit_px);
                }
                advanced(state)
            }
            _ => {
                session.reset();
                state.advance(params.tutorial);
                advanced(state)
            }
        },
        WizardInput::Restart => {
            session.reset();
            if state.step.axis().is_some() {
                state.restart_leg();
            } else {
                state.enter(OuterStep::Azimuth);
            }
            advanced(state)
        }
        WizardInput::NextOuterStep => {
            session.reset();
            state.advance(params.tutorial);
            advanced(state)
        }
        WizardInput::RealignAzimuth => {
            session.reset();
            state.enter(if params.tutorial {
                OuterStep::AzimuthInfo
            } else {
                OuterStep::Azimuth
            });
            advanced(state)
        }
    }
}

/// Owns the wizard state, the session and the parameters of one polar
/// alignment run.
#[derive(Clone, Debug, Default)]
pub struct PolarAlignWizard {
    params: DriftParams,
    state: WizardState,
    session: DriftSession,
}

impl PolarAlignWizard {
    pub fn new(params: DriftParams) -> Self {
        Self {
            state: WizardState::initial(params.tutorial),
            session: DriftSession::default(),
            params,
        }
    }

    pub fn params(&self) -> &DriftParams {
        &self.params
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn session(&self) -> &DriftSession {
        &self.session
    }

    /// Run one tick against the current frame.
    pub fn poll<S: PixelSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<Option<DriftEvent>, DriftError> {
        poll(source, &mut self.state, &mut self.session, &self.params)
    }

    pub fn input(&mut self, input: WizardInput) -> Option<DriftEvent> {
        apply_input(input, &mut self.state, &mut self.session, &self.params)
    }

    /// Drop a half-captured leg after sampling was suspended. A finished
    /// result is kept on screen.
    pub fn interrupt_leg(&mut self) {
        let mid_leg = self.state.step.axis().is_some()
            && self.state.drift_step != DriftStep::ShowResult
            && (self.state.drift_step != DriftStep::WaitStart || self.state.hysteresis > 0);
        if mid_leg {
            log::info!("drift leg interrupted at {:?}", self.state.drift_step);
            self.state.restart_leg();
            self.session.reset();
        }
    }

    /// Back to the first step with an empty session.
    pub fn reset(&mut self) {
        self.state = WizardState::initial(self.params.tutorial);
        self.session.reset();
    }
}
