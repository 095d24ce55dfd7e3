use astro_assist_core::{PixelSource, SampleRegion, SourceError};
use astro_assist_hfd::{compute_signature, measure, SignatureParams, StarSignature};
use serde::{Deserialize, Serialize};

use crate::checkpoints::{background_regions, end_column, start_region, turn_region};
use crate::{average_signatures, Axis, DriftSession, DriftStep, Hemisphere, OuterStep, WizardState};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Tunables of the drift wizard. Owned by the host and passed to every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftParams {
    /// Signature settings used at every checkpoint.
    pub signature: SignatureParams,
    /// HFD and peak tolerance when comparing a sample against `start`.
    pub match_tolerance: i32,
    /// A step is accepted once its counter exceeds these values.
    pub start_streak: u32,
    pub turn_streak: u32,
    pub end_streak: u32,
    /// Largest `|start.y - end.y|` still reported as aligned.
    pub aligned_limit_px: i32,
    pub hemisphere: Hemisphere,
    /// Show the info screens between legs.
    pub tutorial: bool,
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            signature: SignatureParams::checkpoint(),
            match_tolerance: 30,
            start_streak: 7,
            turn_streak: 2,
            end_streak: 3,
            aligned_limit_px: 5,
            hemisphere: Hemisphere::Northern,
            tutorial: true,
        }
    }
}

/// Lifecycle events for host feedback (beeps, redraws).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DriftEvent {
    StarAcquired { signature: StarSignature },
    TurnAcquired { signature: StarSignature },
    EndAcquired { signature: StarSignature },
    StepAdvanced { step: OuterStep, drift_step: DriftStep },
}

impl DriftEvent {
    /// Number of feedback pulses (beeps) the host should emit.
    pub fn pulses(&self) -> u8 {
        match self {
            DriftEvent::StarAcquired { .. } => 1,
            DriftEvent::TurnAcquired { .. } => 2,
            DriftEvent::EndAcquired { .. } => 3,
            DriftEvent::StepAdvanced { .. } => 0,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DriftError {
    /// The tick was skipped; wizard state and session are untouched.
    #[error(transparent)]
    SourceUnavailable(#[from] SourceError),
}

/// Advance the drift leg by one tick.
///
/// Only the `Azimuth` and `Altitude` outer steps sample anything. Info
/// screens are skipped here when tutorials are off.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(step = ?state.step, drift = ?state.drift_step))
)]
pub fn poll<S: PixelSource + ?Sized>(
    source: &S,
    state: &mut WizardState,
    session: &mut DriftSession,
    params: &DriftParams,
) -> Result<Option<DriftEvent>, DriftError> {
    source.check_ready()?;

    if !params.tutorial && state.step.is_info() {
        state.advance(false);
        session.reset();
        return Ok(Some(DriftEvent::StepAdvanced {
            step: state.step,
            drift_step: state.drift_step,
        }));
    }

    let Some(axis) = state.step.axis() else {
        return Ok(None);
    };

    let event = match state.drift_step {
        DriftStep::WaitStart => wait_start(source, state, session, params),
        DriftStep::WaitTurn => wait_turn(source, state, session, params),
        DriftStep::WaitEnd => wait_end(source, state, session, params, axis),
        DriftStep::ShowResult => None,
    };
    Ok(event)
}

/// Re-sample a checkpoint after acceptance; keep `fallback` if the star
/// vanished in between.
fn freeze<S: PixelSource + ?Sized>(
    source: &S,
    region: &SampleRegion,
    params: &SignatureParams,
    fallback: StarSignature,
) -> StarSignature {
    measure(source, region, params).unwrap_or(fallback)
}

fn sky_background<S: PixelSource + ?Sized>(source: &S, params: &SignatureParams) -> Option<StarSignature> {
    let samples = background_regions().map(|r| compute_signature(source, &r, params));
    average_signatures(&samples)
}

fn wait_start<S: PixelSource + ?Sized>(
    source: &S,
    state: &mut WizardState,
    session: &mut DriftSession,
    params: &DriftParams,
) -> Option<DriftEvent> {
    let region = start_region();
    session.background = sky_background(source, &params.signature);

    // A tick that measured nothing neither extends nor breaks the streak.
    let sig = match measure(source, &region, &params.signature) {
        Ok(sig) => sig,
        Err(e) => {
            log::debug!("start sample skipped: {e}");
            return None;
        }
    };
    let sharp = session.background.is_some_and(|bg| sig.hfd < bg.hfd / 2);
    if !sharp {
        state.hysteresis = 0;
        return None;
    }

    state.hysteresis += 1;
    log::debug!(
        "start candidate hfd={} bg={:?} streak={}",
        sig.hfd,
        session.background.map(|b| b.hfd),
        state.hysteresis
    );
    if state.hysteresis <= params.start_streak {
        return None;
    }

    let frozen = freeze(source, &region, &params.signature, sig);
    session.start = Some(frozen);
    state.hysteresis = 0;
    state.drift_step = DriftStep::WaitTurn;
    log::info!("drift start frozen at ({}, {}) hfd={}", frozen.x, frozen.y, frozen.hfd);
    Some(DriftEvent::StarAcquired { signature: frozen })
}

fn wait_turn<S: PixelSource + ?Sized>(
    source: &S,
    state: &mut WizardState,
    session: &mut DriftSession,
    params: &DriftParams,
) -> Option<DriftEvent> {
    let region = turn_region();
    let start = session.start?;
    let sig = match measure(source, &region, &params.signature) {
        Ok(sig) => sig,
        Err(e) => {
            log::debug!("turn sample skipped: {e}");
            return None;
        }
    };
    if !start.is_similar(&sig, params.match_tolerance) {
        state.hysteresis = 0;
        return None;
    }

    state.hysteresis += 1;
    if state.hysteresis <= params.turn_streak {
        return None;
    }

    let frozen = freeze(source, &region, &params.signature, sig);
    session.turn = Some(frozen);
    state.hysteresis = 0;
    state.drift_step = DriftStep::WaitEnd;
    log::info!("drift turn frozen at ({}, {})", frozen.x, frozen.y);
    Some(DriftEvent::TurnAcquired { signature: frozen })
}

fn wait_end<S: PixelSource + ?Sized>(
    source: &S,
    state: &mut WizardState,
    session: &mut DriftSession,
    params: &DriftParams,
    axis: Axis,
) -> Option<DriftEvent> {
    let start = session.start?;

    // Only the first matching position of the column counts this tick; a
    // tick without any match leaves the counter alone.
    let (region, sig) = end_column().find_map(|region| {
        measure(source, &region, &params.signature)
            .ok()
            .filter(|sig| start.is_similar(sig, params.match_tolerance))
            .map(|sig| (region, sig))
    })?;

    state.hysteresis += 1;
    log::debug!("end candidate at y={} streak={}", region.center.y, state.hysteresis);
    if state.hysteresis <= params.end_streak {
        return None;
    }

    let frozen = freeze(source, &region, &params.signature, sig);
    session.end = Some(frozen);
    state.hysteresis = 0;
    state.drift_step = DriftStep::ShowResult;
    session.result = session.evaluate(axis, params.hemisphere, params.aligned_limit_px);
    if let Some(result) = &session.result {
        log::info!(
            "{axis:?} leg done: diff={} verdict={:?} correction={:?}",
            result.diff,
            result.verdict,
            result.correction
        );
    }
    Some(DriftEvent::EndAcquired { signature: frozen })
}
