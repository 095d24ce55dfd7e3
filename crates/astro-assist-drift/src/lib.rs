//! Drift polar alignment.
//!
//! The wizard has two independent axes of state:
//! - the outer step (camera alignment, azimuth leg, altitude leg, each with
//!   an optional info screen), advanced only by user input;
//! - the inner drift step of the current leg (wait for the star at the
//!   right checkpoint, then at the left one, then anywhere on the right
//!   column, then show the result), advanced by [`poll`] once star
//!   signatures have been stable for enough consecutive ticks.
//!
//! Pipeline per leg:
//! 1. WaitStart: star much sharper than the sky background at the start
//!    checkpoint → freeze `start`.
//! 2. WaitTurn: a star similar to `start` sits at the turn checkpoint →
//!    freeze `turn`.
//! 3. WaitEnd: a star similar to `start` shows up anywhere on the end
//!    column → freeze `end`.
//! 4. ShowResult: the vertical displacement `start.y - end.y` is classified
//!    into a correction for the operator.
//!
//! Nothing here commands a mount; results are for a human to act on.

mod checkpoints;
mod machine;
mod result;
mod session;
mod state;
mod wizard;

pub use checkpoints::{
    background_regions, end_column, start_region, turn_region, CHECKPOINT_RADIUS,
    END_COLUMN_LEN, END_COLUMN_SPACING,
};
pub use machine::{poll, DriftError, DriftEvent, DriftParams};
pub use result::{Correction, DriftResult, PointingError, Verdict};
pub use session::{average_signatures, DriftSession};
pub use state::{Axis, DriftStep, Hemisphere, OuterStep, WizardState};
pub use wizard::{apply_input, PolarAlignWizard, WizardInput};
