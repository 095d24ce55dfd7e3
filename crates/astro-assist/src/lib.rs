//! High-level facade crate for the `astro-assist-*` workspace.
//!
//! This crate provides:
//! - re-exports of the pixel-source, signature and drift crates
//! - the host configuration ([`AssistConfig`]) with JSON persistence
//! - [`AssistDriver`], which keeps focus assist and the drift wizard
//!   mutually exclusive and tells the host when to tick next
//! - (feature `image`) helpers that turn `image::GrayImage` frames into
//!   pixel sources
//!
//! ## Quickstart
//!
//! ```no_run
//! use astro_assist::{AssistConfig, AssistDriver, ViewConditions};
//! use astro_assist::core::GrayImage;
//! use nalgebra::Point2;
//!
//! let mut driver = AssistDriver::new(&AssistConfig::default());
//! driver.enable_alignment();
//!
//! let frame = GrayImage::filled(720, 480, 40);
//! let report = driver.tick(&frame.view(), &ViewConditions::default(), Point2::new(360, 240));
//! println!("next tick in {:?}", report.next_delay);
//! ```
//!
//! ## API map
//! - `astro_assist::core`: pixel sources, logical screen geometry, logger.
//! - `astro_assist::hfd`: star signatures and the focus-assist aid.
//! - `astro_assist::drift`: the drift polar-alignment wizard.
//! - `astro_assist::frame` (feature `image`): adapters from `image` buffers.

pub use astro_assist_core as core;
pub use astro_assist_drift as drift;
pub use astro_assist_hfd as hfd;

pub use astro_assist_core::{PixelSource, SampleRegion};
pub use astro_assist_drift::{DriftEvent, DriftResult, PolarAlignWizard, WizardInput};
pub use astro_assist_hfd::{FocusAssist, FocusReading, StarSignature};

mod config;
mod driver;

pub use config::{AssistConfig, ConfigError};
pub use driver::{
    AssistDriver, BlockReason, Feature, FeatureSwitch, TickReport, ViewConditions,
    ALIGNMENT_CADENCE, FOCUS_CADENCE, IDLE_CADENCE,
};

#[cfg(feature = "image")]
pub mod frame;
