//! Core types shared by the astro-assist crates.
//!
//! This crate is intentionally small. It knows how to read intensities out
//! of the buffers a camera host hands us (8-bit luma, packed YUV422 preview
//! words, raw sensor data) and how to address them in the fixed 720×480
//! logical screen space. It does *not* know anything about stars.

mod error;
mod geometry;
mod image;
mod logger;
mod source;

pub use error::SourceError;
pub use geometry::{clamp_to_screen, SampleRegion, LOGICAL_HEIGHT, LOGICAL_WIDTH};
pub use image::{ActiveArea, GrayImage, GrayImageView, RawView, Yuv422View, DEFAULT_WHITE_LEVEL};
pub use source::{PixelSource, ScaledSource};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_env, parse_level, LOG_ENV};
