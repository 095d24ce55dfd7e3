//! Star signatures from a small pixel region.
//!
//! A signature is the centroid, half-flux diameter (HFD, ×100 fixed point)
//! and peak intensity of whatever bright blob sits inside a region. It is
//! computed in three passes over the region's bounding box:
//!
//! 1. peak: the brightest valid pixel,
//! 2. centroid: unweighted mean position of pixels close to the peak,
//! 3. flux: intensity-weighted mean distance of above-noise pixels from
//!    the centroid.
//!
//! [`FocusAssist`] wraps the engine for the live focusing aid and smooths
//! the HFD over blocks of ten samples.

mod focus;
mod params;
mod signature;

pub use focus::{
    gauge_fraction, FocusAssist, FocusMode, FocusParams, FocusReading, GaugeScale,
    RollingAverage, ROLLING_WINDOW,
};
pub use params::{SignatureParams, StarThreshold};
pub use signature::{
    compute_signature, measure, SignatureError, StarSignature, MAX_REGION_RADIUS, NO_STAR_HFD,
};
