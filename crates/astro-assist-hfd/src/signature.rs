use astro_assist_core::{PixelSource, SampleRegion};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::SignatureParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// HFD reported by the "no star" sentinel signature.
pub const NO_STAR_HFD: i32 = 1099;

/// Largest region radius the engine accepts.
pub const MAX_REGION_RADIUS: i32 = 64;

/// Compact description of the brightest blob in a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StarSignature {
    /// Centroid, in the source's coordinate space.
    pub x: i32,
    pub y: i32,
    /// Half-flux diameter in pixels, scaled by 100.
    pub hfd: i32,
    /// Peak intensity inside the region.
    pub maxpixel: i32,
}

impl StarSignature {
    /// Sentinel returned when a region holds no usable star.
    pub fn no_star(maxpixel: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            hfd: NO_STAR_HFD,
            maxpixel,
        }
    }

    pub fn position(&self) -> Point2<i32> {
        Point2::new(self.x, self.y)
    }

    /// HFD in pixels.
    pub fn hfd_px(&self) -> f32 {
        self.hfd as f32 / 100.0
    }

    /// True for the sentinel produced by [`StarSignature::no_star`].
    pub fn is_no_star(&self) -> bool {
        self.hfd == NO_STAR_HFD && self.x == 0 && self.y == 0
    }

    /// Two signatures are similar when both HFD and peak differ by less
    /// than `tolerance`. A sentinel is never similar to anything.
    pub fn is_similar(&self, other: &StarSignature, tolerance: i32) -> bool {
        if self.is_no_star() || other.is_no_star() {
            return false;
        }
        self.hfd.abs_diff(other.hfd) < tolerance.max(0) as u32
            && self.maxpixel.abs_diff(other.maxpixel) < tolerance.max(0) as u32
    }
}

/// Why a region did not yield a star.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    #[error("no pixel reached the star threshold (brightest={brightest})")]
    NoStarDetected { brightest: i32 },

    #[error("no pixel above the background level (brightest={brightest})")]
    DegenerateFlux { brightest: i32 },

    #[error("region lies wholly outside the readable area")]
    OutsideSource,

    #[error("region radius {radius} outside 0..={max}")]
    RegionTooLarge { radius: i32, max: i32 },
}

impl SignatureError {
    /// Sentinel signature standing in for this failure.
    pub fn sentinel(&self) -> StarSignature {
        match *self {
            SignatureError::NoStarDetected { brightest }
            | SignatureError::DegenerateFlux { brightest } => StarSignature::no_star(brightest),
            SignatureError::OutsideSource | SignatureError::RegionTooLarge { .. } => {
                StarSignature::no_star(0)
            }
        }
    }
}

#[derive(Clone, Copy)]
struct RegionPixel {
    x: i32,
    y: i32,
    value: i32,
}

/// Measure the star signature of `region`.
///
/// Pixels the source reports as invalid are skipped in every pass.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "trace",
        skip(source, params),
        fields(x = region.center.x, y = region.center.y, r = region.radius)
    )
)]
pub fn measure<S: PixelSource + ?Sized>(
    source: &S,
    region: &SampleRegion,
    params: &SignatureParams,
) -> Result<StarSignature, SignatureError> {
    if region.radius < 0 || region.radius > MAX_REGION_RADIUS {
        return Err(SignatureError::RegionTooLarge {
            radius: region.radius,
            max: MAX_REGION_RADIUS,
        });
    }

    // Peak pass; keeps the readable pixels for the next two passes.
    let side = region.side();
    let mut pixels = Vec::with_capacity(side * side);
    let mut brightest = i32::MIN;
    for (x, y) in region.pixels() {
        if !source.is_valid(x, y) {
            continue;
        }
        let value = source.intensity(x, y);
        brightest = brightest.max(value);
        pixels.push(RegionPixel { x, y, value });
    }
    if pixels.is_empty() {
        return Err(SignatureError::OutsideSource);
    }

    // Centroid pass.
    let cutoff = params
        .star_threshold
        .cutoff(brightest, source.full_scale());
    let (mut sum_x, mut sum_y, mut count) = (0i64, 0i64, 0i64);
    for p in pixels.iter().filter(|p| p.value >= cutoff) {
        sum_x += p.x as i64;
        sum_y += p.y as i64;
        count += 1;
    }
    if count == 0 {
        return Err(SignatureError::NoStarDetected { brightest });
    }
    let cx = (sum_x / count) as i32;
    let cy = (sum_y / count) as i32;

    // Flux pass.
    let noise_floor = brightest as i64 * params.background_pct as i64 / 100;
    let mut sum_flux = 0u64;
    let mut sum_flux_distance = 0u64;
    for p in pixels.iter().filter(|p| p.value as i64 > noise_floor) {
        let dx = (p.x - cx) as f64;
        let dy = (p.y - cy) as f64;
        let distance = (dx * dx + dy * dy).sqrt() as u64;
        let flux = p.value.max(0) as u64;
        sum_flux += flux;
        sum_flux_distance += flux * distance;
    }
    if sum_flux == 0 {
        return Err(SignatureError::DegenerateFlux { brightest });
    }

    Ok(StarSignature {
        x: cx,
        y: cy,
        hfd: (sum_flux_distance * 100 / sum_flux) as i32,
        maxpixel: brightest,
    })
}

/// Like [`measure`], but reports failures as the sentinel signature.
pub fn compute_signature<S: PixelSource + ?Sized>(
    source: &S,
    region: &SampleRegion,
    params: &SignatureParams,
) -> StarSignature {
    measure(source, region, params).unwrap_or_else(|e| {
        log::debug!("no star at {:?}: {e}", region.center);
        e.sentinel()
    })
}
