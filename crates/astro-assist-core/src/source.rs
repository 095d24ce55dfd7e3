use nalgebra::Point2;

use crate::geometry::{SampleRegion, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::SourceError;

/// Random-access intensity lookup over one frame.
///
/// Implementations are borrowed for the duration of a single sampling call;
/// the engine never keeps a reference across ticks.
pub trait PixelSource {
    /// Intensity at `(x, y)`. Only called for coordinates where
    /// [`PixelSource::is_valid`] returned `true`.
    fn intensity(&self, x: i32, y: i32) -> i32;

    /// Whether `(x, y)` can be read.
    fn is_valid(&self, x: i32, y: i32) -> bool;

    /// Value of a fully saturated pixel, used to turn threshold percentages
    /// into intensity levels.
    fn full_scale(&self) -> i32;

    /// Whether the underlying buffer can be sampled this tick.
    fn check_ready(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

impl<S: PixelSource + ?Sized> PixelSource for &S {
    #[inline]
    fn intensity(&self, x: i32, y: i32) -> i32 {
        (**self).intensity(x, y)
    }

    #[inline]
    fn is_valid(&self, x: i32, y: i32) -> bool {
        (**self).is_valid(x, y)
    }

    fn full_scale(&self) -> i32 {
        (**self).full_scale()
    }

    fn check_ready(&self) -> Result<(), SourceError> {
        (**self).check_ready()
    }
}

/// Addresses an inner source through the 720×480 logical screen space.
///
/// Coordinates are mapped with nearest-neighbour scaling, so a 1440×960
/// buffer answers logical `(10, 10)` with its pixel `(20, 20)`.
#[derive(Clone, Copy, Debug)]
pub struct ScaledSource<S> {
    inner: S,
    width: i32,
    height: i32,
}

impl<S: PixelSource> ScaledSource<S> {
    /// Wrap `inner`, whose addressable extent is `width` × `height` pixels.
    pub fn new(inner: S, width: usize, height: usize) -> Result<Self, SourceError> {
        if width == 0 || height == 0 || width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(SourceError::InvalidDimensions { width, height });
        }
        Ok(Self {
            inner,
            width: width as i32,
            height: height as i32,
        })
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The same window in the inner source's own pixels. The radius grows
    /// with the horizontal scale factor.
    pub fn native_region(&self, region: &SampleRegion) -> SampleRegion {
        let (x, y) = self.map(region.center.x, region.center.y);
        let radius = region.radius.max(0) as i64 * self.width as i64 / LOGICAL_WIDTH as i64;
        SampleRegion::new(x, y, radius.min(i32::MAX as i64) as i32)
    }

    /// Inner-source pixel back to logical screen coordinates.
    pub fn to_logical(&self, p: Point2<i32>) -> Point2<i32> {
        let x = p.x as i64 * LOGICAL_WIDTH as i64 / self.width as i64;
        let y = p.y as i64 * LOGICAL_HEIGHT as i64 / self.height as i64;
        Point2::new(x as i32, y as i32)
    }

    #[inline]
    fn map(&self, x: i32, y: i32) -> (i32, i32) {
        let bx = (x as i64 * self.width as i64 / LOGICAL_WIDTH as i64) as i32;
        let by = (y as i64 * self.height as i64 / LOGICAL_HEIGHT as i64) as i32;
        (bx, by)
    }
}

impl<S: PixelSource> PixelSource for ScaledSource<S> {
    #[inline]
    fn intensity(&self, x: i32, y: i32) -> i32 {
        let (bx, by) = self.map(x, y);
        self.inner.intensity(bx, by)
    }

    #[inline]
    fn is_valid(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= LOGICAL_WIDTH || y >= LOGICAL_HEIGHT {
            return false;
        }
        let (bx, by) = self.map(x, y);
        self.inner.is_valid(bx, by)
    }

    fn full_scale(&self) -> i32 {
        self.inner.full_scale()
    }

    fn check_ready(&self) -> Result<(), SourceError> {
        self.inner.check_ready()
    }
}
