//! Live focus assist: one signature per tick around the autofocus point,
//! HFD smoothed over blocks of [`ROLLING_WINDOW`] samples.

use astro_assist_core::{clamp_to_screen, PixelSource, SampleRegion, ScaledSource, SourceError};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{measure, SignatureError, SignatureParams, StarSignature, MAX_REGION_RADIUS};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Number of samples per averaging block.
pub const ROLLING_WINDOW: u32 = 10;

/// Block average of HFD values.
///
/// Once a block is full the accumulator is cleared on the next push, so the
/// value never mixes samples from two blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingAverage {
    sum: i64,
    count: u32,
}

impl RollingAverage {
    pub fn push(&mut self, value: i32) {
        if self.count == ROLLING_WINDOW {
            self.sum = 0;
            self.count = 0;
        }
        self.count += 1;
        self.sum += value as i64;
    }

    /// Current block mean, `None` before the first sample.
    pub fn value(&self) -> Option<i32> {
        (self.count > 0).then(|| (self.sum / self.count as i64) as i32)
    }

    pub fn sum(&self) -> i64 {
        self.sum
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Which pixel data the focus aid reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    /// 8-bit live-preview luma.
    #[default]
    Preview,
    /// Linear raw sensor data.
    Raw,
}

impl FocusMode {
    /// Sampling radius around the autofocus point.
    pub fn region_radius(self) -> i32 {
        match self {
            FocusMode::Preview => 30,
            FocusMode::Raw => 20,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusParams {
    pub mode: FocusMode,
    pub signature: SignatureParams,
    /// Minimum distance between the sampling center and the screen edge.
    pub edge_margin: i32,
}

impl Default for FocusParams {
    fn default() -> Self {
        Self {
            mode: FocusMode::Preview,
            signature: SignatureParams::default(),
            edge_margin: 50,
        }
    }
}

/// Output of one focus-assist tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusReading {
    /// This tick's signature, or the sentinel when nothing was measured.
    pub signature: StarSignature,
    pub detected: bool,
    /// Block-averaged HFD (×100).
    pub displayed_hfd: Option<i32>,
    pub brightest: i32,
    /// Samples in the current averaging block.
    pub samples: u32,
}

impl FocusReading {
    /// Bar lengths in `0.0..=1.0` for the HFD and peak gauges.
    pub fn gauges(&self, scale: &GaugeScale) -> (f32, f32) {
        let hfd = self
            .displayed_hfd
            .map(|v| gauge_fraction(v, 1, scale.max_hfd))
            .unwrap_or(0.0);
        (hfd, gauge_fraction(self.brightest, 0, scale.max_pixel))
    }
}

/// Full-scale values of the two on-screen gauges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeScale {
    pub max_hfd: i32,
    pub max_pixel: i32,
}

impl GaugeScale {
    /// Gauge range for `mode`; magnified views spread stars over more pixels.
    pub fn for_mode(mode: FocusMode, zoomed: bool, full_scale: i32) -> Self {
        let max_hfd = match (mode, zoomed) {
            (FocusMode::Preview, false) => 800,
            (FocusMode::Preview, true) => 1400,
            (FocusMode::Raw, false) => 1200,
            (FocusMode::Raw, true) => 2000,
        };
        Self {
            max_hfd,
            max_pixel: full_scale,
        }
    }
}

/// Map `value` from `min..=max` into `0.0..=1.0`, clamping at both ends.
pub fn gauge_fraction(value: i32, min: i32, max: i32) -> f32 {
    if max <= min {
        return 0.0;
    }
    let v = value.clamp(min, max);
    (v - min) as f32 / (max - min) as f32
}

/// Focus-assist state owned by the host's focus poller.
#[derive(Clone, Debug, Default)]
pub struct FocusAssist {
    params: FocusParams,
    average: RollingAverage,
}

impl FocusAssist {
    pub fn new(params: FocusParams) -> Self {
        Self {
            params,
            average: RollingAverage::default(),
        }
    }

    pub fn params(&self) -> &FocusParams {
        &self.params
    }

    /// Replace the parameters; the averaging block restarts.
    pub fn set_params(&mut self, params: FocusParams) {
        self.params = params;
        self.average.reset();
    }

    pub fn average(&self) -> &RollingAverage {
        &self.average
    }

    /// Call whenever focus assist is (re)enabled.
    pub fn reset(&mut self) {
        self.average.reset();
    }

    /// Sampling region around the autofocus point, kept away from the edges.
    pub fn region_for(&self, af_point: Point2<i32>) -> SampleRegion {
        let c = clamp_to_screen(af_point, self.params.edge_margin);
        SampleRegion::new(c.x, c.y, self.params.mode.region_radius())
    }

    /// Measure one frame already in logical coordinates. Failed
    /// measurements leave the average untouched.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, source), fields(mode = ?self.params.mode))
    )]
    pub fn poll<S: PixelSource + ?Sized>(
        &mut self,
        source: &S,
        af_point: Point2<i32>,
    ) -> Result<FocusReading, SourceError> {
        source.check_ready()?;
        let region = self.region_for(af_point);
        let result = measure(source, &region, &self.params.signature);
        Ok(self.record(result))
    }

    /// Measure a frame addressed through the logical screen.
    ///
    /// In [`FocusMode::Raw`] the region is scanned at the inner source's
    /// full resolution, so no sensor pixel is skipped by the scaling; the
    /// centroid is reported back in logical coordinates while HFD stays in
    /// sensor pixels. Preview mode samples the logical grid like [`poll`].
    ///
    /// [`poll`]: FocusAssist::poll
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, source), fields(mode = ?self.params.mode))
    )]
    pub fn poll_scaled<S: PixelSource>(
        &mut self,
        source: &ScaledSource<S>,
        af_point: Point2<i32>,
    ) -> Result<FocusReading, SourceError> {
        source.check_ready()?;
        let region = self.region_for(af_point);
        let result = match self.params.mode {
            FocusMode::Preview => measure(source, &region, &self.params.signature),
            FocusMode::Raw => {
                let mut native = source.native_region(&region);
                native.radius = native.radius.min(MAX_REGION_RADIUS);
                measure(source.inner(), &native, &self.params.signature).map(|sig| {
                    let p = source.to_logical(sig.position());
                    StarSignature { x: p.x, y: p.y, ..sig }
                })
            }
        };
        Ok(self.record(result))
    }

    fn record(&mut self, result: Result<StarSignature, SignatureError>) -> FocusReading {
        let (signature, detected) = match result {
            Ok(sig) => {
                self.average.push(sig.hfd);
                (sig, true)
            }
            Err(e) => {
                log::debug!("focus sample skipped: {e}");
                (e.sentinel(), false)
            }
        };
        FocusReading {
            signature,
            detected,
            displayed_hfd: self.average.value(),
            brightest: signature.maxpixel,
            samples: self.average.count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use astro_assist_core::{GrayImage, GrayImageView, RawView, LOGICAL_HEIGHT, LOGICAL_WIDTH};

    fn raw_frame_with_single_hot_star() -> Vec<u16> {
        let (w, black) = (1440usize, 2048u16);
        let mut data = vec![black + 100; w * 960];
        data[481 * w + 721] = black + 12_000;
        data
    }

    #[test]
    fn rolling_average_resets_after_full_block() {
        let mut avg = RollingAverage::default();
        assert_eq!(avg.value(), None);
        for _ in 0..9 {
            avg.push(250);
        }
        assert_eq!(avg.value(), Some(250));
        avg.push(250);
        assert_eq!(avg.count(), ROLLING_WINDOW);
        assert_eq!(avg.value(), Some(250));

        avg.push(100);
        assert_eq!(avg.count(), 1);
        assert_eq!(avg.sum(), 100);
        assert_eq!(avg.value(), Some(100));
    }

    #[test]
    fn rolling_average_is_block_not_sliding() {
        let mut avg = RollingAverage::default();
        for v in 1..=10 {
            avg.push(v * 10);
        }
        assert_eq!(avg.value(), Some(55));
        avg.push(1000);
        avg.push(2000);
        assert_eq!(avg.value(), Some(1500));
    }

    #[test]
    fn region_is_clamped_inside_screen() {
        let focus = FocusAssist::new(FocusParams::default());
        let r = focus.region_for(Point2::new(5, LOGICAL_HEIGHT));
        assert_eq!(r.center, Point2::new(50, LOGICAL_HEIGHT - 50));
        assert_eq!(r.radius, 30);

        let raw = FocusAssist::new(FocusParams {
            mode: FocusMode::Raw,
            ..FocusParams::default()
        });
        assert_eq!(raw.region_for(Point2::new(360, 240)).radius, 20);
    }

    #[test]
    fn poll_smooths_hfd_and_reports_brightest() {
        let mut img = GrayImage::filled(LOGICAL_WIDTH as usize, LOGICAL_HEIGHT as usize, 20);
        img.fill_disk(360, 240, 3, 250);
        let mut focus = FocusAssist::new(FocusParams::default());
        let af = Point2::new(360, 240);

        let first = focus.poll(&img.view(), af).expect("reading");
        assert!(first.detected);
        assert_eq!(first.brightest, 250);
        assert_eq!(first.samples, 1);
        assert_eq!(first.displayed_hfd, Some(first.signature.hfd));

        for _ in 0..4 {
            focus.poll(&img.view(), af).expect("reading");
        }
        let fifth = focus.poll(&img.view(), af).expect("reading");
        assert_eq!(fifth.samples, 6);
        assert_eq!(fifth.displayed_hfd, Some(first.signature.hfd));
    }

    #[test]
    fn black_frame_does_not_feed_average() {
        let img = GrayImage::new(LOGICAL_WIDTH as usize, LOGICAL_HEIGHT as usize);
        let mut focus = FocusAssist::new(FocusParams::default());
        let reading = focus.poll(&img.view(), Point2::new(360, 240)).expect("reading");
        assert!(!reading.detected);
        assert_eq!(reading.displayed_hfd, None);
        assert_eq!(reading.signature, StarSignature::no_star(0));
        assert_eq!(focus.average().count(), 0);
    }

    #[test]
    fn unavailable_source_is_an_error() {
        let view = GrayImageView {
            width: 0,
            height: 0,
            data: &[],
        };
        let mut focus = FocusAssist::new(FocusParams::default());
        assert_eq!(
            focus.poll(&view, Point2::new(360, 240)),
            Err(SourceError::Unavailable)
        );
    }

    #[test]
    fn gauges_clamp_to_unit_range() {
        let scale = GaugeScale::for_mode(FocusMode::Preview, false, 255);
        assert_eq!(scale.max_hfd, 800);
        let reading = FocusReading {
            signature: StarSignature::no_star(255),
            detected: true,
            displayed_hfd: Some(2000),
            brightest: 128,
            samples: 1,
        };
        let (hfd, peak) = reading.gauges(&scale);
        assert_relative_eq!(hfd, 1.0);
        assert_relative_eq!(peak, 128.0 / 255.0);
        assert_relative_eq!(gauge_fraction(-5, 0, 10), 0.0);
        assert_relative_eq!(gauge_fraction(5, 5, 5), 0.0);
        assert_eq!(
            GaugeScale::for_mode(FocusMode::Raw, true, 14_335),
            GaugeScale {
                max_hfd: 2000,
                max_pixel: 14_335
            }
        );
    }

    #[test]
    fn raw_mode_reads_every_sensor_pixel() {
        let data = raw_frame_with_single_hot_star();
        let view = RawView::new(1440, 960, &data, 2048).expect("raw");
        let source = ScaledSource::new(view, 1440, 960).expect("scaled");
        let af = Point2::new(360, 240);

        // Logical sampling lands on even sensor pixels only.
        let mut preview = FocusAssist::new(FocusParams::default());
        let coarse = preview.poll_scaled(&source, af).expect("reading");
        assert_eq!(coarse.brightest, 100);

        let mut raw = FocusAssist::new(FocusParams {
            mode: FocusMode::Raw,
            ..FocusParams::default()
        });
        let reading = raw.poll_scaled(&source, af).expect("reading");
        assert!(reading.detected);
        assert_eq!(reading.brightest, 12_000);
        assert_eq!(reading.signature.position(), Point2::new(360, 240));
        assert_eq!(reading.signature.hfd, 0);
        assert_eq!(raw.average().count(), 1);
    }

    #[test]
    fn raw_mode_on_native_size_matches_plain_poll() {
        let mut img = GrayImage::filled(LOGICAL_WIDTH as usize, LOGICAL_HEIGHT as usize, 20);
        img.fill_disk(200, 300, 3, 250);
        let params = FocusParams {
            mode: FocusMode::Raw,
            ..FocusParams::default()
        };
        let view = img.view();
        let scaled = ScaledSource::new(view, view.width, view.height).expect("scaled");
        let af = Point2::new(200, 300);
        let a = FocusAssist::new(params).poll(&view, af).expect("reading");
        let b = FocusAssist::new(params).poll_scaled(&scaled, af).expect("reading");
        assert_eq!(a, b);
    }
}
