use serde::{Deserialize, Serialize};

use crate::{PixelSource, SourceError};

/// Saturation level of a 14-bit sensor.
pub const DEFAULT_WHITE_LEVEL: i32 = 16383;

fn check_len(width: usize, height: usize, len: usize) -> Result<(), SourceError> {
    if width == 0 || height == 0 || width > i32::MAX as usize || height > i32::MAX as usize {
        return Err(SourceError::InvalidDimensions { width, height });
    }
    let expected = width * height;
    if len != expected {
        return Err(SourceError::InvalidBuffer { expected, got: len });
    }
    Ok(())
}

#[inline]
fn in_bounds(width: usize, height: usize, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> GrayImageView<'a> {
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, SourceError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

impl PixelSource for GrayImageView<'_> {
    #[inline]
    fn intensity(&self, x: i32, y: i32) -> i32 {
        self.data[y as usize * self.width + x as usize] as i32
    }

    #[inline]
    fn is_valid(&self, x: i32, y: i32) -> bool {
        in_bounds(self.width, self.height, x, y)
    }

    fn full_scale(&self) -> i32 {
        255
    }

    fn check_ready(&self) -> Result<(), SourceError> {
        if self.data.is_empty() || self.data.len() < self.width * self.height {
            return Err(SourceError::Unavailable);
        }
        Ok(())
    }
}

/// Owned 8-bit luma frame, mostly used to build synthetic frames.
#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    pub fn put(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }

    /// Paint a filled disk; pixels outside the frame are skipped.
    pub fn fill_disk(&mut self, cx: i32, cy: i32, radius: i32, value: u8) {
        let r2 = radius * radius;
        for y in cy - radius..=cy + radius {
            for x in cx - radius..=cx + radius {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy <= r2 && in_bounds(self.width, self.height, x, y) {
                    self.put(x as usize, y as usize, value);
                }
            }
        }
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Live-preview buffer: packed 16-bit YUV422 words with luma in the high byte.
#[derive(Clone, Copy, Debug)]
pub struct Yuv422View<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u16],
}

impl<'a> Yuv422View<'a> {
    pub fn new(width: usize, height: usize, data: &'a [u16]) -> Result<Self, SourceError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

impl PixelSource for Yuv422View<'_> {
    #[inline]
    fn intensity(&self, x: i32, y: i32) -> i32 {
        let word = self.data[y as usize * self.width + x as usize];
        ((word >> 8) & 0xFF) as i32
    }

    #[inline]
    fn is_valid(&self, x: i32, y: i32) -> bool {
        in_bounds(self.width, self.height, x, y)
    }

    fn full_scale(&self) -> i32 {
        255
    }

    fn check_ready(&self) -> Result<(), SourceError> {
        if self.data.is_empty() || self.data.len() < self.width * self.height {
            return Err(SourceError::Unavailable);
        }
        Ok(())
    }
}

/// Inclusive rectangle of sensor pixels that carry image data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveArea {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl ActiveArea {
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            x1: 0,
            y1: 0,
            x2: width as i32 - 1,
            y2: height as i32 - 1,
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// Raw sensor buffer with black level and active-area bounds.
#[derive(Clone, Copy, Debug)]
pub struct RawView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u16],
    pub black_level: i32,
    pub white_level: i32,
    pub active_area: ActiveArea,
}

impl<'a> RawView<'a> {
    pub fn new(
        width: usize,
        height: usize,
        data: &'a [u16],
        black_level: i32,
    ) -> Result<Self, SourceError> {
        check_len(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
            black_level,
            white_level: DEFAULT_WHITE_LEVEL,
            active_area: ActiveArea::full(width, height),
        })
    }

    pub fn with_white_level(mut self, white_level: i32) -> Self {
        self.white_level = white_level;
        self
    }

    pub fn with_active_area(mut self, area: ActiveArea) -> Result<Self, SourceError> {
        let fits = area.x1 >= 0
            && area.y1 >= 0
            && area.x1 <= area.x2
            && area.y1 <= area.y2
            && (area.x2 as usize) < self.width
            && (area.y2 as usize) < self.height;
        if !fits {
            return Err(SourceError::InvalidActiveArea {
                x1: area.x1,
                y1: area.y1,
                x2: area.x2,
                y2: area.y2,
                width: self.width,
                height: self.height,
            });
        }
        self.active_area = area;
        Ok(self)
    }
}

impl PixelSource for RawView<'_> {
    #[inline]
    fn intensity(&self, x: i32, y: i32) -> i32 {
        let raw = self.data[y as usize * self.width + x as usize] as i32;
        (raw - self.black_level).max(0)
    }

    #[inline]
    fn is_valid(&self, x: i32, y: i32) -> bool {
        self.active_area.contains(x, y)
    }

    fn full_scale(&self) -> i32 {
        (self.white_level - self.black_level).max(1)
    }

    fn check_ready(&self) -> Result<(), SourceError> {
        if self.data.is_empty() || self.data.len() < self.width * self.height {
            return Err(SourceError::Unavailable);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_view_rejects_short_buffer() {
        let data = [0u8; 5];
        let err = GrayImageView::new(2, 3, &data).unwrap_err();
        assert_eq!(err, SourceError::InvalidBuffer { expected: 6, got: 5 });
    }

    #[test]
    fn empty_gray_view_is_not_ready() {
        let view = GrayImageView {
            width: 0,
            height: 0,
            data: &[],
        };
        assert_eq!(view.check_ready(), Err(SourceError::Unavailable));
    }

    #[test]
    fn yuv_luma_comes_from_high_byte() {
        let data = [0x8040u16, 0xFF10, 0x0080, 0x1234];
        let view = Yuv422View::new(2, 2, &data).expect("view");
        assert_eq!(view.intensity(0, 0), 0x80);
        assert_eq!(view.intensity(1, 0), 0xFF);
        assert_eq!(view.intensity(0, 1), 0);
        assert_eq!(view.intensity(1, 1), 0x12);
        assert_eq!(view.full_scale(), 255);
    }

    #[test]
    fn raw_view_subtracts_black_level_and_honours_active_area() {
        let data = vec![2048u16, 3000, 1000, 2100];
        let view = RawView::new(2, 2, &data, 2048)
            .expect("raw")
            .with_active_area(ActiveArea {
                x1: 1,
                y1: 0,
                x2: 1,
                y2: 1,
            })
            .expect("area");
        assert!(!view.is_valid(0, 0));
        assert!(view.is_valid(1, 0));
        assert_eq!(view.intensity(1, 0), 952);
        assert_eq!(view.intensity(0, 1), 0);
        assert_eq!(view.full_scale(), DEFAULT_WHITE_LEVEL - 2048);
    }

    #[test]
    fn raw_view_rejects_area_outside_sensor() {
        let data = vec![0u16; 4];
        let view = RawView::new(2, 2, &data, 0).expect("raw");
        assert!(view
            .with_active_area(ActiveArea {
                x1: 0,
                y1: 0,
                x2: 2,
                y2: 1,
            })
            .is_err());
    }

    #[test]
    fn fill_disk_clips_at_frame_edge() {
        let mut img = GrayImage::filled(8, 8, 10);
        img.fill_disk(0, 0, 2, 255);
        assert_eq!(img.get(0, 0), 255);
        assert_eq!(img.get(2, 0), 255);
        assert_eq!(img.get(2, 2), 10);
    }
}
