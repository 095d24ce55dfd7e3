//! Adapters from `image` buffers to pixel sources.

use std::path::Path;

use astro_assist_core::{GrayImageView, ScaledSource, SourceError, LOGICAL_HEIGHT, LOGICAL_WIDTH};

/// Errors produced while loading frames from disk.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error(transparent)]
    Image(#[from] ::image::ImageError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Convert an `image::GrayImage` into the lightweight core view type.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Decode any supported image file into 8-bit luma.
pub fn load_luma(path: impl AsRef<Path>) -> Result<::image::GrayImage, FrameError> {
    let path = path.as_ref();
    let img = ::image::open(path)?.to_luma8();
    log::debug!(
        "loaded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img)
}

/// View a frame of any size through the 720×480 logical screen.
pub fn logical_source(
    img: &::image::GrayImage,
) -> Result<ScaledSource<GrayImageView<'_>>, FrameError> {
    let view = gray_view(img);
    Ok(ScaledSource::new(view, view.width, view.height)?)
}

/// True when the frame is already in logical coordinates.
pub fn is_logical_size(img: &::image::GrayImage) -> bool {
    img.width() as i32 == LOGICAL_WIDTH && img.height() as i32 == LOGICAL_HEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use astro_assist_core::PixelSource;

    #[test]
    fn logical_source_scales_double_size_frame() {
        let mut img = ::image::GrayImage::new(1440, 960);
        img.put_pixel(1340, 480, ::image::Luma([200]));
        assert!(!is_logical_size(&img));
        let src = logical_source(&img).expect("source");
        assert_eq!(src.intensity(670, 240), 200);
        assert!(src.is_valid(719, 479));
        assert!(!src.is_valid(720, 0));
    }

    #[test]
    fn empty_frame_is_rejected() {
        let img = ::image::GrayImage::new(0, 0);
        assert!(matches!(
            logical_source(&img),
            Err(FrameError::Source(SourceError::InvalidDimensions { .. }))
        ));
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let err = load_luma("/nonexistent/frame.png").unwrap_err();
        assert!(matches!(err, FrameError::Image(_)));
    }
}
