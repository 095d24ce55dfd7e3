/// Errors reported by pixel sources.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("pixel buffer not available")]
    Unavailable,

    #[error("invalid pixel buffer length (expected {expected} samples, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("invalid buffer dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("active area {x1},{y1}..{x2},{y2} does not fit a {width}x{height} sensor")]
    InvalidActiveArea {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        width: usize,
        height: usize,
    },
}
