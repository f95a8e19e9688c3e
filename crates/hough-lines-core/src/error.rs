/// Errors returned while setting up or driving a Hough transform.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HoughError {
    #[error("angle precision must be a positive number of subdivisions per degree (got {precision})")]
    InvalidPrecision { precision: u32 },
    #[error("vote threshold must be at least 1")]
    InvalidThreshold,
    #[error("{name} must be a finite, non-negative value (got {value})")]
    InvalidTolerance { name: &'static str, value: f64 },
    #[error("invalid image size (width={width}, height={height})")]
    InvalidImageSize { width: u32, height: u32 },
    #[error("point {index} at ({x}, {y}) lies outside the distance axis (max distance {max_distance})")]
    PointOutOfRange {
        index: usize,
        x: i32,
        y: i32,
        max_distance: u32,
    },
    #[error("point index {index} out of range for {len} points")]
    PointIndexOutOfRange { index: usize, len: usize },
    #[error("cell ({angle}, {distance}) outside the {angles}x{distances} accumulator")]
    CellOutOfRange {
        angle: u32,
        distance: u32,
        angles: u32,
        distances: u32,
    },
    #[error("accumulator of {angles}x{distances} cells does not fit in memory")]
    AccumulatorTooLarge { angles: u32, distances: u32 },
}
