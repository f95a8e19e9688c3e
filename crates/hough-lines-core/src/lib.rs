//! Hough transform line detection over 2D point sets.
//!
//! Points vote into a discretized (angle, distance) accumulator. Every cell
//! that collects `threshold` distinct votes is handed, once, to an online
//! classifier that groups nearby cells into line centers using a circular
//! mean for the angle. This crate is purely geometric: reading points from
//! images and drawing results lives in the `hough-lines` facade.
//!
//! ## Quickstart
//!
//! ```
//! use hough_lines_core::{HoughParams, HoughTransform, ImageSize};
//! use nalgebra::Point2;
//!
//! let points = [Point2::new(50, -50), Point2::new(100, -50)];
//! let params = HoughParams { threshold: 2, ..HoughParams::default() };
//!
//! let mut hough = HoughTransform::new(&points, ImageSize::new(800, 600), params)?;
//! hough.cast_all();
//! print!("{}", hough.describe());
//! assert_eq!(hough.finish().len(), 1);
//! # Ok::<(), hough_lines_core::HoughError>(())
//! ```

mod accumulator;
mod classifier;
mod engine;
mod error;
mod line;
mod logger;
mod params;
mod trig;

pub use accumulator::{Accumulator, CellKey, Vote};
pub use classifier::{
    angle_distance, distance_distance, Center, Classifier, ClassifyOutcome, DropReason,
};
pub use engine::{detect_lines, CastSummary, HoughStats, HoughTransform};
pub use error::HoughError;
pub use line::{Line, LineForm, VERTICAL_EPS};
pub use params::{
    AngleDomain, Geometry, HoughParams, ImageSize, ToleranceMode, DEFAULT_MAX_LINES,
};
pub use trig::TrigCache;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
