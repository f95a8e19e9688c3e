//! High-level facade for the `hough-lines-*` workspace.
//!
//! This crate provides:
//! - re-exports of the Hough engine in `hough-lines-core`
//! - JSON run configuration and detection reports (`io`)
//! - (feature `image`) helpers that turn bright pixels into points, render the
//!   accumulator as a heat map and draw detected lines over an image
//!
//! ## Quickstart
//!
//! ```no_run
//! use hough_lines::{detect, HoughParams};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("edges.png")?.decode()?.to_luma8();
//! let params = HoughParams { threshold: 40, precision: 10, ..HoughParams::default() };
//!
//! let lines = detect::detect_lines_in_image(&img, 128, params)?;
//! for line in &lines {
//!     println!("{}", line.form());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `hough_lines::core`: accumulator, classifier, run context, line types.
//! - `hough_lines::io`: `HoughDetectConfig` / `HoughDetectReport` JSON helpers.
//! - `hough_lines::raster` (feature `image`): image ↔ point/line conversions.
//! - `hough_lines::detect` (feature `image`): end-to-end helpers from images.

pub use hough_lines_core as core;

pub use hough_lines_core::{
    detect_lines, HoughError, HoughParams, HoughStats, HoughTransform, ImageSize, Line, LineForm,
    ToleranceMode,
};

pub mod io;

#[cfg(feature = "image")]
pub mod detect;
#[cfg(feature = "image")]
pub mod raster;
