//! JSON configuration and report helpers for Hough line detection.

use hough_lines_core::{HoughError, HoughParams, HoughStats, HoughTransform, ImageSize, LineForm};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum HoughIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Hough(#[from] HoughError),
}

fn default_luma_threshold() -> u8 {
    128
}

fn default_scale() -> f64 {
    1.0
}

fn default_full_intensity_votes() -> u32 {
    20
}

/// How detected lines are drawn over an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayOptions {
    /// Background pixels per detection pixel.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Skip lines with `|m|` below this value (near-horizontal lines).
    #[serde(default)]
    pub min_abs_slope: Option<f64>,
    /// Skip lines with `|b|` below this value (lines through the origin).
    #[serde(default)]
    pub min_abs_intercept: Option<f64>,
    #[serde(default = "default_line_color")]
    pub color: [u8; 3],
}

fn default_line_color() -> [u8; 3] {
    [255, 0, 0]
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            min_abs_slope: None,
            min_abs_intercept: None,
            color: default_line_color(),
        }
    }
}

impl OverlayOptions {
    /// Whether a line survives the slope/intercept filters.
    pub fn keeps(&self, form: &LineForm) -> bool {
        match *form {
            LineForm::SlopeIntercept { m, b } => {
                !(self.min_abs_slope.is_some_and(|s| m.abs() < s)
                    || self.min_abs_intercept.is_some_and(|v| b.abs() < v))
            }
            LineForm::Vertical { .. } => true,
        }
    }
}

/// Configuration for a detection run over one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoughDetectConfig {
    pub image_path: String,
    #[serde(default)]
    pub params: HoughParams,
    /// Pixels with luma at or above this value become points.
    #[serde(default = "default_luma_threshold")]
    pub luma_threshold: u8,
    #[serde(default)]
    pub report_path: Option<String>,
    #[serde(default)]
    pub accumulator_path: Option<String>,
    /// Votes that map to full red in the accumulator image.
    #[serde(default = "default_full_intensity_votes")]
    pub accumulator_full_votes: u32,
    #[serde(default)]
    pub overlay_path: Option<String>,
    /// Image to draw lines on; defaults to the input image.
    #[serde(default)]
    pub background_path: Option<String>,
    #[serde(default)]
    pub overlay: OverlayOptions,
}

impl HoughDetectConfig {
    pub fn new(image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            params: HoughParams::default(),
            luma_threshold: default_luma_threshold(),
            report_path: None,
            accumulator_path: None,
            accumulator_full_votes: default_full_intensity_votes(),
            overlay_path: None,
            background_path: None,
            overlay: OverlayOptions::default(),
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, HoughIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), HoughIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn background_path(&self) -> PathBuf {
        PathBuf::from(self.background_path.as_deref().unwrap_or(&self.image_path))
    }
}

/// One detected line as written to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineReport {
    pub theta: f64,
    pub r: f64,
    pub degrees: f64,
    pub cells: usize,
    pub form: LineForm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoughDetectReport {
    pub image_path: String,
    pub size: ImageSize,
    pub num_points: usize,
    pub params: HoughParams,
    pub lines: Vec<LineReport>,
    #[serde(default)]
    pub stats: Option<HoughStats>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HoughDetectReport {
    /// Base report before detection has run.
    pub fn new(cfg: &HoughDetectConfig, size: ImageSize, num_points: usize) -> Self {
        Self {
            image_path: cfg.image_path.clone(),
            size,
            num_points,
            params: cfg.params.clone(),
            lines: Vec::new(),
            stats: None,
            error: None,
        }
    }

    /// Fill lines and counters from a finished run.
    pub fn set_run(&mut self, hough: &HoughTransform<'_>) {
        let domain = hough.domain();
        self.lines = hough
            .centers()
            .iter()
            .zip(hough.lines())
            .map(|(c, line)| LineReport {
                theta: line.theta,
                r: line.r,
                degrees: domain.to_degrees(c.t),
                cells: c.members.len(),
                form: line.form(),
            })
            .collect();
        self.stats = Some(hough.stats().clone());
        self.error = None;
    }

    pub fn set_error(&mut self, err: &HoughError) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, HoughIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), HoughIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
