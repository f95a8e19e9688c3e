use hough_lines_core::{HoughParams, HoughTransform, Line};
use image::{GrayImage, ImageReader};
use log::info;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::io::{HoughDetectConfig, HoughDetectReport, HoughIoError};
use crate::raster::{points_from_luma, render_accumulator, render_lines};

/// Detect lines in a grayscale image: bright pixels → points → Hough run.
pub fn detect_lines_in_image(
    img: &GrayImage,
    luma_threshold: u8,
    params: HoughParams,
) -> Result<Vec<Line>, HoughIoError> {
    let cloud = points_from_luma(img, luma_threshold);
    Ok(hough_lines_core::detect_lines(
        &cloud.points,
        cloud.size,
        params,
    )?)
}

/// Output of [`run_config`].
#[derive(Debug, Clone)]
pub struct DetectRun {
    pub report: HoughDetectReport,
    /// Text dump of every center, one block per line.
    pub description: String,
}

/// Run a full detection described by `cfg`, writing every configured output.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(cfg), fields(image = %cfg.image_path))
)]
pub fn run_config(cfg: &HoughDetectConfig) -> Result<DetectRun, HoughIoError> {
    let img = ImageReader::open(&cfg.image_path)?.decode()?.to_luma8();
    let cloud = points_from_luma(&img, cfg.luma_threshold);
    info!(
        "{}: {} points above luma {}",
        cfg.image_path,
        cloud.points.len(),
        cfg.luma_threshold
    );

    let mut report = HoughDetectReport::new(cfg, cloud.size, cloud.points.len());
    let mut hough = match HoughTransform::new(&cloud.points, cloud.size, cfg.params.clone()) {
        Ok(hough) => hough,
        Err(err) => {
            report.set_error(&err);
            if let Some(path) = &cfg.report_path {
                report.write_json(path)?;
            }
            return Err(err.into());
        }
    };
    hough.cast_all();
    report.set_run(&hough);

    if let Some(path) = &cfg.accumulator_path {
        render_accumulator(hough.accumulator(), cfg.accumulator_full_votes).save(path)?;
    }
    if let Some(path) = &cfg.overlay_path {
        let background = ImageReader::open(cfg.background_path())?.decode()?.to_rgb8();
        render_lines(&background, &hough.lines(), &cfg.overlay).save(path)?;
    }
    if let Some(path) = &cfg.report_path {
        report.write_json(path)?;
    }

    Ok(DetectRun {
        description: hough.describe(),
        report,
    })
}
