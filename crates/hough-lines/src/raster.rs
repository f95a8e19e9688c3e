//! Conversions between raster images and the point/line world of the core.
//!
//! Points use a y-up frame centered on the image:
//!
//! ```text
//!                 +semi_height
//!   (0,0) pixel +-----+
//!               |     |
//!  -semi_width -+-----o----- +semi_width
//!                     |
//!                 -semi_height
//! ```

use hough_lines_core::{Accumulator, CellKey, ImageSize, Line, LineForm};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use nalgebra::Point2;

use crate::io::OverlayOptions;

/// Points extracted from an image, with the image size they live in.
#[derive(Clone, Debug)]
pub struct PointCloud {
    pub points: Vec<Point2<i32>>,
    pub size: ImageSize,
}

/// Every pixel with luma `>= luma_threshold` becomes a centered point.
pub fn points_from_luma(img: &GrayImage, luma_threshold: u8) -> PointCloud {
    let (width, height) = img.dimensions();
    let semi_w = width.div_ceil(2) as i32;
    let semi_h = height.div_ceil(2) as i32;
    let points = img
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] >= luma_threshold)
        .map(|(x, y, _)| Point2::new(x as i32 - semi_w, (height - y) as i32 - semi_h))
        .collect();
    PointCloud {
        points,
        size: ImageSize::new(width, height),
    }
}

/// Heat map of the accumulator: one pixel per cell, angle along x, distance
/// growing upwards. `full_votes` votes saturate the red channel.
pub fn render_accumulator(acc: &Accumulator, full_votes: u32) -> RgbImage {
    let (angles, distances) = acc.dims();
    let full = full_votes.max(1) as u64;
    RgbImage::from_fn(angles, distances, |x, y| {
        let count = acc.count(CellKey::new(x, distances - 1 - y)) as u64;
        let red = (count * 255 / full).min(255) as u8;
        Rgb([red, 0, 0])
    })
}

/// Clip the segment `a → b` to `[0, w] × [0, h]` (Liang–Barsky).
fn clip_segment(a: (f64, f64), b: (f64, f64), w: f64, h: f64) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, a.0), (dx, w - a.0), (-dy, a.1), (dy, h - a.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((
        (a.0 + t0 * dx, a.1 + t0 * dy),
        (a.0 + t1 * dx, a.1 + t1 * dy),
    ))
}

/// Draw `lines` over a copy of `background`.
///
/// Line coordinates are in the centered detection frame; `opts.scale` maps
/// detection pixels onto background pixels.
pub fn render_lines(background: &RgbImage, lines: &[Line], opts: &OverlayOptions) -> RgbImage {
    let mut out = background.clone();
    let (w, h) = (out.width() as f64, out.height() as f64);
    let (semi_w, semi_h) = ((w / 2.0).ceil(), (h / 2.0).ceil());
    let scale = if opts.scale > 0.0 { opts.scale } else { 1.0 };
    let half_w = semi_w / scale;
    let half_h = semi_h / scale;
    let color = Rgb(opts.color);

    let to_pixel = |x: f64, y: f64| (x * scale + semi_w, h - y * scale - semi_h);

    for line in lines {
        let form = line.form();
        if !opts.keeps(&form) {
            continue;
        }
        let (a, b) = match form {
            LineForm::SlopeIntercept { m, b } => (
                to_pixel(-half_w, -half_w * m + b),
                to_pixel(half_w, half_w * m + b),
            ),
            LineForm::Vertical { x } => (to_pixel(x, -half_h), to_pixel(x, half_h)),
        };
        if let Some((a, b)) = clip_segment(a, b, w - 1.0, h - 1.0) {
            draw_line_segment_mut(
                &mut out,
                (a.0 as f32, a.1 as f32),
                (b.0 as f32, b.1 as f32),
                color,
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hough_lines_core::{AngleDomain, Geometry};
    use image::Luma;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn bright_pixels_become_centered_points() {
        let mut img = GrayImage::new(4, 3);
        img.put_pixel(0, 0, Luma([255]));
        img.put_pixel(3, 2, Luma([200]));
        img.put_pixel(1, 1, Luma([10]));
        let cloud = points_from_luma(&img, 128);
        assert_eq!(cloud.size, ImageSize::new(4, 3));
        assert_eq!(cloud.points, vec![Point2::new(-2, 1), Point2::new(1, -1)]);
    }

    #[test]
    fn accumulator_image_flips_distance_axis() {
        let domain = AngleDomain::new(1).unwrap();
        let geometry = Geometry::new(ImageSize::new(40, 30)).unwrap();
        let mut acc = Accumulator::build(&domain, &geometry, 30, 100).unwrap();
        for p in 0..10 {
            acc.vote(CellKey::new(5, 0), p).unwrap();
        }
        acc.vote(CellKey::new(7, 25), 0).unwrap();

        let img = render_accumulator(&acc, 20);
        assert_eq!(img.dimensions(), (360, 26));
        assert_eq!(img.get_pixel(5, 25).0, [127, 0, 0]);
        assert_eq!(img.get_pixel(7, 0).0, [12, 0, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn horizontal_line_is_drawn_on_its_row() {
        let bg = RgbImage::new(80, 60);
        // y = -10 in the centered frame is pixel row 60 - (-10) - 30 = 40.
        let line = Line::new(3.0 * FRAC_PI_2, 10.0);
        let out = render_lines(&bg, &[line], &OverlayOptions::default());
        assert_eq!(out.get_pixel(40, 40).0, [255, 0, 0]);
        assert_eq!(out.get_pixel(40, 10).0, [0, 0, 0]);

        let filtered = OverlayOptions {
            min_abs_slope: Some(0.5),
            ..Default::default()
        };
        let out = render_lines(&bg, &[line], &filtered);
        assert_eq!(out.get_pixel(40, 40).0, [0, 0, 0]);
    }

    #[test]
    fn vertical_line_is_drawn_on_its_column() {
        let bg = RgbImage::new(80, 60);
        let line = Line::new(0.0, 5.0);
        let out = render_lines(&bg, &[line], &OverlayOptions::default());
        assert_eq!(out.get_pixel(45, 30).0, [255, 0, 0]);
    }

    #[test]
    fn clipping_rejects_outside_segments() {
        assert!(clip_segment((-10.0, -5.0), (-1.0, -5.0), 10.0, 10.0).is_none());
        let (a, b) = clip_segment((-10.0, 5.0), (20.0, 5.0), 10.0, 10.0).unwrap();
        assert_abs_diff_eq!(a.0, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.0, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(a.1, 5.0);
        assert_abs_diff_eq!(b.1, 5.0);
    }
}
