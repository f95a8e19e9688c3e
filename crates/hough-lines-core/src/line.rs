use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// `|sin θ|` below which a line is treated as vertical.
pub const VERTICAL_EPS: f64 = 1e-9;

/// A detected line in normal form: `x·cos θ + y·sin θ = r`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Normal angle in radians.
    pub theta: f64,
    /// Distance from the origin (image center) in pixels.
    pub r: f64,
}

/// Cartesian form of a [`Line`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineForm {
    /// `y = m·x + b`
    SlopeIntercept { m: f64, b: f64 },
    /// `x = x`
    Vertical { x: f64 },
}

impl Line {
    pub fn new(theta: f64, r: f64) -> Self {
        Self { theta, r }
    }

    pub fn form(&self) -> LineForm {
        let (s, c) = self.theta.sin_cos();
        if s.abs() < VERTICAL_EPS {
            LineForm::Vertical { x: self.r / c }
        } else {
            LineForm::SlopeIntercept {
                m: -c / s,
                b: self.r / s,
            }
        }
    }

    /// `y` on the line at `x`, or `None` for vertical lines.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        match self.form() {
            LineForm::SlopeIntercept { m, b } => Some(m * x + b),
            LineForm::Vertical { .. } => None,
        }
    }

    /// Perpendicular distance from `p` to the line.
    pub fn distance_to(&self, p: Point2<f64>) -> f64 {
        let (s, c) = self.theta.sin_cos();
        (p.x * c + p.y * s - self.r).abs()
    }
}

impl std::fmt::Display for LineForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineForm::SlopeIntercept { m, b } => write!(f, "y = {m:.2}*x+{b:.2}"),
            LineForm::Vertical { x } => write!(f, "x = {x:.2}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn horizontal_line_below_origin() {
        // angle 270°, distance 50 is y = -50
        let line = Line::new(3.0 * FRAC_PI_2, 50.0);
        match line.form() {
            LineForm::SlopeIntercept { m, b } => {
                assert_abs_diff_eq!(m, 0.0, epsilon = 1e-12);
                assert_abs_diff_eq!(b, -50.0, epsilon = 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_abs_diff_eq!(line.y_at(123.0).unwrap(), -50.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_angle_is_vertical() {
        let line = Line::new(0.0, 12.0);
        assert_eq!(line.form(), LineForm::Vertical { x: 12.0 });
        assert!(line.y_at(0.0).is_none());
        let line = Line::new(PI, 12.0);
        match line.form() {
            LineForm::Vertical { x } => assert_abs_diff_eq!(x, -12.0, epsilon = 1e-12),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(format!("{}", Line::new(0.0, 3.0).form()), "x = 3.00");
    }

    #[test]
    fn distance_to_point() {
        let line = Line::new(FRAC_PI_4, 0.0);
        let d = line.distance_to(Point2::new(1.0, 1.0));
        assert_abs_diff_eq!(d, 2f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(line.distance_to(Point2::new(1.0, -1.0)), 0.0, epsilon = 1e-12);
    }
}
