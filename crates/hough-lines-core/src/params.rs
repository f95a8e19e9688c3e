use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::HoughError;

/// Number of lines kept when `max_lines` is left at its `0` sentinel.
pub const DEFAULT_MAX_LINES: usize = 500;

/// Discretized angle axis: integers in `[0, circumference)` with
/// `precision` subdivisions per degree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AngleDomain {
    pub precision: u32,
    pub circumference: u32,
    pub semi_circumference: u32,
}

impl AngleDomain {
    pub fn new(precision: u32) -> Result<Self, HoughError> {
        if precision == 0 {
            return Err(HoughError::InvalidPrecision { precision });
        }
        let circumference = precision
            .checked_mul(360)
            .ok_or(HoughError::InvalidPrecision { precision })?;
        Ok(Self {
            precision,
            circumference,
            semi_circumference: circumference / 2,
        })
    }

    /// Discrete angle (possibly fractional, e.g. a cluster mean) to radians.
    #[inline]
    pub fn to_radians(&self, t: f64) -> f64 {
        t * PI / self.semi_circumference as f64
    }

    #[inline]
    pub fn to_degrees(&self, t: f64) -> f64 {
        t / self.precision as f64
    }

    /// Radians back onto the discrete axis, without rounding.
    #[inline]
    pub fn from_radians(&self, radians: f64) -> f64 {
        radians * self.semi_circumference as f64 / PI
    }

    /// Convert a tolerance expressed in degrees into discrete angle units.
    #[inline]
    pub fn scale_tolerance(&self, degrees: f64) -> f64 {
        degrees * self.precision as f64
    }

    /// Wrap a (fractional) angle into `[0, circumference)`.
    #[inline]
    pub fn wrap(&self, t: f64) -> f64 {
        let c = self.circumference as f64;
        let w = t.rem_euclid(c);
        if w >= c {
            0.0
        } else {
            w
        }
    }
}

/// Input image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Image geometry with the derived diagonal that bounds the distance axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub diagonal: u32,
    pub semi_diagonal: u32,
}

impl Geometry {
    pub fn new(size: ImageSize) -> Result<Self, HoughError> {
        let ImageSize { width, height } = size;
        if width == 0 || height == 0 {
            return Err(HoughError::InvalidImageSize { width, height });
        }
        let w = width as f64;
        let h = height as f64;
        let diagonal = (w * w + h * h).sqrt().ceil();
        let semi_diagonal = (diagonal / 2.0).ceil();
        Ok(Self {
            width,
            height,
            diagonal: diagonal as u32,
            semi_diagonal: semi_diagonal as u32,
        })
    }

    /// Number of distance bins: `0..=semi_diagonal`.
    #[inline]
    pub fn distance_bins(&self) -> u32 {
        self.semi_diagonal + 1
    }
}

/// How the clustering distance check treats the distance axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToleranceMode {
    /// Both `dt` and `dr` are compared against the scaled angle tolerance.
    /// `tolerance_r` is accepted but unused.
    #[default]
    Shared,
    /// `dt` is compared against the scaled angle tolerance and `dr`
    /// against `tolerance_r`.
    Separate,
}

/// Parameters for a Hough line detection run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// Distinct point votes needed before a cell is classified.
    pub threshold: u32,
    /// Clustering tolerance in degrees.
    pub tolerance_t: f64,
    /// Clustering tolerance in pixels (see [`ToleranceMode`]).
    pub tolerance_r: f64,
    /// Angle subdivisions per degree (10 = tenths of a degree).
    pub precision: u32,
    /// Maximum number of centers, and of cells per center. `0` selects
    /// [`DEFAULT_MAX_LINES`].
    pub max_lines: usize,
    pub tolerance_mode: ToleranceMode,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            threshold: 12,
            tolerance_t: 15.0,
            tolerance_r: 5.0,
            precision: 1,
            max_lines: 0,
            tolerance_mode: ToleranceMode::Shared,
        }
    }
}

impl HoughParams {
    /// `max_lines` with the `0` sentinel resolved.
    pub fn effective_max_lines(&self) -> usize {
        if self.max_lines == 0 {
            DEFAULT_MAX_LINES
        } else {
            self.max_lines
        }
    }

    pub(crate) fn validate(&self) -> Result<(), HoughError> {
        if self.threshold == 0 {
            return Err(HoughError::InvalidThreshold);
        }
        if !self.tolerance_t.is_finite() || self.tolerance_t < 0.0 {
            return Err(HoughError::InvalidTolerance {
                name: "tolerance_t",
                value: self.tolerance_t,
            });
        }
        if !self.tolerance_r.is_finite() || self.tolerance_r < 0.0 {
            return Err(HoughError::InvalidTolerance {
                name: "tolerance_r",
                value: self.tolerance_r,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn geometry_matches_ceil_rules() {
        let g = Geometry::new(ImageSize::new(800, 600)).unwrap();
        assert_eq!(g.diagonal, 1000);
        assert_eq!(g.semi_diagonal, 500);
        assert_eq!(g.distance_bins(), 501);

        let g = Geometry::new(ImageSize::new(3, 3)).unwrap();
        assert_eq!(g.diagonal, 5);
        assert_eq!(g.semi_diagonal, 3);
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert!(matches!(
            Geometry::new(ImageSize::new(0, 10)),
            Err(HoughError::InvalidImageSize { .. })
        ));
        assert!(matches!(
            AngleDomain::new(0),
            Err(HoughError::InvalidPrecision { .. })
        ));
        let params = HoughParams {
            threshold: 0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(HoughError::InvalidThreshold)));
    }

    #[test]
    fn angle_domain_conversions() {
        let d = AngleDomain::new(10).unwrap();
        assert_eq!(d.circumference, 3600);
        assert_eq!(d.semi_circumference, 1800);
        assert_abs_diff_eq!(d.to_radians(900.0), std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(d.to_degrees(455.0), 45.5);
        assert_abs_diff_eq!(d.scale_tolerance(1.5), 15.0);
        assert_abs_diff_eq!(AngleDomain::new(1).unwrap().scale_tolerance(2.5), 2.5);
        assert_abs_diff_eq!(d.wrap(-10.0), 3590.0);
        assert_abs_diff_eq!(d.wrap(3600.0), 0.0);
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let p: HoughParams =
            serde_json::from_str(r#"{"threshold": 4, "tolerance_mode": "separate"}"#).unwrap();
        assert_eq!(p.threshold, 4);
        assert_eq!(p.precision, 1);
        assert_eq!(p.tolerance_mode, ToleranceMode::Separate);
        assert_eq!(p.effective_max_lines(), DEFAULT_MAX_LINES);
    }
}
