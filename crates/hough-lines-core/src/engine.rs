//! Hough transform run context.
//!
//! [`HoughTransform`] owns the trigonometric cache, the accumulator and the
//! classifier for one batch of points. Points are cast one at a time; every
//! cell that crosses the vote threshold for the first time is classified
//! immediately, in angle-then-point order.

use std::fmt::Write as _;

use log::{info, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Accumulator, AngleDomain, CellKey, Center, Classifier, ClassifyOutcome, DropReason, Geometry,
    HoughError, HoughParams, ImageSize, Line, TrigCache, Vote,
};

/// Counters collected while voting and classifying.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoughStats {
    pub points_cast: usize,
    pub votes_cast: usize,
    pub duplicate_votes: usize,
    pub cells_classified: usize,
    pub centers_created: usize,
    pub merges: usize,
    pub dropped_classifier_full: usize,
    pub dropped_center_full: usize,
}

impl HoughStats {
    fn record(&mut self, outcome: ClassifyOutcome) {
        self.cells_classified += 1;
        match outcome {
            ClassifyOutcome::Created { .. } => self.centers_created += 1,
            ClassifyOutcome::Merged { .. } => self.merges += 1,
            ClassifyOutcome::Dropped(DropReason::ClassifierFull) => {
                self.dropped_classifier_full += 1
            }
            ClassifyOutcome::Dropped(DropReason::CenterFull { .. }) => {
                self.dropped_center_full += 1
            }
        }
    }
}

/// Cells classified while casting a single point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CastSummary {
    pub point: usize,
    pub classified: Vec<(CellKey, ClassifyOutcome)>,
}

/// Owned state of one Hough transform run over a borrowed point set.
pub struct HoughTransform<'a> {
    points: &'a [Point2<i32>],
    params: HoughParams,
    domain: AngleDomain,
    geometry: Geometry,
    trig: TrigCache,
    accumulator: Accumulator,
    classifier: Classifier,
    stats: HoughStats,
}

impl<'a> HoughTransform<'a> {
    /// Build caches, accumulator and an empty classifier.
    ///
    /// Points are coordinates relative to the image center. Every point must
    /// project inside the distance axis, otherwise setup fails.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(points, params),
            fields(num_points = points.len(), precision = params.precision)
        )
    )]
    pub fn new(
        points: &'a [Point2<i32>],
        size: ImageSize,
        params: HoughParams,
    ) -> Result<Self, HoughError> {
        params.validate()?;
        let domain = AngleDomain::new(params.precision)?;
        let geometry = Geometry::new(size)?;

        for (index, p) in points.iter().enumerate() {
            let norm = (p.x as f64).hypot(p.y as f64).round();
            if norm > geometry.semi_diagonal as f64 {
                return Err(HoughError::PointOutOfRange {
                    index,
                    x: p.x,
                    y: p.y,
                    max_distance: geometry.semi_diagonal,
                });
            }
        }

        let trig = TrigCache::build(&domain);
        let accumulator = Accumulator::build(&domain, &geometry, points.len(), params.threshold)?;
        let classifier = Classifier::new(
            domain,
            domain.scale_tolerance(params.tolerance_t),
            params.tolerance_r,
            params.tolerance_mode,
            params.effective_max_lines(),
        );

        info!(
            "hough setup: {} points, {}x{} image, {}x{} accumulator, threshold {}",
            points.len(),
            geometry.width,
            geometry.height,
            domain.circumference,
            geometry.distance_bins(),
            params.threshold
        );

        Ok(Self {
            points,
            params,
            domain,
            geometry,
            trig,
            accumulator,
            classifier,
            stats: HoughStats::default(),
        })
    }

    /// Vote point `index` into every angle bin of the half circle.
    ///
    /// Negative distances are folded onto the opposite angle. Casting the
    /// same point twice leaves all counts unchanged.
    pub fn cast(&mut self, index: usize) -> Result<CastSummary, HoughError> {
        let p = *self
            .points
            .get(index)
            .ok_or(HoughError::PointIndexOutOfRange {
                index,
                len: self.points.len(),
            })?;
        Ok(self.cast_point(index, p))
    }

    /// Cast every point in input order.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    pub fn cast_all(&mut self) {
        let points = self.points;
        for (index, &p) in points.iter().enumerate() {
            self.cast_point(index, p);
        }
    }

    fn cast_point(&mut self, index: usize, p: Point2<i32>) -> CastSummary {
        let semi = self.domain.semi_circumference;
        let mut summary = CastSummary {
            point: index,
            classified: Vec::new(),
        };

        for t in 0..semi {
            let r = self.trig.project(p.x, p.y, t);
            let key = if r < 0 {
                CellKey::new(semi + t, (-r) as u32)
            } else {
                CellKey::new(t, r as u32)
            };

            self.stats.votes_cast += 1;
            match self.accumulator.vote(key, index) {
                Ok(Vote::Duplicate) => self.stats.duplicate_votes += 1,
                Ok(Vote::Counted) => {}
                Ok(Vote::ReachedThreshold) => {
                    if self.accumulator.mark_processed(key) {
                        let outcome = self.classifier.classify(key, &self.trig);
                        self.stats.record(outcome);
                        summary.classified.push((key, outcome));
                    }
                }
                Err(err) => warn!("point {index} at ({}, {}): {err}", p.x, p.y),
            }
        }

        self.stats.points_cast += 1;
        summary
    }

    /// One line per center, angle in radians.
    pub fn lines(&self) -> Vec<Line> {
        self.classifier
            .centers()
            .iter()
            .map(|c| Line::new(self.domain.to_radians(c.t), c.r))
            .collect()
    }

    /// Human-readable dump of every center.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for c in self.classifier.centers() {
            let line = Line::new(self.domain.to_radians(c.t), c.r);
            let _ = writeln!(
                out,
                "({:.2}º, {:.2}) from {} cells",
                self.domain.to_degrees(c.t),
                c.r,
                c.members.len()
            );
            let _ = writeln!(out, "Parametric line: {}", line.form());
            out.push('\n');
        }
        out
    }

    /// Consume the run and return its lines. Dropping the context releases
    /// every owned buffer.
    pub fn finish(self) -> Vec<Line> {
        self.lines()
    }

    pub fn centers(&self) -> &[Center] {
        self.classifier.centers()
    }

    pub fn stats(&self) -> &HoughStats {
        &self.stats
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn trig(&self) -> &TrigCache {
        &self.trig
    }

    pub fn domain(&self) -> &AngleDomain {
        &self.domain
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn params(&self) -> &HoughParams {
        &self.params
    }

    pub fn points(&self) -> &'a [Point2<i32>] {
        self.points
    }
}

/// Set up a run, cast every point and return the detected lines.
pub fn detect_lines(
    points: &[Point2<i32>],
    size: ImageSize,
    params: HoughParams,
) -> Result<Vec<Line>, HoughError> {
    let mut hough = HoughTransform::new(points, size, params)?;
    hough.cast_all();
    Ok(hough.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineForm;
    use approx::assert_abs_diff_eq;

    fn params(threshold: u32, tolerance_t: f64, precision: u32, max_lines: usize) -> HoughParams {
        HoughParams {
            threshold,
            tolerance_t,
            tolerance_r: 5.0,
            precision,
            max_lines,
            ..Default::default()
        }
    }

    fn size() -> ImageSize {
        ImageSize::new(800, 600)
    }

    #[test]
    fn two_points_recover_horizontal_line() {
        let points = [Point2::new(50, -50), Point2::new(100, -50)];
        let mut hough = HoughTransform::new(&points, size(), params(2, 15.0, 1, 0)).unwrap();
        assert!(hough.cast(0).unwrap().classified.is_empty());
        let summary = hough.cast(1).unwrap();
        assert_eq!(summary.classified.len(), 1);
        assert_eq!(summary.classified[0].0, CellKey::new(270, 50));

        let lines = hough.lines();
        assert_eq!(lines.len(), 1);
        for p in &points {
            let y = lines[0].y_at(p.x as f64).unwrap();
            assert_abs_diff_eq!(y, p.y as f64, epsilon = 0.5);
        }
    }

    #[test]
    fn recovers_known_line() {
        let points: Vec<_> = (-100..=100)
            .step_by(2)
            .map(|x| Point2::new(x, 2 * x + 3))
            .collect();
        let p = params(points.len() as u32, 2.0, 10, 0);
        let lines = detect_lines(&points, size(), p).unwrap();
        assert_eq!(lines.len(), 1);

        let line = lines[0];
        let LineForm::SlopeIntercept { m, b } = line.form() else {
            panic!("expected a non-vertical line");
        };
        assert_abs_diff_eq!(m, 2.0, epsilon = 0.01);
        // Distances are integral, so the intercept is only known to
        // half a pixel along the normal.
        let b_tol = 0.5 / line.theta.sin().abs() + 0.05;
        assert_abs_diff_eq!(b, 3.0, epsilon = b_tol);
        for q in &points {
            assert!(line.distance_to(Point2::new(q.x as f64, q.y as f64)) < 1.0);
        }
    }

    #[test]
    fn recasting_a_point_keeps_counts() {
        let points = [Point2::new(10, 20), Point2::new(-30, 5)];
        let mut once = HoughTransform::new(&points, size(), params(3, 5.0, 1, 0)).unwrap();
        let mut twice = HoughTransform::new(&points, size(), params(3, 5.0, 1, 0)).unwrap();
        once.cast_all();
        twice.cast_all();
        twice.cast(0).unwrap();

        let a: Vec<_> = once.accumulator().voted_cells().collect();
        let b: Vec<_> = twice.accumulator().voted_cells().collect();
        assert_eq!(a, b);
        assert_eq!(twice.stats().duplicate_votes, 180);
        assert_eq!(twice.stats().votes_cast, 3 * 180);
    }

    #[test]
    fn cast_all_matches_casting_each_point() {
        let points: Vec<_> = (0..25).map(|i| Point2::new(i * 4 - 50, i - 12)).collect();
        let mut batch = HoughTransform::new(&points, size(), params(4, 5.0, 1, 0)).unwrap();
        let mut single = HoughTransform::new(&points, size(), params(4, 5.0, 1, 0)).unwrap();
        batch.cast_all();
        for i in 0..points.len() {
            single.cast(i).unwrap();
        }

        assert_eq!(batch.stats(), single.stats());
        assert_eq!(batch.stats().points_cast, points.len());
        assert_eq!(batch.stats().votes_cast, points.len() * 180);
        assert_eq!(batch.lines(), single.lines());
        let a: Vec<_> = batch.accumulator().voted_cells().collect();
        let b: Vec<_> = single.accumulator().voted_cells().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn cells_are_classified_once() {
        let points: Vec<_> = (0..30).map(|i| Point2::new(i * 3 - 45, 40)).collect();
        let mut hough = HoughTransform::new(&points, size(), params(3, 5.0, 1, 0)).unwrap();
        let mut seen = std::collections::HashSet::new();
        for i in 0..points.len() {
            for (key, _) in hough.cast(i).unwrap().classified {
                assert!(seen.insert(key), "cell {key:?} classified twice");
            }
        }
        let stats = hough.stats();
        assert_eq!(stats.cells_classified, seen.len());
        assert_eq!(stats.cells_classified, hough.accumulator().processed_cells());
        let members: usize = hough.centers().iter().map(|c| c.members.len()).sum();
        assert_eq!(
            members + stats.dropped_center_full + stats.dropped_classifier_full,
            stats.cells_classified
        );
        assert!(hough.accumulator().max_count() as usize >= points.len() - 1);
    }

    #[test]
    fn line_count_is_capped() {
        let points: Vec<_> = (-5..5)
            .flat_map(|i| (-5..5).map(move |j| Point2::new(i * 17, j * 13)))
            .collect();
        let mut hough = HoughTransform::new(&points, size(), params(2, 1.0, 1, 3)).unwrap();
        hough.cast_all();
        assert!(hough.lines().len() <= 3);
        assert!(hough.stats().dropped_classifier_full > 0);
        for c in hough.centers() {
            assert!(c.members.len() <= 3);
        }
    }

    #[test]
    fn runs_are_deterministic() {
        let points: Vec<_> = (0..40)
            .map(|i| Point2::new((i * 37) % 200 - 100, (i * 53) % 160 - 80))
            .collect();
        let p = params(4, 3.0, 2, 0);
        let a = detect_lines(&points, size(), p.clone()).unwrap();
        let b = detect_lines(&points, size(), p).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn describe_lists_each_center() {
        let points = [Point2::new(50, -50), Point2::new(100, -50)];
        let mut hough = HoughTransform::new(&points, size(), params(2, 15.0, 1, 0)).unwrap();
        hough.cast_all();
        let text = hough.describe();
        assert!(text.contains("(270.00º, 50.00) from 1 cells"), "{text}");
        assert!(text.contains("Parametric line: y = "), "{text}");
    }

    #[test]
    fn rejects_bad_points() {
        let points = [Point2::new(600, 0)];
        assert!(matches!(
            HoughTransform::new(&points, size(), HoughParams::default()),
            Err(HoughError::PointOutOfRange { index: 0, .. })
        ));
        let points = [Point2::new(0, 0)];
        let mut hough = HoughTransform::new(&points, size(), HoughParams::default()).unwrap();
        assert_eq!(
            hough.cast(1),
            Err(HoughError::PointIndexOutOfRange { index: 1, len: 1 })
        );
    }
}
