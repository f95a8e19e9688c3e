//! Online clustering of accumulator cells into line centers.
//!
//! Cells arrive one at a time, the first time they cross the vote threshold.
//! Each one either joins the nearest existing center or seeds a new one.
//! Center angles are averaged as circular quantities so that clusters
//! straddling 0°/360° stay put instead of collapsing towards 180°.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{AngleDomain, CellKey, ToleranceMode, TrigCache};

/// A cluster of cells that represents one detected line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Center {
    /// Mean angle on the discrete axis, in `[0, circumference)`.
    pub t: f64,
    /// Mean distance in pixels.
    pub r: f64,
    /// Member cells in classification order.
    pub members: Vec<CellKey>,
}

impl Center {
    fn seed(cell: CellKey) -> Self {
        Self {
            t: cell.angle as f64,
            r: cell.distance as f64,
            members: vec![cell],
        }
    }

    /// Recompute `r` as a linear mean and `t` as a circular mean over all
    /// members.
    fn update_mean(&mut self, domain: &AngleDomain, trig: &TrigCache) {
        let n = self.members.len() as f64;
        let (mut sum_r, mut sum_sin, mut sum_cos) = (0.0, 0.0, 0.0);
        for m in &self.members {
            sum_r += m.distance as f64;
            sum_sin += trig.sine(m.angle);
            sum_cos += trig.cosine(m.angle);
        }
        self.r = sum_r / n;
        let mean = (sum_sin / n).atan2(sum_cos / n);
        self.t = domain.wrap(domain.from_radians(mean));
    }
}

/// Why a cell did not end up in any center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// A new center was needed but `max_lines` centers already exist.
    ClassifierFull,
    /// The nearest center already holds `max_lines` cells.
    CenterFull { center: usize },
}

/// What [`Classifier::classify`] did with a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassifyOutcome {
    Created { center: usize },
    Merged { center: usize },
    Dropped(DropReason),
}

/// Shortest distance between two angles on the discrete circle.
#[inline]
pub fn angle_distance(domain: &AngleDomain, t1: f64, t2: f64) -> f64 {
    let dt = (t1 - t2).abs();
    if dt > domain.semi_circumference as f64 {
        domain.circumference as f64 - dt
    } else {
        dt
    }
}

#[inline]
pub fn distance_distance(r1: f64, r2: f64) -> f64 {
    (r1 - r2).abs()
}

/// Greedy nearest-center clustering bounded by `max_lines`.
#[derive(Clone, Debug)]
pub struct Classifier {
    domain: AngleDomain,
    tolerance_t: f64,
    tolerance_r: f64,
    mode: ToleranceMode,
    max_lines: usize,
    centers: Vec<Center>,
}

impl Classifier {
    /// `tolerance_t` is in discrete angle units (already scaled by precision),
    /// `tolerance_r` in pixels.
    pub fn new(
        domain: AngleDomain,
        tolerance_t: f64,
        tolerance_r: f64,
        mode: ToleranceMode,
        max_lines: usize,
    ) -> Self {
        Self {
            domain,
            tolerance_t,
            tolerance_r,
            mode,
            max_lines,
            centers: Vec::new(),
        }
    }

    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Index of the center closest to `cell` under `max(dr, dt)`, with its
    /// `dt` and `dr`. Ties keep the earliest center.
    fn nearest(&self, cell: CellKey) -> Option<(usize, f64, f64)> {
        let t2 = cell.angle as f64;
        let r2 = cell.distance as f64;
        let mut best: Option<(usize, f64, f64, f64)> = None;
        for (i, c) in self.centers.iter().enumerate() {
            let dt = angle_distance(&self.domain, c.t, t2);
            let dr = distance_distance(c.r, r2);
            let d = dt.max(dr);
            if best.is_none_or(|(_, _, _, bd)| d < bd) {
                best = Some((i, dt, dr, d));
            }
        }
        best.map(|(i, dt, dr, _)| (i, dt, dr))
    }

    fn within_tolerance(&self, dt: f64, dr: f64) -> bool {
        let r_limit = match self.mode {
            ToleranceMode::Shared => self.tolerance_t,
            ToleranceMode::Separate => self.tolerance_r,
        };
        dt <= self.tolerance_t && dr <= r_limit
    }

    /// Assign `cell` to a center. Capacity exhaustion drops the cell and
    /// logs a warning; it is never an error.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self, trig)))]
    pub fn classify(&mut self, cell: CellKey, trig: &TrigCache) -> ClassifyOutcome {
        match self.nearest(cell) {
            Some((i, dt, dr)) if self.within_tolerance(dt, dr) => {
                let center = &mut self.centers[i];
                if center.members.len() >= self.max_lines {
                    warn!(
                        "center {i} already holds {} cells, dropping cell ({}, {})",
                        center.members.len(),
                        cell.angle,
                        cell.distance
                    );
                    return ClassifyOutcome::Dropped(DropReason::CenterFull { center: i });
                }
                center.members.push(cell);
                center.update_mean(&self.domain, trig);
                debug!(
                    "cell ({}, {}) merged into center {i} -> ({:.2}, {:.2})",
                    cell.angle, cell.distance, center.t, center.r
                );
                ClassifyOutcome::Merged { center: i }
            }
            _ => {
                if self.centers.len() >= self.max_lines {
                    warn!(
                        "classifier full ({} centers), dropping cell ({}, {})",
                        self.centers.len(),
                        cell.angle,
                        cell.distance
                    );
                    return ClassifyOutcome::Dropped(DropReason::ClassifierFull);
                }
                self.centers.push(Center::seed(cell));
                let i = self.centers.len() - 1;
                debug!("cell ({}, {}) seeds center {i}", cell.angle, cell.distance);
                ClassifyOutcome::Created { center: i }
            }
        }
    }
}
