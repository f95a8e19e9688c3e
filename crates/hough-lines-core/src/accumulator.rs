//! Dense (angle, distance) vote grid.
//!
//! Each cell counts the distinct points that voted for it. A point can vote
//! into a cell at most once; membership is tracked by a per-cell bitset that
//! is only allocated when the cell receives its first vote.

use serde::{Deserialize, Serialize};

use crate::{AngleDomain, Geometry, HoughError};

/// Coordinates of one accumulator cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub angle: u32,
    pub distance: u32,
}

impl CellKey {
    pub fn new(angle: u32, distance: u32) -> Self {
        Self { angle, distance }
    }
}

/// Result of a single vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vote {
    /// The point already voted here; nothing changed.
    Duplicate,
    /// The count was incremented but the cell does not need classification.
    Counted,
    /// The count is at or above the threshold and the cell has never been
    /// handed to the classifier.
    ReachedThreshold,
}

#[derive(Clone, Debug, Default)]
struct Cell {
    count: u32,
    processed: bool,
    voters: Vec<u64>,
}

impl Cell {
    /// Set the voter bit; returns `false` if it was already set.
    fn insert_voter(&mut self, point: usize, num_points: usize) -> bool {
        if self.voters.is_empty() {
            self.voters = vec![0; num_points.div_ceil(64)];
        }
        let word = &mut self.voters[point / 64];
        let mask = 1u64 << (point % 64);
        if *word & mask != 0 {
            return false;
        }
        *word |= mask;
        true
    }

    fn has_voter(&self, point: usize) -> bool {
        self.voters
            .get(point / 64)
            .is_some_and(|w| w & (1u64 << (point % 64)) != 0)
    }
}

/// `circumference × (semi_diagonal + 1)` grid of vote cells.
#[derive(Clone, Debug)]
pub struct Accumulator {
    angles: u32,
    distances: u32,
    num_points: usize,
    threshold: u32,
    cells: Vec<Cell>,
}

impl Accumulator {
    pub fn build(
        domain: &AngleDomain,
        geometry: &Geometry,
        num_points: usize,
        threshold: u32,
    ) -> Result<Self, HoughError> {
        let angles = domain.circumference;
        let distances = geometry.distance_bins();
        let len = (angles as usize)
            .checked_mul(distances as usize)
            .ok_or(HoughError::AccumulatorTooLarge { angles, distances })?;
        let mut cells = Vec::new();
        cells.resize_with(len, Cell::default);
        Ok(Self {
            angles,
            distances,
            num_points,
            threshold,
            cells,
        })
    }

    fn index(&self, key: CellKey) -> Option<usize> {
        (key.angle < self.angles && key.distance < self.distances)
            .then(|| key.angle as usize * self.distances as usize + key.distance as usize)
    }

    /// Record a vote of `point` into `key`. This is the only write path for
    /// vote counts.
    pub fn vote(&mut self, key: CellKey, point: usize) -> Result<Vote, HoughError> {
        let idx = self.index(key).ok_or(HoughError::CellOutOfRange {
            angle: key.angle,
            distance: key.distance,
            angles: self.angles,
            distances: self.distances,
        })?;
        if point >= self.num_points {
            return Err(HoughError::PointIndexOutOfRange {
                index: point,
                len: self.num_points,
            });
        }
        let num_points = self.num_points;
        let threshold = self.threshold;
        let cell = &mut self.cells[idx];
        if !cell.insert_voter(point, num_points) {
            return Ok(Vote::Duplicate);
        }
        cell.count += 1;
        Ok(if !cell.processed && cell.count >= threshold {
            Vote::ReachedThreshold
        } else {
            Vote::Counted
        })
    }

    /// Flag a cell as handed to the classifier. Returns `false` if it
    /// already was, or if `key` lies outside the grid.
    pub(crate) fn mark_processed(&mut self, key: CellKey) -> bool {
        match self.index(key) {
            Some(idx) => !std::mem::replace(&mut self.cells[idx].processed, true),
            None => false,
        }
    }

    fn cell(&self, key: CellKey) -> Option<&Cell> {
        self.index(key).map(|idx| &self.cells[idx])
    }

    /// Votes in `key`; zero outside the grid.
    pub fn count(&self, key: CellKey) -> u32 {
        self.cell(key).map_or(0, |c| c.count)
    }

    pub fn is_processed(&self, key: CellKey) -> bool {
        self.cell(key).is_some_and(|c| c.processed)
    }

    pub fn has_voted(&self, key: CellKey, point: usize) -> bool {
        self.cell(key).is_some_and(|c| c.has_voter(point))
    }

    /// `(angles, distances)` extent of the grid.
    pub fn dims(&self) -> (u32, u32) {
        (self.angles, self.distances)
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn max_count(&self) -> u32 {
        self.cells.iter().map(|c| c.count).max().unwrap_or(0)
    }

    /// Number of cells that have been handed to the classifier.
    pub fn processed_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.processed).count()
    }

    /// Iterate over cells with at least one vote, in angle-major order.
    pub fn voted_cells(&self) -> impl Iterator<Item = (CellKey, u32)> + '_ {
        let distances = self.distances as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.count > 0)
            .map(move |(i, c)| {
                let key = CellKey::new((i / distances) as u32, (i % distances) as u32);
                (key, c.count)
            })
    }
}
