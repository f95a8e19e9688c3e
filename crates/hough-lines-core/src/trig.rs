//! Sine/cosine lookup tables over the discrete angle axis.

use crate::AngleDomain;

/// Precomputed `sin`/`cos` for every discrete angle in `[0, circumference)`.
#[derive(Clone, Debug)]
pub struct TrigCache {
    sin: Vec<f64>,
    cos: Vec<f64>,
}

impl TrigCache {
    pub fn build(domain: &AngleDomain) -> Self {
        let n = domain.circumference as usize;
        let mut sin = Vec::with_capacity(n);
        let mut cos = Vec::with_capacity(n);
        for t in 0..domain.circumference {
            let (s, c) = domain.to_radians(t as f64).sin_cos();
            sin.push(s);
            cos.push(c);
        }
        Self { sin, cos }
    }

    /// Cached `sin` of a discrete angle. `angle` must be below the circumference.
    #[inline]
    pub fn sine(&self, angle: u32) -> f64 {
        self.sin[angle as usize]
    }

    /// Cached `cos` of a discrete angle. `angle` must be below the circumference.
    #[inline]
    pub fn cosine(&self, angle: u32) -> f64 {
        self.cos[angle as usize]
    }

    /// Signed distance of the line through `(x, y)` with normal angle `angle`:
    /// `x·cos + y·sin`, rounded to the nearest pixel.
    #[inline]
    pub fn project(&self, x: i32, y: i32, angle: u32) -> i64 {
        let i = angle as usize;
        (x as f64 * self.cos[i] + y as f64 * self.sin[i]).round() as i64
    }

    pub fn len(&self) -> usize {
        self.sin.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sin.is_empty()
    }
}
