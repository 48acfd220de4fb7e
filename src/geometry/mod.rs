//! # Geometry Module
//!
//! Rectangular (R, z) grids in the poloidal plane. Two-dimensional arrays
//! over a grid are indexed `[z-index, R-index]`.

use ndarray::{Array1, Array2};

use crate::error::{Error, Result};

/// One axis given as `[min, max, count]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSpec {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl AxisSpec {
    pub fn new(min: f64, max: f64, count: usize) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidGrid(format!("non-finite limits [{}, {}]", min, max)));
        }
        if count == 0 {
            return Err(Error::InvalidGrid("grid needs at least one point".into()));
        }
        Ok(Self { min, max, count })
    }

    /// Build from a `[min, max, count]` triple. The count is truncated
    /// toward zero.
    pub fn from_triple(triple: [f64; 3]) -> Result<Self> {
        let [min, max, count] = triple;
        if !count.is_finite() || count < 1.0 {
            return Err(Error::InvalidGrid(format!("invalid point count {}", count)));
        }
        Self::new(min, max, count as usize)
    }

    /// Evenly spaced points from `min` to `max` inclusive
    pub fn points(&self) -> Array1<f64> {
        linspace(self.min, self.max, self.count)
    }
}

/// `n` evenly spaced points over `[start, stop]`, the last one exactly `stop`
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    let mut pts = Array1::linspace(start, stop, n);
    // start + (n - 1) * step can round away from stop
    if n > 1 {
        pts[n - 1] = stop;
    }
    pts
}

/// Tensor-product grid of R and z coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct RzGrid {
    /// R coordinates (m)
    pub r: Array1<f64>,
    /// z coordinates (m)
    pub z: Array1<f64>,
}

impl RzGrid {
    pub fn new(r: AxisSpec, z: AxisSpec) -> Self {
        Self {
            r: r.points(),
            z: z.points(),
        }
    }

    /// Grid from `[min, max, count]` triples for R and z
    pub fn from_triples(rgrid: [f64; 3], zgrid: [f64; 3]) -> Result<Self> {
        Ok(Self::new(AxisSpec::from_triple(rgrid)?, AxisSpec::from_triple(zgrid)?))
    }

    pub fn nr(&self) -> usize {
        self.r.len()
    }

    pub fn nz(&self) -> usize {
        self.z.len()
    }

    /// Shape of arrays over this grid, `(nz, nr)`
    pub fn shape(&self) -> (usize, usize) {
        (self.nz(), self.nr())
    }

    /// First and last R coordinate
    pub fn rlim(&self) -> [f64; 2] {
        [self.r[0], self.r[self.nr() - 1]]
    }

    /// First and last z coordinate
    pub fn zlim(&self) -> [f64; 2] {
        [self.z[0], self.z[self.nz() - 1]]
    }

    /// Coordinate meshes `(R, z)`, both shaped `(nz, nr)`
    pub fn mesh(&self) -> (Array2<f64>, Array2<f64>) {
        let rg = Array2::from_shape_fn(self.shape(), |(_, i)| self.r[i]);
        let zg = Array2::from_shape_fn(self.shape(), |(j, _)| self.z[j]);
        (rg, zg)
    }
}
