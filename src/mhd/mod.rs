//! # MHD Module
//!
//! Analytic tokamak equilibria.
//!
//! ## Key Equations
//!
//! Poloidal flux from the closed-form Grad-Shafranov basis:
//! ψ(R, z) = ψ_mult · ψ₀(R/R0, z/R0; c)
//!
//! Toroidal field falls off as 1/R:
//! B_φ(R) = B_φ0 · R0 / R

pub mod grad_shafranov;

use ndarray::{Array2, Zip};

use crate::geometry::RzGrid;

pub use grad_shafranov::{psi0, PsiCoefficients, N_PSI_COEFF};

/// Analytic equilibrium defined by axis position, on-axis field and
/// flux basis coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticEquilibrium {
    /// Magnetic axis R (m)
    pub r0: f64,
    /// Magnetic axis z (m)
    pub z0: f64,
    /// Toroidal field on axis (T)
    pub b_phi0: f64,
    /// Flux normalization
    pub psi_mult: f64,
    /// Basis coefficients
    pub coeff: PsiCoefficients,
}

/// Field components over an Rz grid, each shaped `(nz, nr)`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMaps {
    pub psi: Array2<f64>,
    pub br: Array2<f64>,
    pub bphi: Array2<f64>,
    pub bz: Array2<f64>,
}

impl AnalyticEquilibrium {
    pub fn new(r0: f64, z0: f64, b_phi0: f64, psi_mult: f64, coeff: PsiCoefficients) -> Self {
        Self { r0, z0, b_phi0, psi_mult, coeff }
    }

    /// Poloidal flux at (R, z). Both coordinates are normalized by R0;
    /// z is not shifted by the axis height.
    pub fn psi(&self, r: f64, z: f64) -> f64 {
        self.psi_mult * psi0(r / self.r0, z / self.r0, &self.coeff)
    }

    /// Flux at the magnetic axis
    pub fn axis_psi(&self) -> f64 {
        self.psi(self.r0, self.z0)
    }

    /// Toroidal field B_φ0 · R0 / R
    pub fn b_phi(&self, r: f64) -> f64 {
        self.b_phi0 * self.r0 / r
    }

    /// ψ over the grid
    pub fn flux_map(&self, grid: &RzGrid) -> Array2<f64> {
        let (rg, zg) = grid.mesh();
        let mut psi = Array2::zeros(grid.shape());
        Zip::from(&mut psi)
            .and(&rg)
            .and(&zg)
            .par_for_each(|p, &r, &z| *p = self.psi(r, z));
        psi
    }

    /// B_φ over the grid
    pub fn b_phi_map(&self, grid: &RzGrid) -> Array2<f64> {
        let (rg, _) = grid.mesh();
        rg.mapv(|r| self.b_phi(r))
    }

    /// All field components over the grid.
    ///
    /// B_R and B_z are zero-filled: they are not derived from ∇ψ here.
    pub fn field_maps(&self, grid: &RzGrid) -> FieldMaps {
        FieldMaps {
            psi: self.flux_map(grid),
            br: Array2::zeros(grid.shape()),
            bphi: self.b_phi_map(grid),
            bz: Array2::zeros(grid.shape()),
        }
    }
}
