//! # Analytic Grad-Shafranov Solutions
//!
//! Closed-form flux functions for up-down asymmetric tokamak equilibria.
//!
//! ## The Grad-Shafranov Equation
//!
//! With the Solov'ev choice of profiles (p' and FF' constant) and
//! normalized coordinates x = R/R0, y = z/R0, the equation becomes
//!
//! Δ*ψ = x ∂/∂x (1/x ∂ψ/∂x) + ∂²ψ/∂y² = (1 - A) x² + A
//!
//! A particular solution is (1 - A) x⁴/8 + A x² ln(x)/2. Twelve polynomial
//! homogeneous solutions are added on top, each weighted by a coefficient
//! chosen to fit the plasma boundary. The basis description is therefore
//! 13 numbers: c[0..12] weight the homogeneous terms and c[12] is A.

use crate::error::{Error, Result};

/// Number of coefficients describing one analytic equilibrium
pub const N_PSI_COEFF: usize = 13;

/// Homogeneous-solution weights plus the profile parameter A
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsiCoefficients(pub [f64; N_PSI_COEFF]);

impl PsiCoefficients {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Profile parameter A
    pub fn a(&self) -> f64 {
        self.0[12]
    }
}

impl TryFrom<&[f64]> for PsiCoefficients {
    type Error = Error;

    fn try_from(c: &[f64]) -> Result<Self> {
        let arr: [f64; N_PSI_COEFF] = c.try_into().map_err(|_| Error::CoefficientCount {
            expected: N_PSI_COEFF,
            found: c.len(),
        })?;
        Ok(PsiCoefficients(arr))
    }
}

impl From<[f64; N_PSI_COEFF]> for PsiCoefficients {
    fn from(c: [f64; N_PSI_COEFF]) -> Self {
        PsiCoefficients(c)
    }
}

/// Unscaled flux at normalized coordinates x = R/R0, y = z/R0
pub fn psi0(x: f64, y: f64, c: &PsiCoefficients) -> f64 {
    let c = &c.0;
    let lx = x.ln();

    let x2 = x * x;
    let x4 = x2 * x2;
    let x6 = x4 * x2;
    let y2 = y * y;
    let y3 = y2 * y;
    let y4 = y2 * y2;
    let y5 = y4 * y;
    let y6 = y4 * y2;

    // Particular solution
    let particular = (1.0 - c[12]) * x4 / 8.0 + c[12] * x2 * lx / 2.0;

    // Up-down symmetric homogeneous solutions
    let even = c[0]
        + c[1] * x2
        + c[2] * (y2 - x2 * lx)
        + c[3] * (x4 - 4.0 * x2 * y2)
        + c[4] * (2.0 * y4 - 9.0 * y2 * x2 + 3.0 * x4 * lx - 12.0 * x2 * y2 * lx)
        + c[5] * (x6 - 12.0 * x4 * y2 + 8.0 * x2 * y4)
        + c[6]
            * (8.0 * y6 - 140.0 * y4 * x2 + 75.0 * y2 * x4 - 15.0 * x6 * lx
                + 180.0 * x4 * y2 * lx
                - 120.0 * x2 * y4 * lx);

    // Odd in y
    let odd = c[7] * y
        + c[8] * y * x2
        + c[9] * (y3 - 3.0 * y * x2 * lx)
        + c[10] * (3.0 * y * x4 - 4.0 * y3 * x2)
        + c[11] * (8.0 * y5 - 45.0 * y * x4 - 80.0 * y3 * x2 * lx + 60.0 * y * x4 * lx);

    particular + even + odd
}
