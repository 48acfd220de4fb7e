//! # Configuration
//!
//! Command-line defaults and input descriptions read from TOML.
//!
//! ```toml
//! file = "ascot5.h5"
//! description = "No description."
//!
//! [rz]
//! rmin = 0.1
//! rmax = 10.0
//! nr = 50
//! zmin = 8.0
//! zmax = -8.0
//! nz = 50
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::bfield::b_gs::BGsInput;
use crate::constants::DEFAULT_DESCRIPTION;
use crate::error::Result;
use crate::mhd::{AnalyticEquilibrium, PsiCoefficients};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HDF5 file operated on when none is given on the command line
    pub file: PathBuf,
    /// Description given to new input instances
    pub description: String,
    /// Rz evaluation grid
    pub rz: RzConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: PathBuf::from("ascot5.h5"),
            description: DEFAULT_DESCRIPTION.to_string(),
            rz: RzConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }
}

/// Rz evaluation grid and slice
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RzConfig {
    pub rmin: f64,
    pub rmax: f64,
    pub nr: usize,
    pub zmin: f64,
    pub zmax: f64,
    pub nz: usize,
    /// Toroidal angle (deg)
    pub phi: f64,
    /// Time (s)
    pub time: f64,
}

impl Default for RzConfig {
    fn default() -> Self {
        Self {
            rmin: 0.1,
            rmax: 10.0,
            nr: 50,
            zmin: 8.0,
            zmax: -8.0,
            nz: 50,
            phi: 0.0,
            time: 0.0,
        }
    }
}

/// Analytic field description, as given to `bfield write-gs` and
/// `bfield write-2d`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GsConfig {
    #[serde(rename = "R0")]
    pub r0: f64,
    pub z0: f64,
    #[serde(rename = "B_phi0")]
    pub b_phi0: f64,
    #[serde(default)]
    pub psi0: f64,
    #[serde(default)]
    pub psi1: f64,
    pub psi_mult: f64,
    pub psi_coeff: Vec<f64>,
    /// `[min, max, count]`, used when tabulating to `B_2D`
    pub rgrid: Option<[f64; 3]>,
    pub zgrid: Option<[f64; 3]>,
}

impl GsConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn coefficients(&self) -> Result<PsiCoefficients> {
        PsiCoefficients::try_from(self.psi_coeff.as_slice())
    }

    pub fn to_input(&self) -> Result<BGsInput> {
        Ok(BGsInput {
            r0: self.r0,
            z0: self.z0,
            b_phi0: self.b_phi0,
            psi0: self.psi0,
            psi1: self.psi1,
            psi_mult: self.psi_mult,
            psi_coeff: self.coefficients()?,
        })
    }

    pub fn equilibrium(&self) -> Result<AnalyticEquilibrium> {
        Ok(AnalyticEquilibrium::new(
            self.r0,
            self.z0,
            self.b_phi0,
            self.psi_mult,
            self.coefficients()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.rz.nr, 50);
        assert_eq!(cfg.rz.zmin, 8.0);
        assert_eq!(cfg.description, "No description.");
    }

    #[test]
    fn test_partial_override() {
        let cfg = Config::from_toml(
            r#"
            file = "iter.h5"
            [rz]
            rmin = 4.0
            nr = 100
            "#,
        )
        .unwrap();
        assert_eq!(cfg.file, PathBuf::from("iter.h5"));
        assert_eq!(cfg.rz.rmin, 4.0);
        assert_eq!(cfg.rz.nr, 100);
        assert_eq!(cfg.rz.rmax, 10.0);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(Config::from_toml("rz = 3"), Err(Error::Config(_))));
    }

    #[test]
    fn test_gs_config() {
        let gs = GsConfig::from_toml(
            r#"
            R0 = 6.2
            z0 = 0.0
            B_phi0 = 5.3
            psi_mult = 200.0
            psi_coeff = [0.02, -0.13, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -0.155]
            rgrid = [4.0, 8.5, 120]
            zgrid = [-5.0, 5.0, 200]
            "#,
        )
        .unwrap();

        let input = gs.to_input().unwrap();
        assert_eq!(input.r0, 6.2);
        assert_eq!(input.psi_coeff.a(), -0.155);
        assert_eq!(gs.rgrid, Some([4.0, 8.5, 120.0]));
        assert_eq!(gs.equilibrium().unwrap().b_phi0, 5.3);
    }

    #[test]
    fn test_gs_config_short_coefficients() {
        let text = "R0 = 1.0\nz0 = 0.0\nB_phi0 = 1.0\npsi_mult = 1.0\npsi_coeff = [1.0]";
        let gs = GsConfig::from_toml(text).unwrap();
        assert!(matches!(gs.to_input(), Err(Error::CoefficientCount { found: 1, .. })));
    }
}
