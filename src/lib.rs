//! # ASCOT5IO
//!
//! HDF5 input layer for the ASCOT5 orbit-following code
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          ASCOT5IO                                           │
//! │                  ASCOT5 Inputs in Rust                                      │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │  LEVEL 1: HDF5IO   (group paths, qids, dataset read/write)                  │
//! │  LEVEL 2: INPUTS   (options, markers, bfield B_GS / B_2D)                   │
//! │  LEVEL 3: MHD      (analytic Grad-Shafranov flux, B_φ ∝ 1/R)               │
//! │  LEVEL 4: CONTEXT  (open file, capabilities, Rz evaluation)                 │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## File Layout
//!
//! | Group        | Instances           | Group attribute   |
//! |--------------|---------------------|-------------------|
//! | `options`    | `opt-<qid>`         | `active`          |
//! | `bfield`     | `B_GS`, `B_2D`      | `type`            |
//! | `markers`    | one per population  | marker counts     |

pub mod bfield;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod geometry;
pub mod hdf5io;
pub mod mhd;

// Re-exports
pub use bfield::b_2d::B2dInput;
pub use bfield::b_gs::BGsInput;
pub use bfield::BfieldType;
pub use config::{Config, GsConfig, RzConfig};
pub use constants::*;
pub use context::{AnalyticEvaluator, Ascot5, Capability, CapabilitySet, FieldEvaluator, RzRequest};
pub use error::{Error, Result};
pub use geometry::{AxisSpec, RzGrid};
pub use hdf5io::{Data, DataMap, InputData, Layout, Qid};
pub use mhd::{AnalyticEquilibrium, PsiCoefficients};

/// ascot5io version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Information about the library
pub fn info() -> String {
    format!(
        "ASCOT5IO v{}\n\
         HDF5 input layer for ASCOT5\n\
         Options, markers and analytic tokamak fields",
        VERSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info() {
        let info = info();
        assert!(info.contains("ASCOT5IO"));
        assert!(info.contains(VERSION));
    }
}
