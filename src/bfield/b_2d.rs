//! # Tabulated 2D Field (`bfield/B_2D`)
//!
//! ψ and the three field components on a rectangular (R, z) grid, plus the
//! magnetic axis and the flux values at axis and separatrix.

use std::path::Path;

use hdf5::File;
use ndarray::{Array2, ErrorKind, ShapeError};

use crate::bfield::{open_instance, replace_instance, BfieldType};
use crate::error::{Error, Result};
use crate::hdf5io::dataset::{read_dataset, read_f64, write_dataset, write_f64, Data};

/// Contents of a `B_2D` input. Arrays are shaped `(n_z, n_r)`.
#[derive(Debug, Clone, PartialEq)]
pub struct B2dInput {
    /// `[r_min, r_max]` (m)
    pub rlim: [f64; 2],
    /// `[z_min, z_max]` (m)
    pub zlim: [f64; 2],
    pub psi: Array2<f64>,
    pub br: Array2<f64>,
    pub bphi: Array2<f64>,
    pub bz: Array2<f64>,
    /// Magnetic axis `[R, z]` (m)
    pub axis: [f64; 2],
    /// `[psi at axis, psi at separatrix]`
    pub psivals: [f64; 2],
}

impl B2dInput {
    /// `(n_z, n_r)`
    pub fn shape(&self) -> (usize, usize) {
        self.psi.dim()
    }

    fn check_shapes(&self) -> Result<()> {
        let dim = self.psi.dim();
        if self.br.dim() != dim || self.bphi.dim() != dim || self.bz.dim() != dim {
            return Err(ShapeError::from_kind(ErrorKind::IncompatibleShape).into());
        }
        Ok(())
    }
}

/// Write `bfield/B_2D`, replacing a previous one and setting the group
/// type to `B_2D`.
pub fn write_hdf5(path: impl AsRef<Path>, input: &B2dInput) -> Result<()> {
    input.check_shapes()?;
    let (n_z, n_r) = input.shape();

    let file = File::append(path.as_ref())?;
    let group = replace_instance(&file, BfieldType::TwoD)?;

    write_f64(&group, "r_min", input.rlim[0])?;
    write_f64(&group, "r_max", input.rlim[1])?;
    write_dataset(&group, "n_r", &Data::from(n_r as i64))?;
    write_f64(&group, "z_min", input.zlim[0])?;
    write_f64(&group, "z_max", input.zlim[1])?;
    write_dataset(&group, "n_z", &Data::from(n_z as i64))?;

    write_dataset(&group, "psi", &input.psi.clone().into())?;
    write_dataset(&group, "B_r", &input.br.clone().into())?;
    write_dataset(&group, "B_phi", &input.bphi.clone().into())?;
    write_dataset(&group, "B_z", &input.bz.clone().into())?;

    write_f64(&group, "axis_r", input.axis[0])?;
    write_f64(&group, "axis_z", input.axis[1])?;
    write_f64(&group, "psi0", input.psivals[0])?;
    write_f64(&group, "psi1", input.psivals[1])?;

    drop(group);
    file.close()?;
    Ok(())
}

/// Read `bfield/B_2D`
pub fn read_hdf5(path: impl AsRef<Path>) -> Result<B2dInput> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::not_found(path.display().to_string()));
    }
    let file = File::open(path)?;
    let group = open_instance(&file, BfieldType::TwoD)?;

    let grid = |name: &str| -> Result<Array2<f64>> {
        Ok(read_dataset(&group, name)?.to_f64().into_dimensionality()?)
    };

    let input = B2dInput {
        rlim: [read_f64(&group, "r_min")?, read_f64(&group, "r_max")?],
        zlim: [read_f64(&group, "z_min")?, read_f64(&group, "z_max")?],
        psi: grid("psi")?,
        br: grid("B_r")?,
        bphi: grid("B_phi")?,
        bz: grid("B_z")?,
        axis: [read_f64(&group, "axis_r")?, read_f64(&group, "axis_z")?],
        psivals: [read_f64(&group, "psi0")?, read_f64(&group, "psi1")?],
    };
    input.check_shapes()?;
    Ok(input)
}
