//! # Analytic Field (`bfield/B_GS`)
//!
//! Stores the parameters of an analytic Grad-Shafranov equilibrium, and
//! derives a tabulated `B_2D` field from the same parameters.

use std::path::Path;

use hdf5::File;
use tracing::info;

use crate::bfield::b_2d::{self, B2dInput};
use crate::bfield::{open_instance, replace_instance, BfieldType};
use crate::error::{Error, Result};
use crate::geometry::RzGrid;
use crate::hdf5io::dataset::{read_dataset, read_f64, write_dataset, write_f64};
use crate::mhd::{AnalyticEquilibrium, PsiCoefficients};

/// Contents of a `B_GS` input
#[derive(Debug, Clone, PartialEq)]
pub struct BGsInput {
    /// Axis R (m)
    pub r0: f64,
    /// Axis z (m)
    pub z0: f64,
    /// On-axis toroidal field (T)
    pub b_phi0: f64,
    /// ψ at axis
    pub psi0: f64,
    /// ψ at separatrix
    pub psi1: f64,
    pub psi_mult: f64,
    pub psi_coeff: PsiCoefficients,
}

impl BGsInput {
    pub fn equilibrium(&self) -> AnalyticEquilibrium {
        AnalyticEquilibrium::new(self.r0, self.z0, self.b_phi0, self.psi_mult, self.psi_coeff)
    }
}

/// Write `bfield/B_GS` as 8-byte floats, replacing a previous one and
/// setting the group type to `B_GS`.
pub fn write_hdf5(path: impl AsRef<Path>, input: &BGsInput) -> Result<()> {
    let file = File::append(path.as_ref())?;
    let group = replace_instance(&file, BfieldType::Gs)?;

    write_f64(&group, "R0", input.r0)?;
    write_f64(&group, "z0", input.z0)?;
    write_f64(&group, "B_phi0", input.b_phi0)?;
    write_f64(&group, "psi0", input.psi0)?;
    write_f64(&group, "psi1", input.psi1)?;
    write_f64(&group, "psi_mult", input.psi_mult)?;
    write_dataset(&group, "psi_coeff", &input.psi_coeff.as_slice().to_vec().into())?;

    drop(group);
    file.close()?;
    Ok(())
}

/// Read `bfield/B_GS`
pub fn read_hdf5(path: impl AsRef<Path>) -> Result<BGsInput> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::not_found(path.display().to_string()));
    }
    let file = File::open(path)?;
    let group = open_instance(&file, BfieldType::Gs)?;

    let coeff = read_dataset(&group, "psi_coeff")?.to_f64();
    let coeff: Vec<f64> = coeff.iter().copied().collect();

    Ok(BGsInput {
        r0: read_f64(&group, "R0")?,
        z0: read_f64(&group, "z0")?,
        b_phi0: read_f64(&group, "B_phi0")?,
        psi0: read_f64(&group, "psi0")?,
        psi1: read_f64(&group, "psi1")?,
        psi_mult: read_f64(&group, "psi_mult")?,
        psi_coeff: PsiCoefficients::try_from(coeff.as_slice())?,
    })
}

/// Tabulate the analytic field on a grid.
///
/// ψ and B_φ are evaluated pointwise; B_R and B_z are left zero. The
/// separatrix flux is fixed at 0.
pub fn derive_b_2d(eq: &AnalyticEquilibrium, grid: &RzGrid) -> B2dInput {
    let maps = eq.field_maps(grid);
    B2dInput {
        rlim: grid.rlim(),
        zlim: grid.zlim(),
        psi: maps.psi,
        br: maps.br,
        bphi: maps.bphi,
        bz: maps.bz,
        axis: [eq.r0, eq.z0],
        psivals: [eq.axis_psi(), 0.0],
    }
}

/// Write the analytic field as a `B_2D` input on the grid given by
/// `[min, max, count]` triples for R and z.
pub fn write_hdf5_b_2d(
    path: impl AsRef<Path>,
    eq: &AnalyticEquilibrium,
    rgrid: [f64; 3],
    zgrid: [f64; 3],
) -> Result<()> {
    let grid = RzGrid::from_triples(rgrid, zgrid)?;
    let input = derive_b_2d(eq, &grid);
    info!(nr = grid.nr(), nz = grid.nz(), "deriving B_2D from analytic field");
    b_2d::write_hdf5(path, &input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bfield::active_type;
    use crate::constants::BFIELD_GROUP;
    use crate::hdf5io::dataset::Data;
    use crate::mhd::N_PSI_COEFF;
    use approx::assert_relative_eq;

    fn sample() -> BGsInput {
        let mut c = [0.0; N_PSI_COEFF];
        c[0] = 0.02;
        c[1] = -0.13;
        c[3] = -0.06;
        c[12] = -0.155;
        BGsInput {
            r0: 6.2,
            z0: 0.0,
            b_phi0: 5.3,
            psi0: -0.5,
            psi1: 0.0,
            psi_mult: 200.0,
            psi_coeff: PsiCoefficients(c),
        }
    }

    #[test]
    fn test_b_gs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgs.h5");
        write_hdf5(&path, &sample()).unwrap();

        assert_eq!(read_hdf5(&path).unwrap(), sample());
        assert_eq!(active_type(&path).unwrap(), BfieldType::Gs);
    }

    #[test]
    fn test_rewrite_leaves_no_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgs.h5");
        write_hdf5(&path, &sample()).unwrap();
        {
            let file = File::append(&path).unwrap();
            let group = file.group("bfield/B_GS").unwrap();
            write_dataset(&group, "stale", &Data::from(1.0)).unwrap();
        }

        let mut second = sample();
        second.b_phi0 = 2.0;
        write_hdf5(&path, &second).unwrap();

        let file = File::open(&path).unwrap();
        let group = file.group("bfield/B_GS").unwrap();
        assert!(!group.link_exists("stale"));
        assert_eq!(read_f64(&group, "B_phi0").unwrap(), 2.0);
        assert_eq!(active_type(&path).unwrap(), BfieldType::Gs);
    }

    #[test]
    fn test_type_follows_last_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgs.h5");
        write_hdf5(&path, &sample()).unwrap();

        let eq = sample().equilibrium();
        write_hdf5_b_2d(&path, &eq, [4.0, 8.0, 5.0], [-3.0, 3.0, 4.0]).unwrap();
        assert_eq!(active_type(&path).unwrap(), BfieldType::TwoD);

        // B_GS stays in the file
        assert_eq!(read_hdf5(&path).unwrap(), sample());
        write_hdf5(&path, &sample()).unwrap();
        assert_eq!(active_type(&path).unwrap(), BfieldType::Gs);

        let file = File::open(&path).unwrap();
        let bfield = file.group(BFIELD_GROUP).unwrap();
        assert_eq!(bfield.attr_names().unwrap(), vec!["type".to_string()]);
    }

    #[test]
    fn test_derive_b_2d_grid() {
        let eq = AnalyticEquilibrium::new(1.0, 0.0, 2.0, 1.0, sample().psi_coeff);
        let grid = RzGrid::from_triples([1.0, 2.0, 3.0], [0.0, 1.0, 3.0]).unwrap();
        let b2d = derive_b_2d(&eq, &grid);

        assert_eq!(b2d.rlim, [1.0, 2.0]);
        assert_eq!(b2d.zlim, [0.0, 1.0]);
        assert_eq!(b2d.shape(), (3, 3));
        assert_eq!(b2d.axis, [1.0, 0.0]);
        assert_eq!(b2d.psivals[1], 0.0);
        assert_relative_eq!(b2d.psivals[0], eq.psi(1.0, 0.0));

        // [z, R]: z = 0.5 row, R = 2 column
        assert_relative_eq!(b2d.psi[[1, 2]], eq.psi(2.0, 0.5));
        assert_relative_eq!(b2d.bphi[[1, 2]], 1.0);
        assert!(b2d.br.iter().chain(b2d.bz.iter()).all(|&v| v == 0.0));
    }

    #[test]
    fn test_write_b_2d_from_analytic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("derived.h5");
        let eq = sample().equilibrium();

        write_hdf5_b_2d(&path, &eq, [4.0, 8.0, 9.0], [-4.0, 4.0, 7.0]).unwrap();
        let b2d = b_2d::read_hdf5(&path).unwrap();
        assert_eq!(b2d.shape(), (7, 9));
        assert_relative_eq!(b2d.bphi[[3, 0]], 5.3 * 6.2 / 4.0);
        assert_eq!(b2d.psivals[1], 0.0);
    }

    #[test]
    fn test_bad_grid_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("derived.h5");
        let eq = sample().equilibrium();
        let err = write_hdf5_b_2d(&path, &eq, [4.0, 8.0, 0.0], [-4.0, 4.0, 7.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidGrid(_)));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_hdf5(dir.path().join("nope.h5")).unwrap_err().is_not_found());
    }
}
