//! # Simulation Context
//!
//! The state an interactive session works with: which file is open, which
//! inputs it holds, and something that can evaluate field quantities on an
//! Rz grid. Components receive this explicitly.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use hdf5::File;
use ndarray::Array2;
use tracing::debug;

use crate::bfield::{self, b_gs, BfieldType};
use crate::config::RzConfig;
use crate::constants::DEG_TO_RAD;
use crate::error::{Error, Result};
use crate::geometry::{AxisSpec, RzGrid};
use crate::hdf5io::group::leaf_name;
use crate::mhd::AnalyticEquilibrium;

/// Input kinds an evaluator can be initialized with
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Bfield,
    Efield,
    Plasma,
    Neutral,
    Boozer,
    Mhd,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Bfield,
        Capability::Efield,
        Capability::Plasma,
        Capability::Neutral,
        Capability::Boozer,
        Capability::Mhd,
    ];

    /// Top-level group holding this input
    pub fn group_name(&self) -> &'static str {
        match self {
            Capability::Bfield => "bfield",
            Capability::Efield => "efield",
            Capability::Plasma => "plasma",
            Capability::Neutral => "neutral",
            Capability::Boozer => "boozer",
            Capability::Mhd => "mhd",
        }
    }

    /// Quantities that become available when this input is present
    pub fn quantities(&self) -> &'static [&'static str] {
        match self {
            Capability::Bfield => &["br", "bphi", "bz", "bnorm", "psi", "rho"],
            Capability::Efield => &["er", "ephi", "ez", "enorm"],
            Capability::Plasma => &["ne", "te", "ni", "ti"],
            Capability::Neutral => &["n0"],
            Capability::Boozer => &["theta", "zeta"],
            Capability::Mhd => &["alphaeig", "phieig"],
        }
    }
}

/// Inputs present in a file, computed once when it is opened
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn from_group_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        CapabilitySet(
            Capability::ALL
                .into_iter()
                .filter(|c| names.iter().any(|n| n.as_ref() == c.group_name()))
                .collect(),
        )
    }

    pub fn contains(&self, cap: Capability) -> bool {
        self.0.contains(&cap)
    }

    pub fn insert(&mut self, cap: Capability) {
        self.0.insert(cap);
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Quantities of all present inputs, in canonical input order
    pub fn quantities(&self) -> Vec<&'static str> {
        self.iter().flat_map(|c| c.quantities().iter().copied()).collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        CapabilitySet(iter.into_iter().collect())
    }
}

/// Rz evaluation request
#[derive(Debug, Clone, PartialEq)]
pub struct RzRequest {
    pub r: AxisSpec,
    pub z: AxisSpec,
    /// Toroidal angle (deg)
    pub phi_deg: f64,
    /// Time (s)
    pub time: f64,
    /// Color range; `None` ends are left to the renderer
    pub clim: [Option<f64>; 2],
}

impl RzRequest {
    pub fn from_config(cfg: &RzConfig) -> Result<Self> {
        Ok(Self {
            r: AxisSpec::new(cfg.rmin, cfg.rmax, cfg.nr)?,
            z: AxisSpec::new(cfg.zmin, cfg.zmax, cfg.nz)?,
            phi_deg: cfg.phi,
            time: cfg.time,
            clim: [None, None],
        })
    }

    /// Toroidal angle (rad)
    pub fn phi(&self) -> f64 {
        self.phi_deg * DEG_TO_RAD
    }

    pub fn grid(&self) -> RzGrid {
        RzGrid::new(self.r, self.z)
    }
}

/// Evaluates physical quantities over an Rz grid
pub trait FieldEvaluator {
    /// Load the inputs named in `capabilities`
    fn init(&mut self, capabilities: &CapabilitySet) -> Result<()>;

    /// Quantities this evaluator provides once initialized
    fn quantities(&self) -> Vec<&'static str>;

    /// Evaluate `quantity` over the request grid, shaped `(nz, nr)`
    fn eval_rz(&self, request: &RzRequest, quantity: &str) -> Result<Array2<f64>>;

    /// Flux at the separatrix, for contouring the plasma boundary
    fn separatrix_psi(&self) -> Option<f64>;
}

/// Evaluator backed by an analytic `B_GS` field
#[derive(Debug, Clone)]
pub struct AnalyticEvaluator {
    equilibrium: AnalyticEquilibrium,
    psi_axis: f64,
    psi_sep: f64,
    ready: bool,
}

impl AnalyticEvaluator {
    pub fn new(equilibrium: AnalyticEquilibrium, psi_axis: f64, psi_sep: f64) -> Self {
        Self {
            equilibrium,
            psi_axis,
            psi_sep,
            ready: false,
        }
    }

    pub fn from_input(input: &b_gs::BGsInput) -> Self {
        Self::new(input.equilibrium(), input.psi0, input.psi1)
    }

    fn rho(&self, psi: f64) -> f64 {
        ((psi - self.psi_axis) / (self.psi_sep - self.psi_axis)).max(0.0).sqrt()
    }
}

impl FieldEvaluator for AnalyticEvaluator {
    fn init(&mut self, capabilities: &CapabilitySet) -> Result<()> {
        if !capabilities.contains(Capability::Bfield) {
            return Err(Error::MissingCapability(Capability::Bfield));
        }
        self.ready = true;
        Ok(())
    }

    fn quantities(&self) -> Vec<&'static str> {
        if self.ready {
            Capability::Bfield.quantities().to_vec()
        } else {
            Vec::new()
        }
    }

    fn eval_rz(&self, request: &RzRequest, quantity: &str) -> Result<Array2<f64>> {
        if !self.ready {
            return Err(Error::MissingCapability(Capability::Bfield));
        }
        let grid = request.grid();
        let eq = &self.equilibrium;
        // Axisymmetric and static: phi and time do not enter
        let out = match quantity {
            "psi" => eq.flux_map(&grid),
            "rho" => eq.flux_map(&grid).mapv(|psi| self.rho(psi)),
            "bphi" => eq.b_phi_map(&grid),
            "bnorm" => eq.b_phi_map(&grid).mapv(f64::abs),
            "br" | "bz" => Array2::zeros(grid.shape()),
            other => return Err(Error::UnknownQuantity(other.to_string())),
        };
        Ok(out)
    }

    fn separatrix_psi(&self) -> Option<f64> {
        self.ready.then_some(self.psi_sep)
    }
}

/// An open ASCOT5 file and the inputs it holds
#[derive(Debug, Clone)]
pub struct Ascot5 {
    path: PathBuf,
    capabilities: CapabilitySet,
}

impl Ascot5 {
    /// Open `path` and record which inputs are present
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::not_found(path.display().to_string()));
        }
        let file = File::open(path)?;
        let names = file.groups()?.iter().map(|g| leaf_name(&g.name())).collect::<Vec<_>>();
        let capabilities = CapabilitySet::from_group_names(names);
        debug!(path = %path.display(), ?capabilities, "opened file");
        Ok(Self {
            path: path.to_path_buf(),
            capabilities,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn quantities(&self) -> Vec<&'static str> {
        self.capabilities.quantities()
    }

    /// Initialized evaluator over the file's analytic field
    pub fn analytic_evaluator(&self) -> Result<AnalyticEvaluator> {
        if !self.capabilities.contains(Capability::Bfield) {
            return Err(Error::MissingCapability(Capability::Bfield));
        }
        let kind = bfield::active_type(&self.path)?;
        if kind != BfieldType::Gs {
            return Err(Error::InvalidValue(format!("active field is {}, not B_GS", kind)));
        }
        let mut evaluator = AnalyticEvaluator::from_input(&b_gs::read_hdf5(&self.path)?);
        evaluator.init(&self.capabilities)?;
        Ok(evaluator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bfield::b_gs::BGsInput;
    use crate::mhd::{PsiCoefficients, N_PSI_COEFF};
    use approx::assert_relative_eq;

    fn gs_input() -> BGsInput {
        let mut c = [0.0; N_PSI_COEFF];
        c[1] = -0.1;
        c[12] = 0.5;
        BGsInput {
            r0: 1.0,
            z0: 0.0,
            b_phi0: 2.0,
            psi0: -1.0,
            psi1: 0.0,
            psi_mult: 1.0,
            psi_coeff: PsiCoefficients(c),
        }
    }

    fn small_request() -> RzRequest {
        RzRequest {
            r: AxisSpec::new(1.0, 2.0, 3).unwrap(),
            z: AxisSpec::new(0.0, 1.0, 3).unwrap(),
            phi_deg: 90.0,
            time: 0.0,
            clim: [None, Some(1.0)],
        }
    }

    #[test]
    fn test_capabilities_from_groups() {
        let caps = CapabilitySet::from_group_names(["options", "plasma", "bfield", "markers"]);
        assert!(caps.contains(Capability::Bfield));
        assert!(caps.contains(Capability::Plasma));
        assert!(!caps.contains(Capability::Efield));

        let q = caps.quantities();
        // bfield quantities come before plasma quantities
        assert_eq!(q[0], "br");
        assert!(q.contains(&"ne"));
        assert!(!q.contains(&"er"));
    }

    #[test]
    fn test_request_from_config() {
        let req = RzRequest::from_config(&RzConfig::default()).unwrap();
        let grid = req.grid();
        assert_eq!(grid.shape(), (50, 50));
        assert_eq!(grid.z[0], 8.0);
        assert_eq!(grid.z[49], -8.0);

        let req = small_request();
        assert_relative_eq!(req.phi(), std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_evaluator_requires_init() {
        let mut ev = AnalyticEvaluator::from_input(&gs_input());
        assert!(ev.quantities().is_empty());
        assert!(ev.eval_rz(&small_request(), "psi").is_err());
        assert_eq!(ev.separatrix_psi(), None);

        let err = ev.init(&CapabilitySet::default()).unwrap_err();
        assert!(matches!(err, Error::MissingCapability(Capability::Bfield)));

        ev.init(&[Capability::Bfield].into_iter().collect()).unwrap();
        assert_eq!(ev.separatrix_psi(), Some(0.0));
        assert!(ev.quantities().contains(&"rho"));
    }

    #[test]
    fn test_evaluator_quantities() {
        let mut ev = AnalyticEvaluator::from_input(&gs_input());
        ev.init(&[Capability::Bfield].into_iter().collect()).unwrap();
        let req = small_request();

        let bphi = ev.eval_rz(&req, "bphi").unwrap();
        assert_eq!(bphi.dim(), (3, 3));
        assert_relative_eq!(bphi[[0, 2]], 1.0);

        let eq = gs_input().equilibrium();
        let psi = ev.eval_rz(&req, "psi").unwrap();
        assert_relative_eq!(psi[[2, 1]], eq.psi(1.5, 1.0));

        let rho = ev.eval_rz(&req, "rho").unwrap();
        let expected = (eq.psi(1.5, 1.0) + 1.0).max(0.0).sqrt();
        assert_relative_eq!(rho[[2, 1]], expected);

        assert!(ev.eval_rz(&req, "br").unwrap().iter().all(|&v| v == 0.0));
        assert!(matches!(ev.eval_rz(&req, "ne"), Err(Error::UnknownQuantity(_))));
    }

    #[test]
    fn test_open_file_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.h5");
        b_gs::write_hdf5(&path, &gs_input()).unwrap();

        let ctx = Ascot5::open(&path).unwrap();
        assert!(ctx.capabilities().contains(Capability::Bfield));
        assert_eq!(ctx.quantities(), Capability::Bfield.quantities().to_vec());

        let ev = ctx.analytic_evaluator().unwrap();
        let bphi = ev.eval_rz(&small_request(), "bphi").unwrap();
        assert_relative_eq!(bphi[[1, 0]], 2.0);
    }

    #[test]
    fn test_root_dataset_is_not_a_capability() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.h5");
        {
            let file = File::create(&path).unwrap();
            crate::hdf5io::dataset::write_f64(&file, "bfield", 1.0).unwrap();
        }
        let ctx = Ascot5::open(&path).unwrap();
        assert!(!ctx.capabilities().contains(Capability::Bfield));
    }

    #[test]
    fn test_open_without_bfield() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.h5");
        File::create(&path).unwrap();

        let ctx = Ascot5::open(&path).unwrap();
        assert!(ctx.capabilities().is_empty());
        assert!(matches!(
            ctx.analytic_evaluator(),
            Err(Error::MissingCapability(Capability::Bfield))
        ));
        assert!(Ascot5::open(dir.path().join("nope.h5")).unwrap_err().is_not_found());
    }
}
