//! # Marker Input
//!
//! Simulation markers are stored column-wise under `/markers`, split into
//! three populations:
//!
//! ```text
//! markers/                 attrs: n_particle, n_guiding_center, n_field_line
//! ├── particle/            r phi z v_r v_phi v_z anum znum weight id
//! ├── guiding_center/      r phi z energy pitch anum znum weight id
//! └── field_line/          r phi z pitch id
//! ```
//!
//! Angles are stored in degrees, mass and charge as atomic mass number and
//! charge number. Conversion to SI happens when records become markers.

use std::path::Path;

use hdf5::{File, Group};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::hdf5io::dataset::write_dataset;
use crate::hdf5io::group::{open_group, require_group};

const PARTICLE: &str = "particle";
const GUIDING_CENTER: &str = "guiding_center";
const FIELD_LINE: &str = "field_line";

/// Full-orbit particle as stored
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleRecord {
    pub r: f64,
    /// Toroidal angle (deg)
    pub phi: f64,
    pub z: f64,
    pub v_r: f64,
    pub v_phi: f64,
    pub v_z: f64,
    /// Atomic mass number
    pub anum: f64,
    /// Charge number
    pub znum: f64,
    pub weight: f64,
    pub id: f64,
}

/// Guiding center as stored
#[derive(Debug, Clone, PartialEq)]
pub struct GuidingCenterRecord {
    pub r: f64,
    /// Toroidal angle (deg)
    pub phi: f64,
    pub z: f64,
    /// Energy (eV)
    pub energy: f64,
    pub pitch: f64,
    pub anum: f64,
    pub znum: f64,
    pub weight: f64,
    pub id: f64,
}

/// Field line tracer as stored
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLineRecord {
    pub r: f64,
    /// Toroidal angle (deg)
    pub phi: f64,
    pub z: f64,
    pub pitch: f64,
    pub id: f64,
}

/// Contents of the `/markers` group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerSet {
    pub particle: Vec<ParticleRecord>,
    pub guiding_center: Vec<GuidingCenterRecord>,
    pub field_line: Vec<FieldLineRecord>,
}

/// Run state every marker starts with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStatus {
    pub time: f64,
    pub endcond: i32,
    pub walltile: i32,
    pub running: bool,
}

impl Default for MarkerStatus {
    fn default() -> Self {
        Self {
            time: 0.0,
            endcond: 0,
            walltile: 0,
            running: true,
        }
    }
}

/// Marker ready for a simulation, in SI units and radians
#[derive(Debug, Clone, PartialEq)]
pub enum InputMarker {
    Particle {
        r: f64,
        phi: f64,
        z: f64,
        v_r: f64,
        v_phi: f64,
        v_z: f64,
        /// Mass (kg)
        mass: f64,
        /// Charge (C)
        charge: f64,
        weight: f64,
        id: i64,
        status: MarkerStatus,
    },
    GuidingCenter {
        r: f64,
        phi: f64,
        z: f64,
        energy: f64,
        pitch: f64,
        mass: f64,
        charge: f64,
        weight: f64,
        id: i64,
        status: MarkerStatus,
    },
    FieldLine {
        r: f64,
        phi: f64,
        z: f64,
        pitch: f64,
        id: i64,
        status: MarkerStatus,
    },
}

impl InputMarker {
    pub fn id(&self) -> i64 {
        match self {
            InputMarker::Particle { id, .. }
            | InputMarker::GuidingCenter { id, .. }
            | InputMarker::FieldLine { id, .. } => *id,
        }
    }
}

impl MarkerSet {
    pub fn len(&self) -> usize {
        self.particle.len() + self.guiding_center.len() + self.field_line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to simulation markers: particles first, then guiding
    /// centers, then field lines. Order within a population is kept.
    pub fn to_markers(&self) -> Vec<InputMarker> {
        let mut out = Vec::with_capacity(self.len());

        out.par_extend(self.particle.par_iter().map(|p| InputMarker::Particle {
            r: p.r,
            phi: p.phi * DEG_TO_RAD,
            z: p.z,
            v_r: p.v_r,
            v_phi: p.v_phi,
            v_z: p.v_z,
            mass: p.anum * AMU,
            charge: p.znum * E_CHARGE,
            weight: p.weight,
            id: p.id as i64,
            status: MarkerStatus::default(),
        }));

        out.par_extend(self.guiding_center.par_iter().map(|p| InputMarker::GuidingCenter {
            r: p.r,
            phi: p.phi * DEG_TO_RAD,
            z: p.z,
            energy: p.energy,
            pitch: p.pitch,
            mass: p.anum * AMU,
            charge: p.znum * E_CHARGE,
            weight: p.weight,
            id: p.id as i64,
            status: MarkerStatus::default(),
        }));

        out.par_extend(self.field_line.par_iter().map(|p| InputMarker::FieldLine {
            r: p.r,
            phi: p.phi * DEG_TO_RAD,
            z: p.z,
            pitch: p.pitch,
            id: p.id as i64,
            status: MarkerStatus::default(),
        }));

        out
    }
}

/// Write `/markers`, replacing any previous marker input. Empty
/// populations get a zero count and no subgroup.
pub fn write_hdf5(path: impl AsRef<Path>, markers: &MarkerSet) -> Result<()> {
    let file = File::append(path.as_ref())?;
    if file.link_exists(MARKERS_GROUP) {
        file.unlink(MARKERS_GROUP)?;
    }
    let group = require_group(&file, MARKERS_GROUP)?;

    write_count(&group, "n_particle", markers.particle.len())?;
    write_count(&group, "n_guiding_center", markers.guiding_center.len())?;
    write_count(&group, "n_field_line", markers.field_line.len())?;

    let p = &markers.particle;
    if !p.is_empty() {
        let sub = group.create_group(PARTICLE)?;
        write_column(&sub, "r", p.iter().map(|m| m.r))?;
        write_column(&sub, "phi", p.iter().map(|m| m.phi))?;
        write_column(&sub, "z", p.iter().map(|m| m.z))?;
        write_column(&sub, "v_r", p.iter().map(|m| m.v_r))?;
        write_column(&sub, "v_phi", p.iter().map(|m| m.v_phi))?;
        write_column(&sub, "v_z", p.iter().map(|m| m.v_z))?;
        write_column(&sub, "anum", p.iter().map(|m| m.anum))?;
        write_column(&sub, "znum", p.iter().map(|m| m.znum))?;
        write_column(&sub, "weight", p.iter().map(|m| m.weight))?;
        write_column(&sub, "id", p.iter().map(|m| m.id))?;
    }

    let g = &markers.guiding_center;
    if !g.is_empty() {
        let sub = group.create_group(GUIDING_CENTER)?;
        write_column(&sub, "r", g.iter().map(|m| m.r))?;
        write_column(&sub, "phi", g.iter().map(|m| m.phi))?;
        write_column(&sub, "z", g.iter().map(|m| m.z))?;
        write_column(&sub, "energy", g.iter().map(|m| m.energy))?;
        write_column(&sub, "pitch", g.iter().map(|m| m.pitch))?;
        write_column(&sub, "anum", g.iter().map(|m| m.anum))?;
        write_column(&sub, "znum", g.iter().map(|m| m.znum))?;
        write_column(&sub, "weight", g.iter().map(|m| m.weight))?;
        write_column(&sub, "id", g.iter().map(|m| m.id))?;
    }

    let f = &markers.field_line;
    if !f.is_empty() {
        let sub = group.create_group(FIELD_LINE)?;
        write_column(&sub, "r", f.iter().map(|m| m.r))?;
        write_column(&sub, "phi", f.iter().map(|m| m.phi))?;
        write_column(&sub, "z", f.iter().map(|m| m.z))?;
        write_column(&sub, "pitch", f.iter().map(|m| m.pitch))?;
        write_column(&sub, "id", f.iter().map(|m| m.id))?;
    }

    drop(group);
    file.close()?;
    info!(n = markers.len(), "wrote markers");
    Ok(())
}

/// Read `/markers` as stored. A file without markers gives an empty set.
pub fn read_hdf5(path: impl AsRef<Path>) -> Result<MarkerSet> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::not_found(path.display().to_string()));
    }
    let file = File::open(path)?;
    if !file.link_exists(MARKERS_GROUP) {
        debug!("no marker input");
        return Ok(MarkerSet::default());
    }
    let group = file.group(MARKERS_GROUP)?;

    let n = read_count(&group, "n_particle")?;
    let particle = if n > 0 {
        let sub = open_group(&group, PARTICLE)?;
        let r = read_column(&sub, "r", n)?;
        let phi = read_column(&sub, "phi", n)?;
        let z = read_column(&sub, "z", n)?;
        let v_r = read_column(&sub, "v_r", n)?;
        let v_phi = read_column(&sub, "v_phi", n)?;
        let v_z = read_column(&sub, "v_z", n)?;
        let anum = read_column(&sub, "anum", n)?;
        let znum = read_column(&sub, "znum", n)?;
        let weight = read_column(&sub, "weight", n)?;
        let id = read_column(&sub, "id", n)?;
        (0..n)
            .map(|i| ParticleRecord {
                r: r[i],
                phi: phi[i],
                z: z[i],
                v_r: v_r[i],
                v_phi: v_phi[i],
                v_z: v_z[i],
                anum: anum[i],
                znum: znum[i],
                weight: weight[i],
                id: id[i],
            })
            .collect()
    } else {
        Vec::new()
    };

    let n = read_count(&group, "n_guiding_center")?;
    let guiding_center = if n > 0 {
        let sub = open_group(&group, GUIDING_CENTER)?;
        let r = read_column(&sub, "r", n)?;
        let phi = read_column(&sub, "phi", n)?;
        let z = read_column(&sub, "z", n)?;
        let energy = read_column(&sub, "energy", n)?;
        let pitch = read_column(&sub, "pitch", n)?;
        let anum = read_column(&sub, "anum", n)?;
        let znum = read_column(&sub, "znum", n)?;
        let weight = read_column(&sub, "weight", n)?;
        let id = read_column(&sub, "id", n)?;
        (0..n)
            .map(|i| GuidingCenterRecord {
                r: r[i],
                phi: phi[i],
                z: z[i],
                energy: energy[i],
                pitch: pitch[i],
                anum: anum[i],
                znum: znum[i],
                weight: weight[i],
                id: id[i],
            })
            .collect()
    } else {
        Vec::new()
    };

    let n = read_count(&group, "n_field_line")?;
    let field_line = if n > 0 {
        let sub = open_group(&group, FIELD_LINE)?;
        let r = read_column(&sub, "r", n)?;
        let phi = read_column(&sub, "phi", n)?;
        let z = read_column(&sub, "z", n)?;
        let pitch = read_column(&sub, "pitch", n)?;
        let id = read_column(&sub, "id", n)?;
        (0..n)
            .map(|i| FieldLineRecord {
                r: r[i],
                phi: phi[i],
                z: z[i],
                pitch: pitch[i],
                id: id[i],
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(MarkerSet {
        particle,
        guiding_center,
        field_line,
    })
}

/// Read `/markers` and convert to simulation markers
pub fn read_markers(path: impl AsRef<Path>) -> Result<Vec<InputMarker>> {
    Ok(read_hdf5(path)?.to_markers())
}

fn write_count(group: &Group, name: &str, n: usize) -> Result<()> {
    let n = i32::try_from(n)
        .map_err(|_| Error::InvalidValue(format!("{} = {} overflows", name, n)))?;
    group.new_attr::<i32>().create(name)?.write_scalar(&n)?;
    Ok(())
}

fn read_count(group: &Group, name: &str) -> Result<usize> {
    if !group.attr_names()?.iter().any(|a| a == name) {
        return Err(Error::not_found(format!("{}@{}", MARKERS_GROUP, name)));
    }
    let n: i32 = group.attr(name)?.read_scalar()?;
    usize::try_from(n).map_err(|_| Error::InvalidValue(format!("{} = {}", name, n)))
}

fn write_column(group: &Group, name: &str, values: impl Iterator<Item = f64>) -> Result<()> {
    write_dataset(group, name, &values.collect::<Vec<_>>().into())
}

fn read_column(group: &Group, name: &str, n: usize) -> Result<Vec<f64>> {
    if !group.link_exists(name) {
        return Err(Error::not_found(format!("{}/{}", group.name(), name)));
    }
    let values = group.dataset(name)?.read_raw::<f64>()?;
    if values.len() < n {
        return Err(Error::InvalidValue(format!(
            "{}/{} holds {} values, expected {}",
            group.name(),
            name,
            values.len(),
            n
        )));
    }
    Ok(values)
}
