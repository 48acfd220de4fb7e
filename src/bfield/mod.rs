//! # Magnetic Field Inputs
//!
//! A file holds at most one instance of each field type under `bfield/`.
//! The group-level `type` attribute names the type written last; writing
//! any type deletes and rewrites it without checking what was there.

pub mod b_2d;
pub mod b_gs;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use hdf5::{File, Group};
use tracing::{debug, info};

use crate::constants::{ATTR_TYPE, BFIELD_GROUP};
use crate::error::{Error, Result};
use crate::hdf5io::group::{open_group, read_str_attr, require_group, write_str_attr};

/// Magnetic field input types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BfieldType {
    /// Analytic Grad-Shafranov field
    Gs,
    /// Tabulated axisymmetric field
    TwoD,
}

impl BfieldType {
    /// Group and `type` attribute name
    pub fn as_str(&self) -> &'static str {
        match self {
            BfieldType::Gs => "B_GS",
            BfieldType::TwoD => "B_2D",
        }
    }
}

impl fmt::Display for BfieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BfieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "B_GS" => Ok(BfieldType::Gs),
            "B_2D" => Ok(BfieldType::TwoD),
            other => Err(Error::InvalidValue(format!("unknown bfield type {:?}", other))),
        }
    }
}

/// Prepare `bfield/<kind>` for writing: set the group's `type`, unlink
/// any previous instance of `kind` and return a fresh empty group.
pub(crate) fn replace_instance(file: &File, kind: BfieldType) -> Result<Group> {
    let bfield = require_group(file, BFIELD_GROUP)?;
    write_str_attr(&bfield, ATTR_TYPE, kind.as_str())?;

    if bfield.link_exists(kind.as_str()) {
        debug!(%kind, "removing previous field");
        bfield.unlink(kind.as_str())?;
    }
    info!(%kind, "writing magnetic field");
    Ok(bfield.create_group(kind.as_str())?)
}

/// Open `bfield/<kind>` for reading
pub(crate) fn open_instance(file: &File, kind: BfieldType) -> Result<Group> {
    open_group(file, &format!("{}/{}", BFIELD_GROUP, kind.as_str()))
}

/// Type recorded on the `bfield` group of the file at `path`
pub fn active_type(path: impl AsRef<Path>) -> Result<BfieldType> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::not_found(path.display().to_string()));
    }
    let file = File::open(path)?;
    let bfield = open_group(&file, BFIELD_GROUP)?;
    read_str_attr(&bfield, ATTR_TYPE)?.parse()
}
