//! # HDF5 Input/Output
//!
//! Persistence of simulation inputs in the ASCOT5 HDF5 layout.
//!
//! ```text
//! /
//! ├── options/             attr: active
//! │   └── opt-<qid>/       attrs: date, description; one dataset per option
//! ├── bfield/              attr: type ("B_GS" | "B_2D")
//! │   ├── B_GS/
//! │   └── B_2D/
//! └── markers/
//! ```
//!
//! Every call opens the file, does its work and closes it again. Nothing
//! guards against two writers on the same file.

pub mod dataset;
pub mod group;
pub mod markers;
pub mod options;
pub mod qid;

use std::path::Path;

use hdf5::File;

use crate::error::{Error, Result};

pub use dataset::{Data, DataMap, InputData, Layout};
pub use group::{InstanceInfo, InstanceRef};
pub use qid::Qid;

/// Summary of one top-level group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub name: String,
    /// `active` attribute, if set
    pub active: Option<String>,
    /// `type` attribute, if set
    pub kind: Option<String>,
    pub instances: Vec<InstanceInfo>,
}

/// List every top-level group of the file with its instances. Datasets at
/// the root are skipped.
pub fn list_inputs(path: impl AsRef<Path>) -> Result<Vec<GroupSummary>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::not_found(path.display().to_string()));
    }
    let file = File::open(path)?;
    let mut out = Vec::new();
    for master in file.groups()? {
        let name = group::leaf_name(&master.name());
        out.push(GroupSummary {
            active: group::read_str_attr(&master, crate::constants::ATTR_ACTIVE).ok(),
            kind: group::read_str_attr(&master, crate::constants::ATTR_TYPE).ok(),
            instances: group::list_instances(&file, &name)?,
            name,
        });
    }
    Ok(out)
}
