//! # Group Path Resolver
//!
//! Input instances live two levels deep: `<master>/<prefix>-<qid>`. This
//! module creates those groups, stamps their metadata and keeps track of
//! which instance is active in each master group.

use chrono::Local;
use hdf5::types::{FixedAscii, VarLenAscii, VarLenUnicode};
use hdf5::{Group, Location};
use tracing::{debug, info};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::hdf5io::qid::Qid;

/// Location of a freshly created input instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    /// Path relative to the file root, e.g. `options/opt-0123456789`
    pub path: String,
    /// Identifier embedded in the path
    pub qid: Qid,
}

/// Summary of one instance under a master group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    /// Group name below the master group (`opt-0123456789`, `B_GS`, ...)
    pub name: String,
    /// qid parsed from the name, if it carries one
    pub qid: Option<Qid>,
    pub date: Option<String>,
    pub description: Option<String>,
}

/// Path of an instance with the given prefix and qid
pub fn instance_path(master: &str, prefix: &str, qid: &Qid) -> String {
    format!("{}/{}-{}", master, prefix, qid)
}

/// Current local time in the `date` attribute format
pub fn timestamp() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// True if every component of `path` exists below `root`
pub fn path_exists(root: &Group, path: &str) -> bool {
    let mut prefix = String::new();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(part);
        if !root.link_exists(&prefix) {
            return false;
        }
    }
    !prefix.is_empty()
}

/// Open `path` below `root`, failing with `NotFound` when it is absent
pub fn open_group(root: &Group, path: &str) -> Result<Group> {
    if !path_exists(root, path) {
        return Err(Error::not_found(path));
    }
    Ok(root.group(path)?)
}

/// Open a direct child group, creating it if missing
pub fn require_group(parent: &Group, name: &str) -> Result<Group> {
    if parent.link_exists(name) {
        Ok(parent.group(name)?)
    } else {
        debug!(name, "creating group");
        Ok(parent.create_group(name)?)
    }
}

/// Create a new instance group `<master>/<prefix>-<qid>`.
///
/// The master group is created if missing; in that case the new instance
/// also becomes its active one. The instance receives `date` and
/// `description` attributes.
pub fn create_group(
    root: &Group,
    master: &str,
    prefix: &str,
    description: &str,
) -> Result<InstanceRef> {
    let is_new_master = !root.link_exists(master);
    let master_group = require_group(root, master)?;

    let mut qid = Qid::generate();
    while master_group.link_exists(&format!("{}-{}", prefix, qid)) {
        qid = Qid::generate();
    }

    let name = format!("{}-{}", prefix, qid);
    let group = master_group.create_group(&name)?;
    write_str_attr(&group, ATTR_DATE, &timestamp())?;
    write_str_attr(&group, ATTR_DESCRIPTION, description)?;

    if is_new_master {
        write_str_attr(&master_group, ATTR_ACTIVE, qid.as_str())?;
    }

    let path = instance_path(master, prefix, &qid);
    info!(%path, "created input group");
    Ok(InstanceRef { path, qid })
}

/// Mark `qid` as the active instance of `master`
pub fn set_active(root: &Group, master: &str, qid: &Qid) -> Result<()> {
    let group = open_group(root, master)?;
    let exists = group
        .member_names()?
        .iter()
        .any(|name| Qid::from_instance_name(name).as_ref() == Some(qid));
    if !exists {
        return Err(Error::not_found(format!("{}/*-{}", master, qid)));
    }
    write_str_attr(&group, ATTR_ACTIVE, qid.as_str())
}

/// qid of the active instance of `master`
pub fn get_active(root: &Group, master: &str) -> Result<Qid> {
    let group = open_group(root, master)?;
    Qid::parse(&read_str_attr(&group, ATTR_ACTIVE)?)
}

/// Replace the description of an existing instance
pub fn set_description(root: &Group, path: &str, description: &str) -> Result<()> {
    let group = open_group(root, path)?;
    write_str_attr(&group, ATTR_DESCRIPTION, description)
}

/// List the instances stored under `master`, sorted by name
pub fn list_instances(root: &Group, master: &str) -> Result<Vec<InstanceInfo>> {
    let group = open_group(root, master)?;
    let mut out = Vec::new();
    for child in group.groups()? {
        let name = leaf_name(&child.name());
        out.push(InstanceInfo {
            qid: Qid::from_instance_name(&name),
            date: read_str_attr(&child, ATTR_DATE).ok(),
            description: read_str_attr(&child, ATTR_DESCRIPTION).ok(),
            name,
        });
    }
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

/// Unlink an instance. Clears the master's `active` attribute if it
/// pointed at the removed instance.
pub fn remove_instance(root: &Group, master: &str, name: &str) -> Result<()> {
    let group = open_group(root, master)?;
    if !group.link_exists(name) {
        return Err(Error::not_found(format!("{}/{}", master, name)));
    }
    group.unlink(name)?;

    let active = read_str_attr(&group, ATTR_ACTIVE);
    if let (Some(qid), Ok(active)) = (Qid::from_instance_name(name), active) {
        if qid.as_str() == active {
            group.delete_attr(ATTR_ACTIVE)?;
        }
    }

    info!(master, name, "removed input group");
    Ok(())
}

/// Last component of an HDF5 object path
pub(crate) fn leaf_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_owned()
}

fn has_attr(loc: &Location, name: &str) -> Result<bool> {
    Ok(loc.attr_names()?.iter().any(|n| n == name))
}

/// Write a variable-length string attribute, replacing any previous one
pub fn write_str_attr(loc: &Location, name: &str, value: &str) -> Result<()> {
    if has_attr(loc, name)? {
        loc.delete_attr(name)?;
    }
    let value: VarLenUnicode = value.parse()?;
    loc.new_attr::<VarLenUnicode>().create(name)?.write_scalar(&value)?;
    Ok(())
}

/// Read a string attribute written as variable-length unicode, variable
/// length ASCII or fixed-length ASCII.
pub fn read_str_attr(loc: &Location, name: &str) -> Result<String> {
    if !has_attr(loc, name)? {
        return Err(Error::not_found(format!("{}@{}", loc.name(), name)));
    }
    let attr = loc.attr(name)?;

    if let Ok(s) = attr.read_scalar::<VarLenUnicode>() {
        return Ok(s.to_string());
    }
    if let Ok(s) = attr.read_scalar::<VarLenAscii>() {
        return Ok(s.to_string());
    }

    // Largest first: a short FixedAscii silently truncates longer strings
    macro_rules! try_fixed_ascii {
        ($($n:expr),*) => {
            $(
                if let Ok(s) = attr.read_scalar::<FixedAscii<$n>>() {
                    return Ok(s.as_str().trim_end_matches('\0').to_owned());
                }
            )*
        }
    }
    try_fixed_ascii!(256, 64, 32, 16, 8, 4, 1);

    Err(hdf5::Error::Internal(format!("attribute {:?} is not a string", name)).into())
}
