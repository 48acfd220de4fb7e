//! # Options Input
//!
//! Simulation options are a flat mapping `option name -> array`, stored one
//! dataset per option under `options/opt-<qid>`.

use std::path::Path;

use tracing::info;

use crate::constants::{OPTIONS_GROUP, OPTIONS_PREFIX};
use crate::error::{Error, Result};
use crate::hdf5io::dataset::{read_input, write_input, Data, DataMap, InputData, Layout};
use crate::hdf5io::group::instance_path;
use crate::hdf5io::qid::Qid;

/// Path of the options instance `qid`
pub fn options_path(qid: &Qid) -> String {
    instance_path(OPTIONS_GROUP, OPTIONS_PREFIX, qid)
}

/// Write options as a new instance and return its qid.
///
/// Each option becomes a 1-D dataset sized to its element count.
pub fn write_hdf5(path: impl AsRef<Path>, options: &DataMap, description: &str) -> Result<Qid> {
    let qid = write_input(path, OPTIONS_GROUP, OPTIONS_PREFIX, description, options, Layout::Flat)?;
    info!(%qid, count = options.len(), "wrote options");
    Ok(qid)
}

/// Read the options instance `qid`
pub fn read_hdf5(path: impl AsRef<Path>, qid: &Qid) -> Result<InputData> {
    read_input(path, &options_path(qid))
}

/// Parse options from a TOML table whose values are numbers or arrays of
/// numbers. Integer values stay integers; any float in an array makes the
/// whole array floating point.
pub fn options_from_toml(text: &str) -> Result<DataMap> {
    let table: toml::Table = text.parse()?;
    let mut out = DataMap::new();
    for (key, value) in table {
        let data = toml_to_data(&value)
            .ok_or_else(|| Error::InvalidValue(format!("option {:?} is not numeric", key)))?;
        out.insert(key, data);
    }
    Ok(out)
}

fn toml_to_data(value: &toml::Value) -> Option<Data> {
    match value {
        toml::Value::Integer(i) => Some(Data::from(*i)),
        toml::Value::Float(f) => Some(Data::from(*f)),
        toml::Value::Boolean(b) => Some(Data::from(i64::from(*b))),
        toml::Value::Array(items) => {
            if items.iter().all(|v| v.is_integer()) {
                let ints = items.iter().filter_map(toml::Value::as_integer).collect::<Vec<_>>();
                Some(Data::from(ints))
            } else {
                let floats = items
                    .iter()
                    .map(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
                    .collect::<Option<Vec<_>>>()?;
                Some(Data::from(floats))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataMap {
        let mut opts = DataMap::new();
        opts.insert("SIM_MODE".into(), Data::from(vec![2_i64]));
        opts.insert("FIXEDSTEP_USE_USERDEFINED".into(), Data::from(vec![1_i64]));
        opts.insert("FIXEDSTEP_USERDEFINED".into(), Data::from(vec![1e-8]));
        opts.insert("ENDCOND_MAX_RHO".into(), Data::from(vec![1.0, 0.5]));
        opts
    }

    #[test]
    fn test_options_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ascot.h5");

        let qid = write_hdf5(&path, &sample(), "Test options").unwrap();
        let read = read_hdf5(&path, &qid).unwrap();

        assert_eq!(read.qid.as_ref(), Some(&qid));
        assert_eq!(read.description, "Test options");
        assert_eq!(read.date.len(), 19);
        assert_eq!(read.data, sample());
    }

    #[test]
    fn test_scalar_option_stored_flat() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ascot.h5");

        let mut opts = DataMap::new();
        opts.insert("ORBITMETHOD".into(), Data::from(1_i64));
        let qid = write_hdf5(&path, &opts, "scalar").unwrap();

        let read = read_hdf5(&path, &qid).unwrap();
        assert_eq!(read.get("ORBITMETHOD").unwrap().shape(), &[1]);
        assert_eq!(read.scalar("ORBITMETHOD").unwrap(), 1.0);
    }

    #[test]
    fn test_missing_qid_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ascot.h5");
        let written = write_hdf5(&path, &sample(), "x").unwrap();

        let other = if written.as_str() == "0000000001" { "0000000002" } else { "0000000001" };
        let err = read_hdf5(&path, &Qid::parse(other).unwrap()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_options_from_toml() {
        let opts = options_from_toml(
            r#"
            SIM_MODE = 2
            FIXEDSTEP_USERDEFINED = 1e-8
            ENDCOND_MAX_RHO = [1, 0.5]
            ENABLE_ORBIT_FOLLOWING = true
            ORBIT_IDS = [1, 2, 3]
            "#,
        )
        .unwrap();

        assert_eq!(opts["SIM_MODE"], Data::from(2_i64));
        assert_eq!(opts["FIXEDSTEP_USERDEFINED"], Data::from(1e-8));
        assert_eq!(opts["ENDCOND_MAX_RHO"], Data::from(vec![1.0, 0.5]));
        assert_eq!(opts["ENABLE_ORBIT_FOLLOWING"], Data::from(1_i64));
        assert_eq!(opts["ORBIT_IDS"], Data::from(vec![1_i64, 2, 3]));
    }

    #[test]
    fn test_options_from_toml_rejects_strings() {
        assert!(options_from_toml("NAME = \"x\"").is_err());
    }
}
