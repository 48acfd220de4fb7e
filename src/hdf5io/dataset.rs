//! # Dataset Writer and Reader
//!
//! Mirrors a mapping `name -> array` into the datasets of one group and
//! back. Floating-point arrays are always stored as 8-byte floats; integer
//! arrays keep an integer storage type.

use std::collections::BTreeMap;
use std::path::Path;

use hdf5::types::TypeDescriptor;
use hdf5::{File, Group};
use ndarray::{Array1, Array2, ArrayD, IxDyn};
use tracing::debug;

use crate::constants::{ATTR_DATE, ATTR_DESCRIPTION};
use crate::error::{Error, Result};
use crate::hdf5io::group::{create_group, leaf_name, open_group, read_str_attr};
use crate::hdf5io::qid::Qid;

/// One dataset payload. Scalars are 0-dimensional arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Float(ArrayD<f64>),
    Int(ArrayD<i64>),
}

/// Named arrays of one input instance
pub type DataMap = BTreeMap<String, Data>;

/// How a writer shapes each dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// 1-D dataset sized to the element count of the array
    Flat,
    /// Dataset keeps the array's own shape
    Shaped,
}

impl Data {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Data::Float(a) => a.len(),
            Data::Int(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Data::Float(a) => a.shape(),
            Data::Int(a) => a.shape(),
        }
    }

    /// Same elements in logical order as a 1-D array
    pub fn flattened(&self) -> Data {
        match self {
            Data::Float(a) => Data::Float(a.iter().copied().collect::<Array1<_>>().into_dyn()),
            Data::Int(a) => Data::Int(a.iter().copied().collect::<Array1<_>>().into_dyn()),
        }
    }

    /// Elements converted to f64
    pub fn to_f64(&self) -> ArrayD<f64> {
        match self {
            Data::Float(a) => a.clone(),
            Data::Int(a) => a.mapv(|v| v as f64),
        }
    }

    /// First element as f64, if any
    pub fn first_f64(&self) -> Option<f64> {
        match self {
            Data::Float(a) => a.iter().next().copied(),
            Data::Int(a) => a.iter().next().map(|&v| v as f64),
        }
    }
}

impl From<f64> for Data {
    fn from(v: f64) -> Self {
        Data::Float(ArrayD::from_elem(IxDyn(&[]), v))
    }
}

impl From<i64> for Data {
    fn from(v: i64) -> Self {
        Data::Int(ArrayD::from_elem(IxDyn(&[]), v))
    }
}

impl From<Vec<f64>> for Data {
    fn from(v: Vec<f64>) -> Self {
        Data::Float(Array1::from(v).into_dyn())
    }
}

impl From<Vec<i64>> for Data {
    fn from(v: Vec<i64>) -> Self {
        Data::Int(Array1::from(v).into_dyn())
    }
}

impl From<Array1<f64>> for Data {
    fn from(a: Array1<f64>) -> Self {
        Data::Float(a.into_dyn())
    }
}

impl From<Array2<f64>> for Data {
    fn from(a: Array2<f64>) -> Self {
        Data::Float(a.into_dyn())
    }
}

impl From<ArrayD<f64>> for Data {
    fn from(a: ArrayD<f64>) -> Self {
        Data::Float(a)
    }
}

/// A stored input instance as read back from the file
#[derive(Debug, Clone, PartialEq)]
pub struct InputData {
    /// qid of the instance, when its name carries one
    pub qid: Option<Qid>,
    pub date: String,
    pub description: String,
    /// Datasets keyed by name
    pub data: DataMap,
}

impl InputData {
    pub fn get(&self, name: &str) -> Option<&Data> {
        self.data.get(name)
    }

    /// Scalar (or first element) of a dataset
    pub fn scalar(&self, name: &str) -> Result<f64> {
        self.data
            .get(name)
            .and_then(Data::first_f64)
            .ok_or_else(|| Error::not_found(name))
    }

    /// Whole dataset as f64
    pub fn array(&self, name: &str) -> Result<ArrayD<f64>> {
        self.data
            .get(name)
            .map(Data::to_f64)
            .ok_or_else(|| Error::not_found(name))
    }
}

/// Write one dataset. A same-named dataset is unlinked first.
pub fn write_dataset(group: &Group, name: &str, data: &Data) -> Result<()> {
    if group.link_exists(name) {
        group.unlink(name)?;
    }
    match data {
        Data::Float(a) => {
            group.new_dataset_builder().with_data(a).create(name)?;
        }
        Data::Int(a) => {
            group.new_dataset_builder().with_data(a).create(name)?;
        }
    }
    debug!(group = %group.name(), name, shape = ?data.shape(), "wrote dataset");
    Ok(())
}

/// Write a scalar 8-byte float dataset
pub fn write_f64(group: &Group, name: &str, value: f64) -> Result<()> {
    write_dataset(group, name, &Data::from(value))
}

/// Write every entry of `data` into `group`.
///
/// No transaction: an error part way leaves the already written datasets
/// in place.
pub fn write_datasets(group: &Group, data: &DataMap, layout: Layout) -> Result<()> {
    for (name, value) in data {
        match layout {
            Layout::Flat => write_dataset(group, name, &value.flattened())?,
            Layout::Shaped => write_dataset(group, name, value)?,
        }
    }
    Ok(())
}

/// Read one dataset, integer-typed storage as `Data::Int`
pub fn read_dataset(group: &Group, name: &str) -> Result<Data> {
    if !group.link_exists(name) {
        return Err(Error::not_found(format!("{}/{}", group.name(), name)));
    }
    let ds = group.dataset(name)?;
    let data = match ds.dtype()?.to_descriptor()? {
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            Data::Int(ds.read_dyn::<i64>()?)
        }
        _ => Data::Float(ds.read_dyn::<f64>()?),
    };
    Ok(data)
}

/// Scalar (or first element) of a floating-point dataset
pub fn read_f64(group: &Group, name: &str) -> Result<f64> {
    read_dataset(group, name)?
        .first_f64()
        .ok_or_else(|| Error::not_found(format!("{}/{}", group.name(), name)))
}

/// Read every dataset of `group`. Child groups are skipped.
pub fn read_datasets(group: &Group) -> Result<DataMap> {
    let mut out = DataMap::new();
    for ds in group.datasets()? {
        let name = leaf_name(&ds.name());
        out.insert(name.clone(), read_dataset(group, &name)?);
    }
    Ok(out)
}

/// Create `<master>/<prefix>-<qid>` in the file at `path` and write `data`
/// into it. The file is opened in append mode so existing inputs survive.
pub fn write_input(
    path: impl AsRef<Path>,
    master: &str,
    prefix: &str,
    description: &str,
    data: &DataMap,
    layout: Layout,
) -> Result<Qid> {
    let file = File::append(path.as_ref())?;
    let inst = create_group(&file, master, prefix, description)?;
    let group = file.group(&inst.path)?;
    write_datasets(&group, data, layout)?;
    drop(group);
    file.close()?;
    Ok(inst.qid)
}

/// Read the instance at `group_path` from the file at `path`
pub fn read_input(path: impl AsRef<Path>, group_path: &str) -> Result<InputData> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::not_found(path.display().to_string()));
    }
    let file = File::open(path)?;
    let input = {
        let group = open_group(&file, group_path)?;
        InputData {
            qid: Qid::from_instance_name(&leaf_name(group_path)),
            date: read_str_attr(&group, ATTR_DATE)?,
            description: read_str_attr(&group, ATTR_DESCRIPTION)?,
            data: read_datasets(&group)?,
        }
    };
    file.close()?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn test_flattened() {
        let d = Data::from(array![[1.0, 2.0], [3.0, 4.0]]);
        let flat = d.flattened();
        assert_eq!(flat.shape(), &[4]);
        assert_eq!(flat.to_f64().as_slice().unwrap(), &[1.0, 2.0, 3.0, 4.0]);

        let s = Data::from(5_i64).flattened();
        assert_eq!(s.shape(), &[1]);
    }

    #[test]
    fn test_scalar_is_zero_dim() {
        let d = Data::from(2.5);
        assert!(d.shape().is_empty());
        assert_eq!(d.len(), 1);
        assert_eq!(d.first_f64(), Some(2.5));
    }

    #[test]
    fn test_shaped_datasets_keep_type() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("ds.h5")).unwrap();
        let group = file.create_group("g").unwrap();

        let mut data = DataMap::new();
        data.insert("grid".into(), Data::from(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]));
        data.insert("count".into(), Data::from(vec![3_i64, 4]));
        data.insert("x".into(), Data::from(0.25));
        write_datasets(&group, &data, Layout::Shaped).unwrap();

        let back = read_datasets(&group).unwrap();
        assert_eq!(back, data);
        assert_eq!(read_f64(&group, "x").unwrap(), 0.25);
    }

    #[test]
    fn test_rewrite_replaces_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("ds.h5")).unwrap();
        let group = file.create_group("g").unwrap();

        write_dataset(&group, "v", &Data::from(vec![1.0, 2.0, 3.0])).unwrap();
        write_dataset(&group, "v", &Data::from(vec![9.0])).unwrap();
        assert_eq!(read_dataset(&group, "v").unwrap(), Data::from(vec![9.0]));
    }

    #[test]
    fn test_read_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let file = File::create(dir.path().join("ds.h5")).unwrap();
        let group = file.create_group("g").unwrap();
        assert!(read_dataset(&group, "nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_input_roundtrip_and_isolation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.h5");

        let mut a = DataMap::new();
        a.insert("v".into(), Data::from(vec![1.0, 2.0]));
        let mut b = DataMap::new();
        b.insert("v".into(), Data::from(vec![7.0]));
        b.insert("w".into(), Data::from(3_i64));

        let qa = write_input(&path, "things", "thing", "A", &a, Layout::Flat).unwrap();
        let qb = write_input(&path, "things", "thing", "B", &b, Layout::Flat).unwrap();
        assert_ne!(qa, qb);

        let ra = read_input(&path, &format!("things/thing-{}", qa)).unwrap();
        let rb = read_input(&path, &format!("things/thing-{}", qb)).unwrap();
        assert_eq!(ra.qid.as_ref(), Some(&qa));
        assert_eq!(ra.description, "A");
        assert_eq!(ra.data, a);
        assert_eq!(rb.description, "B");
        assert_eq!(rb.array("v").unwrap().as_slice().unwrap(), &[7.0]);
        assert_eq!(rb.get("w"), Some(&Data::from(vec![3_i64])));
    }

    fn data_strategy() -> impl Strategy<Value = Data> {
        prop_oneof![
            prop::collection::vec(-1e6f64..1e6, 0..8).prop_map(Data::from),
            prop::collection::vec(any::<i64>(), 0..8).prop_map(Data::from),
        ]
    }

    fn data_map_strategy() -> impl Strategy<Value = DataMap> {
        prop::collection::btree_map("[A-Za-z][A-Za-z0-9_]{0,15}", data_strategy(), 0..6)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_any_mapping_roundtrips(a in data_map_strategy(), b in data_map_strategy()) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("any.h5");

            let qa = write_input(&path, "things", "thing", "first", &a, Layout::Flat).unwrap();
            let qb = write_input(&path, "things", "thing", "second", &b, Layout::Flat).unwrap();
            prop_assert_ne!(&qa, &qb);

            let ra = read_input(&path, &format!("things/thing-{}", qa)).unwrap();
            let rb = read_input(&path, &format!("things/thing-{}", qb)).unwrap();
            prop_assert_eq!(ra.description.as_str(), "first");
            prop_assert_eq!(rb.description.as_str(), "second");
            prop_assert_eq!(&ra.data, &a);
            prop_assert_eq!(&rb.data, &b);
        }
    }

    #[test]
    fn test_read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input(dir.path().join("absent.h5"), "options/opt-0000000001").unwrap_err();
        assert!(err.is_not_found());
    }
}
