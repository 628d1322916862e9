use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::{ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError, ReadableElement};

use crate::error::{Result, SliceError};

type Archive = NpzReader<BufReader<File>>;

/// Read the label volume stored under `key` in an `.npz` archive.
///
/// The entry may be named `key` or `key.npy` (NumPy's `savez` appends the
/// extension). Any integer element type is accepted; values must fit in
/// `0..=u16::MAX`. Returns `Ok(None)` when the archive has no such entry.
pub fn read_labels(path: &Path, key: &str) -> Result<Option<ArrayD<u16>>> {
    let mut npz = NpzReader::new(BufReader::new(File::open(path)?))?;
    let with_ext = format!("{key}.npy");
    let name = match npz
        .names()?
        .into_iter()
        .find(|name| name == key || *name == with_ext)
    {
        Some(name) => name,
        None => return Ok(None),
    };

    if let Some(labels) = read_as::<u16>(&mut npz, &name)? {
        return Ok(Some(labels));
    }
    macro_rules! try_widths {
        ($($t:ty),*) => {
            $(
                if let Some(labels) = read_as::<$t>(&mut npz, &name)? {
                    return narrow(labels, path).map(Some);
                }
            )*
        };
    }
    try_widths!(u32, i32, u8, i64, u64, i16, i8);

    Err(SliceError::UnsupportedSampleType {
        path: path.to_path_buf(),
        found: format!("non-integer entry {name}"),
    })
}

fn read_as<T: ReadableElement>(npz: &mut Archive, name: &str) -> Result<Option<ArrayD<T>>> {
    match npz.by_name::<OwnedRepr<T>, IxDyn>(name) {
        Ok(array) => Ok(Some(array)),
        Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn narrow<T: Copy + Into<i128>>(labels: ArrayD<T>, path: &Path) -> Result<ArrayD<u16>> {
    let range = 0..=i128::from(u16::MAX);
    if let Some(&bad) = labels.iter().find(|&&v| {
        let v: i128 = v.into();
        !range.contains(&v)
    }) {
        return Err(SliceError::LabelOutOfRange {
            path: path.to_path_buf(),
            value: bad.into(),
        });
    }
    Ok(labels.mapv(|v| {
        let v: i128 = v.into();
        v as u16
    }))
}
