use std::path::Path;

use ndarray::{ArrayView2, IxDyn};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiObject, NiftiType, ReaderOptions};

use super::{PixelType, RawVolume};
use crate::error::{Result, SliceError};

/// Read a NIfTI volume. NIfTI stores (i, j, k[, t]) = (X, Y, Z[, T]); the
/// spatial axes are reversed so the result is (Z, Y, X[, T]), and a 2D
/// image (X, Y) comes back as (Y, X).
///
/// The companion label archive is not reordered: for NIfTI inputs it must
/// already hold the labels in (Z, Y, X) order, i.e. the transpose of what
/// nibabel's `get_fdata()` returns.
///
/// Only uint8, uint16 and float32 volumes are accepted, so slices can be
/// written back in the stored type.
pub(crate) fn read_nifti(path: &Path) -> Result<RawVolume> {
    let obj = ReaderOptions::new().read_file(path)?;
    let pixel_type = match obj.header().data_type()? {
        NiftiType::Uint8 => PixelType::U8,
        NiftiType::Uint16 => PixelType::U16,
        NiftiType::Float32 => PixelType::F32,
        other => {
            return Err(SliceError::UnsupportedSampleType {
                path: path.to_path_buf(),
                found: format!("{other:?}"),
            });
        }
    };
    let data = obj.into_volume().into_ndarray::<f32>()?;
    let data = match data.ndim() {
        2 => data.permuted_axes(IxDyn(&[1, 0])),
        3 => data.permuted_axes(IxDyn(&[2, 1, 0])),
        4 => data.permuted_axes(IxDyn(&[2, 1, 0, 3])),
        _ => data,
    };
    Ok(RawVolume { data, pixel_type })
}

// Slices are (rows, cols) in volume order, so they are transposed back to
// NIfTI's column-first layout before writing.

pub(crate) fn write_nifti_image(
    path: &Path,
    slice: ArrayView2<'_, f32>,
    pixel_type: PixelType,
) -> Result<()> {
    let writer = WriterOptions::new(path);
    let slice = slice.t();
    match pixel_type {
        PixelType::U8 => writer.write_nifti(&slice.mapv(|v| v as u8))?,
        PixelType::U16 => writer.write_nifti(&slice.mapv(|v| v as u16))?,
        PixelType::F32 => writer.write_nifti(&slice.as_standard_layout())?,
    }
    Ok(())
}

pub(crate) fn write_nifti_labels(path: &Path, slice: ArrayView2<'_, u16>) -> Result<()> {
    WriterOptions::new(path).write_nifti(&slice.t().as_standard_layout())?;
    Ok(())
}
