//! Reading volumes and label archives, writing slices.
//!
//! Volumes come back as an `ArrayD<f32>` in (Z, Y, X[, C]) order together
//! with the sample type they were stored in, so slices can be written back
//! without changing the on-disk type. Label slices are always 16-bit
//! unsigned.

mod labels;
mod nii;
mod tif;


use std::path::Path;

use ndarray::{ArrayD, ArrayView2};

use crate::error::{Result, SliceError};

pub use labels::read_labels;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    U8,
    U16,
    F32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeFormat {
    Tiff,
    Nifti,
}

impl VolumeFormat {
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "tif" | "tiff" => Ok(VolumeFormat::Tiff),
            "nii" | "nii.gz" => Ok(VolumeFormat::Nifti),
            other => Err(SliceError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A volume as loaded from disk, before its shape is checked.
///
/// Samples are widened to `f32` whatever their stored type, so a u8 stack
/// takes four times its on-disk size in memory and a u16 stack twice.
#[derive(Debug)]
pub struct RawVolume {
    pub data: ArrayD<f32>,
    pub pixel_type: PixelType,
}

pub fn read_volume(path: &Path, format: VolumeFormat) -> Result<RawVolume> {
    match format {
        VolumeFormat::Tiff => tif::read_tiff(path),
        VolumeFormat::Nifti => nii::read_nifti(path),
    }
}

/// Write an intensity slice, converting back to `pixel_type`.
pub fn write_image_slice(
    path: &Path,
    format: VolumeFormat,
    slice: ArrayView2<'_, f32>,
    pixel_type: PixelType,
) -> Result<()> {
    match format {
        VolumeFormat::Tiff => tif::write_tiff_image(path, slice, pixel_type),
        VolumeFormat::Nifti => nii::write_nifti_image(path, slice, pixel_type),
    }
}

pub fn write_label_slice(
    path: &Path,
    format: VolumeFormat,
    slice: ArrayView2<'_, u16>,
) -> Result<()> {
    match format {
        VolumeFormat::Tiff => tif::write_tiff_labels(path, slice),
        VolumeFormat::Nifti => nii::write_nifti_labels(path, slice),
    }
}
