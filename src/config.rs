use std::path::{Path, PathBuf};

use crate::error::{Result, SliceError};
use crate::formats::VolumeFormat;
use crate::naming::Naming;

/// Everything a slicing run needs to know.
#[derive(Debug, Clone)]
pub struct SliceConfig {
    /// Directory holding the image volumes and their companion label files.
    pub input_dir: PathBuf,
    /// Directory receiving the slice pairs. Created when absent.
    pub output_dir: PathBuf,
    /// Minimum number of distinct non-background labels a slice must hold to be kept.
    pub min_masks: usize,
    /// Extension of image volumes, without the leading period. Slices are
    /// written with the same extension.
    pub extension: String,
    /// Appended to an image stem to name its companion label file.
    pub label_suffix: String,
    pub label_extension: String,
    /// Entry of the label archive holding the label volume.
    pub label_key: String,
    pub naming: Naming,
    /// Z voxel spacing relative to X/Y. Accepted and reported, never applied:
    /// slices are cut on the native voxel grid.
    pub anisotropy: Option<f64>,
}

impl SliceConfig {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(input_dir: P, output_dir: Q) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
            min_masks: 1,
            extension: "tif".to_string(),
            label_suffix: "_seg".to_string(),
            label_extension: "npz".to_string(),
            label_key: "masks".to_string(),
            naming: Naming::default(),
            anisotropy: None,
        }
    }

    pub fn with_min_masks(mut self, min_masks: usize) -> Self {
        self.min_masks = min_masks;
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn with_label_key(mut self, key: &str) -> Self {
        self.label_key = key.to_string();
        self
    }

    pub fn with_anisotropy(mut self, anisotropy: Option<f64>) -> Self {
        self.anisotropy = anisotropy;
        self
    }

    pub fn format(&self) -> Result<VolumeFormat> {
        VolumeFormat::from_extension(&self.extension)
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        self.format()?;
        if !self.input_dir.is_dir() {
            return Err(SliceError::Config(format!(
                "input directory {} does not exist",
                self.input_dir.display()
            )));
        }
        if self.label_key.is_empty() {
            return Err(SliceError::Config("label key must not be empty".into()));
        }
        if self.naming.mask_suffix.is_empty() {
            return Err(SliceError::Config("mask suffix must not be empty".into()));
        }
        if let Some(a) = self.anisotropy {
            if !a.is_finite() || a <= 0.0 {
                return Err(SliceError::Config(format!(
                    "anisotropy must be a positive number, got {a}"
                )));
            }
        }
        Ok(())
    }
}
