//! Finding image volumes and their companion label files.

use glob::{glob, Pattern};
use log::debug;
use std::path::{Path, PathBuf};

use crate::config::SliceConfig;
use crate::error::{Result, SliceError};
use crate::naming::strip_extension;

/// File name of `path` without the configured extension.
pub fn image_stem<'a>(path: &'a Path, ext: &str) -> Option<&'a str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| strip_extension(name, ext))
}

/// All image volumes in the input directory, sorted by file name.
///
/// Files carrying a derived-output marker (masks, flows, segmentation
/// results) and slices previously written by this tool are left out.
pub fn find_images(config: &SliceConfig) -> Result<Vec<PathBuf>> {
    let dir = config.input_dir.to_str().ok_or_else(|| {
        SliceError::Config(format!(
            "input directory {} is not valid UTF-8",
            config.input_dir.display()
        ))
    })?;
    let pattern = format!("{}/*.{}", Pattern::escape(dir), config.extension);

    let mut images = Vec::new();
    for entry in glob(&pattern)? {
        let path = entry?;
        if !path.is_file() {
            continue;
        }
        let (name, stem) = match (
            path.file_name().and_then(|n| n.to_str()),
            image_stem(&path, &config.extension),
        ) {
            (Some(name), Some(stem)) => (name, stem),
            _ => continue,
        };
        if config.naming.is_derived(name) || config.naming.is_slice_output(stem) {
            debug!("Ignoring derived file {name}");
            continue;
        }
        images.push(path);
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// Path of the label file paired with `image`: `<stem><suffix>.<ext>` in the
/// same directory.
pub fn companion_path(image: &Path, config: &SliceConfig) -> Option<PathBuf> {
    let stem = image_stem(image, &config.extension)?;
    Some(image.with_file_name(format!(
        "{stem}{}.{}",
        config.label_suffix, config.label_extension
    )))
}
