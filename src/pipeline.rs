//! The batch: discover images, pair them with labels, slice, write, tally.

use std::fs;
use std::path::Path;

use log::{error, info, warn};

use crate::common::{Plane, SlicePair};
use crate::config::SliceConfig;
use crate::discover::{companion_path, find_images, image_stem};
use crate::error::{Result, SliceError};
use crate::formats::{
    read_labels, read_volume, write_image_slice, write_label_slice, PixelType, VolumeFormat,
};
use crate::report::{FileReport, RunReport, SkipReason};
use crate::slicing::{check_shapes, normalize_dims, slice_plane};

#[derive(Debug)]
pub enum FileOutcome {
    Sliced(FileReport),
    Skipped(SkipReason),
}

/// Slice every image in `config.input_dir` into `config.output_dir`.
///
/// Missing or keyless label files skip the image; any other per-file error
/// is recorded in the report and the batch moves on. Only configuration,
/// output directory and directory scan errors end the run early. Slices
/// already written for a file that later fails stay on disk.
pub fn run(config: &SliceConfig) -> Result<RunReport> {
    config.validate()?;
    if let Some(anisotropy) = config.anisotropy {
        warn!("Anisotropy {anisotropy} is not applied; slices are cut on the native voxel grid");
    }
    fs::create_dir_all(&config.output_dir)?;

    let images = find_images(config)?;
    info!("Found {} image files", images.len());

    let mut report = RunReport {
        output_dir: config.output_dir.clone(),
        ..RunReport::default()
    };
    for image in images {
        info!("Processing {}", image.display());
        match process_file(config, &image) {
            Ok(FileOutcome::Sliced(file)) => report.files.push(file),
            Ok(FileOutcome::Skipped(reason)) => {
                warn!("{}: {reason}, skipping", image.display());
                report.skipped.push((image, reason));
            }
            Err(e) => {
                error!("{}: {e}", image.display());
                report.failures.push((image, e));
            }
        }
    }
    Ok(report)
}

/// Slice one image along all three planes.
///
/// Only this file's volumes are held in memory; they are released on return.
pub fn process_file(config: &SliceConfig, image: &Path) -> Result<FileOutcome> {
    let format = config.format()?;
    let stem = image_stem(image, &config.extension).ok_or_else(|| {
        SliceError::Config(format!(
            "{} does not end in .{}",
            image.display(),
            config.extension
        ))
    })?;
    let companion = companion_path(image, config).ok_or_else(|| {
        SliceError::Config(format!("cannot derive a label file name for {}", image.display()))
    })?;
    if !companion.is_file() {
        return Ok(FileOutcome::Skipped(SkipReason::MissingCompanion(companion)));
    }

    let labels = match read_labels(&companion, &config.label_key)? {
        Some(labels) => labels,
        None => {
            return Ok(FileOutcome::Skipped(SkipReason::MissingKey {
                companion,
                key: config.label_key.clone(),
            }))
        }
    };
    let raw = read_volume(image, format)?;
    let image_shape = raw.data.shape().to_vec();
    let label_shape = labels.shape().to_vec();
    info!("  Image shape: {image_shape:?}, Masks shape: {label_shape:?}");

    let pixel_type = raw.pixel_type;
    let volume = normalize_dims(raw.data, image)?;
    let labels = normalize_dims(labels, &companion)?;
    check_shapes(&volume, &labels, image)?;

    let mut planes = Vec::with_capacity(Plane::ALL.len());
    for plane in Plane::ALL {
        let tally = slice_plane(&volume, &labels, plane, config.min_masks, |pair| {
            write_pair(config, format, stem, pixel_type, pair)
        })?;
        info!("  {plane}: saved {}/{} slices", tally.saved, tally.total);
        planes.push((plane, tally));
    }

    let file = FileReport {
        image: image.to_path_buf(),
        image_shape,
        label_shape,
        planes,
    };
    info!("  Total for this file: {} slices", file.saved().total());
    Ok(FileOutcome::Sliced(file))
}

fn write_pair(
    config: &SliceConfig,
    format: VolumeFormat,
    stem: &str,
    pixel_type: PixelType,
    pair: SlicePair<'_>,
) -> Result<()> {
    let naming = &config.naming;
    let ext = &config.extension;
    let image_path = config
        .output_dir
        .join(naming.image_name(stem, pair.plane, pair.index, ext));
    let mask_path = config
        .output_dir
        .join(naming.mask_name(stem, pair.plane, pair.index, ext));
    write_image_slice(&image_path, format, pair.image, pixel_type)?;
    write_label_slice(&mask_path, format, pair.labels)?;
    Ok(())
}
