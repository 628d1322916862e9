use std::fs::{self, File};
use std::path::Path;

use ndarray::{Array3, Axis, IxDyn};
use ndarray_npy::NpzWriter;
use nifti::writer::WriterOptions;
use tempfile::tempdir;
use tiff::encoder::{colortype, TiffEncoder};

use triaxslice::common::{AxisCounts, Plane};
use triaxslice::formats::{read_volume, PixelType, VolumeFormat};
use triaxslice::pipeline::{process_file, run, FileOutcome};
use triaxslice::report::{verify_outputs, SkipReason};
use triaxslice::{SliceConfig, SliceError};

fn write_stack(path: &Path, volume: &Array3<u16>) {
    let (_, height, width) = volume.dim();
    let mut encoder = TiffEncoder::new(File::create(path).expect("create")).expect("encoder");
    for page in volume.axis_iter(Axis(0)) {
        let page: Vec<u16> = page.iter().copied().collect();
        encoder
            .write_image::<colortype::Gray16>(width as u32, height as u32, &page)
            .expect("page");
    }
}

fn write_labels(path: &Path, key: &str, labels: &Array3<u16>) {
    let mut npz = NpzWriter::new(File::create(path).expect("create"));
    npz.add_array(key, labels).expect("add");
    npz.finish().expect("finish");
}

/// 10x20x20 volume, label 5 over the whole z=3 plane and label 7 at (3, 10, 10).
fn scenario(dir: &Path, stem: &str) {
    let image = Array3::from_shape_fn((10, 20, 20), |(z, y, x)| (z * 400 + y * 20 + x) as u16);
    let mut labels = Array3::<u16>::zeros((10, 20, 20));
    labels.index_axis_mut(Axis(0), 3).fill(5);
    labels[[3, 10, 10]] = 7;
    write_stack(&dir.join(format!("{stem}.tif")), &image);
    write_labels(&dir.join(format!("{stem}_seg.npz")), "masks.npy", &labels);
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir).expect("read_dir").count()
}

#[test]
fn scenario_writes_expected_slices() {
    let input = tempdir().expect("tempdir");
    let output = input.path().join("train");
    scenario(input.path(), "cells");

    let report = run(&SliceConfig::new(input.path(), &output)).expect("run");
    assert!(report.is_clean());
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.totals(), AxisCounts { xy: 1, xz: 20, yz: 20 });
    assert_eq!(count_files(&output), 2 * 41);

    let file = &report.files[0];
    assert_eq!(file.image_shape, vec![10, 20, 20]);
    assert_eq!(file.planes[0].1.total, 10);

    let mask = read_volume(&output.join("cells_XY_Z003_cp_masks.tif"), VolumeFormat::Tiff)
        .expect("mask");
    assert_eq!(mask.pixel_type, PixelType::U16);
    assert_eq!(mask.data.shape(), &[20, 20]);
    assert_eq!(mask.data[IxDyn(&[10, 10])], 7.0);
    assert_eq!(mask.data[IxDyn(&[0, 0])], 5.0);

    let image = read_volume(&output.join("cells_XZ_Y010.tif"), VolumeFormat::Tiff).expect("image");
    assert_eq!(image.pixel_type, PixelType::U16);
    assert_eq!(image.data.shape(), &[10, 20]);
    assert_eq!(image.data[IxDyn(&[3, 4])], (3 * 400 + 10 * 20 + 4) as f32);

    assert!(!output.join("cells_XY_Z004.tif").exists());
}

#[test]
fn higher_threshold_keeps_only_multi_label_slices() {
    let input = tempdir().expect("tempdir");
    let output = input.path().join("train");
    scenario(input.path(), "cells");

    let config = SliceConfig::new(input.path(), &output).with_min_masks(2);
    let report = run(&config).expect("run");
    assert_eq!(report.totals(), AxisCounts { xy: 1, xz: 1, yz: 1 });
    assert!(output.join("cells_XZ_Y010_cp_masks.tif").exists());
    assert!(output.join("cells_YZ_X010_cp_masks.tif").exists());
    assert!(!output.join("cells_YZ_X009_cp_masks.tif").exists());
}

#[test]
fn disk_recount_matches_run_counts() {
    let input = tempdir().expect("tempdir");
    let output = input.path().join("train");
    scenario(input.path(), "a");
    scenario(input.path(), "b");
    let config = SliceConfig::new(input.path(), &output);

    let first = run(&config).expect("first run");
    let on_disk = verify_outputs(&output, &config.naming, &config.extension).expect("verify");
    assert_eq!(on_disk, first.totals());
    assert_eq!(on_disk.total(), 82);

    let second = run(&config).expect("second run");
    assert_eq!(second.totals(), first.totals());
    let on_disk = verify_outputs(&output, &config.naming, &config.extension).expect("verify");
    assert_eq!(on_disk, first.totals());
}

#[test]
fn rerun_into_input_directory_ignores_earlier_slices() {
    let dir = tempdir().expect("tempdir");
    scenario(dir.path(), "cells");
    let config = SliceConfig::new(dir.path(), dir.path());

    let first = run(&config).expect("first run");
    let second = run(&config).expect("second run");
    assert_eq!(second.files.len(), 1);
    assert!(second.skipped.is_empty());
    assert_eq!(second.totals(), first.totals());
}

#[test]
fn missing_companion_is_skipped_and_batch_continues() {
    let input = tempdir().expect("tempdir");
    let output = input.path().join("train");
    write_stack(&input.path().join("alone.tif"), &Array3::zeros((2, 3, 3)));
    scenario(input.path(), "cells");

    let report = run(&SliceConfig::new(input.path(), &output)).expect("run");
    assert!(report.is_clean());
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.skipped.len(), 1);
    let (image, reason) = &report.skipped[0];
    assert_eq!(image, &input.path().join("alone.tif"));
    assert_eq!(
        reason,
        &SkipReason::MissingCompanion(input.path().join("alone_seg.npz"))
    );
    let from_alone = fs::read_dir(&output)
        .expect("read_dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("alone"))
        .count();
    assert_eq!(from_alone, 0);
}

#[test]
fn label_archive_without_key_is_skipped() {
    let input = tempdir().expect("tempdir");
    let output = input.path().join("train");
    write_stack(&input.path().join("cells.tif"), &Array3::zeros((2, 3, 3)));
    write_labels(
        &input.path().join("cells_seg.npz"),
        "outlines.npy",
        &Array3::ones((2, 3, 3)),
    );

    let config = SliceConfig::new(input.path(), &output);
    match process_file(&config, &input.path().join("cells.tif")).expect("process") {
        FileOutcome::Skipped(SkipReason::MissingKey { key, .. }) => assert_eq!(key, "masks"),
        other => panic!("expected a missing-key skip, got {other:?}"),
    }
    let report = run(&config).expect("run");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.totals().total(), 0);
}

#[test]
fn broken_files_are_recorded_and_others_still_sliced() {
    let input = tempdir().expect("tempdir");
    let output = input.path().join("train");
    scenario(input.path(), "good");

    // RGB stack: trailing channel axis of size 3
    let rgb = input.path().join("rgb.tif");
    let mut encoder = TiffEncoder::new(File::create(&rgb).expect("create")).expect("encoder");
    for _ in 0..2 {
        encoder
            .write_image::<colortype::RGB8>(3, 3, &[1u8; 27])
            .expect("page");
    }
    drop(encoder);
    write_labels(&input.path().join("rgb_seg.npz"), "masks.npy", &Array3::ones((2, 3, 3)));

    // label volume with the wrong shape
    write_stack(&input.path().join("short.tif"), &Array3::zeros((2, 3, 3)));
    write_labels(&input.path().join("short_seg.npz"), "masks.npy", &Array3::ones((2, 3, 4)));

    let report = run(&SliceConfig::new(input.path(), &output)).expect("run");
    assert!(!report.is_clean());
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.totals(), AxisCounts { xy: 1, xz: 20, yz: 20 });
    assert_eq!(report.failures.len(), 2);
    assert!(matches!(
        &report.failures[0],
        (path, SliceError::UnsupportedShape { shape, .. })
            if path.ends_with("rgb.tif") && shape == &vec![2, 3, 3, 3]
    ));
    assert!(matches!(
        &report.failures[1],
        (path, SliceError::ShapeMismatch { .. }) if path.ends_with("short.tif")
    ));
}

#[test]
fn anisotropy_does_not_change_output() {
    let input = tempdir().expect("tempdir");
    scenario(input.path(), "cells");
    let plain = run(&SliceConfig::new(input.path(), input.path().join("a"))).expect("run");
    let config = SliceConfig::new(input.path(), input.path().join("b")).with_anisotropy(Some(3.85));
    let aniso = run(&config).expect("run");
    assert_eq!(plain.totals(), aniso.totals());
    for plane in Plane::ALL {
        assert_eq!(plain.totals().get(plane), aniso.totals().get(plane));
    }
}

#[test]
fn missing_input_directory_fails_the_run() {
    let dir = tempdir().expect("tempdir");
    let config = SliceConfig::new(dir.path().join("nope"), dir.path().join("out"));
    assert!(matches!(run(&config), Err(SliceError::Config(_))));
    assert!(!dir.path().join("out").exists());
}

/// The scenario volume stored as NIfTI, i.e. (X, Y, Z) = (20, 20, 10).
fn nifti_scenario(dir: &Path, stem: &str) {
    let xyz = Array3::from_shape_fn((20, 20, 10), |(x, y, z)| (z * 400 + y * 20 + x) as f32);
    WriterOptions::new(dir.join(format!("{stem}.nii")))
        .write_nifti(&xyz)
        .expect("write nifti");
    let mut labels = Array3::<u16>::zeros((10, 20, 20));
    labels.index_axis_mut(Axis(0), 3).fill(5);
    labels[[3, 10, 10]] = 7;
    labels[[3, 2, 17]] = 9;
    write_labels(&dir.join(format!("{stem}_seg.npz")), "masks.npy", &labels);
}

#[test]
fn nifti_volumes_are_sliced_into_nifti_pairs() {
    let input = tempdir().expect("tempdir");
    let output = input.path().join("train");
    nifti_scenario(input.path(), "cells");

    let config = SliceConfig::new(input.path(), &output).with_extension("nii");
    let report = run(&config).expect("run");
    assert!(report.is_clean());
    assert_eq!(report.files[0].image_shape, vec![10, 20, 20]);
    assert_eq!(report.totals(), AxisCounts { xy: 1, xz: 20, yz: 20 });
    assert_eq!(count_files(&output), 2 * 41);
    let on_disk = verify_outputs(&output, &config.naming, &config.extension).expect("verify");
    assert_eq!(on_disk, report.totals());

    let mask = read_volume(&output.join("cells_XY_Z003_cp_masks.nii"), VolumeFormat::Nifti)
        .expect("mask");
    assert_eq!(mask.pixel_type, PixelType::U16);
    assert_eq!(mask.data.shape(), &[20, 20]);
    assert_eq!(mask.data[IxDyn(&[2, 17])], 9.0);
    assert_eq!(mask.data[IxDyn(&[17, 2])], 5.0);

    let image = read_volume(&output.join("cells_XZ_Y010.nii"), VolumeFormat::Nifti)
        .expect("image");
    assert_eq!(image.pixel_type, PixelType::F32);
    assert_eq!(image.data.shape(), &[10, 20]);
    assert_eq!(image.data[IxDyn(&[3, 4])], (3 * 400 + 10 * 20 + 4) as f32);
}

#[test]
fn nifti_int16_volume_fails_its_file() {
    let input = tempdir().expect("tempdir");
    let output = input.path().join("train");
    WriterOptions::new(input.path().join("vol.nii"))
        .write_nifti(&Array3::<i16>::ones((5, 4, 3)))
        .expect("write nifti");
    let mut labels = Array3::<u16>::zeros((3, 4, 5));
    labels[[1, 2, 3]] = 1;
    write_labels(&input.path().join("vol_seg.npz"), "masks.npy", &labels);

    let report = run(&SliceConfig::new(input.path(), &output).with_extension("nii")).expect("run");
    assert!(report.files.is_empty());
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0].1,
        SliceError::UnsupportedSampleType { found, .. } if found.contains("Int16")
    ));
    assert_eq!(count_files(&output), 0);
}
