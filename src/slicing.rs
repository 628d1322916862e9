//! Cutting label/image volume pairs into 2D slices and filtering them by
//! label content.

use std::collections::HashSet;
use std::path::Path;

use log::debug;
use ndarray::{Array3, ArrayD, ArrayView2, Axis, Ix3};

use crate::common::{Plane, SlicePair};
use crate::error::{Result, SliceError};


/// Saved and visited slices along one plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaneTally {
    pub saved: usize,
    pub total: usize,
}

/// Bring a loaded array to (Z, Y, X).
///
/// Three axes pass through. Four axes with a trailing axis of size 1 lose
/// that axis. Every other shape is rejected rather than guessed at.
pub fn normalize_dims<T>(data: ArrayD<T>, path: &Path) -> Result<Array3<T>> {
    let shape = data.shape().to_vec();
    match shape.as_slice() {
        [_, _, _] => Ok(data.into_dimensionality::<Ix3>()?),
        [_, _, _, 1] => Ok(data.index_axis_move(Axis(3), 0).into_dimensionality::<Ix3>()?),
        _ => Err(SliceError::UnsupportedShape {
            path: path.to_path_buf(),
            shape: data.shape().to_vec(),
        }),
    }
}

pub fn check_shapes(image: &Array3<f32>, labels: &Array3<u16>, path: &Path) -> Result<()> {
    if image.shape() != labels.shape() {
        return Err(SliceError::ShapeMismatch {
            path: path.to_path_buf(),
            image: image.shape().to_vec(),
            labels: labels.shape().to_vec(),
        });
    }
    Ok(())
}

/// Number of distinct non-zero labels in a slice.
pub fn count_labels(slice: ArrayView2<'_, u16>) -> usize {
    slice
        .iter()
        .filter(|&&v| v != 0)
        .collect::<HashSet<_>>()
        .len()
}

/// Walk every index along `plane`'s axis and hand each slice holding at
/// least `min_masks` distinct labels to `sink`.
///
/// `image` and `labels` must have the same shape (see [`check_shapes`]).
/// Slices below the threshold are skipped without touching the image.
pub fn slice_plane<F>(
    image: &Array3<f32>,
    labels: &Array3<u16>,
    plane: Plane,
    min_masks: usize,
    mut sink: F,
) -> Result<PlaneTally>
where
    F: FnMut(SlicePair<'_>) -> Result<()>,
{
    let axis = plane.axis();
    let total = labels.len_of(axis);
    let mut saved = 0;

    for index in 0..total {
        let label_slice = labels.index_axis(axis, index);
        let label_count = count_labels(label_slice);
        if label_count < min_masks {
            continue;
        }
        debug!("{plane} {index}: {label_count} labels, keeping");
        sink(SlicePair {
            image: image.index_axis(axis, index),
            labels: label_slice,
            plane,
            index,
            label_count,
        })?;
        saved += 1;
    }

    Ok(PlaneTally { saved, total })
}
