use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SliceError>;

#[derive(Debug, Error)]
pub enum SliceError {
    #[error("{path}: unsupported volume shape {shape:?}, expected (Z, Y, X) or (Z, Y, X, 1)")]
    UnsupportedShape { path: PathBuf, shape: Vec<usize> },

    #[error("{path}: image shape {image:?} does not match label shape {labels:?}")]
    ShapeMismatch {
        path: PathBuf,
        image: Vec<usize>,
        labels: Vec<usize>,
    },

    #[error("{path}: unsupported sample type {found}")]
    UnsupportedSampleType { path: PathBuf, found: String },

    #[error("{path}: label value {value} is outside 0..=65535")]
    LabelOutOfRange { path: PathBuf, value: i128 },

    #[error("unsupported volume extension: {0}")]
    UnsupportedFormat(String),

    #[error("{path}: TIFF pages must have identical dimensions")]
    RaggedStack { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF decode/encode failure: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("NIfTI failure: {0}")]
    Nifti(#[from] nifti::NiftiError),

    #[error("label archive failure: {0}")]
    Npz(#[from] ndarray_npy::ReadNpzError),

    #[error("array shape failure: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("bad glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("directory scan failure: {0}")]
    Glob(#[from] glob::GlobError),
}
