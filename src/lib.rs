//! Cut 3D image/label volume pairs into 2D training slices.
//!
//! Every image in a directory is paired with its label archive, sliced along
//! Z, Y and X, and each slice holding enough labeled objects is written out
//! as an image/mask pair. See [`pipeline::run`].

pub mod common;
pub mod config;
pub mod discover;
pub mod error;
pub mod formats;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod slicing;

pub use config::SliceConfig;
pub use error::{Result, SliceError};
