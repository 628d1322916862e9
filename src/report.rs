//! Per-file and per-run tallies, the run summary and the on-disk recount.

use std::fmt;
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};

use crate::common::{AxisCounts, Plane};
use crate::error::{Result, SliceError};
use crate::naming::Naming;
use crate::slicing::PlaneTally;

/// Why an image was passed over without producing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingCompanion(PathBuf),
    MissingKey { companion: PathBuf, key: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingCompanion(path) => {
                write!(f, "no label file {} found", path.display())
            }
            SkipReason::MissingKey { companion, key } => {
                write!(f, "no '{key}' entry in {}", companion.display())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub image: PathBuf,
    pub image_shape: Vec<usize>,
    pub label_shape: Vec<usize>,
    pub planes: Vec<(Plane, PlaneTally)>,
}

impl FileReport {
    pub fn saved(&self) -> AxisCounts {
        let mut counts = AxisCounts::default();
        for (plane, tally) in &self.planes {
            counts.add(*plane, tally.saved);
        }
        counts
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub output_dir: PathBuf,
    pub files: Vec<FileReport>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub failures: Vec<(PathBuf, SliceError)>,
}

impl RunReport {
    /// Slice pairs written during this run.
    pub fn totals(&self) -> AxisCounts {
        let mut totals = AxisCounts::default();
        for file in &self.files {
            totals += file.saved();
        }
        totals
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        let totals = self.totals();
        writeln!(f, "{rule}")?;
        writeln!(f, "Done! Check {}", self.output_dir.display())?;
        writeln!(f, "Created:")?;
        for plane in Plane::ALL {
            writeln!(f, "  {} {plane} slice pairs", totals.get(plane))?;
        }
        writeln!(f, "  {} total training pairs", totals.total())?;
        if !self.skipped.is_empty() {
            writeln!(f, "Skipped {} file(s):", self.skipped.len())?;
            for (image, reason) in &self.skipped {
                writeln!(f, "  {}: {reason}", image.display())?;
            }
        }
        if !self.failures.is_empty() {
            writeln!(f, "Failed {} file(s):", self.failures.len())?;
            for (image, error) in &self.failures {
                writeln!(f, "  {}: {error}", image.display())?;
            }
        }
        write!(f, "{rule}")
    }
}

/// Count label slices present in `output_dir`, per plane, by file name.
///
/// This is a diagnostic: it also counts outputs of earlier runs and any
/// unrelated file that happens to match the naming pattern.
pub fn verify_outputs(output_dir: &Path, naming: &Naming, ext: &str) -> Result<AxisCounts> {
    let dir = output_dir.to_str().ok_or_else(|| {
        SliceError::Config(format!(
            "output directory {} is not valid UTF-8",
            output_dir.display()
        ))
    })?;
    let dir = Pattern::escape(dir);
    let mut counts = AxisCounts::default();
    for plane in Plane::ALL {
        let pattern = format!("{dir}/{}", naming.mask_pattern(plane, ext));
        let mut n = 0;
        for entry in glob(&pattern)? {
            if entry?.is_file() {
                n += 1;
            }
        }
        counts.add(plane, n);
    }
    Ok(counts)
}
