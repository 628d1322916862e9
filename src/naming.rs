//! File naming for slice outputs.
//!
//! Outputs are named `<stem>_<TAG>_<L><index>.<ext>` for the image slice and
//! `<stem>_<TAG>_<L><index><mask_suffix>.<ext>` for the label slice, where
//! `TAG` is the plane (`XY`, `XZ`, `YZ`) and `L` the walked axis letter.

use crate::common::Plane;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    /// Appended to the slice stem of label outputs.
    pub mask_suffix: String,
    /// Zero padding of the slice index.
    pub index_width: usize,
    /// Name fragments marking files derived from an image (masks, flows,
    /// segmentation results). Such files are never treated as inputs.
    pub derived_markers: Vec<String>,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            mask_suffix: "_cp_masks".to_string(),
            index_width: 3,
            derived_markers: vec![
                "_cp_masks".to_string(),
                "_flows".to_string(),
                "_seg".to_string(),
            ],
        }
    }
}

impl Naming {
    pub fn slice_stem(&self, stem: &str, plane: Plane, index: usize) -> String {
        format!(
            "{stem}_{}_{}{:0width$}",
            plane.tag(),
            plane.index_letter(),
            index,
            width = self.index_width
        )
    }

    pub fn image_name(&self, stem: &str, plane: Plane, index: usize, ext: &str) -> String {
        format!("{}.{ext}", self.slice_stem(stem, plane, index))
    }

    pub fn mask_name(&self, stem: &str, plane: Plane, index: usize, ext: &str) -> String {
        format!(
            "{}{}.{ext}",
            self.slice_stem(stem, plane, index),
            self.mask_suffix
        )
    }

    /// Whether `file_name` carries one of the derived-output markers.
    pub fn is_derived(&self, file_name: &str) -> bool {
        self.derived_markers
            .iter()
            .any(|marker| file_name.contains(marker.as_str()))
    }

    /// Whether `stem` looks like an image slice written by this tool, i.e.
    /// contains `_XY_Z<digits>`, `_XZ_Y<digits>` or `_YZ_X<digits>` followed
    /// by the end of the stem or an underscore.
    pub fn is_slice_output(&self, stem: &str) -> bool {
        Plane::ALL.iter().any(|plane| {
            let marker = format!("_{}_{}", plane.tag(), plane.index_letter());
            stem.match_indices(marker.as_str()).any(|(at, _)| {
                let rest = &stem[at + marker.len()..];
                let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
                digits > 0 && matches!(rest[digits..].chars().next(), None | Some('_'))
            })
        })
    }

    /// Glob matching the label outputs of one plane in a directory listing.
    pub fn mask_pattern(&self, plane: Plane, ext: &str) -> String {
        format!("*_{}_*{}.{ext}", plane.tag(), self.mask_suffix)
    }
}

/// Strip `.<ext>` from `file_name`. Unlike `Path::file_stem` this keeps
/// inner periods and handles compound extensions such as `nii.gz`.
pub fn strip_extension<'a>(file_name: &'a str, ext: &str) -> Option<&'a str> {
    file_name
        .strip_suffix(ext)
        .and_then(|rest| rest.strip_suffix('.'))
        .filter(|stem| !stem.is_empty())
}
