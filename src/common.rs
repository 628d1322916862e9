use ndarray::{ArrayView2, Axis};
use std::fmt;
use std::ops::AddAssign;

// set up enums and structs

/// A family of 2D cross-sections through a (Z, Y, X) volume.
///
/// Each plane is produced by walking one axis and holding the other two full:
/// `XY` walks Z, `XZ` walks Y and `YZ` walks X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::XY, Plane::XZ, Plane::YZ];

    /// Index of the volume axis walked to produce this plane.
    pub fn to_usize(self) -> usize {
        match self {
            Plane::XY => 0,
            Plane::XZ => 1,
            Plane::YZ => 2,
        }
    }

    pub fn axis(self) -> Axis {
        Axis(self.to_usize())
    }

    /// Tag used in output file names.
    pub fn tag(self) -> &'static str {
        match self {
            Plane::XY => "XY",
            Plane::XZ => "XZ",
            Plane::YZ => "YZ",
        }
    }

    /// Letter of the walked axis, prefixed to the slice index in file names.
    pub fn index_letter(self) -> char {
        match self {
            Plane::XY => 'Z',
            Plane::XZ => 'Y',
            Plane::YZ => 'X',
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// An image slice and its co-located label slice.
#[derive(Debug)]
pub struct SlicePair<'a> {
    pub image: ArrayView2<'a, f32>,
    pub labels: ArrayView2<'a, u16>,
    pub plane: Plane,
    pub index: usize,
    /// Distinct non-background labels present in `labels`.
    pub label_count: usize,
}

/// Saved slice pairs per plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisCounts {
    pub xy: usize,
    pub xz: usize,
    pub yz: usize,
}

impl AxisCounts {
    pub fn get(&self, plane: Plane) -> usize {
        match plane {
            Plane::XY => self.xy,
            Plane::XZ => self.xz,
            Plane::YZ => self.yz,
        }
    }

    pub fn add(&mut self, plane: Plane, n: usize) {
        match plane {
            Plane::XY => self.xy += n,
            Plane::XZ => self.xz += n,
            Plane::YZ => self.yz += n,
        }
    }

    pub fn total(&self) -> usize {
        self.xy + self.xz + self.yz
    }
}

impl AddAssign for AxisCounts {
    fn add_assign(&mut self, other: Self) {
        self.xy += other.xy;
        self.xz += other.xz;
        self.yz += other.yz;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planes_walk_distinct_axes() {
        let axes: Vec<usize> = Plane::ALL.iter().map(|p| p.to_usize()).collect();
        assert_eq!(axes, vec![0, 1, 2]);
        assert_eq!(Plane::XY.index_letter(), 'Z');
        assert_eq!(Plane::YZ.index_letter(), 'X');
    }

    #[test]
    fn display_uses_tag() {
        let tags: Vec<String> = Plane::ALL.iter().map(|p| p.to_string()).collect();
        assert_eq!(tags, vec!["XY", "XZ", "YZ"]);
    }

    #[test]
    fn axis_counts_accumulate() {
        let mut counts = AxisCounts::default();
        counts.add(Plane::XY, 2);
        counts.add(Plane::YZ, 5);
        counts += AxisCounts { xy: 1, xz: 1, yz: 0 };
        assert_eq!(counts.get(Plane::XY), 3);
        assert_eq!(counts.get(Plane::XZ), 1);
        assert_eq!(counts.total(), 9);
    }
}
