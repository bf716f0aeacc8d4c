use crate::{Point3i, PointN};

use morton_encoding::{morton_decode, morton_encode};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The largest coordinate (exclusive) along any axis that can be Morton-encoded.
pub const MAX_MORTON_COORDINATE: i32 = 1 << 16;

/// A Morton-encoded voxel coordinate within one octree layer. Coordinates are non-negative and less than
/// `MAX_MORTON_COORDINATE`, which fits 48 bits in a `u64`.
///
/// X is the least significant bit of each interleaved triple, so the 8 children of a cell are the codes
/// `first_child()..first_child() + 8`, in the order (x, y, z) = (0,0,0), (1,0,0), (0,1,0), ..., (1,1,1).
///
/// <https://en.wikipedia.org/wiki/Z-order_curve>
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct MortonCode(pub u64);

impl fmt::Debug for MortonCode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{} = {:b}", self.0, self.0)
    }
}

impl MortonCode {
    /// Encodes `p`, or returns `None` if any coordinate is outside of `[0, MAX_MORTON_COORDINATE)`.
    #[inline]
    pub fn from_coordinates(p: Point3i) -> Option<Self> {
        let in_range = |c: i32| (0..MAX_MORTON_COORDINATE).contains(&c);
        if !(in_range(p.x()) && in_range(p.y()) && in_range(p.z())) {
            return None;
        }

        Some(Self(morton_encode([p.z() as u16, p.y() as u16, p.x() as u16])))
    }

    #[inline]
    pub fn coordinates(&self) -> Point3i {
        let zyx: [u16; 3] = morton_decode(self.0);

        PointN([zyx[2] as i32, zyx[1] as i32, zyx[0] as i32])
    }

    /// The code of the cell containing this one in the next coarser layer.
    #[inline]
    pub fn parent(&self) -> Self {
        Self(self.0 >> 3)
    }

    /// The code of this cell's first child in the next finer layer.
    #[inline]
    pub fn first_child(&self) -> Self {
        Self(self.0 << 3)
    }

    #[inline]
    pub fn child(&self, child_index: u8) -> Self {
        Self((self.0 << 3) | (child_index & 7) as u64)
    }

    /// Which of its parent's 8 children this cell is.
    #[inline]
    pub fn child_index(&self) -> u8 {
        (self.0 & 7) as u8
    }
}

/// Morton index of a cell inside a small grid of at most 4 cells per axis, like the sub-voxels of a leaf. This avoids
/// a full encode for the 6-bit case.
#[inline]
pub fn morton_index_4x4x4(p: Point3i) -> u8 {
    let spread = |c: i32| {
        let c = (c & 3) as u8;

        (c & 1) | ((c & 2) << 2)
    };

    spread(p.x()) | (spread(p.y()) << 1) | (spread(p.z()) << 2)
}

/// The inverse of `morton_index_4x4x4`.
#[inline]
pub fn morton_coordinates_4x4x4(index: u8) -> Point3i {
    let compact = |bits: u8| ((bits & 1) | ((bits >> 2) & 2)) as i32;

    PointN([
        compact(index & 0b1001),
        compact((index >> 1) & 0b1001),
        compact((index >> 2) & 0b1001),
    ])
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn limits() {
        let max = PointN([MAX_MORTON_COORDINATE - 1; 3]);

        assert_eq!(
            MortonCode::from_coordinates(PointN([0; 3])),
            Some(MortonCode(0))
        );
        assert_eq!(
            MortonCode::from_coordinates(max),
            Some(MortonCode((1 << 48) - 1))
        );
        assert_eq!(MortonCode::from_coordinates(PointN([-1, 0, 0])), None);
        assert_eq!(
            MortonCode::from_coordinates(PointN([0, MAX_MORTON_COORDINATE, 0])),
            None
        );
    }

    #[test]
    fn x_is_least_significant() {
        assert_eq!(
            MortonCode::from_coordinates(PointN([1, 0, 0])),
            Some(MortonCode(1))
        );
        assert_eq!(
            MortonCode::from_coordinates(PointN([0, 1, 0])),
            Some(MortonCode(2))
        );
        assert_eq!(
            MortonCode::from_coordinates(PointN([0, 0, 1])),
            Some(MortonCode(4))
        );
    }

    #[test]
    fn children_are_contiguous_in_morton_space() {
        for parent_coords in [PointN([0, 0, 0]), PointN([3, 1, 2]), PointN([7, 7, 0])] {
            let parent = MortonCode::from_coordinates(parent_coords).unwrap();
            for (i, offset) in Z_OFFSETS.iter().enumerate() {
                let child = MortonCode::from_coordinates(parent_coords * 2 + PointN(*offset)).unwrap();

                assert_eq!(child, parent.child(i as u8));
                assert_eq!(child.0, parent.first_child().0 + i as u64);
                assert_eq!(child.parent(), parent);
                assert_eq!(child.child_index(), i as u8);
            }
        }
    }

    #[test]
    fn decode_is_inverse_of_encode() {
        for p in [PointN([0, 0, 0]), PointN([5, 9, 13]), PointN([1023, 0, 77])] {
            assert_eq!(MortonCode::from_coordinates(p).unwrap().coordinates(), p);
        }
    }

    #[test]
    fn small_grid_index_matches_full_encoding() {
        for index in 0..64u8 {
            let p = morton_coordinates_4x4x4(index);

            assert_eq!(morton_index_4x4x4(p), index);
            assert_eq!(MortonCode::from_coordinates(p), Some(MortonCode(index as u64)));
        }
    }

    const Z_OFFSETS: [[i32; 3]; 8] = [
        [0, 0, 0],
        [1, 0, 0],
        [0, 1, 0],
        [1, 1, 0],
        [0, 0, 1],
        [1, 0, 1],
        [0, 1, 1],
        [1, 1, 1],
    ];
}
