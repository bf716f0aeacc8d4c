use crate::{Point3i, PointN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Either the X, Y, or Z axis.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Axis3 {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis3 {
    /// The index for a point's component on this axis.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn get_unit_vector(&self) -> Point3i {
        match self {
            Axis3::X => PointN([1, 0, 0]),
            Axis3::Y => PointN([0, 1, 0]),
            Axis3::Z => PointN([0, 0, 1]),
        }
    }
}

/// One of the 6 face directions of an axis-aligned cell. The discriminants are the slots of a node's neighbor links.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum NeighborDirection {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

impl NeighborDirection {
    pub const ALL: [NeighborDirection; 6] = [
        NeighborDirection::PosX,
        NeighborDirection::NegX,
        NeighborDirection::PosY,
        NeighborDirection::NegY,
        NeighborDirection::PosZ,
        NeighborDirection::NegZ,
    ];

    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }

    #[inline]
    pub fn axis(&self) -> Axis3 {
        match self {
            NeighborDirection::PosX | NeighborDirection::NegX => Axis3::X,
            NeighborDirection::PosY | NeighborDirection::NegY => Axis3::Y,
            NeighborDirection::PosZ | NeighborDirection::NegZ => Axis3::Z,
        }
    }

    #[inline]
    pub fn sign(&self) -> i32 {
        if self.index() % 2 == 0 {
            1
        } else {
            -1
        }
    }

    #[inline]
    pub fn opposite(&self) -> Self {
        Self::ALL[self.index() ^ 1]
    }

    #[inline]
    pub fn get_vector(&self) -> Point3i {
        self.axis().get_unit_vector() * self.sign()
    }

    pub fn from_vector(v: Point3i) -> Option<Self> {
        match v {
            PointN([1, 0, 0]) => Some(NeighborDirection::PosX),
            PointN([-1, 0, 0]) => Some(NeighborDirection::NegX),
            PointN([0, 1, 0]) => Some(NeighborDirection::PosY),
            PointN([0, -1, 0]) => Some(NeighborDirection::NegY),
            PointN([0, 0, 1]) => Some(NeighborDirection::PosZ),
            PointN([0, 0, -1]) => Some(NeighborDirection::NegZ),
            _ => None,
        }
    }
}

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
