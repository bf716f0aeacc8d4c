use crate::{Distance, Point3f, PointN};

use core::ops::Add;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned box in world space, defined by its minimum and shape.
///
/// Containment is inclusive on both ends so that positions lying exactly on the boundary of a navigation volume still
/// belong to it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Extent3f {
    /// The least point contained in the extent.
    pub minimum: Point3f,
    /// The length of each dimension.
    pub shape: Point3f,
}

impl Extent3f {
    #[inline]
    pub fn from_min_and_shape(minimum: Point3f, shape: Point3f) -> Self {
        Self { minimum, shape }
    }

    #[inline]
    pub fn from_min_and_max(minimum: Point3f, max: Point3f) -> Self {
        Self {
            minimum,
            shape: max - minimum,
        }
    }

    #[inline]
    pub fn from_center_and_half_extent(center: Point3f, half_extent: Point3f) -> Self {
        Self::from_min_and_shape(center - half_extent, half_extent * 2.0)
    }

    /// The cube of edge length `edge` centered on `center`.
    #[inline]
    pub fn cube(center: Point3f, edge: f32) -> Self {
        Self::from_center_and_half_extent(center, Point3f::fill(0.5 * edge))
    }

    /// The greatest point contained in the extent.
    #[inline]
    pub fn max(&self) -> Point3f {
        self.minimum + self.shape
    }

    #[inline]
    pub fn center(&self) -> Point3f {
        self.minimum + self.shape * 0.5
    }

    #[inline]
    pub fn half_extent(&self) -> Point3f {
        self.shape * 0.5
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        self.shape.x() * self.shape.y() * self.shape.z()
    }

    /// Returns `true` iff some dimension has no positive length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.shape.x() > 0.0 && self.shape.y() > 0.0 && self.shape.z() > 0.0)
    }

    #[inline]
    pub fn contains(&self, p: Point3f) -> bool {
        self.minimum <= p && p <= self.max()
    }

    /// Returns `true` iff the interiors of the two extents overlap. Extents that only share a face, edge or corner do
    /// not intersect.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.minimum < other.max() && other.minimum < self.max()
    }

    /// Returns `true` iff the two extents overlap or touch.
    #[inline]
    pub fn touches(&self, other: &Self) -> bool {
        self.minimum <= other.max() && other.minimum <= self.max()
    }

    #[inline]
    pub fn intersection(&self, other: &Self) -> Self {
        let minimum = self.minimum.join(&other.minimum);
        let max = self.max().meet(&other.max()).join(&minimum);

        Self::from_min_and_max(minimum, max)
    }

    /// The point of this extent closest to `p`.
    #[inline]
    pub fn clamp(&self, p: Point3f) -> Point3f {
        p.join(&self.minimum).meet(&self.max())
    }

    /// Squared distance from `p` to the closest point of this extent. Zero if `p` is inside.
    #[inline]
    pub fn distance_squared_to(&self, p: Point3f) -> f32 {
        self.clamp(p).l2_distance_squared(&p)
    }
}

impl Add<Point3f> for Extent3f {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Point3f) -> Self::Output {
        Self::from_min_and_shape(self.minimum + rhs, self.shape)
    }
}

impl From<[[f32; 3]; 2]> for Extent3f {
    fn from([min, max]: [[f32; 3]; 2]) -> Self {
        Self::from_min_and_max(PointN(min), PointN(max))
    }
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
    fn touching_boxes_do_not_intersect() {
        let a = Extent3f::from([[0.0; 3], [1.0; 3]]);
        let b = Extent3f::from([[1.0, 0.0, 0.0], [2.0, 1.0, 1.0]]);
        let c = Extent3f::from([[0.5; 3], [1.5; 3]]);

        assert!(!a.intersects(&b));
        assert!(a.touches(&b));
        assert!(a.intersects(&c));
    }

    #[test]
    fn empty_intersection_is_empty() {
        let a = Extent3f::from([[0.0; 3], [1.0; 3]]);
        let b = Extent3f::from([[2.0; 3], [3.0; 3]]);

        assert!(a.intersection(&b).is_empty());
        assert!(!a.intersection(&a).is_empty());
    }

    #[test]
    fn clamp_and_distance() {
        let e = Extent3f::cube(Point3f::fill(0.0), 2.0);

        assert_eq!(e.clamp(PointN([3.0, 0.5, -4.0])), PointN([1.0, 0.5, -1.0]));
        assert_eq!(e.distance_squared_to(PointN([3.0, 0.0, 0.0])), 4.0);
        assert_eq!(e.distance_squared_to(PointN([0.5, 0.0, 0.0])), 0.0);
    }
}
