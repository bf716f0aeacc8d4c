use crate::{Distance, Point, PointN, SmallZero};

use core::ops::{Add, Div, Mul, Sub};
use std::cmp::Ordering;

/// A 3-dimensional point with scalar type `T`.
pub type Point3<T> = PointN<[T; 3]>;
/// A 3-dimensional point with scalar type `i32`.
pub type Point3i = PointN<[i32; 3]>;
/// A 3-dimensional point with scalar type `f32`.
pub type Point3f = PointN<[f32; 3]>;

impl<T> Point3<T>
where
    T: Copy,
{
    pub fn fill(value: T) -> Self {
        PointN([value; 3])
    }

    pub fn x(&self) -> T {
        self.0[0]
    }

    pub fn y(&self) -> T {
        self.0[1]
    }

    pub fn z(&self) -> T {
        self.0[2]
    }
}

impl Point3f {
    pub fn floor(&self) -> Self {
        self.map_components(|c| c.floor())
    }

    /// Component-wise minimum.
    pub fn meet(&self, other: &Self) -> Self {
        self.zip_map(other, f32::min)
    }

    /// Component-wise maximum.
    pub fn join(&self, other: &Self) -> Self {
        self.zip_map(other, f32::max)
    }

    pub fn min_component(&self) -> f32 {
        self.x().min(self.y()).min(self.z())
    }

    pub fn max_component(&self) -> f32 {
        self.x().max(self.y()).max(self.z())
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    /// Returns `true` iff every component differs by at most `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f32) -> bool {
        (*self - *other).abs().max_component() <= tolerance
    }
}

impl Point3i {
    pub fn right_shift(&self, shift_by: i32) -> Self {
        self.map_components(|c| c >> shift_by)
    }
}

impl From<Point3i> for Point3f {
    fn from(p: Point3i) -> Self {
        PointN([p.x() as f32, p.y() as f32, p.z() as f32])
    }
}

/// The integer coordinates of the cell of edge length `cell_size` containing `p`.
pub fn cell_containing_point3f(p: &Point3f, cell_size: f32) -> Point3i {
    let c = (*p / cell_size).floor();

    PointN([c.x() as i32, c.y() as i32, c.z() as i32])
}

macro_rules! impl_point3 {
    ($scalar:ty, $zero:expr) => {
        impl Point for Point3<$scalar> {
            type Scalar = $scalar;

            #[inline]
            fn abs(&self) -> Self {
                self.map_components(|c| c.abs())
            }

            #[inline]
            fn at(&self, component_index: usize) -> Self::Scalar {
                self.0[component_index]
            }

            #[inline]
            fn map_components(&self, f: impl Fn(Self::Scalar) -> Self::Scalar) -> Self {
                PointN([f(self.x()), f(self.y()), f(self.z())])
            }

            #[inline]
            fn zip_map(
                &self,
                other: &Self,
                f: impl Fn(Self::Scalar, Self::Scalar) -> Self::Scalar,
            ) -> Self {
                PointN([
                    f(self.x(), other.x()),
                    f(self.y(), other.y()),
                    f(self.z(), other.z()),
                ])
            }
        }

        impl SmallZero for Point3<$scalar> {
            const ZERO: Self = PointN([$zero; 3]);
        }


        impl Distance for Point3<$scalar> {
            #[inline]
            fn l1_distance(&self, other: &Self) -> Self::Scalar {
                let diff = *self - *other;
                let abs = diff.abs();

                abs.x() + abs.y() + abs.z()
            }

            #[inline]
            fn l2_distance_squared(&self, other: &Self) -> Self::Scalar {
                let diff = *self - *other;

                diff.x() * diff.x() + diff.y() * diff.y() + diff.z() * diff.z()
            }
        }

        impl Add for Point3<$scalar> {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                self.zip_map(&rhs, |a, b| a + b)
            }
        }

        impl Sub for Point3<$scalar> {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                self.zip_map(&rhs, |a, b| a - b)
            }
        }

        impl Mul<$scalar> for Point3<$scalar> {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: $scalar) -> Self {
                self.map_components(|c| c * rhs)
            }
        }

        impl Mul for Point3<$scalar> {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: Self) -> Self {
                self.zip_map(&rhs, |a, b| a * b)
            }
        }

        impl Div<$scalar> for Point3<$scalar> {
            type Output = Self;

            #[inline]
            fn div(self, rhs: $scalar) -> Self {
                self.map_components(|c| c / rhs)
            }
        }

        impl PartialOrd for Point3<$scalar> {
            #[inline]
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                if self < other {
                    Some(Ordering::Less)
                } else if self > other {
                    Some(Ordering::Greater)
                } else if self.eq(other) {
                    Some(Ordering::Equal)
                } else {
                    None
                }
            }

            #[inline]
            fn lt(&self, other: &Self) -> bool {
                self.x() < other.x() && self.y() < other.y() && self.z() < other.z()
            }

            #[inline]
            fn gt(&self, other: &Self) -> bool {
                self.x() > other.x() && self.y() > other.y() && self.z() > other.z()
            }

            #[inline]
            fn le(&self, other: &Self) -> bool {
                self.x() <= other.x() && self.y() <= other.y() && self.z() <= other.z()
            }

            #[inline]
            fn ge(&self, other: &Self) -> bool {
                self.x() >= other.x() && self.y() >= other.y() && self.z() >= other.z()
            }
        }
    };
}

impl_point3!(i32, 0);
impl_point3!(f32, 0.0);

// ████████╗███████╗███████╗████████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝
//    ██║   █████╗  ███████╗   ██║
//    ██║   ██╔══╝  ╚════██║   ██║
//    ██║   ███████╗███████║   ██║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝
