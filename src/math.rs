// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::Sub;

use num_traits::Num;
use serde::{Deserialize, Serialize};

/// The scalar types the geometric kernel accepts. Callers pick the precision:
/// plain integers for exact lattice inputs, wide integers or floats otherwise.
/// The predicates multiply three coordinates at a time, so a type that
/// overflows on cubic products of the coordinate range will produce wrong
/// results.
pub trait Scalar: Num + Copy + PartialOrd + Debug {}
impl<T: Num + Copy + PartialOrd + Debug> Scalar for T {}

/// A point (or vector) in 3D space.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3<F> {
    pub x: F,
    pub y: F,
    pub z: F,
}

/// A point in the plane, the input currency of the Delaunay and Voronoi
/// builders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2<F> {
    pub x: F,
    pub y: F,
}

/// A 3D point with an opaque label attached. The Delaunay triangulator uses
/// the label to trace input indices through the paraboloid lift.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint<F, L> {
    pub position: Point3<F>,
    pub label: L,
}

impl<F> Point3<F> {
    pub const fn new(x: F, y: F, z: F) -> Self {
        Self { x, y, z }
    }
}

impl<F> Point2<F> {
    pub const fn new(x: F, y: F) -> Self {
        Self { x, y }
    }
}

fn cmp_scalar<F: Scalar>(a: F, b: F) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

impl<F: Scalar> Point3<F> {
    /// Total order on points by (x, y, z). Incomparable coordinates (NaN)
    /// compare as equal.
    pub fn lexicographic_cmp(&self, other: &Self) -> Ordering {
        cmp_scalar(self.x, other.x)
            .then_with(|| cmp_scalar(self.y, other.y))
            .then_with(|| cmp_scalar(self.z, other.z))
    }
}

impl<F: Scalar> Sub for Point3<F> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Anything that sits at a 3D position. The hull engine is generic over this
/// so labeled points travel through it unchanged.
pub trait Position3 {
    type Scalar: Scalar;

    fn position(&self) -> Point3<Self::Scalar>;
}

impl<F: Scalar> Position3 for Point3<F> {
    type Scalar = F;

    fn position(&self) -> Point3<F> {
        *self
    }
}

impl<F: Scalar, L> Position3 for LabeledPoint<F, L> {
    type Scalar = F;

    fn position(&self) -> Point3<F> {
        self.position
    }
}

pub fn scalar_product<F: Scalar>(a: Point3<F>, b: Point3<F>) -> F {
    a.x * b.x + a.y * b.y + a.z * b.z
}

pub fn vector_product<F: Scalar>(a: Point3<F>, b: Point3<F>) -> Point3<F> {
    Point3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

pub fn determinant<F: Scalar>(a: Point3<F>, b: Point3<F>, c: Point3<F>) -> F {
    scalar_product(a, vector_product(b, c))
}

/// Signed volume sign of the tetrahedron `pqrs`: positive when `s` lies on
/// the side of the oriented plane `p -> q -> r` its normal points toward.
pub fn orientation<F: Scalar>(p: Point3<F>, q: Point3<F>, r: Point3<F>, s: Point3<F>) -> F {
    determinant(q - p, r - p, s - p)
}

/// Whether `p`, `q`, `r` lie on one line. Uses pairwise coordinate cross
/// products, so it stays exact for integer scalars.
pub fn collinear<F: Scalar>(p: Point3<F>, q: Point3<F>, r: Point3<F>) -> bool {
    let a = q - p;
    let b = r - p;
    a.x * b.y == b.x * a.y && a.y * b.z == b.y * a.z && a.z * b.x == b.z * a.x
}
