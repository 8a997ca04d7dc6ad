// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use crate::{
    geometry::{
        point::{Point3, PointOps},
        vector::Vector3,
    },
    numeric::scalar::Scalar,
};

/// Plane through `origin` with unit `normal`: `normal · (x - origin) = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane<T: Scalar> {
    pub normal: Vector3<T>,
    pub origin: Point3<T>,
}

impl<T: Scalar> Plane<T> {
    /// `None` if `normal` has zero length.
    pub fn new(origin: Point3<T>, normal: Vector3<T>) -> Option<Self> {
        let (normal, _) = normal.try_normalize()?;
        Some(Plane { normal, origin })
    }

    pub fn from_points(p1: &Point3<T>, p2: &Point3<T>, p3: &Point3<T>) -> Option<Self> {
        let n = (p2 - p1).cross(&(p3 - p1));
        Plane::new(*p1, n)
    }

    #[inline]
    pub fn signed_distance(&self, x: &Point3<T>) -> T {
        self.normal.dot(&(x - &self.origin))
    }

    /// Orthogonal projection of `x` onto the plane.
    pub fn project_point(&self, x: &Point3<T>) -> Point3<T> {
        let d = self.signed_distance(x);
        x.add_vector(&self.normal.scale(-d))
    }

    /// Intersection of segment `p1`–`p2` with the plane as `(t, x)`, `t` in
    /// `[0, 1]`. Segments parallel to the plane never intersect.
    pub fn intersect_segment(&self, p1: &Point3<T>, p2: &Point3<T>) -> Option<(T, Point3<T>)> {
        let p21 = p2 - p1;
        let num = self.normal.dot(&(&self.origin - p1));
        let den = self.normal.dot(&p21);

        if den.abs() <= T::tolerance() * p21.norm() {
            return None;
        }

        let t = num / den;
        if t < T::zero() || t > T::one() {
            return None;
        }
        Some((t, p1.add_vector(&p21.scale(t))))
    }
}
