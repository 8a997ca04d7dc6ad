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

use crate::{geometry::point::Point3, numeric::scalar::Scalar};

/// An axis-aligned bounding box in 3 dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb<T: Scalar> {
    pub min: Point3<T>,
    pub max: Point3<T>,
}

impl<T: Scalar> Aabb<T> {
    pub fn new(min: Point3<T>, max: Point3<T>) -> Self {
        Aabb { min, max }
    }

    /// Smallest box containing every point; `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<T>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut aabb = Aabb::new(first, first);
        for p in iter {
            for i in 0..3 {
                aabb.min[i] = aabb.min[i].min(p[i]);
                aabb.max[i] = aabb.max[i].max(p[i]);
            }
        }
        Some(aabb)
    }

    /// Length along axis `i`.
    #[inline]
    pub fn extent(&self, i: usize) -> T {
        self.max[i] - self.min[i]
    }

    pub fn center(&self) -> Point3<T> {
        let half = T::half();
        Point3::new(std::array::from_fn(|i| (self.min[i] + self.max[i]) * half))
    }

    pub fn diagonal_length(&self) -> T {
        (0..3)
            .map(|i| self.extent(i) * self.extent(i))
            .fold(T::zero(), |a, b| a + b)
            .sqrt()
    }

    pub fn contains(&self, p: &Point3<T>, tol: T) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - tol && p[i] <= self.max[i] + tol)
    }

    /// Whether the boxes share a point, each grown by `tol`.
    pub fn overlaps(&self, other: &Aabb<T>, tol: T) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] + tol && other.min[i] <= self.max[i] + tol)
    }

    /// Maps `x` into box-normalized coordinates (`min` → 0, `max` → 1).
    /// A flat axis maps to 0.
    pub fn normalize(&self, x: &Point3<T>) -> [T; 3] {
        std::array::from_fn(|i| {
            let e = self.extent(i);
            if e > T::zero() {
                (x[i] - self.min[i]) / e
            } else {
                T::zero()
            }
        })
    }

    /// Inverse of [`Aabb::normalize`].
    pub fn denormalize(&self, pcoords: &[T; 3]) -> Point3<T> {
        Point3::new(std::array::from_fn(|i| {
            self.min[i] + pcoords[i] * self.extent(i)
        }))
    }
}
