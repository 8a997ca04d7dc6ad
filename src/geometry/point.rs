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

use std::{
    array::from_fn,
    ops::{Add, Index, IndexMut, Sub},
};

use crate::{geometry::vector::Vector, numeric::scalar::Scalar};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T: Scalar, const N: usize> {
    pub coords: [T; N],
}

pub trait PointOps<T: Scalar, const N: usize>: Sized {
    fn distance_squared_to(&self, other: &Self) -> T;
    fn distance_to(&self, other: &Self) -> T;
    fn as_vector(&self) -> Vector<T, N>;
    fn add_vector(&self, v: &Vector<T, N>) -> Self;
    fn vector_to(&self, other: &Self) -> Vector<T, N>;
    fn midpoint(&self, other: &Self) -> Self;
}

impl<T: Scalar, const N: usize> Point<T, N> {
    #[inline]
    pub fn new(coords: [T; N]) -> Self {
        Point { coords }
    }

    pub fn from_vals<V>(vals: [V; N]) -> Self
    where
        V: Into<f64>,
    {
        Point {
            coords: vals.map(|v| T::from_f64(v.into())),
        }
    }

    #[inline]
    pub fn origin() -> Self {
        Point {
            coords: [T::zero(); N],
        }
    }

    #[inline]
    pub fn coords(&self) -> &[T; N] {
        &self.coords
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.coords.iter()
    }

    pub fn cast<U: Scalar>(&self) -> Point<U, N> {
        Point {
            coords: from_fn(|i| U::from_f64(self.coords[i].to_f64_lossy())),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite())
    }
}

impl<T: Scalar> Point<T, 3> {
    #[inline]
    pub fn x(&self) -> T {
        self.coords[0]
    }

    #[inline]
    pub fn y(&self) -> T {
        self.coords[1]
    }

    #[inline]
    pub fn z(&self) -> T {
        self.coords[2]
    }

    /// Drops the z coordinate.
    #[inline]
    pub fn xy(&self) -> Point<T, 2> {
        Point::new([self.coords[0], self.coords[1]])
    }
}

impl<T: Scalar, const N: usize> Default for Point<T, N> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<T: Scalar, const N: usize> PointOps<T, N> for Point<T, N> {
    #[inline]
    fn distance_squared_to(&self, other: &Self) -> T {
        let mut sum = T::zero();
        for i in 0..N {
            let d = self.coords[i] - other.coords[i];
            sum = sum + d * d;
        }
        sum
    }

    #[inline]
    fn distance_to(&self, other: &Self) -> T {
        self.distance_squared_to(other).sqrt()
    }

    #[inline]
    fn as_vector(&self) -> Vector<T, N> {
        Vector::new(self.coords)
    }

    #[inline]
    fn add_vector(&self, v: &Vector<T, N>) -> Self {
        Point {
            coords: from_fn(|i| self.coords[i] + v.coords[i]),
        }
    }

    #[inline]
    fn vector_to(&self, other: &Self) -> Vector<T, N> {
        Vector::new(from_fn(|i| other.coords[i] - self.coords[i]))
    }

    fn midpoint(&self, other: &Self) -> Self {
        let half = T::half();
        Point {
            coords: from_fn(|i| (self.coords[i] + other.coords[i]) * half),
        }
    }
}

impl<T: Scalar, const N: usize> Index<usize> for Point<T, N> {
    type Output = T;
    fn index(&self, i: usize) -> &Self::Output {
        &self.coords[i]
    }
}

impl<T: Scalar, const N: usize> IndexMut<usize> for Point<T, N> {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.coords[i]
    }
}

impl<T: Scalar, const N: usize> Sub for Point<T, N> {
    type Output = Vector<T, N>;
    #[inline]
    fn sub(self, rhs: Point<T, N>) -> Self::Output {
        rhs.vector_to(&self)
    }
}

impl<'a, 'b, T: Scalar, const N: usize> Sub<&'b Point<T, N>> for &'a Point<T, N> {
    type Output = Vector<T, N>;
    #[inline]
    fn sub(self, rhs: &'b Point<T, N>) -> Self::Output {
        rhs.vector_to(self)
    }
}

impl<T: Scalar, const N: usize> Add<Vector<T, N>> for Point<T, N> {
    type Output = Point<T, N>;
    #[inline]
    fn add(self, rhs: Vector<T, N>) -> Self::Output {
        self.add_vector(&rhs)
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for Point<T, N> {
    fn from(coords: [T; N]) -> Self {
        Point { coords }
    }
}

impl<T: Scalar, const N: usize> From<Point<T, N>> for [T; N] {
    fn from(p: Point<T, N>) -> Self {
        p.coords
    }
}

pub type Point2<T> = Point<T, 2>;
pub type Point3<T> = Point<T, 3>;
