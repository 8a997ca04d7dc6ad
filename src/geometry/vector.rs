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
    ops::{Add, Index, Mul, Neg, Sub},
};

use crate::numeric::scalar::Scalar;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector<T: Scalar, const N: usize> {
    pub coords: [T; N],
}

impl<T: Scalar, const N: usize> Vector<T, N> {
    #[inline]
    pub fn new(coords: [T; N]) -> Self {
        Vector { coords }
    }

    #[inline]
    pub fn zero() -> Self {
        Vector {
            coords: [T::zero(); N],
        }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> T {
        let mut sum = T::zero();
        for i in 0..N {
            sum = sum + self.coords[i] * other.coords[i];
        }
        sum
    }

    #[inline]
    pub fn norm_squared(&self) -> T {
        self.dot(self)
    }

    #[inline]
    pub fn norm(&self) -> T {
        self.norm_squared().sqrt()
    }

    #[inline]
    pub fn scale(&self, s: T) -> Self {
        Vector {
            coords: self.coords.map(|c| c * s),
        }
    }

    /// Unit vector and original length, or `None` for a zero-length vector.
    pub fn try_normalize(&self) -> Option<(Self, T)> {
        let len = self.norm();
        if len > T::zero() {
            Some((self.scale(T::one() / len), len))
        } else {
            None
        }
    }

    /// Zero vectors are returned unchanged.
    pub fn normalized(&self) -> Self {
        self.try_normalize().map(|(v, _)| v).unwrap_or(*self)
    }

    /// Index of the component with the largest magnitude (first one wins ties).
    pub fn dominant_axis(&self) -> usize {
        let mut best = 0;
        let mut max = T::zero();
        for i in 0..N {
            if self.coords[i].abs() > max {
                max = self.coords[i].abs();
                best = i;
            }
        }
        best
    }
}

impl<T: Scalar> Vector<T, 2> {
    /// z component of the 3D cross product.
    #[inline]
    pub fn perp_dot(&self, other: &Self) -> T {
        self.coords[0] * other.coords[1] - self.coords[1] * other.coords[0]
    }
}

impl<T: Scalar> Vector<T, 3> {
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        let [ax, ay, az] = self.coords;
        let [bx, by, bz] = other.coords;
        Vector::new([ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx])
    }
}

impl<T: Scalar, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        &self.coords[i]
    }
}

impl<T: Scalar, const N: usize> Add for Vector<T, N> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Vector::new(from_fn(|i| self.coords[i] + rhs.coords[i]))
    }
}

impl<T: Scalar, const N: usize> Sub for Vector<T, N> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Vector::new(from_fn(|i| self.coords[i] - rhs.coords[i]))
    }
}

impl<T: Scalar, const N: usize> Mul<T> for Vector<T, N> {
    type Output = Self;
    fn mul(self, s: T) -> Self {
        self.scale(s)
    }
}

impl<T: Scalar, const N: usize> Neg for Vector<T, N> {
    type Output = Self;
    fn neg(self) -> Self {
        Vector::new(self.coords.map(|c| -c))
    }
}

pub type Vector2<T> = Vector<T, 2>;
pub type Vector3<T> = Vector<T, 3>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Vector3::<f64>::new([1.0, 0.0, 0.0]);
        let y = Vector3::<f64>::new([0.0, 1.0, 0.0]);
        assert_eq!(x.cross(&y), Vector3::<f64>::new([0.0, 0.0, 1.0]));
    }

    #[test]
    fn zero_vector_does_not_normalize() {
        assert!(Vector3::<f64>::zero().try_normalize().is_none());
        let (u, len) = Vector3::<f64>::new([3.0, 0.0, 4.0]).try_normalize().unwrap();
        assert_eq!(len, 5.0);
        assert!((u.norm() - 1.0f64).abs() < 1e-15);
    }

    #[test]
    fn dominant_axis_uses_magnitude() {
        assert_eq!(Vector3::<f64>::new([0.1, -3.0, 2.0]).dominant_axis(), 1);
        assert_eq!(Vector3::<f64>::new([0.0, 0.0, 0.0f64]).dominant_axis(), 0);
    }
}
