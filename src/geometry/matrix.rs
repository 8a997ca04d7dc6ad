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

use std::ops::{Index, IndexMut};

use crate::numeric::{degeneracy::Degeneracy, scalar::Scalar};

/// Generic row-major matrix R x C
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix<T: Scalar, const R: usize, const C: usize>(pub [[T; C]; R]);

pub type Matrix2<T> = Matrix<T, 2, 2>;
pub type Matrix3<T> = Matrix<T, 3, 3>;

impl<T: Scalar, const R: usize, const C: usize> Matrix<T, R, C> {
    #[inline]
    pub fn new(data: [[T; C]; R]) -> Self {
        Matrix(data)
    }

    #[inline]
    pub fn zero() -> Self {
        Matrix([[T::zero(); C]; R])
    }

    /// Build from columns.
    #[inline]
    pub fn from_cols(cols: [[T; R]; C]) -> Self {
        let mut m = Self::zero();
        for i in 0..R {
            for j in 0..C {
                m.0[i][j] = cols[j][i];
            }
        }
        m
    }

    /// Transpose into C x R.
    #[inline]
    pub fn transpose(&self) -> Matrix<T, C, R> {
        Matrix::<T, C, R>::from_cols(self.0)
    }

    pub fn mul_vec(&self, v: &[T; C]) -> [T; R] {
        let mut out = [T::zero(); R];
        for i in 0..R {
            for j in 0..C {
                out[i] = out[i] + self.0[i][j] * v[j];
            }
        }
        out
    }
}

impl<T: Scalar> Matrix<T, 2, 2> {
    #[inline]
    pub fn determinant(&self) -> T {
        let [[a, b], [c, d]] = self.0;
        a * d - b * c
    }

    /// Cramer's rule. `None` when the system is singular under `test`.
    pub fn solve_with(&self, rhs: [T; 2], test: Degeneracy) -> Option<[T; 2]> {
        let det = self.determinant();
        if test.is_singular2(&self.0, det) {
            return None;
        }
        let [[a, b], [c, d]] = self.0;
        Some([
            (rhs[0] * d - b * rhs[1]) / det,
            (a * rhs[1] - rhs[0] * c) / det,
        ])
    }

    pub fn solve(&self, rhs: [T; 2]) -> Option<[T; 2]> {
        self.solve_with(rhs, Degeneracy::ExactZero)
    }

    pub fn inverse_with(&self, test: Degeneracy) -> Option<Self> {
        let det = self.determinant();
        if test.is_singular2(&self.0, det) {
            return None;
        }
        let [[a, b], [c, d]] = self.0;
        Some(Matrix([[d / det, -b / det], [-c / det, a / det]]))
    }
}

impl<T: Scalar> Matrix<T, 3, 3> {
    pub fn determinant(&self) -> T {
        let m = &self.0;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Cramer's rule. `None` when the system is singular under `test`.
    pub fn solve_with(&self, rhs: [T; 3], test: Degeneracy) -> Option<[T; 3]> {
        let det = self.determinant();
        if test.is_singular3(&self.0, det) {
            return None;
        }
        let mut out = [T::zero(); 3];
        for (k, value) in out.iter_mut().enumerate() {
            let mut replaced = *self;
            for i in 0..3 {
                replaced.0[i][k] = rhs[i];
            }
            *value = replaced.determinant() / det;
        }
        Some(out)
    }

    pub fn solve(&self, rhs: [T; 3]) -> Option<[T; 3]> {
        self.solve_with(rhs, Degeneracy::ExactZero)
    }
}

impl<T: Scalar, const R: usize, const C: usize> Index<usize> for Matrix<T, R, C> {
    type Output = [T; C];
    #[inline]
    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i]
    }
}

impl<T: Scalar, const R: usize, const C: usize> IndexMut<usize> for Matrix<T, R, C> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.0[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_2x2() {
        let m = Matrix2::new([[2.0, 1.0], [1.0, 3.0]]);
        let x = m.solve([3.0, 5.0]).unwrap();
        assert!((x[0] - 0.8f64).abs() < 1e-12);
        assert!((x[1] - 1.4f64).abs() < 1e-12);
        assert!(Matrix2::new([[1.0, 2.0], [2.0, 4.0f64]]).solve([1.0, 1.0]).is_none());
    }

    #[test]
    fn solve_3x3_and_transpose() {
        let m = Matrix3::new([[1.0, 2.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 4.0f64]]);
        assert_eq!(m.determinant(), 4.0);
        let x = m.solve([5.0, 2.0, 8.0]).unwrap();
        assert_eq!(x, [1.0, 2.0, 2.0]);
        assert_eq!(m.transpose()[0], [1.0, 0.0, 0.0]);
        assert_eq!(m.mul_vec(&x), [5.0, 2.0, 8.0]);
    }

    #[test]
    fn inverse_2x2() {
        let m = Matrix2::new([[4.0, 7.0], [2.0, 6.0f64]]);
        let inv = m.inverse_with(Degeneracy::ExactZero).unwrap();
        assert!((inv[0][0] - 0.6).abs() < 1e-12);
        assert!((inv[1][1] - 0.4).abs() < 1e-12);
    }
}
