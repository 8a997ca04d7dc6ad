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

use std::cmp::Ordering;

use crate::numeric::{exact, scalar::Scalar};

/// How a determinant is judged singular.
///
/// `ExactZero` compares the computed floating-point determinant against zero
/// and nothing else. Near-singular systems therefore solve to very large
/// (but finite) values; use `Relative` or `Exact` when that matters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Degeneracy {
    #[default]
    ExactZero,
    /// Singular when `|det| <= eps * prod(|row_i|)` (Hadamard bound).
    Relative(f64),
    /// Singular when the determinant of the floating inputs is exactly zero
    /// in rational arithmetic.
    Exact,
}

impl Degeneracy {
    pub fn is_singular2<T: Scalar>(&self, m: &[[T; 2]; 2], det: T) -> bool {
        match *self {
            Degeneracy::ExactZero => det == T::zero(),
            Degeneracy::Relative(eps) => {
                let bound = row_norm(&m[0]) * row_norm(&m[1]);
                det.abs() <= T::from_f64(eps) * bound
            }
            Degeneracy::Exact => {
                let [[a, b], [c, d]] = m.map(|r| r.map(T::to_f64_lossy));
                !matches!(
                    exact::det2_sign(a, b, c, d),
                    Some(Ordering::Less | Ordering::Greater)
                )
            }
        }
    }

    pub fn is_singular3<T: Scalar>(&self, m: &[[T; 3]; 3], det: T) -> bool {
        match *self {
            Degeneracy::ExactZero => det == T::zero(),
            Degeneracy::Relative(eps) => {
                let bound = row_norm(&m[0]) * row_norm(&m[1]) * row_norm(&m[2]);
                det.abs() <= T::from_f64(eps) * bound
            }
            Degeneracy::Exact => {
                let rows = m.map(|r| r.map(T::to_f64_lossy));
                !matches!(
                    exact::det3_sign(&rows),
                    Some(Ordering::Less | Ordering::Greater)
                )
            }
        }
    }
}

#[inline]
fn row_norm<T: Scalar, const N: usize>(row: &[T; N]) -> T {
    row.iter().fold(T::zero(), |acc, v| acc + *v * *v).sqrt()
}
