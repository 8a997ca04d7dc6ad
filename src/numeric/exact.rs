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

//! Exact evaluation of small determinants.
//!
//! Every finite `f64` is a dyadic rational, so the determinant of a matrix of
//! floats can be evaluated without rounding in `rug::Rational`. This is used
//! to decide whether a floating-point zero (or near zero) determinant is a
//! genuinely singular configuration.

use std::cmp::Ordering;

use rug::Rational;

#[inline]
fn exact(v: f64) -> Option<Rational> {
    Rational::from_f64(v)
}

/// Exact value of `a*d - b*c`. `None` if any entry is not finite.
pub fn det2(a: f64, b: f64, c: f64, d: f64) -> Option<Rational> {
    let (a, b, c, d) = (exact(a)?, exact(b)?, exact(c)?, exact(d)?);
    let ad = Rational::from(&a * &d);
    let bc = Rational::from(&b * &c);
    Some(ad - bc)
}

/// Exact determinant of a row-major 3x3 matrix.
pub fn det3(m: &[[f64; 3]; 3]) -> Option<Rational> {
    let mut r: [[Rational; 3]; 3] = Default::default();
    for i in 0..3 {
        for j in 0..3 {
            r[i][j] = exact(m[i][j])?;
        }
    }
    let minor = |a: &Rational, b: &Rational, c: &Rational, d: &Rational| {
        Rational::from(a * d) - Rational::from(b * c)
    };
    let m0 = minor(&r[1][1], &r[1][2], &r[2][1], &r[2][2]);
    let m1 = minor(&r[1][0], &r[1][2], &r[2][0], &r[2][2]);
    let m2 = minor(&r[1][0], &r[1][1], &r[2][0], &r[2][1]);

    let t0 = Rational::from(&r[0][0] * &m0);
    let t1 = Rational::from(&r[0][1] * &m1);
    let t2 = Rational::from(&r[0][2] * &m2);
    Some(t0 - t1 + t2)
}

pub fn det2_sign(a: f64, b: f64, c: f64, d: f64) -> Option<Ordering> {
    det2(a, b, c, d).map(|v| v.cmp0())
}

pub fn det3_sign(m: &[[f64; 3]; 3]) -> Option<Ordering> {
    det3(m).map(|v| v.cmp0())
}
