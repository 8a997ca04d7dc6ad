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

use crate::{
    geometry::point::{Point2, Point3},
    numeric::{exact, scalar::Scalar},
};

/// Returns:
/// - >0 if counter-clockwise
/// - <0 if clockwise
/// - =0 if collinear
pub fn orient2d<T: Scalar>(a: &Point2<T>, b: &Point2<T>, c: &Point2<T>) -> T {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Signed volume of tetra (a,b,c,d) times six: ((b-a) x (c-a)) · (d-a)
pub fn orient3d<T: Scalar>(a: &Point3<T>, b: &Point3<T>, c: &Point3<T>, d: &Point3<T>) -> T {
    (b - a).cross(&(c - a)).dot(&(d - a))
}

/// Exact sign of [`orient3d`], evaluated in rational arithmetic.
/// `None` if a coordinate is not finite.
pub fn orient3d_sign_exact<T: Scalar>(
    a: &Point3<T>,
    b: &Point3<T>,
    c: &Point3<T>,
    d: &Point3<T>,
) -> Option<Ordering> {
    let cofactor = |skip: usize| -> [[f64; 3]; 3] {
        let pts = [a, b, c, d];
        let mut out = [[0.0; 3]; 3];
        let mut r = 0;
        for (k, p) in pts.iter().enumerate() {
            if k == skip {
                continue;
            }
            out[r] = std::array::from_fn(|i| p[i].to_f64_lossy());
            r += 1;
        }
        out
    };
    // orient3d == -det [[a 1] [b 1] [c 1] [d 1]], expanded along the last
    // column. Differences are never formed, so nothing rounds.
    let mut total = rug::Rational::new();
    for (k, sign) in [(0usize, 1i32), (1, -1), (2, 1), (3, -1)] {
        let minor = exact::det3(&cofactor(k))?;
        if sign > 0 {
            total += minor;
        } else {
            total -= minor;
        }
    }
    Some(total.cmp0())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ccw_test() {
        let a = Point2::<f64>::new([0.0, 0.0]);
        let b = Point2::<f64>::new([1.0, 0.0]);
        let c = Point2::<f64>::new([0.0, 1.0]);

        assert!(orient2d(&a, &b, &c) > 0.0); // Counter-clockwise
    }

    #[test]
    fn orientation_3d_positive_volume() {
        let a = Point3::<f64>::new([0.0, 0.0, 0.0]);
        let b = Point3::<f64>::new([1.0, 0.0, 0.0]);
        let c = Point3::<f64>::new([0.0, 1.0, 0.0]);
        let d = Point3::<f64>::new([0.0, 0.0, 1.0]); // above the abc plane

        assert!(orient3d(&a, &b, &c, &d) > 0.0);
        assert_eq!(orient3d_sign_exact(&a, &b, &c, &d), Some(Ordering::Greater));
    }

    #[test]
    fn orientation_3d_negative_volume() {
        let a = Point3::<f64>::new([0.0, 0.0, 0.0]);
        let b = Point3::<f64>::new([1.0, 0.0, 0.0]);
        let c = Point3::<f64>::new([0.0, 1.0, 0.0]);
        let d = Point3::<f64>::new([0.0, 0.0, -1.0]); // below the abc plane

        assert!(orient3d(&a, &b, &c, &d) < 0.0);
        assert_eq!(orient3d_sign_exact(&a, &b, &c, &d), Some(Ordering::Less));
    }

    #[test]
    fn orientation_3d_coplanar() {
        let a = Point3::<f64>::new([0.1, 0.1, 0.3]);
        let b = Point3::<f64>::new([1.1, 0.1, 0.3]);
        let c = Point3::<f64>::new([0.1, 1.7, 0.3]);
        let d = Point3::<f64>::new([1.3, 1.9, 0.3]); // lies in the same z plane

        assert!(orient3d(&a, &b, &c, &d).abs() < 1e-12);
        assert_eq!(orient3d_sign_exact(&a, &b, &c, &d), Some(Ordering::Equal));
    }
}
