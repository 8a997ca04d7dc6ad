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

//! Planar polygon helpers used to split polyhedron faces into triangles.

use smallvec::SmallVec;

use crate::{
    geometry::{
        point::{Point2, Point3},
        vector::{Vector2, Vector3},
    },
    numeric::scalar::Scalar,
};

/// Newell normal of a (possibly non-convex) polygon. Its length is twice the
/// polygon area; a zero vector means the polygon is degenerate.
pub fn newell_normal<T: Scalar>(points: &[Point3<T>]) -> Vector3<T> {
    let mut n = [T::zero(); 3];
    let count = points.len();
    for i in 0..count {
        let p = &points[i];
        let q = &points[(i + 1) % count];
        n[0] = n[0] + (p[1] - q[1]) * (p[2] + q[2]);
        n[1] = n[1] + (p[2] - q[2]) * (p[0] + q[0]);
        n[2] = n[2] + (p[0] - q[0]) * (p[1] + q[1]);
    }
    Vector3::new(n)
}

pub fn centroid<T: Scalar>(points: &[Point3<T>]) -> Point3<T> {
    let mut c = [T::zero(); 3];
    for p in points {
        for i in 0..3 {
            c[i] = c[i] + p[i];
        }
    }
    let n = T::from_f64(points.len().max(1) as f64);
    Point3::new(c.map(|v| v / n))
}

/// Splits the polygon into triangles by ear clipping in the plane that drops
/// the dominant normal axis. Triangles index into `points` and keep the
/// polygon's winding. Returns `None` for a polygon with zero area.
pub fn triangulate<T: Scalar>(points: &[Point3<T>]) -> Option<Vec<[usize; 3]>> {
    let count = points.len();
    if count < 3 {
        return None;
    }
    let normal = newell_normal(points);
    if normal.norm_squared() == T::zero() {
        return None;
    }
    if count == 3 {
        return Some(vec![[0, 1, 2]]);
    }

    let axis = normal.dominant_axis();
    let (u, v) = match axis {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    };
    // With (u, v) chosen cyclically, a polygon wound counter-clockwise about
    // `normal` is counter-clockwise in the projection iff normal[axis] > 0.
    let sign = if normal[axis] > T::zero() {
        T::one()
    } else {
        -T::one()
    };
    let flat: SmallVec<[Point2<T>; 16]> = points
        .iter()
        .map(|p| Point2::new([p[u], p[v]]))
        .collect();

    let mut remaining: SmallVec<[usize; 16]> = (0..count).collect();
    let mut triangles = Vec::with_capacity(count - 2);

    while remaining.len() > 3 {
        let n = remaining.len();
        let mut clipped = None;
        for k in 0..n {
            let (ip, ic, inx) = (remaining[(k + n - 1) % n], remaining[k], remaining[(k + 1) % n]);
            if is_ear(&flat, &remaining, ip, ic, inx, sign) {
                clipped = Some(k);
                break;
            }
        }
        // No strict ear (collinear runs or numerical noise): clip the first
        // vertex that is not reflex so the loop always terminates.
        let k = clipped
            .or_else(|| {
                (0..n).find(|&k| {
                    let (ip, ic, inx) =
                        (remaining[(k + n - 1) % n], remaining[k], remaining[(k + 1) % n]);
                    turn(&flat[ip], &flat[ic], &flat[inx]) * sign >= T::zero()
                })
            })
            .unwrap_or(0);

        let (ip, ic, inx) = (remaining[(k + n - 1) % n], remaining[k], remaining[(k + 1) % n]);
        triangles.push([ip, ic, inx]);
        remaining.remove(k);
    }
    triangles.push([remaining[0], remaining[1], remaining[2]]);
    Some(triangles)
}

#[inline]
fn turn<T: Scalar>(a: &Point2<T>, b: &Point2<T>, c: &Point2<T>) -> T {
    let ab = Vector2::new([b[0] - a[0], b[1] - a[1]]);
    let ac = Vector2::new([c[0] - a[0], c[1] - a[1]]);
    ab.perp_dot(&ac)
}

fn is_ear<T: Scalar>(
    flat: &[Point2<T>],
    remaining: &[usize],
    ip: usize,
    ic: usize,
    inx: usize,
    sign: T,
) -> bool {
    let (a, b, c) = (&flat[ip], &flat[ic], &flat[inx]);
    if turn(a, b, c) * sign <= T::zero() {
        return false;
    }
    remaining
        .iter()
        .filter(|&&j| j != ip && j != ic && j != inx)
        .all(|&j| !inside_or_on(&flat[j], a, b, c, sign))
}

fn inside_or_on<T: Scalar>(p: &Point2<T>, a: &Point2<T>, b: &Point2<T>, c: &Point2<T>, sign: T) -> bool {
    turn(a, b, p) * sign >= T::zero()
        && turn(b, c, p) * sign >= T::zero()
        && turn(c, a, p) * sign >= T::zero()
}
