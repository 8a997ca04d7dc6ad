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

//! Stateless predicates on a single 3D triangle.
//!
//! Parametric coordinates follow the usual cell convention: `pcoords[0]`
//! and `pcoords[1]` are the coordinates along `p1 - p0` and `p2 - p0`, and
//! `pcoords[2] = 1 - pcoords[0] - pcoords[1]`. Interpolation weights are
//! ordered by vertex: `[pcoords[2], pcoords[0], pcoords[1]]`.

use crate::{
    cell::Line,
    geometry::{
        matrix::{Matrix2, Matrix3},
        plane::Plane,
        point::{Point2, Point3, PointOps},
        segment::{Segment3, SegmentProjection},
        vector::Vector3,
    },
    numeric::{degeneracy::Degeneracy, scalar::Scalar},
};

/// Result of projecting a query point onto a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrianglePosition<T: Scalar> {
    pub closest_point: Point3<T>,
    pub pcoords: [T; 3],
    pub weights: [T; 3],
    pub dist2: T,
    /// The projection of the query point falls inside the triangle.
    pub inside: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHit<T: Scalar> {
    pub t: T,
    pub x: Point3<T>,
    pub pcoords: [T; 3],
}

/// Center and squared radius of a 2D circumcircle. Collinear input yields
/// center `(0, 0)` and an infinite radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circumcircle<T: Scalar> {
    pub center: Point2<T>,
    pub radius2: T,
}

impl<T: Scalar> Circumcircle<T> {
    pub fn is_degenerate(&self) -> bool {
        self.radius2.is_infinite()
    }
}

/// Direction of the triangle normal, `(p1 - p0) x (p2 - p0)`. Its length is
/// twice the triangle area.
#[inline]
pub fn normal_direction<T: Scalar>(p0: &Point3<T>, p1: &Point3<T>, p2: &Point3<T>) -> Vector3<T> {
    (p1 - p0).cross(&(p2 - p0))
}

/// Unit normal; the zero vector for collinear points.
#[inline]
pub fn compute_normal<T: Scalar>(p0: &Point3<T>, p1: &Point3<T>, p2: &Point3<T>) -> Vector3<T> {
    normal_direction(p0, p1, p2).normalized()
}

pub fn area<T: Scalar>(p0: &Point3<T>, p1: &Point3<T>, p2: &Point3<T>) -> T {
    normal_direction(p0, p1, p2).norm() * T::half()
}

pub fn evaluate_position<T: Scalar>(
    x: &Point3<T>,
    p0: &Point3<T>,
    p1: &Point3<T>,
    p2: &Point3<T>,
) -> Option<TrianglePosition<T>> {
    evaluate_position_with(x, p0, p1, p2, Degeneracy::ExactZero)
}

/// Closest point, parametric coordinates and squared distance of `x`.
///
/// `x` is projected onto the triangle plane and two of its three coordinate
/// equations (those excluding the dominant normal axis) are solved for the
/// parametric coordinates. `None` means the triangle is degenerate.
pub fn evaluate_position_with<T: Scalar>(
    x: &Point3<T>,
    p0: &Point3<T>,
    p1: &Point3<T>,
    p2: &Point3<T>,
    degeneracy: Degeneracy,
) -> Option<TrianglePosition<T>> {
    let n = compute_normal(p0, p1, p2);
    let plane = Plane::new(*p1, n)?;
    let projected = plane.project_point(x);

    let idx = n.dominant_axis();
    let [i0, i1] = match idx {
        0 => [1, 2],
        1 => [0, 2],
        _ => [0, 1],
    };

    let rhs = [projected[i0] - p0[i0], projected[i1] - p0[i1]];
    let c1 = [p1[i0] - p0[i0], p1[i1] - p0[i1]];
    let c2 = [p2[i0] - p0[i0], p2[i1] - p0[i1]];
    let [r, s] = Matrix2::from_cols([c1, c2]).solve_with(rhs, degeneracy)?;

    let pcoords = [r, s, T::one() - r - s];
    let weights = [pcoords[2], pcoords[0], pcoords[1]];
    let unit = |v: T| v >= T::zero() && v <= T::one();

    if pcoords.iter().all(|&v| unit(v)) {
        return Some(TrianglePosition {
            closest_point: projected,
            pcoords,
            weights,
            dist2: projected.distance_squared_to(x),
            inside: true,
        });
    }

    let zero = T::zero();
    let on_edge = |a: &Point3<T>, b: &Point3<T>| Segment3::new(a, b).project(x);
    let nearer = |e: SegmentProjection<T, 3>, f: SegmentProjection<T, 3>| {
        if f.dist2 < e.dist2 { f } else { e }
    };
    let best = if r < zero && s < zero {
        nearer(on_edge(p0, p1), on_edge(p0, p2))
    } else if s < zero && pcoords[2] < zero {
        nearer(on_edge(p1, p0), on_edge(p1, p2))
    } else if r < zero && pcoords[2] < zero {
        nearer(on_edge(p2, p0), on_edge(p2, p1))
    } else if r < zero {
        on_edge(p2, p0)
    } else if s < zero {
        on_edge(p1, p0)
    } else {
        on_edge(p1, p2)
    };

    Some(TrianglePosition {
        closest_point: best.closest,
        pcoords,
        weights,
        dist2: best.dist2,
        inside: false,
    })
}

/// Point at the given parametric coordinates and its interpolation weights.
pub fn evaluate_location<T: Scalar>(
    pcoords: &[T; 3],
    p0: &Point3<T>,
    p1: &Point3<T>,
    p2: &Point3<T>,
) -> (Point3<T>, [T; 3]) {
    let u3 = T::one() - pcoords[0] - pcoords[1];
    let x = Point3::new(std::array::from_fn(|i| {
        p0[i] * u3 + p1[i] * pcoords[0] + p2[i] * pcoords[1]
    }));
    (x, [u3, pcoords[0], pcoords[1]])
}

pub fn barycentric_coords<T: Scalar>(
    x: &Point2<T>,
    x1: &Point2<T>,
    x2: &Point2<T>,
    x3: &Point2<T>,
) -> Option<[T; 3]> {
    barycentric_coords_with(x, x1, x2, x3, Degeneracy::ExactZero)
}

/// Barycentric coordinates of a 2D point from the homogeneous system
/// `[x1 x2 x3; y1 y2 y3; 1 1 1] b = [x; y; 1]`. `None` for a zero-area
/// triangle.
pub fn barycentric_coords_with<T: Scalar>(
    x: &Point2<T>,
    x1: &Point2<T>,
    x2: &Point2<T>,
    x3: &Point2<T>,
    degeneracy: Degeneracy,
) -> Option<[T; 3]> {
    let one = T::one();
    let a = Matrix3::new([
        [x1[0], x2[0], x3[0]],
        [x1[1], x2[1], x3[1]],
        [one, one, one],
    ]);
    a.solve_with([x[0], x[1], one], degeneracy)
}

/// Rigid planar embedding: `v0 = (0, 0)`, `v1 = (|p1 - p0|, 0)`, `v2` in the
/// in-plane basis. `None` when `p1 == p0`.
pub fn project_to_2d<T: Scalar>(
    p0: &Point3<T>,
    p1: &Point3<T>,
    p2: &Point3<T>,
) -> Option<[Point2<T>; 3]> {
    let n = compute_normal(p0, p1, p2);
    let (v21, len) = (p1 - p0).try_normalize()?;
    let v31 = p2 - p0;
    let v = n.cross(&v21);

    Some([
        Point2::origin(),
        Point2::new([len, T::zero()]),
        Point2::new([v31.dot(&v21), v31.dot(&v)]),
    ])
}

/// Circumcircle of three 2D points via the intersection of two edge
/// perpendicular bisectors.
pub fn circumcircle<T: Scalar>(x1: &Point2<T>, x2: &Point2<T>, x3: &Point2<T>) -> Circumcircle<T> {
    let n12 = [x2[0] - x1[0], x2[1] - x1[1]];
    let n13 = [x3[0] - x1[0], x3[1] - x1[1]];
    let half = T::half();
    let x12 = [(x2[0] + x1[0]) * half, (x2[1] + x1[1]) * half];
    let x13 = [(x3[0] + x1[0]) * half, (x3[1] + x1[1]) * half];

    let rhs = [
        n12[0] * x12[0] + n12[1] * x12[1],
        n13[0] * x13[0] + n13[1] * x13[1],
    ];
    let Some(center) = Matrix2::new([n12, n13]).solve(rhs) else {
        return Circumcircle {
            center: Point2::origin(),
            radius2: T::infinity(),
        };
    };
    let center = Point2::new(center);

    // average of the three squared radii
    let sum = center.distance_squared_to(x1)
        + center.distance_squared_to(x2)
        + center.distance_squared_to(x3);
    let radius2 = sum / T::from_f64(3.0);
    Circumcircle {
        center,
        radius2: if radius2.is_finite() {
            radius2
        } else {
            T::infinity()
        },
    }
}

/// Gradient of a linearly interpolated field. `values` holds `dim`
/// components per vertex (`values[dim * vertex + j]`); the result holds the
/// `(d/dx, d/dy, d/dz)` triple of each component. Degenerate triangles give
/// all-zero derivatives.
pub fn derivatives<T: Scalar>(
    p0: &Point3<T>,
    p1: &Point3<T>,
    p2: &Point3<T>,
    values: &[T],
    dim: usize,
) -> Vec<T> {
    let mut derivs = vec![T::zero(); 3 * dim];
    if values.len() < 3 * dim {
        log::warn!(
            "triangle derivatives need {} values, got {}",
            3 * dim,
            values.len()
        );
        return derivs;
    }

    let n = compute_normal(p0, p1, p2);
    let v = p2 - p0;
    let v20 = n.cross(&(p1 - p0));
    let (Some((v10, len_x)), Some((v20, _))) = ((p1 - p0).try_normalize(), v20.try_normalize())
    else {
        return derivs;
    };

    // local 2D frame: v0 = (0, 0), v1 = (len_x, 0), v2 = (v . v10, v . v20)
    let jacobian = Matrix2::new([[len_x, T::zero()], [v.dot(&v10), v.dot(&v20)]]);
    let Some(ji) = jacobian.inverse_with(Degeneracy::ExactZero) else {
        return derivs;
    };

    let one = T::one();
    let dr = [-one, one, T::zero()];
    let ds = [-one, T::zero(), one];
    for j in 0..dim {
        let mut sum = [T::zero(); 2];
        for i in 0..3 {
            sum[0] = sum[0] + dr[i] * values[dim * i + j];
            sum[1] = sum[1] + ds[i] * values[dim * i + j];
        }
        let dx = sum[0] * ji[0][0] + sum[1] * ji[0][1];
        let dy = sum[0] * ji[1][0] + sum[1] * ji[1][1];
        for k in 0..3 {
            derivs[3 * j + k] = dx * v10[k] + dy * v20[k];
        }
    }
    derivs
}

/// Intersection of segment `a`–`b` with the triangle, accepted when the plane
/// hit lies within `tol` of the triangle.
pub fn intersect_with_line<T: Scalar>(
    a: &Point3<T>,
    b: &Point3<T>,
    tol: T,
    p0: &Point3<T>,
    p1: &Point3<T>,
    p2: &Point3<T>,
    degeneracy: Degeneracy,
) -> Option<LineHit<T>> {
    let plane = Plane::new(*p1, normal_direction(p0, p1, p2))?;
    let (t, x) = plane.intersect_segment(a, b)?;
    let pos = evaluate_position_with(&x, p0, p1, p2, degeneracy)?;
    (pos.dist2 <= tol * tol).then_some(LineHit {
        t,
        x,
        pcoords: pos.pcoords,
    })
}

/// Marching-triangles case table: pairs of edge indices per sign case.
const LINE_CASES: [&[usize]; 8] = [&[], &[0, 2], &[1, 0], &[1, 2], &[2, 1], &[0, 1], &[2, 0], &[]];
const EDGES: [[usize; 2]; 3] = [[0, 1], [1, 2], [2, 0]];

/// A transient triangle: three points and the ids they carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle<T: Scalar> {
    pub points: [Point3<T>; 3],
    pub point_ids: [usize; 3],
}

/// One contour segment, with the cut edges (as point-id pairs) it joins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourSegment<T: Scalar> {
    pub points: [Point3<T>; 2],
    pub edges: [[usize; 2]; 2],
}

impl<T: Scalar> Triangle<T> {
    pub fn new(points: [Point3<T>; 3], point_ids: [usize; 3]) -> Self {
        Triangle { points, point_ids }
    }

    /// Triangle with point ids `0, 1, 2`.
    pub fn from_points(points: [Point3<T>; 3]) -> Self {
        Triangle::new(points, [0, 1, 2])
    }

    pub fn normal(&self) -> Vector3<T> {
        let [p0, p1, p2] = &self.points;
        compute_normal(p0, p1, p2)
    }

    pub fn area(&self) -> T {
        let [p0, p1, p2] = &self.points;
        area(p0, p1, p2)
    }

    pub fn evaluate_position(&self, x: &Point3<T>) -> Option<TrianglePosition<T>> {
        let [p0, p1, p2] = &self.points;
        evaluate_position(x, p0, p1, p2)
    }

    pub fn evaluate_location(&self, pcoords: &[T; 3]) -> (Point3<T>, [T; 3]) {
        let [p0, p1, p2] = &self.points;
        evaluate_location(pcoords, p0, p1, p2)
    }

    pub fn intersect_with_line(&self, a: &Point3<T>, b: &Point3<T>, tol: T) -> Option<LineHit<T>> {
        let [p0, p1, p2] = &self.points;
        intersect_with_line(a, b, tol, p0, p1, p2, Degeneracy::ExactZero)
    }

    pub fn derivatives(&self, values: &[T], dim: usize) -> Vec<T> {
        let [p0, p1, p2] = &self.points;
        derivatives(p0, p1, p2, values, dim)
    }

    /// The boundary edge nearest to `pcoords` (as point ids), and whether
    /// `pcoords` lies inside the triangle.
    pub fn cell_boundary(&self, pcoords: &[T; 3]) -> ([usize; 2], bool) {
        let (r, s) = (pcoords[0], pcoords[1]);
        let (one, two, half) = (T::one(), T::two(), T::half());
        let t1 = r - s;
        let t2 = half * (one - r) - s;
        let t3 = two * r + s - one;

        let ids = &self.point_ids;
        let edge = if t1 >= T::zero() && t2 >= T::zero() {
            [ids[0], ids[1]]
        } else if t2 < T::zero() && t3 >= T::zero() {
            [ids[1], ids[2]]
        } else {
            [ids[2], ids[0]]
        };

        let outside =
            r < T::zero() || s < T::zero() || r > one || s > one || one - r - s < T::zero();
        (edge, !outside)
    }

    /// Edge `i` runs from vertex `i` to vertex `(i + 1) % 3`.
    pub fn edge(&self, i: usize) -> Line<T> {
        let j = (i + 1) % 3;
        Line {
            point_ids: [self.point_ids[i], self.point_ids[j]],
            points: [self.points[i], self.points[j]],
        }
    }

    /// Iso-line through the triangle where the linearly interpolated
    /// `scalars` equal `value`. Vertices at or above `value` count as inside.
    pub fn contour(&self, value: T, scalars: &[T; 3]) -> Vec<ContourSegment<T>> {
        let index = (0..3)
            .filter(|&i| scalars[i] >= value)
            .fold(0usize, |acc, i| acc | (1 << i));

        LINE_CASES[index]
            .chunks_exact(2)
            .map(|pair| {
                let cut = |e: usize| {
                    let [v0, v1] = EDGES[e];
                    let t = (value - scalars[v0]) / (scalars[v1] - scalars[v0]);
                    let seg = Segment3::new(&self.points[v0], &self.points[v1]);
                    (seg.point_at(t), [self.point_ids[v0], self.point_ids[v1]])
                };
                let (a, ea) = cut(pair[0]);
                let (b, eb) = cut(pair[1]);
                ContourSegment {
                    points: [a, b],
                    edges: [ea, eb],
                }
            })
            .collect()
    }

    /// A triangle is its own triangulation.
    pub fn triangulate(&self) -> [Point3<T>; 3] {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Triangle<f64> {
        Triangle::from_points([
            Point3::<f64>::new([0.0, 0.0, 0.0]),
            Point3::<f64>::new([1.0, 0.0, 0.0]),
            Point3::<f64>::new([0.0, 1.0, 0.0]),
        ])
    }

    #[test]
    fn obtuse_corner_uses_nearest_edge() {
        // Wide obtuse angle at p0: x has two negative coordinates but its
        // nearest feature is the interior of edge p0-p1, not the vertex.
        let p0 = Point3::<f64>::new([0.0, 0.0, 0.0]);
        let p1 = Point3::<f64>::new([10.0, 1.0, 0.0]);
        let p2 = Point3::<f64>::new([-10.0, 1.0, 0.0]);
        let x = Point3::<f64>::new([3.0, -2.0, 0.0]);
        let pos = evaluate_position(&x, &p0, &p1, &p2).unwrap();
        assert!(!pos.inside);
        assert!(pos.pcoords[0] < 0.0 && pos.pcoords[1] < 0.0);
        let on_edge = Segment3::new(&p0, &p1).project(&x);
        assert!(on_edge.t > 0.0 && on_edge.t < 1.0);
        assert!((pos.dist2 - on_edge.dist2).abs() < 1e-12);
        assert!(pos.dist2 < x.distance_squared_to(&p0));
    }

    #[test]
    fn cell_boundary_picks_nearest_edge() {
        let tri = Triangle::new(unit().points, [10, 11, 12]);
        assert_eq!(tri.cell_boundary(&[0.5, 0.1, 0.4]), ([10, 11], true));
        assert_eq!(tri.cell_boundary(&[0.45, 0.45, 0.1]), ([11, 12], true));
        assert_eq!(tri.cell_boundary(&[0.1, 0.5, 0.4]), ([12, 10], true));
        assert!(!tri.cell_boundary(&[1.2, 0.1, -0.3]).1);
    }

    #[test]
    fn contour_crosses_two_edges() {
        let segs = unit().contour(0.5, &[0.0, 1.0, 1.0]);
        assert_eq!(segs.len(), 1);
        let s = segs[0];
        for p in &s.points {
            assert!((p[0] + p[1] - 0.5).abs() < 1e-12);
        }
        assert!(unit().contour(2.0, &[0.0, 1.0, 1.0]).is_empty());
    }

    #[test]
    fn edges_wrap_around() {
        let e = unit().edge(2);
        assert_eq!(e.point_ids, [2, 0]);
    }
}
