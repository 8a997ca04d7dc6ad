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

//! Linear tetrahedron: the unit the polyhedron decomposes into.

use crate::{
    geometry::{
        matrix::Matrix3,
        point::{Point3, PointOps},
        segment::Segment3,
    },
    kernel::{orientation::orient3d, triangle},
    numeric::{degeneracy::Degeneracy, scalar::Scalar},
};

/// Faces with outward normals for a positively oriented tetrahedron.
pub const FACES: [[usize; 3]; 4] = [[0, 1, 3], [1, 2, 3], [2, 0, 3], [0, 2, 1]];

pub const EDGES: [[usize; 2]; 6] = [[0, 1], [1, 2], [2, 0], [0, 3], [1, 3], [2, 3]];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tetra<T: Scalar> {
    pub points: [Point3<T>; 4],
    pub point_ids: [usize; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TetraPosition<T: Scalar> {
    pub closest_point: Point3<T>,
    pub pcoords: [T; 3],
    pub weights: [T; 4],
    pub dist2: T,
    pub inside: bool,
}

/// A vertex of a clipped tetrahedron: an original corner, or the point at
/// parameter `t` along the cut edge `a -> b` (ids are the tetra's point ids).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipVertex<T: Scalar> {
    Corner(usize),
    Cut { a: usize, b: usize, t: T },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourTriangle<T: Scalar> {
    pub points: [Point3<T>; 3],
    /// Cut edges as point-id pairs, one per output point.
    pub edges: [[usize; 2]; 3],
}

impl<T: Scalar> Tetra<T> {
    pub fn new(points: [Point3<T>; 4], point_ids: [usize; 4]) -> Self {
        Tetra { points, point_ids }
    }

    pub fn from_points(points: [Point3<T>; 4]) -> Self {
        Tetra::new(points, [0, 1, 2, 3])
    }

    pub fn signed_volume(&self) -> T {
        let [a, b, c, d] = &self.points;
        orient3d(a, b, c, d) / T::from_f64(6.0)
    }

    pub fn centroid(&self) -> Point3<T> {
        let quarter = T::from_f64(0.25);
        Point3::new(std::array::from_fn(|i| {
            self.points.iter().fold(T::zero(), |acc, p| acc + p[i]) * quarter
        }))
    }

    /// Parametric coordinates `(r, s, t)` along the three edges leaving
    /// vertex 0. `None` for a flat tetrahedron.
    pub fn parametric_coords(&self, x: &Point3<T>, degeneracy: Degeneracy) -> Option<[T; 3]> {
        let p0 = &self.points[0];
        let m = Matrix3::from_cols([
            (&self.points[1] - p0).coords,
            (&self.points[2] - p0).coords,
            (&self.points[3] - p0).coords,
        ]);
        m.solve_with((x - p0).coords, degeneracy)
    }

    pub fn barycentric_coords(&self, x: &Point3<T>) -> Option<[T; 4]> {
        let [r, s, t] = self.parametric_coords(x, Degeneracy::ExactZero)?;
        Some([T::one() - r - s - t, r, s, t])
    }

    /// Containment uses a small tolerance on the barycentric weights; outside
    /// points are measured against the nearest face.
    pub fn evaluate_position(
        &self,
        x: &Point3<T>,
        degeneracy: Degeneracy,
    ) -> Option<TetraPosition<T>> {
        let pcoords = self.parametric_coords(x, degeneracy)?;
        let [r, s, t] = pcoords;
        let weights = [T::one() - r - s - t, r, s, t];

        let tol = T::tolerance();
        let inside = weights
            .iter()
            .all(|&w| w >= -tol && w <= T::one() + tol);
        if inside {
            return Some(TetraPosition {
                closest_point: *x,
                pcoords,
                weights,
                dist2: T::zero(),
                inside,
            });
        }

        let mut best: Option<(T, Point3<T>)> = None;
        for face in FACES {
            let [a, b, c] = face.map(|i| &self.points[i]);
            if let Some(pos) = triangle::evaluate_position_with(x, a, b, c, degeneracy) {
                if best.is_none_or(|(d, _)| pos.dist2 < d) {
                    best = Some((pos.dist2, pos.closest_point));
                }
            }
        }
        let (dist2, closest_point) = best?;
        Some(TetraPosition {
            closest_point,
            pcoords,
            weights,
            dist2,
            inside,
        })
    }

    pub fn evaluate_location(&self, weights: &[T; 4]) -> Point3<T> {
        Point3::new(std::array::from_fn(|i| {
            (0..4).fold(T::zero(), |acc, k| acc + self.points[k][i] * weights[k])
        }))
    }

    /// Constant gradient of the linear field given by `dim` values per vertex
    /// (`values[dim * vertex + j]`). A flat tetrahedron gives zeros.
    pub fn derivatives(&self, values: &[T], dim: usize) -> Vec<T> {
        let mut derivs = vec![T::zero(); 3 * dim];
        if values.len() < 4 * dim {
            log::warn!(
                "tetra derivatives need {} values, got {}",
                4 * dim,
                values.len()
            );
            return derivs;
        }
        let p0 = &self.points[0];
        let rows = Matrix3::new([
            (&self.points[1] - p0).coords,
            (&self.points[2] - p0).coords,
            (&self.points[3] - p0).coords,
        ]);
        for j in 0..dim {
            let f0 = values[j];
            let rhs = [
                values[dim + j] - f0,
                values[2 * dim + j] - f0,
                values[3 * dim + j] - f0,
            ];
            let Some(g) = rows.solve(rhs) else {
                return vec![T::zero(); 3 * dim];
            };
            derivs[3 * j..3 * j + 3].copy_from_slice(&g);
        }
        derivs
    }

    /// Marching tetrahedra: the iso-surface `scalars == value` within this
    /// tetrahedron. Normals point from the region at or above `value`
    /// towards the region below it.
    pub fn contour(&self, value: T, scalars: &[T; 4]) -> Vec<ContourTriangle<T>> {
        let above: Vec<usize> = (0..4).filter(|&i| scalars[i] >= value).collect();
        let below: Vec<usize> = (0..4).filter(|&i| scalars[i] < value).collect();

        let cut = |a: usize, b: usize| -> (Point3<T>, [usize; 2]) {
            let t = (value - scalars[a]) / (scalars[b] - scalars[a]);
            let p = Segment3::new(&self.points[a], &self.points[b]).point_at(t);
            (p, [self.point_ids[a], self.point_ids[b]])
        };
        let make = |corners: [(usize, usize); 3]| {
            let [(p0, e0), (p1, e1), (p2, e2)] = corners.map(|(a, b)| cut(a, b));
            ContourTriangle {
                points: [p0, p1, p2],
                edges: [e0, e1, e2],
            }
        };

        let mut tris = match (above.len(), below.len()) {
            (1, 3) => vec![make([
                (above[0], below[0]),
                (above[0], below[1]),
                (above[0], below[2]),
            ])],
            (3, 1) => vec![make([
                (above[0], below[0]),
                (above[1], below[0]),
                (above[2], below[0]),
            ])],
            (2, 2) => {
                let (a, b, c, d) = (above[0], above[1], below[0], below[1]);
                vec![
                    make([(a, c), (a, d), (b, d)]),
                    make([(a, c), (b, d), (b, c)]),
                ]
            }
            _ => Vec::new(),
        };

        let centroid = |ids: &[usize]| -> Point3<T> {
            let n = T::from_f64(ids.len() as f64);
            Point3::new(std::array::from_fn(|i| {
                ids.iter().fold(T::zero(), |acc, &k| acc + self.points[k][i]) / n
            }))
        };
        if !tris.is_empty() {
            let dir = centroid(&above).vector_to(&centroid(&below));
            for tri in &mut tris {
                let [p0, p1, p2] = &tri.points;
                if triangle::normal_direction(p0, p1, p2).dot(&dir) < T::zero() {
                    tri.points.swap(1, 2);
                    tri.edges.swap(1, 2);
                }
            }
        }
        tris
    }

    /// Splits off the part of the tetrahedron where `scalars >= value` (or
    /// `< value` when `inside_out`) as positively oriented tetrahedra.
    pub fn clip(&self, value: T, scalars: &[T; 4], inside_out: bool) -> Vec<[ClipVertex<T>; 4]> {
        let keep = |i: usize| (scalars[i] >= value) != inside_out;
        let kept: Vec<usize> = (0..4).filter(|&i| keep(i)).collect();
        let gone: Vec<usize> = (0..4).filter(|&i| !keep(i)).collect();

        let corner = |i: usize| ClipVertex::Corner(i);
        let cut = |a: usize, b: usize| ClipVertex::Cut {
            a,
            b,
            t: (value - scalars[a]) / (scalars[b] - scalars[a]),
        };

        let tets: Vec<[ClipVertex<T>; 4]> = match kept.len() {
            4 => vec![[corner(0), corner(1), corner(2), corner(3)]],
            1 => {
                let (a, g) = (kept[0], &gone);
                vec![[corner(a), cut(a, g[0]), cut(a, g[1]), cut(a, g[2])]]
            }
            3 => {
                // prism (a, b, c) / (a', b', c') with primes on the edges to d
                let (a, b, c, d) = (kept[0], kept[1], kept[2], gone[0]);
                let (ad, bd, cd) = (cut(a, d), cut(b, d), cut(c, d));
                vec![
                    [corner(a), corner(b), corner(c), ad],
                    [corner(b), corner(c), ad, bd],
                    [corner(c), ad, bd, cd],
                ]
            }
            2 => {
                // prism (a, ac, ad) / (b, bc, bd)
                let (a, b, c, d) = (kept[0], kept[1], gone[0], gone[1]);
                let (ac, ad, bc, bd) = (cut(a, c), cut(a, d), cut(b, c), cut(b, d));
                vec![
                    [corner(a), ac, ad, corner(b)],
                    [ac, ad, corner(b), bc],
                    [ad, corner(b), bc, bd],
                ]
            }
            _ => Vec::new(),
        };

        tets.into_iter()
            .filter_map(|mut tet| {
                let [p0, p1, p2, p3] = tet.map(|v| self.clip_point(&v));
                let vol = orient3d(&p0, &p1, &p2, &p3);
                if vol == T::zero() {
                    None
                } else {
                    if vol < T::zero() {
                        tet.swap(2, 3);
                    }
                    Some(tet)
                }
            })
            .collect()
    }

    /// Coordinates of a [`ClipVertex`] of this tetrahedron.
    pub fn clip_point(&self, v: &ClipVertex<T>) -> Point3<T> {
        match *v {
            ClipVertex::Corner(i) => self.points[i],
            ClipVertex::Cut { a, b, t } => {
                Segment3::new(&self.points[a], &self.points[b]).point_at(t)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Tetra<f64> {
        Tetra::from_points([
            Point3::<f64>::new([0.0, 0.0, 0.0]),
            Point3::<f64>::new([1.0, 0.0, 0.0]),
            Point3::<f64>::new([0.0, 1.0, 0.0]),
            Point3::<f64>::new([0.0, 0.0, 1.0]),
        ])
    }

    fn volume(t: &Tetra<f64>, tets: &[[ClipVertex<f64>; 4]]) -> f64 {
        tets.iter()
            .map(|tet| {
                let [a, b, c, d] = tet.map(|v| t.clip_point(&v));
                orient3d(&a, &b, &c, &d) / 6.0
            })
            .sum()
    }

    #[test]
    fn faces_point_outward() {
        let t = unit();
        let c = t.centroid();
        for face in FACES {
            let [a, b, d] = face.map(|i| t.points[i]);
            let n = triangle::normal_direction(&a, &b, &d);
            assert!(n.dot(&a.vector_to(&c)) < 0.0);
        }
    }

    #[test]
    fn inside_and_outside_positions() {
        let t = unit();
        let inside = t
            .evaluate_position(&Point3::<f64>::new([0.1, 0.2, 0.3]), Degeneracy::ExactZero)
            .unwrap();
        assert!(inside.inside);
        assert_eq!(inside.dist2, 0.0);
        assert!((inside.weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);

        let outside = t
            .evaluate_position(&Point3::<f64>::new([0.2, 0.2, -2.0]), Degeneracy::ExactZero)
            .unwrap();
        assert!(!outside.inside);
        assert!((outside.dist2 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn gradient_of_linear_field() {
        let t = unit();
        // f = 1 + 2x - y + 3z
        let values = [1.0, 3.0, 0.0, 4.0];
        let d = t.derivatives(&values, 1);
        assert_eq!(d, vec![2.0, -1.0, 3.0]);
    }

    #[test]
    fn clip_partitions_volume() {
        let t = unit();
        let scalars = [0.0, 1.0, 1.0, 0.0];
        let total = t.signed_volume();
        for value in [0.25, 0.5, 0.75] {
            let kept = t.clip(value, &scalars, false);
            let rest = t.clip(value, &scalars, true);
            let sum = volume(&t, &kept) + volume(&t, &rest);
            assert!((sum - total).abs() < 1e-12);
            assert!(volume(&t, &kept) > 0.0 && volume(&t, &rest) > 0.0);
        }
        assert_eq!(t.clip(2.0, &scalars, false).len(), 0);
        assert_eq!(t.clip(-1.0, &scalars, false).len(), 1);
    }

    #[test]
    fn contour_single_corner() {
        let t = unit();
        let tris = t.contour(0.5, &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(tris.len(), 1);
        for p in &tris[0].points {
            assert!((p[0] + p[1] + p[2] - 0.5).abs() < 1e-12);
        }
        // Normal points away from vertex 0 (the high side).
        let [a, b, c] = tris[0].points;
        assert!(triangle::normal_direction(&a, &b, &c)[0] > 0.0);
    }
}
