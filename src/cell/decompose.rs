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

//! Convex decomposition of a closed cell by its own face planes.
//!
//! Starting from the bounding box, every convex piece whose box meets a face
//! is cut by that face's plane. Once all faces are processed no face crosses
//! the interior of a piece, so each piece lies wholly inside or wholly
//! outside the cell.

use std::cmp::Ordering;

use crate::{
    geometry::{
        aabb::Aabb,
        plane::Plane,
        point::{Point3, PointOps},
        polygon,
        vector::Vector3,
    },
    kernel::orientation::orient3d,
    numeric::scalar::Scalar,
};

/// Box corners `i` sit at `(i & 1, i >> 1 & 1, i >> 2 & 1)`.
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 2, 3, 1],
    [4, 5, 7, 6],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
    [0, 4, 6, 2],
    [1, 3, 7, 5],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Front,
    Back,
    On,
}

/// Convex polytope bounded by polygons wound counter-clockwise seen from
/// outside.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPiece<T: Scalar> {
    pub faces: Vec<Vec<Point3<T>>>,
}

impl<T: Scalar> ConvexPiece<T> {
    pub fn from_box(bounds: &Aabb<T>) -> Self {
        let corner = |i: usize| {
            Point3::new(std::array::from_fn(|k| {
                if (i >> k) & 1 == 0 {
                    bounds.min[k]
                } else {
                    bounds.max[k]
                }
            }))
        };
        ConvexPiece {
            faces: BOX_FACES
                .iter()
                .map(|face| face.iter().map(|&i| corner(i)).collect())
                .collect(),
        }
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Point3<T>> + '_ {
        self.faces.iter().flatten()
    }

    pub fn bounds(&self) -> Option<Aabb<T>> {
        Aabb::from_points(self.vertices())
    }

    /// Average of the face corners. Every corner gets a positive weight, so
    /// the point is interior to a piece with volume.
    pub fn centroid(&self) -> Point3<T> {
        let mut c = [T::zero(); 3];
        let mut count = 0usize;
        for p in self.vertices() {
            for i in 0..3 {
                c[i] = c[i] + p[i];
            }
            count += 1;
        }
        let inv = T::one() / T::from_f64(count.max(1) as f64);
        Point3::new(c.map(|v| v * inv))
    }

    pub fn volume(&self) -> T {
        let o = self.centroid();
        let six = self.faces.iter().fold(T::zero(), |acc, face| {
            (1..face.len().saturating_sub(1)).fold(acc, |acc, k| {
                acc + orient3d(&o, &face[0], &face[k], &face[k + 1])
            })
        });
        six / T::from_f64(6.0)
    }

    /// Halves on the positive and negative side of `plane`. Corners within
    /// `tol` of the plane count as on it.
    pub fn split(&self, plane: &Plane<T>, tol: T) -> (Option<Self>, Option<Self>) {
        let side = |d: T| {
            if d > tol {
                Side::Front
            } else if d < -tol {
                Side::Back
            } else {
                Side::On
            }
        };
        let sides: Vec<Side> = self.vertices().map(|p| side(plane.signed_distance(p))).collect();
        if !sides.contains(&Side::Back) {
            return (Some(self.clone()), None);
        }
        if !sides.contains(&Side::Front) {
            return (None, Some(self.clone()));
        }

        let mut front = Vec::with_capacity(self.faces.len() + 1);
        let mut back = Vec::with_capacity(self.faces.len() + 1);
        let mut cut = Vec::new();
        for face in &self.faces {
            let mut f = Vec::with_capacity(face.len() + 1);
            let mut b = Vec::with_capacity(face.len() + 1);
            for (i, p) in face.iter().enumerate() {
                let q = &face[(i + 1) % face.len()];
                let (dp, dq) = (plane.signed_distance(p), plane.signed_distance(q));
                let (sp, sq) = (side(dp), side(dq));
                match sp {
                    Side::Front => f.push(*p),
                    Side::Back => b.push(*p),
                    Side::On => {
                        f.push(*p);
                        b.push(*p);
                        cut.push(*p);
                    }
                }
                if matches!((sp, sq), (Side::Front, Side::Back) | (Side::Back, Side::Front)) {
                    let x = p.add_vector(&(q - p).scale(dp / (dp - dq)));
                    f.push(x);
                    b.push(x);
                    cut.push(x);
                }
            }
            if f.len() >= 3 {
                front.push(f);
            }
            if b.len() >= 3 {
                back.push(b);
            }
        }

        if let Some(cap) = cap_polygon(&cut, &plane.normal, tol) {
            front.push(cap.iter().rev().copied().collect());
            back.push(cap);
        }
        (Some(ConvexPiece { faces: front }), Some(ConvexPiece { faces: back }))
    }
}

/// Distinct `points`, all in a plane with unit `normal`, ordered
/// counter-clockwise about it. `None` below three points.
fn cap_polygon<T: Scalar>(points: &[Point3<T>], normal: &Vector3<T>, tol: T) -> Option<Vec<Point3<T>>> {
    let tol2 = tol * tol;
    let mut distinct: Vec<Point3<T>> = Vec::with_capacity(points.len());
    for p in points {
        if !distinct.iter().any(|q| q.distance_squared_to(p) <= tol2) {
            distinct.push(*p);
        }
    }
    if distinct.len() < 3 {
        return None;
    }

    let axis = if normal[0].abs() < T::from_f64(0.9) {
        Vector3::new([T::one(), T::zero(), T::zero()])
    } else {
        Vector3::new([T::zero(), T::one(), T::zero()])
    };
    let (u, _) = normal.cross(&axis).try_normalize()?;
    let v = normal.cross(&u);

    let n = T::from_f64(distinct.len() as f64);
    let c = Point3::new(std::array::from_fn(|i| {
        distinct.iter().fold(T::zero(), |acc, p| acc + p[i]) / n
    }));
    let angle = |p: &Point3<T>| {
        let d = p - &c;
        d.dot(&v).atan2(d.dot(&u))
    };
    distinct.sort_by(|a, b| angle(a).partial_cmp(&angle(b)).unwrap_or(Ordering::Equal));
    Some(distinct)
}

/// Splits `bounds` by the plane of every face in `faces` that its pieces
/// touch, dropping pieces with volume at most `min_volume`.
pub fn convex_pieces<T: Scalar>(
    bounds: &Aabb<T>,
    faces: &[Vec<Point3<T>>],
    tol: T,
    min_volume: T,
) -> Vec<ConvexPiece<T>> {
    let mut pieces = vec![ConvexPiece::from_box(bounds)];
    for face in faces {
        let normal = polygon::newell_normal(face);
        let origin = polygon::centroid(face);
        let (Some(plane), Some(face_box)) = (Plane::new(origin, normal), Aabb::from_points(face)) else {
            continue;
        };
        pieces = pieces
            .into_iter()
            .flat_map(|piece| {
                let touches = piece.bounds().is_some_and(|b| b.overlaps(&face_box, tol));
                if !touches {
                    return vec![piece];
                }
                let (front, back) = piece.split(&plane, tol);
                front
                    .into_iter()
                    .chain(back)
                    .filter(|p| p.volume() > min_volume)
                    .collect()
            })
            .collect();
    }
    log::trace!("cut the cell box into {} convex pieces", pieces.len());
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> ConvexPiece<f64> {
        let b = Aabb::new(Point3::<f64>::new([0.0; 3]), Point3::<f64>::new([1.0; 3]));
        ConvexPiece::from_box(&b)
    }

    #[test]
    fn box_faces_point_outward() {
        let piece = unit_box();
        assert!((piece.volume() - 1.0).abs() < 1e-12);
        assert_eq!(piece.vertices().count(), 24);
    }

    #[test]
    fn split_keeps_volume() {
        let piece = unit_box();
        let plane = Plane::new(
            Point3::<f64>::new([0.3, 0.0, 0.0]),
            Vector3::<f64>::new([1.0, 0.2, 0.1]),
        )
        .unwrap();
        let (front, back) = piece.split(&plane, 1e-12);
        let (front, back) = (front.unwrap(), back.unwrap());
        assert!((front.volume() + back.volume() - 1.0).abs() < 1e-12);
        assert!(front.volume() > 0.0 && back.volume() > 0.0);
        assert!(front.vertices().all(|p| plane.signed_distance(p) >= -1e-12));
        assert!(back.vertices().all(|p| plane.signed_distance(p) <= 1e-12));
    }

    #[test]
    fn plane_along_a_face_does_not_split() {
        let piece = unit_box();
        let plane = Plane::new(
            Point3::<f64>::new([0.0, 0.0, 1.0]),
            Vector3::<f64>::new([0.0, 0.0, 1.0]),
        )
        .unwrap();
        assert_eq!(piece.split(&plane, 1e-12), (None, Some(piece.clone())));
    }

    #[test]
    fn notch_faces_cut_the_box() {
        let b = Aabb::new(Point3::<f64>::new([0.0; 3]), Point3::<f64>::new([3.0, 3.0, 1.0]));
        let wall = |x: f64| {
            vec![
                Point3::<f64>::new([x, 1.0, 0.0]),
                Point3::<f64>::new([x, 3.0, 0.0]),
                Point3::<f64>::new([x, 3.0, 1.0]),
                Point3::<f64>::new([x, 1.0, 1.0]),
            ]
        };
        let pieces = convex_pieces(&b, &[wall(1.0), wall(2.0)], 1e-12, 1e-12);
        assert_eq!(pieces.len(), 3);
        let total: f64 = pieces.iter().map(|p| p.volume()).sum();
        assert!((total - 9.0).abs() < 1e-12);
    }
}
