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

//! Cells: the tetrahedron and the general polyhedron behind a common
//! capability trait, plus the boundary cells they hand out.

pub mod decompose;
pub mod edge_table;
pub mod faces;
pub mod point_id_map;
pub mod polyhedron;

use thiserror::Error;

use crate::{
    geometry::{point::Point3, polygon, vector::Vector3},
    interpolation::InterpolationError,
    kernel::tetra::{self, Tetra},
    numeric::{degeneracy::Degeneracy, scalar::Scalar},
};

pub use polyhedron::{CanonicalPolyhedron, Polyhedron, PolyhedronOptions, PolyhedronState};

/// Errors raised while building or querying a cell.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CellError {
    #[error("no faces have been set")]
    NoFaces,
    #[error("malformed face list at offset {offset}: {reason}")]
    MalformedFaces { offset: usize, reason: &'static str },
    #[error("point {id} is not in the point storage ({points} points)")]
    MissingPoint { id: usize, points: usize },
    /// An undirected edge (global ids) not shared by exactly two faces.
    #[error("edge {edge:?} is used by {uses} faces, expected 2")]
    NonManifold { edge: [usize; 2], uses: usize },
    #[error("expected {expected} values, got {actual}")]
    ValueCount { expected: usize, actual: usize },
    #[error("cell is degenerate")]
    Degenerate,
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// A straight edge of a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<T: Scalar> {
    pub point_ids: [usize; 2],
    pub points: [Point3<T>; 2],
}

/// A planar face of a cell, counter-clockwise seen from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<T: Scalar> {
    pub point_ids: Vec<usize>,
    pub points: Vec<Point3<T>>,
}

impl<T: Scalar> Polygon<T> {
    pub fn len(&self) -> usize {
        self.point_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_ids.is_empty()
    }

    /// Area-weighted normal (length twice the area).
    pub fn normal(&self) -> Vector3<T> {
        polygon::newell_normal(&self.points)
    }

    pub fn centroid(&self) -> Point3<T> {
        polygon::centroid(&self.points)
    }

    /// Ear-clipped triangles as positions into this polygon's point list.
    pub fn triangulate(&self) -> Option<Vec<[usize; 3]>> {
        polygon::triangulate(&self.points)
    }
}

/// Outcome of locating a point relative to a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellPosition<T: Scalar> {
    pub closest_point: Point3<T>,
    pub pcoords: [T; 3],
    /// Zero when the point is inside.
    pub dist2: T,
    /// One interpolation weight per cell point.
    pub weights: Vec<T>,
    pub inside: bool,
}

/// Operations every 3D cell supports.
pub trait Cell3D<T: Scalar> {
    fn number_of_points(&self) -> usize;

    fn number_of_edges(&self) -> usize;

    fn number_of_faces(&self) -> usize;

    fn edge(&self, i: usize) -> Option<Line<T>>;

    fn face(&self, i: usize) -> Option<Polygon<T>>;

    fn evaluate_position(&self, x: &Point3<T>) -> Result<CellPosition<T>, CellError>;

    /// The point reproduced by `weights` (one per cell point).
    fn evaluate_location(&self, weights: &[T]) -> Point3<T>;

    /// Interpolation weights at the given parametric coordinates.
    fn interpolate_functions(&self, pcoords: &[T; 3]) -> Result<Vec<T>, CellError>;

    /// Derivatives of the interpolation weights with respect to the
    /// parametric coordinates: all `d/dr` first, then `d/ds`, then `d/dt`,
    /// one entry per cell point in each block.
    fn interpolate_derivs(&self, pcoords: &[T; 3]) -> Result<Vec<T>, CellError>;

    fn parametric_center(&self) -> [T; 3];
}

impl<T: Scalar> Cell3D<T> for Tetra<T> {
    fn number_of_points(&self) -> usize {
        4
    }

    fn number_of_edges(&self) -> usize {
        tetra::EDGES.len()
    }

    fn number_of_faces(&self) -> usize {
        tetra::FACES.len()
    }

    fn edge(&self, i: usize) -> Option<Line<T>> {
        let [a, b] = *tetra::EDGES.get(i)?;
        Some(Line {
            point_ids: [self.point_ids[a], self.point_ids[b]],
            points: [self.points[a], self.points[b]],
        })
    }

    fn face(&self, i: usize) -> Option<Polygon<T>> {
        let face = tetra::FACES.get(i)?;
        Some(Polygon {
            point_ids: face.iter().map(|&k| self.point_ids[k]).collect(),
            points: face.iter().map(|&k| self.points[k]).collect(),
        })
    }

    fn evaluate_position(&self, x: &Point3<T>) -> Result<CellPosition<T>, CellError> {
        let pos = Tetra::evaluate_position(self, x, Degeneracy::ExactZero)
            .ok_or(CellError::Degenerate)?;
        Ok(CellPosition {
            closest_point: pos.closest_point,
            pcoords: pos.pcoords,
            dist2: pos.dist2,
            weights: pos.weights.to_vec(),
            inside: pos.inside,
        })
    }

    fn evaluate_location(&self, weights: &[T]) -> Point3<T> {
        let mut w = [T::zero(); 4];
        for (dst, src) in w.iter_mut().zip(weights) {
            *dst = *src;
        }
        Tetra::evaluate_location(self, &w)
    }

    fn interpolate_functions(&self, pcoords: &[T; 3]) -> Result<Vec<T>, CellError> {
        let [r, s, t] = *pcoords;
        Ok(vec![T::one() - r - s - t, r, s, t])
    }

    fn interpolate_derivs(&self, _pcoords: &[T; 3]) -> Result<Vec<T>, CellError> {
        let (o, l) = (T::zero(), T::one());
        Ok(vec![-l, l, o, o, -l, o, l, o, -l, o, o, l])
    }

    fn parametric_center(&self) -> [T; 3] {
        [T::from_f64(0.25); 3]
    }
}
