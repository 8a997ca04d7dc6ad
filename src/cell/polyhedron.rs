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

//! General polyhedron cell.
//!
//! A [`Polyhedron`] holds face connectivity in global point ids. Freezing it
//! against a point storage produces a [`CanonicalPolyhedron`]: faces
//! renumbered into local ids, faces ear-clipped into a closed triangle
//! boundary, and a bounding box for parametric coordinates. The snapshot is
//! immutable apart from two lazily built tables (edges, tetrahedra), so it
//! can be shared between threads and queried without locking.

use std::{
    cmp::Ordering,
    sync::{Arc, OnceLock},
};

use ahash::AHashMap;
use rand::{Rng, SeedableRng, rngs::StdRng};
use smallvec::SmallVec;

use crate::{
    cell::{
        Cell3D, CellError, CellPosition, Line, Polygon, decompose, edge_table::EdgeTable,
        faces::FaceList, point_id_map::PointIdMap,
    },
    geometry::{
        aabb::Aabb,
        canonical_edge::CanonicalEdge,
        point::{Point3, PointOps},
        polygon,
        vector::Vector3,
    },
    interpolation::mvc,
    kernel::{
        orientation::{orient3d, orient3d_sign_exact},
        tetra::{ClipVertex, Tetra},
        triangle::{self, LineHit},
    },
    numeric::{degeneracy::Degeneracy, scalar::Scalar},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyhedronState {
    Uninitialized,
    /// Faces are set but not yet canonicalized.
    FacesSet,
    Canonical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyhedronOptions {
    /// Reject face lists in which some edge is not shared by exactly two
    /// faces.
    pub validate_manifold: bool,
    pub degeneracy: Degeneracy,
    /// Rays cast per inside test when the cell has no tetrahedralization.
    pub ray_casts: usize,
    /// Seed for the ray directions, so classification is reproducible.
    pub seed: u64,
}

impl Default for PolyhedronOptions {
    fn default() -> Self {
        PolyhedronOptions {
            validate_manifold: false,
            degeneracy: Degeneracy::ExactZero,
            ray_casts: 5,
            seed: 0x2545_f491_4f6c_dd1d,
        }
    }
}

impl PolyhedronOptions {
    pub fn with_validate_manifold(mut self, validate: bool) -> Self {
        self.validate_manifold = validate;
        self
    }

    pub fn with_degeneracy(mut self, degeneracy: Degeneracy) -> Self {
        self.degeneracy = degeneracy;
        self
    }

    pub fn with_ray_casts(mut self, casts: usize) -> Self {
        self.ray_casts = casts.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Polyhedron under construction.
#[derive(Debug, Clone, Default)]
pub struct Polyhedron<T: Scalar> {
    options: PolyhedronOptions,
    faces: Vec<usize>,
    canonical: Option<Arc<CanonicalPolyhedron<T>>>,
}

impl<T: Scalar> Polyhedron<T> {
    pub fn new() -> Self {
        Self::with_options(PolyhedronOptions::default())
    }

    pub fn with_options(options: PolyhedronOptions) -> Self {
        Polyhedron {
            options,
            faces: Vec::new(),
            canonical: None,
        }
    }

    pub fn options(&self) -> &PolyhedronOptions {
        &self.options
    }

    /// Changing options drops the canonical snapshot.
    pub fn set_options(&mut self, options: PolyhedronOptions) {
        self.options = options;
        self.canonical = None;
    }

    pub fn state(&self) -> PolyhedronState {
        match (&self.canonical, self.faces.is_empty()) {
            (Some(_), _) => PolyhedronState::Canonical,
            (None, true) => PolyhedronState::Uninitialized,
            (None, false) => PolyhedronState::FacesSet,
        }
    }

    /// Sets the connectivity `[count, n0, ids.., n1, ids.., ..]` in global
    /// point ids. Parsing and canonicalization are deferred to
    /// [`Polyhedron::freeze`].
    pub fn set_faces(&mut self, faces: &[usize]) {
        self.faces = faces.to_vec();
        self.canonical = None;
    }

    /// The connectivity as last set.
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    /// Drops the canonical snapshot, e.g. after the points moved.
    pub fn invalidate(&mut self) {
        self.canonical = None;
    }

    pub fn initialize(&mut self, points: &[Point3<T>]) -> Result<(), CellError> {
        self.freeze(points).map(drop)
    }

    /// Canonicalizes against `points` (indexed by global id) unless a
    /// snapshot already exists, and returns the snapshot.
    pub fn freeze(&mut self, points: &[Point3<T>]) -> Result<Arc<CanonicalPolyhedron<T>>, CellError> {
        if let Some(canonical) = &self.canonical {
            return Ok(Arc::clone(canonical));
        }
        if self.faces.is_empty() {
            return Err(CellError::NoFaces);
        }
        let canonical = Arc::new(CanonicalPolyhedron::build(&self.faces, points, self.options)?);
        self.canonical = Some(Arc::clone(&canonical));
        Ok(canonical)
    }

    pub fn canonical(&self) -> Option<&Arc<CanonicalPolyhedron<T>>> {
        self.canonical.as_ref()
    }
}

/// Decomposition of a polyhedron into tetrahedra.
#[derive(Debug, Clone, PartialEq)]
pub struct Tetrahedralization<T: Scalar> {
    /// The cell points in local order, followed by any points the
    /// decomposition added.
    pub points: Vec<Point3<T>>,
    /// Positively oriented tetrahedra as indices into `points`.
    pub tetras: Vec<[usize; 4]>,
    /// Point shared by every tetrahedron when the cell was fanned from one
    /// apex.
    pub apex: Option<usize>,
    /// Number of cell points at the front of `points`.
    pub cell_points: usize,
    /// Interpolation weights over the cell points of each added point.
    pub added_weights: Vec<Vec<T>>,
}

impl<T: Scalar> Tetrahedralization<T> {
    fn empty(points: &[Point3<T>]) -> Self {
        Tetrahedralization {
            points: points.to_vec(),
            tetras: Vec::new(),
            apex: None,
            cell_points: points.len(),
            added_weights: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tetras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tetras.is_empty()
    }

    pub fn tetra(&self, i: usize) -> Option<Tetra<T>> {
        let ids = *self.tetras.get(i)?;
        Some(Tetra::new(ids.map(|k| self.points[k]), ids))
    }

    pub fn iter(&self) -> impl Iterator<Item = Tetra<T>> + '_ {
        self.tetras
            .iter()
            .map(|ids| Tetra::new(ids.map(|k| self.points[k]), *ids))
    }

    pub fn volume(&self) -> T {
        self.iter().map(|t| t.signed_volume()).sum()
    }

    /// Component `j` at point `id` of a field given per cell point in local
    /// order; added points are interpolated.
    fn value_at(&self, id: usize, values: &[T], dim: usize, j: usize) -> T {
        match id.checked_sub(self.cell_points) {
            None => values[id * dim + j],
            Some(k) => self.added_weights[k]
                .iter()
                .enumerate()
                .fold(T::zero(), |acc, (i, &w)| acc + w * values[i * dim + j]),
        }
    }

    /// Index of a point within `tol2` squared distance of `p`, adding `p`
    /// with `weights()` when there is none.
    fn point_index(
        &mut self,
        p: &Point3<T>,
        tol2: T,
        weights: impl FnOnce() -> Result<Vec<T>, CellError>,
    ) -> Result<usize, CellError> {
        if let Some(i) = self.points.iter().position(|q| q.distance_squared_to(p) <= tol2) {
            return Ok(i);
        }
        self.added_weights.push(weights()?);
        self.points.push(*p);
        Ok(self.points.len() - 1)
    }
}

/// Iso-surface of a scalar field through a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour<T: Scalar> {
    pub points: Vec<Point3<T>>,
    pub triangles: Vec<[usize; 3]>,
}

/// The part of a cell on one side of an iso-value, as tetrahedra.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClippedCell<T: Scalar> {
    pub points: Vec<Point3<T>>,
    pub tetras: Vec<[usize; 4]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ClipKey {
    Corner(usize),
    Cut(CanonicalEdge),
}

/// Immutable, canonicalized polyhedron.
#[derive(Debug)]
pub struct CanonicalPolyhedron<T: Scalar> {
    options: PolyhedronOptions,
    point_map: PointIdMap,
    points: Vec<Point3<T>>,
    global_faces: FaceList,
    faces: FaceList,
    /// Face triangles in local ids, wound like their faces.
    boundary: Vec<[usize; 3]>,
    /// Face owning each boundary triangle.
    boundary_faces: Vec<usize>,
    bounds: Aabb<T>,
    edges: OnceLock<EdgeTable>,
    tetras: OnceLock<Result<Tetrahedralization<T>, CellError>>,
}

impl<T: Scalar> CanonicalPolyhedron<T> {
    fn build(
        blob: &[usize],
        storage: &[Point3<T>],
        options: PolyhedronOptions,
    ) -> Result<Self, CellError> {
        let global_faces = FaceList::parse(blob)?;
        let mut point_map = PointIdMap::new();
        let faces = global_faces.map_ids(|id| point_map.insert(id));

        let points = point_map
            .globals()
            .iter()
            .map(|&id| {
                storage.get(id).copied().ok_or(CellError::MissingPoint {
                    id,
                    points: storage.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let edges = OnceLock::new();
        if options.validate_manifold {
            let table = EdgeTable::from_faces(&faces);
            if let Some(([a, b], uses)) = table.first_non_manifold() {
                let globals = point_map.globals();
                return Err(CellError::NonManifold {
                    edge: [globals[a], globals[b]],
                    uses,
                });
            }
            let _ = edges.set(table);
        }

        let (boundary, boundary_faces) = triangulate_faces(&faces, &points);
        let bounds = Aabb::from_points(&points).ok_or(CellError::Degenerate)?;
        log::debug!(
            "canonicalized polyhedron: {} points, {} faces, {} boundary triangles",
            points.len(),
            faces.len(),
            boundary.len()
        );

        Ok(CanonicalPolyhedron {
            options,
            point_map,
            points,
            global_faces,
            faces,
            boundary,
            boundary_faces,
            bounds,
            edges,
            tetras: OnceLock::new(),
        })
    }

    pub fn options(&self) -> &PolyhedronOptions {
        &self.options
    }

    pub fn point_id_map(&self) -> &PointIdMap {
        &self.point_map
    }

    /// Global ids indexed by local id.
    pub fn point_ids(&self) -> &[usize] {
        self.point_map.globals()
    }

    /// Reorders a field given per global point id (`dim` components each)
    /// into the local order the field queries expect.
    pub fn local_values(&self, global: &[T], dim: usize) -> Result<Vec<T>, CellError> {
        let ids = self.point_map.globals();
        let expected = ids.iter().max().map_or(0, |&m| (m + 1) * dim);
        if global.len() < expected {
            return Err(CellError::ValueCount {
                expected,
                actual: global.len(),
            });
        }
        Ok(ids
            .iter()
            .flat_map(|&id| global[id * dim..(id + 1) * dim].iter().copied())
            .collect())
    }

    /// Points in local order.
    pub fn points(&self) -> &[Point3<T>] {
        &self.points
    }

    /// Faces in local ids.
    pub fn canonical_faces(&self) -> &FaceList {
        &self.faces
    }

    /// `[count, n0, ids.., n1, ..]` in global ids.
    pub fn faces(&self) -> Vec<usize> {
        self.global_faces.to_blob()
    }

    pub fn boundary_triangles(&self) -> &[[usize; 3]] {
        &self.boundary
    }

    pub fn bounds(&self) -> &Aabb<T> {
        &self.bounds
    }

    pub fn edges(&self) -> &EdgeTable {
        self.edges.get_or_init(|| EdgeTable::from_faces(&self.faces))
    }

    /// Number of faces sharing each edge, by edge index.
    pub fn edge_face_counts(&self) -> &[usize] {
        self.edges().use_counts()
    }

    /// Box-normalized coordinates of every cell point.
    pub fn parametric_coords(&self) -> Vec<[T; 3]> {
        self.points.iter().map(|p| self.bounds.normalize(p)).collect()
    }

    pub fn pcoords_of(&self, x: &Point3<T>) -> [T; 3] {
        self.bounds.normalize(x)
    }

    pub fn location_at(&self, pcoords: &[T; 3]) -> Point3<T> {
        self.bounds.denormalize(pcoords)
    }

    /// Enclosed volume, positive when faces wind counter-clockwise seen from
    /// outside.
    pub fn volume(&self) -> T {
        let o = self.bounds.center();
        let sum = self.boundary.iter().fold(T::zero(), |acc, &[a, b, c]| {
            acc + orient3d(&o, &self.points[a], &self.points[b], &self.points[c])
        });
        sum / T::from_f64(6.0)
    }

    /// Mean value weights of `x` over the cell points.
    pub fn interpolation_weights(&self, x: &Point3<T>) -> Result<Vec<T>, CellError> {
        Ok(mvc::compute_weights(x, &self.points, &self.boundary)?)
    }

    pub fn interpolate_functions(&self, pcoords: &[T; 3]) -> Result<Vec<T>, CellError> {
        self.interpolation_weights(&self.location_at(pcoords))
    }

    /// Parametric derivatives of the mean value weights, by central
    /// differences. Laid out as in [`Cell3D::interpolate_derivs`].
    pub fn interpolate_derivs(&self, pcoords: &[T; 3]) -> Result<Vec<T>, CellError> {
        let n = self.points.len();
        let h = T::from_f64(1e-4);
        let mut derivs = vec![T::zero(); 3 * n];
        for k in 0..3 {
            if self.bounds.extent(k) <= T::zero() {
                continue;
            }
            let (mut lo, mut hi) = (*pcoords, *pcoords);
            lo[k] = lo[k] - h;
            hi[k] = hi[k] + h;
            let (w_lo, w_hi) = (self.interpolate_functions(&lo)?, self.interpolate_functions(&hi)?);
            for i in 0..n {
                derivs[k * n + i] = (w_hi[i] - w_lo[i]) / (T::two() * h);
            }
        }
        Ok(derivs)
    }

    pub fn evaluate_position(&self, x: &Point3<T>) -> Result<CellPosition<T>, CellError> {
        let weights = self.interpolation_weights(x)?;
        let pcoords = self.pcoords_of(x);
        if self.contains(x) {
            return Ok(CellPosition {
                closest_point: *x,
                pcoords,
                dist2: T::zero(),
                weights,
                inside: true,
            });
        }
        let (dist2, closest_point, _) = self.closest_face(x).ok_or(CellError::Degenerate)?;
        Ok(CellPosition {
            closest_point,
            pcoords,
            dist2,
            weights,
            inside: false,
        })
    }

    /// Weighted sum of the cell points; extra weights are ignored.
    pub fn evaluate_location(&self, weights: &[T]) -> Point3<T> {
        if weights.len() != self.points.len() {
            log::warn!(
                "{} weights for {} polyhedron points",
                weights.len(),
                self.points.len()
            );
        }
        let mut x = [T::zero(); 3];
        for (p, &w) in self.points.iter().zip(weights) {
            for i in 0..3 {
                x[i] = x[i] + p[i] * w;
            }
        }
        Point3::new(x)
    }

    /// Nearest hit of segment `a`-`b` with the boundary, with `pcoords` in
    /// the cell's box-normalized frame.
    pub fn intersect_with_line(&self, a: &Point3<T>, b: &Point3<T>, tol: T) -> Option<LineHit<T>> {
        let mut best: Option<LineHit<T>> = None;
        for &[i, j, k] in &self.boundary {
            let (p0, p1, p2) = (&self.points[i], &self.points[j], &self.points[k]);
            let hit = triangle::intersect_with_line(a, b, tol, p0, p1, p2, self.options.degeneracy);
            if let Some(hit) = hit {
                if best.is_none_or(|h| hit.t < h.t) {
                    best = Some(hit);
                }
            }
        }
        best.map(|hit| LineHit {
            pcoords: self.pcoords_of(&hit.x),
            ..hit
        })
    }

    /// Tetrahedra covering the cell, built on first use. A cell with no
    /// volume yields an empty decomposition.
    pub fn triangulate(&self) -> Result<&Tetrahedralization<T>, CellError> {
        self.tetras
            .get_or_init(|| self.tetrahedralize())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Inside test on the tetrahedra, or by ray casting when there are none.
    pub fn contains(&self, x: &Point3<T>) -> bool {
        match self.triangulate() {
            Ok(tets) if !tets.is_empty() => tets.iter().any(|tet| {
                tet.evaluate_position(x, self.options.degeneracy)
                    .is_some_and(|pos| pos.inside)
            }),
            _ => self.is_inside(x),
        }
    }

    /// Majority vote over rays in seeded random directions, each counting
    /// boundary crossings.
    pub fn is_inside(&self, x: &Point3<T>) -> bool {
        let diag = self.bounds.diagonal_length();
        let tol = T::tolerance() * diag;
        if diag == T::zero() || !self.bounds.contains(x, tol) {
            return false;
        }

        let length = T::two() * diag;
        let casts = self.options.ray_casts.max(1);
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        let mut votes = 0;
        for _ in 0..casts {
            let end = *x + random_direction::<T>(&mut rng) * length;
            let crossings = self
                .boundary
                .iter()
                .filter(|&&[a, b, c]| {
                    let (p0, p1, p2) = (&self.points[a], &self.points[b], &self.points[c]);
                    triangle::intersect_with_line(x, &end, tol, p0, p1, p2, self.options.degeneracy)
                        .is_some()
                })
                .count();
            if crossings % 2 == 1 {
                votes += 1;
            }
        }
        2 * votes > casts
    }

    /// The face nearest to the point at `pcoords` (global ids), and whether
    /// that point is inside the cell.
    pub fn cell_boundary(&self, pcoords: &[T; 3]) -> (Vec<usize>, bool) {
        let x = self.location_at(pcoords);
        let face = self
            .closest_face(&x)
            .and_then(|(_, _, f)| self.global_faces.get(f))
            .map(<[usize]>::to_vec)
            .unwrap_or_default();
        (face, self.contains(&x))
    }

    /// Gradient of a field with `dim` components per cell point, taken on
    /// the tetrahedron containing (or nearest to) the point at `pcoords`.
    /// `values` follows the local point order of [`Self::point_ids`],
    /// component-interleaved.
    pub fn derivatives(&self, pcoords: &[T; 3], values: &[T], dim: usize) -> Result<Vec<T>, CellError> {
        self.check_values(values, dim)?;
        let tets = self.triangulate()?;
        let x = self.location_at(pcoords);
        let tet = self.locate_tetra(tets, &x).ok_or(CellError::Degenerate)?;

        let mut local = Vec::with_capacity(4 * dim);
        for &id in &tet.point_ids {
            for j in 0..dim {
                local.push(tets.value_at(id, values, dim, j));
            }
        }
        Ok(tet.derivatives(&local, dim))
    }

    /// Iso-surface `scalars == value`, one scalar per cell point in the
    /// local order of [`Self::point_ids`]. Points are shared between
    /// triangles that cut the same edge.
    pub fn contour(&self, value: T, scalars: &[T]) -> Result<Contour<T>, CellError> {
        self.check_values(scalars, 1)?;
        let tets = self.triangulate()?;

        let mut out = Contour::default();
        let mut merged: AHashMap<CanonicalEdge, usize> = AHashMap::new();
        for tet in tets.iter() {
            let s = tet.point_ids.map(|id| tets.value_at(id, scalars, 1, 0));
            for tri in tet.contour(value, &s) {
                let ids: [usize; 3] = std::array::from_fn(|k| {
                    let [a, b] = tri.edges[k];
                    *merged.entry(CanonicalEdge::new(a, b)).or_insert_with(|| {
                        out.points.push(tri.points[k]);
                        out.points.len() - 1
                    })
                });
                if ids[0] != ids[1] && ids[1] != ids[2] && ids[2] != ids[0] {
                    out.triangles.push(ids);
                }
            }
        }
        Ok(out)
    }

    /// The part of the cell where `scalars >= value` (`< value` when
    /// `inside_out`), with `scalars` in the local order of
    /// [`Self::point_ids`].
    pub fn clip(&self, value: T, scalars: &[T], inside_out: bool) -> Result<ClippedCell<T>, CellError> {
        self.check_values(scalars, 1)?;
        let tets = self.triangulate()?;

        let mut out = ClippedCell::default();
        let mut merged: AHashMap<ClipKey, usize> = AHashMap::new();
        for tet in tets.iter() {
            let s = tet.point_ids.map(|id| tets.value_at(id, scalars, 1, 0));
            for piece in tet.clip(value, &s, inside_out) {
                let ids = piece.map(|v| {
                    let key = match v {
                        ClipVertex::Corner(i) => ClipKey::Corner(tet.point_ids[i]),
                        ClipVertex::Cut { a, b, .. } => {
                            ClipKey::Cut(CanonicalEdge::new(tet.point_ids[a], tet.point_ids[b]))
                        }
                    };
                    *merged.entry(key).or_insert_with(|| {
                        out.points.push(tet.clip_point(&v));
                        out.points.len() - 1
                    })
                });
                out.tetras.push(ids);
            }
        }
        Ok(out)
    }

    fn check_values(&self, values: &[T], dim: usize) -> Result<(), CellError> {
        let expected = self.points.len() * dim;
        if values.len() < expected {
            return Err(CellError::ValueCount {
                expected,
                actual: values.len(),
            });
        }
        Ok(())
    }

    /// Squared distance, closest point and face of the nearest boundary
    /// triangle.
    fn closest_face(&self, x: &Point3<T>) -> Option<(T, Point3<T>, usize)> {
        let mut best: Option<(T, Point3<T>, usize)> = None;
        for (&[a, b, c], &face) in self.boundary.iter().zip(&self.boundary_faces) {
            let (p0, p1, p2) = (&self.points[a], &self.points[b], &self.points[c]);
            let Some(pos) = triangle::evaluate_position_with(x, p0, p1, p2, self.options.degeneracy)
            else {
                continue;
            };
            if best.is_none_or(|(d, _, _)| pos.dist2 < d) {
                best = Some((pos.dist2, pos.closest_point, face));
            }
        }
        best
    }

    fn locate_tetra(&self, tets: &Tetrahedralization<T>, x: &Point3<T>) -> Option<Tetra<T>> {
        let mut best: Option<(T, Tetra<T>)> = None;
        for tet in tets.iter() {
            let Some(pos) = tet.evaluate_position(x, self.options.degeneracy) else {
                continue;
            };
            if pos.inside {
                return Some(tet);
            }
            if best.is_none_or(|(d, _)| pos.dist2 < d) {
                best = Some((pos.dist2, tet));
            }
        }
        best.map(|(_, tet)| tet)
    }

    fn tetrahedralize(&self) -> Result<Tetrahedralization<T>, CellError> {
        let n = self.points.len();
        let scale = self.bounds.diagonal_length().powi(3);
        let volume = self.volume();
        if volume.is_nan() || volume.abs() <= T::tolerance() * scale {
            log::warn!("polyhedron has no volume; it is not split into tetrahedra");
            return Ok(Tetrahedralization::empty(&self.points));
        }
        let outward = volume > T::zero();

        let centroid = polygon::centroid(&self.points);
        if let Some(tetras) = self.fan(&centroid, n, None, outward, scale) {
            let mut points = self.points.clone();
            points.push(centroid);
            log::debug!("split polyhedron into {} tetrahedra around its centroid", tetras.len());
            return Ok(Tetrahedralization {
                points,
                tetras,
                apex: Some(n),
                cell_points: n,
                added_weights: vec![self.interpolation_weights(&centroid)?],
            });
        }

        for (v, apex) in self.points.iter().enumerate() {
            if let Some(tetras) = self.fan(apex, v, Some(v), outward, scale) {
                log::debug!("split polyhedron into {} tetrahedra around vertex {v}", tetras.len());
                return Ok(Tetrahedralization {
                    tetras,
                    apex: Some(v),
                    ..Tetrahedralization::empty(&self.points)
                });
            }
        }
        self.split_convex(scale)
    }

    /// Tetrahedralization of a cell that is not star-shaped: the convex
    /// pieces of the cell box inside the cell, each fanned from its own
    /// centroid.
    fn split_convex(&self, scale: T) -> Result<Tetrahedralization<T>, CellError> {
        let tol = T::tolerance() * self.bounds.diagonal_length();
        let tol2 = tol * tol;
        let min_volume = T::tolerance() * scale;
        let faces: Vec<Vec<Point3<T>>> = self
            .faces
            .iter()
            .map(|face| face.iter().map(|&i| self.points[i]).collect())
            .collect();
        let pieces = decompose::convex_pieces(&self.bounds, &faces, tol, min_volume);

        let mut out = Tetrahedralization::empty(&self.points);
        let mut inside = 0;
        for piece in &pieces {
            let center = piece.centroid();
            if !self.is_inside(&center) {
                continue;
            }
            inside += 1;
            let c = out.point_index(&center, tol2, || self.interpolation_weights(&center))?;
            for face in &piece.faces {
                let ids = face
                    .iter()
                    .map(|p| out.point_index(p, tol2, || self.interpolation_weights(p)))
                    .collect::<Result<SmallVec<[usize; 8]>, _>>()?;
                for k in 1..ids.len().saturating_sub(1) {
                    let tet = [ids[0], ids[k + 1], ids[k], c];
                    let [p0, p1, p2, p3] = tet.map(|i| &out.points[i]);
                    let six = orient3d(p0, p1, p2, p3);
                    if six.abs() <= T::from_f64(6.0) * min_volume {
                        continue;
                    }
                    out.tetras.push(if six > T::zero() {
                        tet
                    } else {
                        [tet[1], tet[0], tet[2], tet[3]]
                    });
                }
            }
        }
        if out.is_empty() {
            log::warn!("no convex piece of the polyhedron lies inside it");
        }
        log::debug!(
            "split polyhedron into {} tetrahedra over {inside} of {} convex pieces",
            out.len(),
            pieces.len()
        );
        Ok(out)
    }

    /// Cones every boundary triangle to `apex`, skipping faces through the
    /// apex vertex. `None` if some cone is not positively oriented.
    fn fan(
        &self,
        apex: &Point3<T>,
        apex_id: usize,
        vertex: Option<usize>,
        outward: bool,
        scale: T,
    ) -> Option<Vec<[usize; 4]>> {
        let mut tetras = Vec::with_capacity(self.boundary.len());
        for (&[a, b, c], &face) in self.boundary.iter().zip(&self.boundary_faces) {
            let through_apex =
                vertex.is_some_and(|v| self.faces.get(face).is_some_and(|f| f.contains(&v)));
            if through_apex {
                continue;
            }
            let tet = if outward {
                [a, c, b, apex_id]
            } else {
                [a, b, c, apex_id]
            };
            let [p0, p1, p2] = [tet[0], tet[1], tet[2]].map(|i| &self.points[i]);
            if !self.is_positive(p0, p1, p2, apex, scale) {
                return None;
            }
            tetras.push(tet);
        }
        Some(tetras)
    }

    fn is_positive(&self, a: &Point3<T>, b: &Point3<T>, c: &Point3<T>, d: &Point3<T>, scale: T) -> bool {
        match self.options.degeneracy {
            Degeneracy::ExactZero => orient3d(a, b, c, d) > T::zero(),
            Degeneracy::Relative(eps) => orient3d(a, b, c, d) > T::from_f64(eps) * scale,
            Degeneracy::Exact => orient3d_sign_exact(a, b, c, d) == Some(Ordering::Greater),
        }
    }
}

/// Ear-clips every face; a face with no area is fanned from its first point.
fn triangulate_faces<T: Scalar>(faces: &FaceList, points: &[Point3<T>]) -> (Vec<[usize; 3]>, Vec<usize>) {
    let mut triangles = Vec::new();
    let mut owners = Vec::new();
    for (f, face) in faces.iter().enumerate() {
        let corners: SmallVec<[Point3<T>; 8]> = face.iter().map(|&i| points[i]).collect();
        let local = polygon::triangulate(&corners).unwrap_or_else(|| {
            log::warn!("face {f} has no area");
            (1..face.len() - 1).map(|k| [0, k, k + 1]).collect()
        });
        for [a, b, c] in local {
            triangles.push([face[a], face[b], face[c]]);
            owners.push(f);
        }
    }
    (triangles, owners)
}

fn random_direction<T: Scalar>(rng: &mut StdRng) -> Vector3<T> {
    let z: f64 = rng.random_range(-1.0..=1.0);
    let phi: f64 = rng.random_range(0.0..std::f64::consts::TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vector3::new([r * phi.cos(), r * phi.sin(), z].map(T::from_f64))
}

impl<T: Scalar> Cell3D<T> for CanonicalPolyhedron<T> {
    fn number_of_points(&self) -> usize {
        self.points.len()
    }

    fn number_of_edges(&self) -> usize {
        self.edges().len()
    }

    fn number_of_faces(&self) -> usize {
        self.faces.len()
    }

    fn edge(&self, i: usize) -> Option<Line<T>> {
        let [a, b] = self.edges().get(i)?;
        let globals = self.point_map.globals();
        Some(Line {
            point_ids: [globals[a], globals[b]],
            points: [self.points[a], self.points[b]],
        })
    }

    fn face(&self, i: usize) -> Option<Polygon<T>> {
        let local = self.faces.get(i)?;
        Some(Polygon {
            point_ids: self.global_faces.get(i)?.to_vec(),
            points: local.iter().map(|&k| self.points[k]).collect(),
        })
    }

    fn evaluate_position(&self, x: &Point3<T>) -> Result<CellPosition<T>, CellError> {
        CanonicalPolyhedron::evaluate_position(self, x)
    }

    fn evaluate_location(&self, weights: &[T]) -> Point3<T> {
        CanonicalPolyhedron::evaluate_location(self, weights)
    }

    fn interpolate_functions(&self, pcoords: &[T; 3]) -> Result<Vec<T>, CellError> {
        CanonicalPolyhedron::interpolate_functions(self, pcoords)
    }

    fn interpolate_derivs(&self, pcoords: &[T; 3]) -> Result<Vec<T>, CellError> {
        CanonicalPolyhedron::interpolate_derivs(self, pcoords)
    }

    fn parametric_center(&self) -> [T; 3] {
        [T::half(); 3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> (Vec<Point3<f64>>, Vec<usize>) {
        let points = (0..8)
            .map(|i| Point3::<f64>::new([(i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64]))
            .collect();
        let faces = vec![
            6, 4, 0, 2, 3, 1, 4, 4, 5, 7, 6, 4, 0, 1, 5, 4, 4, 2, 6, 7, 3, 4, 0, 4, 6, 2, 4, 1, 3,
            7, 5,
        ];
        (points, faces)
    }

    #[test]
    fn centroid_fan_covers_cube() {
        let (points, faces) = cube();
        let mut cell = Polyhedron::new();
        cell.set_faces(&faces);
        let cell = cell.freeze(&points).unwrap();

        assert!((cell.volume() - 1.0).abs() < 1e-12);
        let tets = cell.triangulate().unwrap();
        assert_eq!(tets.len(), 12);
        assert_eq!(tets.apex, Some(8));
        assert_eq!(tets.cell_points, 8);
        assert!((tets.volume() - 1.0).abs() < 1e-12);
        assert!(tets.iter().all(|t| t.signed_volume() > 0.0));
    }

    #[test]
    fn apex_value_is_interpolated() {
        let (points, faces) = cube();
        let mut cell = Polyhedron::new();
        cell.set_faces(&faces);
        let cell = cell.freeze(&points).unwrap();
        let tets = cell.triangulate().unwrap();

        // f = x at the cube corners, in local order
        let values: Vec<f64> = cell.points().iter().map(|p| p[0]).collect();
        assert_eq!(tets.value_at(3, &values, 1, 0), cell.points()[3][0]);
        assert!((tets.value_at(8, &values, 1, 0) - 0.5).abs() < 1e-9);
    }
}
