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

//! Mean value coordinates for points against a closed triangle mesh.
//!
//! Each boundary triangle is projected onto the unit sphere around the query
//! point and contributes to the weights of its three corners through the
//! spherical angles of its edges. Weights are normalized to sum to one.

use crate::{
    geometry::{aabb::Aabb, point::Point3, vector::Vector3},
    interpolation::{InterpolationError, Triangles},
    numeric::scalar::{Scalar, ScalarType},
};

/// Weights of `x` with respect to `points`, one per point.
///
/// An empty point set yields empty weights without looking at the
/// triangles.
///
/// `x` snaps to a vertex within `mvc_tolerance()` times the diagonal of the
/// points' bounding box. The edge and face cases compare spherical angles
/// against `mvc_tolerance()` directly; the face angle deficit shrinks with
/// the square of the distance to the face, so points closer than roughly
/// `sqrt(mvc_tolerance())` times their distance to the face corners get the
/// planar weights of that face.
pub fn compute_weights<'a, T: Scalar>(
    x: &Point3<T>,
    points: &[Point3<T>],
    triangles: impl Into<Triangles<'a>>,
) -> Result<Vec<T>, InterpolationError> {
    let mut weights = vec![T::zero(); points.len()];
    compute_weights_into(x, points, triangles, &mut weights)?;
    Ok(weights)
}

/// Same as [`compute_weights`], writing into `weights`, which must hold
/// exactly one value per point.
pub fn compute_weights_into<'a, T: Scalar>(
    x: &Point3<T>,
    points: &[Point3<T>],
    triangles: impl Into<Triangles<'a>>,
    weights: &mut [T],
) -> Result<(), InterpolationError> {
    if weights.len() != points.len() {
        return Err(InterpolationError::WeightBufferSize {
            expected: points.len(),
            actual: weights.len(),
        });
    }
    if points.is_empty() {
        return Ok(());
    }
    let triangles = triangles.into();
    triangles.validate(points.len())?;

    weights.fill(T::zero());
    let eps = T::mvc_tolerance();
    // vertex coincidence is a length, so it scales with the mesh
    let snap = eps * mesh_scale(points);

    let mut units: Vec<Vector3<T>> = Vec::with_capacity(points.len());
    let mut dists: Vec<T> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        let v = p - x;
        let d = v.norm();
        if d < snap {
            weights[i] = T::one();
            return Ok(());
        }
        units.push(v * (T::one() / d));
        dists.push(d);
    }

    let two = T::two();
    let pi = T::PI();
    for tri in triangles.iter() {
        let u = tri.map(|i| units[i]);
        let d = tri.map(|i| dists[i]);

        // theta[i] is the spherical length of the edge opposite corner i
        let theta = [(1, 2), (2, 0), (0, 1)].map(|(a, b)| {
            let l = (u[a] - u[b]).norm();
            two * (l / two).min(T::one()).asin()
        });

        if let Some(j) = theta.iter().position(|&t| pi - t < eps) {
            // x lies on the edge opposite corner j
            let (a, b) = ((j + 1) % 3, (j + 2) % 3);
            let total = d[a] + d[b];
            weights.fill(T::zero());
            weights[tri[a]] = d[b] / total;
            weights[tri[b]] = d[a] / total;
            return Ok(());
        }

        let h = (theta[0] + theta[1] + theta[2]) / two;
        if pi - h < eps {
            // x lies inside this triangle: planar barycentric weights
            weights.fill(T::zero());
            let w = [
                theta[0].sin() * d[1] * d[2],
                theta[1].sin() * d[2] * d[0],
                theta[2].sin() * d[0] * d[1],
            ];
            let sum = w[0] + w[1] + w[2];
            for k in 0..3 {
                weights[tri[k]] = w[k] / sum;
            }
            return Ok(());
        }

        let sin = theta.map(|t| t.sin());
        if sin.iter().any(|s| s.abs() < eps) {
            continue;
        }

        let c: [T; 3] = std::array::from_fn(|i| {
            let (next, prev) = ((i + 1) % 3, (i + 2) % 3);
            two * h.sin() * (h - theta[i]).sin() / (sin[next] * sin[prev]) - T::one()
        });

        let det = u[0].dot(&u[1].cross(&u[2]));
        let sign = if det < T::zero() { -T::one() } else { T::one() };
        let s = c.map(|ci| sign * (T::one() - ci * ci).max(T::zero()).sqrt());
        if s.iter().any(|si| si.abs() < eps) {
            // x is on the plane of this triangle but outside it
            continue;
        }

        for i in 0..3 {
            let (next, prev) = ((i + 1) % 3, (i + 2) % 3);
            weights[tri[i]] = weights[tri[i]]
                + (theta[i] - c[next] * theta[prev] - c[prev] * theta[next])
                    / (d[i] * sin[next] * s[prev]);
        }
    }

    let sum: T = weights.iter().copied().sum();
    if sum == T::zero() || !sum.is_finite() {
        log::warn!("mean value weights do not normalize (sum {sum:?})");
        return Ok(());
    }
    let inv = T::one() / sum;
    weights.iter_mut().for_each(|w| *w = *w * inv);
    Ok(())
}

/// Diagonal of the bounding box of `points`, or one for a box with no
/// extent.
fn mesh_scale<T: Scalar>(points: &[Point3<T>]) -> T {
    match Aabb::from_points(points) {
        Some(b) if b.diagonal_length() > T::zero() => b.diagonal_length(),
        _ => T::one(),
    }
}

/// Point storage whose scalar type is only known at runtime.
#[derive(Debug, Clone, Copy)]
pub enum PointArray<'a> {
    Float(&'a [Point3<f32>]),
    Double(&'a [Point3<f64>]),
}

impl PointArray<'_> {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            PointArray::Float(_) => ScalarType::Float,
            PointArray::Double(_) => ScalarType::Double,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PointArray::Float(p) => p.len(),
            PointArray::Double(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeightArray {
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl WeightArray {
    pub fn len(&self) -> usize {
        match self {
            WeightArray::Float(w) => w.len(),
            WeightArray::Double(w) => w.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dynamically typed form of [`compute_weights`]: weights are produced in
/// `requested`, which must be a floating type matching the points.
pub fn compute_weights_for_array<'a>(
    x: [f64; 3],
    points: &PointArray<'_>,
    triangles: impl Into<Triangles<'a>>,
    requested: ScalarType,
) -> Result<WeightArray, InterpolationError> {
    if !requested.is_floating() || requested != points.scalar_type() {
        return Err(InterpolationError::UnsupportedScalarType {
            requested,
            points: points.scalar_type(),
        });
    }
    match points {
        PointArray::Float(p) => {
            let x = Point3::new(x).cast::<f32>();
            compute_weights(&x, p, triangles).map(WeightArray::Float)
        }
        PointArray::Double(p) => {
            compute_weights(&Point3::new(x), p, triangles).map(WeightArray::Double)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetra() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let points = vec![
            Point3::<f64>::new([0.0, 0.0, 0.0]),
            Point3::<f64>::new([1.0, 0.0, 0.0]),
            Point3::<f64>::new([0.0, 1.0, 0.0]),
            Point3::<f64>::new([0.0, 0.0, 1.0]),
        ];
        let tris = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        (points, tris)
    }

    #[test]
    fn tetra_weights_are_barycentric() {
        let (points, tris) = tetra();
        let x = Point3::<f64>::new([0.1, 0.2, 0.3]);
        let w = compute_weights(&x, &points, &tris).unwrap();
        let expected = [0.4, 0.1, 0.2, 0.3];
        for (a, b) in w.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{w:?}");
        }
    }

    #[test]
    fn on_edge_and_on_face() {
        let (points, tris) = tetra();
        let w = compute_weights(&Point3::<f64>::new([0.25, 0.0, 0.0]), &points, &tris).unwrap();
        assert!((w[0] - 0.75).abs() < 1e-12 && (w[1] - 0.25).abs() < 1e-12, "{w:?}");
        assert_eq!(w[2] + w[3], 0.0);

        let w = compute_weights(&Point3::<f64>::new([0.25, 0.25, 0.0]), &points, &tris).unwrap();
        assert!((w[0] - 0.5).abs() < 1e-9, "{w:?}");
        assert!((w[1] - 0.25).abs() < 1e-9 && (w[2] - 0.25).abs() < 1e-9);
        assert_eq!(w[3], 0.0);
    }

    #[test]
    fn type_checks() {
        let (points, tris) = tetra();
        let array = PointArray::Double(&points);
        let w = compute_weights_for_array([0.1, 0.1, 0.1], &array, &tris, ScalarType::Double);
        assert!(matches!(w, Ok(WeightArray::Double(ref v)) if v.len() == 4));
        assert_eq!(
            compute_weights_for_array([0.1, 0.1, 0.1], &array, &tris, ScalarType::Float),
            Err(InterpolationError::UnsupportedScalarType {
                requested: ScalarType::Float,
                points: ScalarType::Double,
            })
        );
    }
}
