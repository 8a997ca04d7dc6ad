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

//! Deforms a point set with a closed triangle control mesh.
//!
//! Every point is bound to the control mesh by its mean value weights. The
//! weights are computed once and reused while the topology is unchanged, so
//! moving the control points moves the bound points smoothly.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use thiserror::Error;

use crate::{
    geometry::point::Point3,
    interpolation::{InterpolationError, Triangles, mvc},
    numeric::scalar::Scalar,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeformError {
    #[error("control mesh must be a closed triangle mesh, cell {cell} has {size} points")]
    NotTriangleMesh { cell: usize, size: usize },
    #[error("deformation aborted")]
    Aborted,
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

/// Sizes the cached weights were computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Signature {
    control_points: usize,
    control_triangles: usize,
    points: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DeformPointSet<T: Scalar> {
    initialize_weights: bool,
    signature: Option<Signature>,
    /// Row per point, column per control point.
    weights: Vec<T>,
    abort: Option<Arc<AtomicBool>>,
}

impl<T: Scalar> DeformPointSet<T> {
    pub fn new() -> Self {
        DeformPointSet {
            initialize_weights: false,
            signature: None,
            weights: Vec::new(),
            abort: None,
        }
    }

    /// Checked every tenth of the work; raising it makes [`deform`] return
    /// [`DeformError::Aborted`].
    ///
    /// [`deform`]: DeformPointSet::deform
    pub fn with_abort(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    /// Forces the next [`DeformPointSet::deform`] to recompute the weights,
    /// e.g. to rebind the points to a control mesh in a new rest pose.
    pub fn set_initialize_weights(&mut self, initialize: bool) {
        self.initialize_weights = initialize;
    }

    pub fn initialize_weights(&self) -> bool {
        self.initialize_weights
    }

    pub fn has_weights(&self) -> bool {
        self.signature.is_some()
    }

    /// Cached weights of point `i`.
    pub fn weights(&self, i: usize) -> Option<&[T]> {
        let cols = self.signature?.control_points;
        self.weights.get(i * cols..(i + 1) * cols)
    }

    /// Positions of `points` driven by the control mesh.
    ///
    /// Weights are computed against the control mesh on the first call, when
    /// any of the point, control point or control triangle counts change,
    /// or when [`DeformPointSet::set_initialize_weights`] was set.
    pub fn deform<'a>(
        &mut self,
        points: &[Point3<T>],
        control_points: &[Point3<T>],
        control_triangles: impl Into<Triangles<'a>>,
    ) -> Result<Vec<Point3<T>>, DeformError> {
        let triangles = control_triangles.into();
        triangles
            .validate(control_points.len())
            .map_err(|e| match e {
                InterpolationError::NotTriangle { cell, size } => {
                    DeformError::NotTriangleMesh { cell, size }
                }
                other => other.into(),
            })?;

        let signature = Signature {
            control_points: control_points.len(),
            control_triangles: triangles.len(),
            points: points.len(),
        };
        let interval = points.len() / 10 + 1;
        let abort = self.abort.as_deref();

        let stale = self.initialize_weights || self.signature != Some(signature);
        if stale {
            log::debug!(
                "binding {} points to a control mesh of {} points",
                points.len(),
                control_points.len()
            );
            self.signature = None;
            self.weights = vec![T::zero(); points.len() * control_points.len()];
            bind(&mut self.weights, points, control_points, triangles, interval, abort)?;
            self.initialize_weights = false;
            self.signature = Some(signature);
        }

        let cols = control_points.len();
        let mut out = Vec::with_capacity(points.len());
        for (i, row) in self.weights.chunks_exact(cols).enumerate() {
            if i % interval == 0 {
                log::debug!("deforming point {i} of {}", points.len());
                check_abort(abort)?;
            }
            let mut x = [T::zero(); 3];
            for (p, &w) in control_points.iter().zip(row) {
                for k in 0..3 {
                    x[k] = x[k] + p[k] * w;
                }
            }
            out.push(Point3::new(x));
        }
        Ok(out)
    }
}

fn check_abort(abort: Option<&AtomicBool>) -> Result<(), DeformError> {
    match abort {
        Some(flag) if flag.load(Ordering::Relaxed) => Err(DeformError::Aborted),
        _ => Ok(()),
    }
}

/// Fills one weight row per point.
fn bind<T: Scalar>(
    weights: &mut [T],
    points: &[Point3<T>],
    control_points: &[Point3<T>],
    triangles: Triangles<'_>,
    interval: usize,
    abort: Option<&AtomicBool>,
) -> Result<(), DeformError> {
    let cols = control_points.len();

    #[cfg(feature = "parallel")]
    let rows = weights
        .par_chunks_exact_mut(cols)
        .zip(points.par_iter())
        .enumerate();
    #[cfg(not(feature = "parallel"))]
    let mut rows = weights.chunks_exact_mut(cols).zip(points.iter()).enumerate();

    rows.try_for_each(|(i, (row, p))| {
        if i % interval == 0 {
            log::debug!("computing weights for point {i} of {}", points.len());
            check_abort(abort)?;
        }
        mvc::compute_weights_into(p, control_points, triangles, row)?;
        Ok(())
    })
}
