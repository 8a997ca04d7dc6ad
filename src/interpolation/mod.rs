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

//! Generalized barycentric interpolation over closed triangulated boundaries.

pub mod mvc;
pub mod triangles;

use thiserror::Error;

use crate::numeric::scalar::ScalarType;

pub use triangles::Triangles;

/// Errors reported before any weight is computed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterpolationError {
    /// The boundary has no triangles.
    #[error("boundary has no triangles")]
    NoTriangles,
    /// A triangle references a point that does not exist.
    #[error("triangle {triangle} references point {index}, but only {points} points exist")]
    TriangleIndexOutOfRange {
        triangle: usize,
        index: usize,
        points: usize,
    },
    /// A connectivity entry is not a triangle.
    #[error("cell {cell} has {size} points, expected a triangle")]
    NotTriangle { cell: usize, size: usize },
    /// The caller-supplied weight buffer does not match the point count.
    #[error("weight buffer holds {actual} values, expected {expected}")]
    WeightBufferSize { expected: usize, actual: usize },
    /// Weights can only be produced in the scalar type of the points, and
    /// only for floating-point types.
    #[error("cannot compute {requested} weights for {points} points")]
    UnsupportedScalarType {
        requested: ScalarType,
        points: ScalarType,
    },
}
