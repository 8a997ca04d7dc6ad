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

use num_traits::{Float, FloatConst, NumCast};

use std::{fmt::Debug, iter::Sum};

/// Floating-point scalar the geometry kernels are generic over.
///
/// Only `f32` and `f64` implement this trait. Interpolation weights, point
/// coordinates and parametric coordinates always share the same scalar type.
pub trait Scalar:
    Float + FloatConst + NumCast + Sum + Debug + Default + Send + Sync + 'static
{
    /// Type tag used by the dynamically typed entry points.
    const TYPE: ScalarType;

    /// General geometric tolerance (coincident points, on-plane tests).
    fn tolerance() -> Self;

    fn tolerance_squared() -> Self {
        let tol = Self::tolerance();
        tol * tol
    }

    /// Distance / angle threshold used by mean value coordinates to detect
    /// a query point lying on a vertex, an edge or a face.
    fn mvc_tolerance() -> Self;

    /// Lossy conversion from `f64`; both implementors accept every finite value.
    #[inline(always)]
    fn from_f64(v: f64) -> Self {
        <Self as NumCast>::from(v).unwrap_or_else(Self::nan)
    }

    #[inline(always)]
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    #[inline(always)]
    fn two() -> Self {
        Self::one() + Self::one()
    }

    #[inline(always)]
    fn half() -> Self {
        Self::one() / Self::two()
    }
}

impl Scalar for f64 {
    const TYPE: ScalarType = ScalarType::Double;

    fn tolerance() -> Self {
        1e-10
    }

    fn mvc_tolerance() -> Self {
        1e-8
    }
}

impl Scalar for f32 {
    const TYPE: ScalarType = ScalarType::Float;

    fn tolerance() -> Self {
        1e-6
    }

    fn mvc_tolerance() -> Self {
        1e-5
    }
}

/// Runtime tag for point / weight storage that is typed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Float,
    Double,
    Int,
    Long,
}

impl ScalarType {
    pub fn is_floating(self) -> bool {
        matches!(self, ScalarType::Float | ScalarType::Double)
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScalarType::Float => "float",
            ScalarType::Double => "double",
            ScalarType::Int => "int",
            ScalarType::Long => "long",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerances_are_ordered_by_precision() {
        assert!(f64::tolerance() < f32::tolerance() as f64);
        assert!(f64::mvc_tolerance() < f32::mvc_tolerance() as f64);
        assert!((f64::tolerance_squared() - 1e-20).abs() < 1e-30);
    }

    #[test]
    fn only_reals_are_floating() {
        assert!(f32::TYPE.is_floating());
        assert!(f64::TYPE.is_floating());
        assert!(!ScalarType::Int.is_floating());
        assert_eq!(ScalarType::Long.to_string(), "long");
    }
}
