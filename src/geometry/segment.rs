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

use crate::{
    geometry::point::{Point, PointOps},
    numeric::scalar::Scalar,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<T: Scalar, const N: usize> {
    pub a: Point<T, N>,
    pub b: Point<T, N>,
}

/// Closest point on a segment, with its parameter and squared distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection<T: Scalar, const N: usize> {
    pub t: T,
    pub closest: Point<T, N>,
    pub dist2: T,
}

impl<T: Scalar, const N: usize> Segment<T, N> {
    pub fn new(a: &Point<T, N>, b: &Point<T, N>) -> Self {
        Self { a: *a, b: *b }
    }

    pub fn length(&self) -> T {
        self.a.distance_to(&self.b)
    }

    pub fn midpoint(&self) -> Point<T, N> {
        self.a.midpoint(&self.b)
    }

    pub fn point_at(&self, t: T) -> Point<T, N> {
        let ab = self.a.vector_to(&self.b);
        self.a.add_vector(&ab.scale(t))
    }

    /// Closest point to `p`. The parameter is clamped to `[0, 1]`; a
    /// zero-length segment reports its first endpoint.
    pub fn project(&self, p: &Point<T, N>) -> SegmentProjection<T, N> {
        let ab = self.a.vector_to(&self.b);
        let len2 = ab.norm_squared();
        let t = if len2 == T::zero() {
            T::zero()
        } else {
            let ap = self.a.vector_to(p);
            (ap.dot(&ab) / len2).max(T::zero()).min(T::one())
        };
        let closest = self.point_at(t);
        SegmentProjection {
            t,
            closest,
            dist2: closest.distance_squared_to(p),
        }
    }
}

pub type Segment2<T> = Segment<T, 2>;
pub type Segment3<T> = Segment<T, 3>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point3;

    #[test]
    fn projection_clamps_to_endpoints() {
        let seg = Segment3::new(&Point3::<f64>::new([0.0, 0.0, 0.0]), &Point3::<f64>::new([2.0, 0.0, 0.0]));
        let mid = seg.project(&Point3::<f64>::new([1.0, 1.0, 0.0]));
        assert_eq!(mid.t, 0.5);
        assert_eq!(mid.dist2, 1.0);

        let past = seg.project(&Point3::<f64>::new([5.0, 0.0, 0.0]));
        assert_eq!(past.t, 1.0);
        assert_eq!(past.closest, Point3::<f64>::new([2.0, 0.0, 0.0]));
        assert_eq!(past.dist2, 9.0);
    }

    #[test]
    fn degenerate_segment_reports_first_endpoint() {
        let p = Point3::<f64>::new([1.0, 1.0, 1.0]);
        let seg = Segment3::new(&p, &p);
        let proj = seg.project(&Point3::<f64>::new([1.0, 1.0, 3.0]));
        assert_eq!(proj.closest, p);
        assert_eq!(proj.dist2, 4.0);
    }
}
