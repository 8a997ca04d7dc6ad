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

use crate::interpolation::InterpolationError;

/// Triangle connectivity of a boundary, in one of the layouts callers
/// typically hold it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triangles<'a> {
    /// One `[i, j, k]` per triangle.
    Triples(&'a [[usize; 3]]),
    /// `i0, j0, k0, i1, j1, k1, ..`
    Flat(&'a [usize]),
    /// `3, i0, j0, k0, 3, i1, ..`: a cell array whose cells must all be
    /// triangles.
    CellArray(&'a [usize]),
}

impl<'a> Triangles<'a> {
    /// Flat storage, stride between triangles and offset of the first id.
    fn layout(&self) -> (&'a [usize], usize, usize) {
        match *self {
            Triangles::Triples(t) => (t.as_flattened(), 3, 0),
            Triangles::Flat(t) => (t, 3, 0),
            Triangles::CellArray(t) => (t, 4, 1),
        }
    }

    /// Number of complete triangles.
    pub fn len(&self) -> usize {
        let (data, stride, _) = self.layout();
        data.len() / stride
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks the layout and that every index is below `num_points`.
    pub fn validate(&self, num_points: usize) -> Result<(), InterpolationError> {
        let (data, stride, offset) = self.layout();
        if data.is_empty() {
            return Err(InterpolationError::NoTriangles);
        }

        let cells = data.chunks(stride);
        for (cell, chunk) in cells.enumerate() {
            let size = if offset == 1 { chunk[0] } else { chunk.len() };
            if size != 3 || chunk.len() != stride {
                let size = if chunk.len() == stride {
                    size
                } else {
                    chunk.len() - offset
                };
                return Err(InterpolationError::NotTriangle { cell, size });
            }
            if let Some(&index) = chunk[offset..].iter().find(|&&i| i >= num_points) {
                return Err(InterpolationError::TriangleIndexOutOfRange {
                    triangle: cell,
                    index,
                    points: num_points,
                });
            }
        }
        Ok(())
    }

    /// Triangles as index triples. Trailing partial entries are skipped;
    /// call [`Triangles::validate`] first to reject them.
    pub fn iter(self) -> impl Iterator<Item = [usize; 3]> + 'a {
        let (data, stride, offset) = self.layout();
        data.chunks_exact(stride)
            .map(move |c| [c[offset], c[offset + 1], c[offset + 2]])
    }
}

impl<'a> From<&'a [[usize; 3]]> for Triangles<'a> {
    fn from(t: &'a [[usize; 3]]) -> Self {
        Triangles::Triples(t)
    }
}

impl<'a, const N: usize> From<&'a [[usize; 3]; N]> for Triangles<'a> {
    fn from(t: &'a [[usize; 3]; N]) -> Self {
        Triangles::Triples(t)
    }
}

impl<'a> From<&'a Vec<[usize; 3]>> for Triangles<'a> {
    fn from(t: &'a Vec<[usize; 3]>) -> Self {
        Triangles::Triples(t.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_agree() {
        let triples = [[0, 1, 2], [2, 1, 3]];
        let flat = [0, 1, 2, 2, 1, 3];
        let cells = [3, 0, 1, 2, 3, 2, 1, 3];

        let a: Vec<_> = Triangles::Triples(&triples).iter().collect();
        let b: Vec<_> = Triangles::Flat(&flat).iter().collect();
        let c: Vec<_> = Triangles::CellArray(&cells).iter().collect();
        assert_eq!(a, triples);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(Triangles::CellArray(&cells).len(), 2);
    }

    #[test]
    fn rejects_quads_and_stray_ids() {
        let quad = [4, 0, 1, 2, 3];
        assert_eq!(
            Triangles::CellArray(&quad).validate(4),
            Err(InterpolationError::NotTriangle { cell: 0, size: 4 })
        );
        let partial = [0, 1, 2, 3];
        assert_eq!(
            Triangles::Flat(&partial).validate(4),
            Err(InterpolationError::NotTriangle { cell: 1, size: 1 })
        );
        assert_eq!(
            Triangles::Flat(&[0, 1, 7]).validate(4),
            Err(InterpolationError::TriangleIndexOutOfRange {
                triangle: 0,
                index: 7,
                points: 4
            })
        );
        assert_eq!(
            Triangles::Flat(&[]).validate(4),
            Err(InterpolationError::NoTriangles)
        );
    }
}
