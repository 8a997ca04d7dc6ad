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

use std::ops::Range;

use crate::cell::CellError;

/// Faces stored back to back: `ids[offsets[i]..offsets[i + 1]]` is face `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceList {
    ids: Vec<usize>,
    offsets: Vec<usize>,
}

impl FaceList {
    pub fn new() -> Self {
        FaceList {
            ids: Vec::new(),
            offsets: vec![0],
        }
    }

    /// Parses `[count, n0, ids.., n1, ids.., ..]`.
    pub fn parse(blob: &[usize]) -> Result<Self, CellError> {
        let (&count, mut rest) = blob.split_first().ok_or(CellError::NoFaces)?;
        if count == 0 {
            return Err(CellError::NoFaces);
        }

        let mut faces = FaceList::new();
        let mut offset = 1;
        for _ in 0..count {
            let (&n, tail) = rest.split_first().ok_or(CellError::MalformedFaces {
                offset,
                reason: "face count exceeds the list",
            })?;
            if n < 3 {
                return Err(CellError::MalformedFaces {
                    offset,
                    reason: "face has fewer than three points",
                });
            }
            if tail.len() < n {
                return Err(CellError::MalformedFaces {
                    offset,
                    reason: "face size runs past the list",
                });
            }
            faces.push(&tail[..n]);
            rest = &tail[n..];
            offset += n + 1;
        }
        if !rest.is_empty() {
            log::warn!(
                "ignoring {} trailing entries after {count} faces",
                rest.len()
            );
        }
        Ok(faces)
    }

    pub fn push(&mut self, face: &[usize]) {
        self.ids.extend_from_slice(face);
        self.offsets.push(self.ids.len());
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self, i: usize) -> Range<usize> {
        self.offsets[i]..self.offsets[i + 1]
    }

    pub fn get(&self, i: usize) -> Option<&[usize]> {
        (i < self.len()).then(|| &self.ids[self.range(i)])
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.offsets.windows(2).map(|w| &self.ids[w[0]..w[1]])
    }

    /// Every id of every face, in order.
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Same faces with every id passed through `f`.
    pub fn map_ids(&self, mut f: impl FnMut(usize) -> usize) -> FaceList {
        FaceList {
            ids: self.ids.iter().map(|&id| f(id)).collect(),
            offsets: self.offsets.clone(),
        }
    }

    /// `[count, n0, ids.., n1, ..]`
    pub fn to_blob(&self) -> Vec<usize> {
        let mut blob = Vec::with_capacity(1 + self.len() + self.ids.len());
        blob.push(self.len());
        for face in self.iter() {
            blob.push(face.len());
            blob.extend_from_slice(face);
        }
        blob
    }
}
