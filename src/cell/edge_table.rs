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

use ahash::AHashMap;

use crate::{cell::faces::FaceList, geometry::canonical_edge::CanonicalEdge};

/// Undirected edges of a face list, numbered in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    index: AHashMap<CanonicalEdge, usize>,
    edges: Vec<CanonicalEdge>,
    /// Number of faces using each edge.
    uses: Vec<usize>,
}

impl EdgeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks every face boundary, including the closing edge.
    pub fn from_faces(faces: &FaceList) -> Self {
        let mut table = EdgeTable::new();
        for face in faces.iter() {
            let n = face.len();
            for i in 0..n {
                table.insert(face[i], face[(i + 1) % n]);
            }
        }
        log::trace!("generated {} edges from {} faces", table.len(), faces.len());
        table
    }

    /// Records one use of edge `a`-`b` and returns its index.
    pub fn insert(&mut self, a: usize, b: usize) -> usize {
        let edge = CanonicalEdge::new(a, b);
        let next = self.edges.len();
        let id = *self.index.entry(edge).or_insert(next);
        if id == next {
            self.edges.push(edge);
            self.uses.push(0);
        }
        self.uses[id] += 1;
        id
    }

    pub fn edge_id(&self, a: usize, b: usize) -> Option<usize> {
        self.index.get(&CanonicalEdge::new(a, b)).copied()
    }

    pub fn get(&self, id: usize) -> Option<[usize; 2]> {
        self.edges.get(id).map(CanonicalEdge::as_array)
    }

    pub fn uses(&self, id: usize) -> usize {
        self.uses.get(id).copied().unwrap_or(0)
    }

    pub fn use_counts(&self) -> &[usize] {
        &self.uses
    }

    /// First edge not shared by exactly two faces, with its use count.
    pub fn first_non_manifold(&self) -> Option<([usize; 2], usize)> {
        self.edges
            .iter()
            .zip(&self.uses)
            .find(|(_, uses)| **uses != 2)
            .map(|(e, &uses)| (e.as_array(), uses))
    }

    pub fn iter(&self) -> impl Iterator<Item = [usize; 2]> + '_ {
        self.edges.iter().map(CanonicalEdge::as_array)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
