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

/// Undirected edge between two point ids, stored with `a <= b` so that both
/// traversal directions hash to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalEdge {
    pub a: usize,
    pub b: usize,
}

impl CanonicalEdge {
    pub fn new(p1: usize, p2: usize) -> Self {
        if p1 <= p2 {
            Self { a: p1, b: p2 }
        } else {
            Self { a: p2, b: p1 }
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.a == self.b
    }

    pub fn contains(&self, id: usize) -> bool {
        self.a == id || self.b == id
    }

    pub fn as_array(&self) -> [usize; 2] {
        [self.a, self.b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_does_not_matter() {
        assert_eq!(CanonicalEdge::new(7, 2), CanonicalEdge::new(2, 7));
        assert_eq!(CanonicalEdge::new(7, 2).as_array(), [2, 7]);
        assert!(CanonicalEdge::new(4, 4).is_degenerate());
        assert!(CanonicalEdge::new(1, 9).contains(9));
    }
}
