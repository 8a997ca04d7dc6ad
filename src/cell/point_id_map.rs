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

/// Bijection between the global ids a cell is defined with and its local
/// indices `0..n`, assigned in order of first insertion.
#[derive(Debug, Clone, Default)]
pub struct PointIdMap {
    to_local: AHashMap<usize, usize>,
    to_global: Vec<usize>,
}

impl PointIdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local index of `global`, assigning the next one if it is new.
    pub fn insert(&mut self, global: usize) -> usize {
        let next = self.to_global.len();
        let local = *self.to_local.entry(global).or_insert(next);
        if local == next {
            self.to_global.push(global);
        }
        local
    }

    pub fn local(&self, global: usize) -> Option<usize> {
        self.to_local.get(&global).copied()
    }

    pub fn global(&self, local: usize) -> Option<usize> {
        self.to_global.get(local).copied()
    }

    /// Global ids indexed by local index.
    pub fn globals(&self) -> &[usize] {
        &self.to_global
    }

    pub fn len(&self) -> usize {
        self.to_global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_global.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_appearance_order() {
        let mut map = PointIdMap::new();
        let locals: Vec<_> = [42, 7, 42, 9, 7].iter().map(|&g| map.insert(g)).collect();
        assert_eq!(locals, vec![0, 1, 0, 2, 1]);
        assert_eq!(map.globals(), &[42, 7, 9]);
        assert_eq!(map.local(9), Some(2));
        assert_eq!(map.global(3), None);
    }
}
