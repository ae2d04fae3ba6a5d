// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;

/// Address of one row in the operator's block space. Blocks are numbered
/// monotonically from the start of the stream, so a coordinate stays valid
/// when older blocks are released from the buffer. `(b, 0)` where `b` is one
/// past the last buffered block is the past-the-end sentinel.
///
/// The derived ordering is lexicographic over `(block, row)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowCoord {
    /// Monotonic block number, not an index into the buffer.
    pub block: u64,
    /// Row offset within the block.
    pub row: u64,
}

impl RowCoord {
    /// Creates a coordinate.
    pub fn new(block: u64, row: u64) -> Self {
        Self { block, row }
    }
}

impl fmt::Display for RowCoord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicographic_order() {
        assert!(RowCoord::new(0, 5) < RowCoord::new(1, 0));
        assert!(RowCoord::new(1, 0) < RowCoord::new(1, 1));
        assert!(RowCoord::new(2, 0) > RowCoord::new(1, 9));
        assert_eq!(RowCoord::new(3, 4), RowCoord::new(3, 4));
    }

    #[test]
    fn display() {
        assert_eq!(RowCoord::new(7, 2).to_string(), "7:2");
    }
}
