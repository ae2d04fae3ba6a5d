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

//! The sliding block buffer and its coordinate arithmetic.

use std::collections::VecDeque;

use arrow::array::ArrayRef;
use arrow::record_batch::RecordBatch;

use windrose_common::utils::get_row_at_idx;
use windrose_common::{Result, ScalarValue};

use crate::coord::RowCoord;

/// One buffered block: the upstream batch plus the result cells computed so
/// far, one vector per window function. Result vectors are filled strictly
/// in row order and converted to arrays when the block is emitted.
#[derive(Debug)]
pub(crate) struct WindowBlock {
    pub input: RecordBatch,
    pub output: Vec<Vec<ScalarValue>>,
}

impl WindowBlock {
    pub fn rows(&self) -> usize {
        self.input.num_rows()
    }
}

/// A sliding window of the blocks we currently need. Input blocks are
/// appended as they arrive and dropped from the front once nothing can
/// address them anymore. Blocks have an always-incrementing number; the
/// number of the first buffered block is `first_block_number`.
#[derive(Debug, Default)]
pub(crate) struct BlockBuffer {
    blocks: VecDeque<WindowBlock>,
    first_block_number: u64,
}

impl BlockBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_block_number(&self) -> u64 {
        self.first_block_number
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Past-the-end coordinate: the first row of the block that would be
    /// appended next.
    pub fn blocks_end(&self) -> RowCoord {
        RowCoord::new(self.first_block_number + self.blocks.len() as u64, 0)
    }

    /// Whether `x` addresses a buffered row, or is the past-the-end sentinel.
    pub fn is_valid(&self, x: RowCoord) -> bool {
        if x.block < self.first_block_number {
            return false;
        }
        if x == self.blocks_end() {
            return true;
        }
        x.block < self.blocks_end().block && (x.row as usize) < self.block(x.block).rows()
    }

    pub fn append(&mut self, batch: RecordBatch, num_functions: usize) {
        debug_assert!(batch.num_rows() > 0);
        let rows = batch.num_rows();
        self.blocks.push_back(WindowBlock {
            input: batch,
            output: (0..num_functions)
                .map(|_| Vec::with_capacity(rows))
                .collect(),
        });
    }

    /// Drops buffered blocks numbered below `block_number`. Blocks must have
    /// been emitted before they are released.
    pub fn release_before(&mut self, block_number: u64) {
        while self.first_block_number < block_number && !self.blocks.is_empty() {
            self.blocks.pop_front();
            self.first_block_number += 1;
        }
    }

    pub fn block(&self, number: u64) -> &WindowBlock {
        debug_assert!(number >= self.first_block_number);
        debug_assert!(((number - self.first_block_number) as usize) < self.blocks.len());
        &self.blocks[(number - self.first_block_number) as usize]
    }

    pub fn block_mut(&mut self, number: u64) -> &mut WindowBlock {
        debug_assert!(number >= self.first_block_number);
        debug_assert!(((number - self.first_block_number) as usize) < self.blocks.len());
        &mut self.blocks[(number - self.first_block_number) as usize]
    }

    pub fn block_rows(&self, number: u64) -> usize {
        self.block(number).rows()
    }

    pub fn column_at(&self, x: RowCoord, column: usize) -> &ArrayRef {
        self.block(x.block).input.column(column)
    }

    /// Extracts the cells of row `x` at the given column indices.
    pub fn row_values(&self, x: RowCoord, columns: &[usize]) -> Result<Vec<ScalarValue>> {
        let arrays: Vec<ArrayRef> = columns
            .iter()
            .map(|&c| self.column_at(x, c).clone())
            .collect();
        get_row_at_idx(&arrays, x.row as usize)
    }

    /// The coordinate one row after `x`, rolling into the next block at the
    /// block boundary.
    pub fn advanced(&self, mut x: RowCoord) -> RowCoord {
        let block_rows = self.block_rows(x.block) as u64;
        debug_assert!(x.row < block_rows);
        x.row += 1;
        if x.row == block_rows {
            x.row = 0;
            x.block += 1;
        }
        x
    }

    /// Moves `x` by a signed `offset` of rows, clamping at the first buffered
    /// row on the left and at [`BlockBuffer::blocks_end`] on the right.
    /// Returns the clamped coordinate and the part of the offset that was not
    /// walked; the remainder is non-zero only when clamping occurred, and
    /// callers interpret it as "the target lies beyond the available data".
    pub fn move_coord(&self, x: RowCoord, offset: i64) -> (RowCoord, i64) {
        let (moved, remainder) = self.move_coord_no_check(x, offset);
        // The walk must be reversible.
        #[cfg(debug_assertions)]
        {
            let (back, leftover) = self.move_coord_no_check(moved, -(offset - remainder));
            debug_assert_eq!(back, x);
            debug_assert_eq!(leftover, 0);
        }
        (moved, remainder)
    }

    fn move_coord_no_check(&self, mut x: RowCoord, mut offset: i64) -> (RowCoord, i64) {
        if offset > 0 {
            let end = self.blocks_end();
            loop {
                debug_assert!(self.is_valid(x));
                if x == end {
                    break;
                }
                let block_rows = self.block_rows(x.block) as u64;
                x.row += offset as u64;
                if x.row < block_rows {
                    offset = 0;
                    break;
                }
                offset = (x.row - block_rows) as i64;
                x.row = 0;
                x.block += 1;
            }
        } else if offset < 0 {
            loop {
                debug_assert!(self.is_valid(x));
                if x.row >= offset.unsigned_abs() {
                    x.row -= offset.unsigned_abs();
                    offset = 0;
                    break;
                }
                // Move to the first row of this block; stepping further costs
                // one extra row to reach the last row of the previous block.
                offset += x.row as i64;
                x.row = 0;
                if x.block == self.first_block_number {
                    break;
                }
                x.block -= 1;
                x.row = self.block_rows(x.block) as u64 - 1;
                offset += 1;
            }
        }
        (x, offset)
    }

    /// Number of rows in `[from, to)`. Both coordinates must lie within the
    /// buffer (`to` may be the past-the-end sentinel).
    pub fn rows_between(&self, from: RowCoord, to: RowCoord) -> u64 {
        debug_assert!(from <= to);
        debug_assert!(self.is_valid(from) && self.is_valid(to));
        if from.block == to.block {
            return to.row - from.row;
        }
        let mut count = self.block_rows(from.block) as u64 - from.row;
        for block in (from.block + 1)..to.block {
            count += self.block_rows(block) as u64;
        }
        count + to.row
    }
}
