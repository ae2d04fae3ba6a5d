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

//! Forward equality scans over buffered rows. Partition-end advancement and
//! peer-group detection are the same scan over different column index sets.

use windrose_common::utils::rows_equal;
use windrose_common::Result;

use crate::buffer::BlockBuffer;
use crate::coord::RowCoord;

/// Whether rows `x` and `y` are equal on `columns`, with NULL comparing
/// equal to NULL. An empty index set makes every pair of rows equal.
pub(crate) fn rows_equal_at(
    buffer: &BlockBuffer,
    columns: &[usize],
    x: RowCoord,
    y: RowCoord,
) -> Result<bool> {
    if x == y || columns.is_empty() {
        return Ok(true);
    }
    Ok(rows_equal(
        &buffer.row_values(x, columns)?,
        &buffer.row_values(y, columns)?,
    ))
}

/// Advances `from` through rows that are equal to the row at `reference` on
/// `columns`, stopping at `end`. Returns the first non-matching coordinate,
/// or `end` when every scanned row matched. The reference row must be
/// buffered; with an empty index set the scan runs straight to `end`.
pub(crate) fn advance_while_equal(
    buffer: &BlockBuffer,
    columns: &[usize],
    reference: RowCoord,
    mut from: RowCoord,
    end: RowCoord,
) -> Result<RowCoord> {
    if from >= end {
        return Ok(from);
    }
    if columns.is_empty() {
        return Ok(end);
    }
    let reference_row = buffer.row_values(reference, columns)?;
    while from < end {
        if !rows_equal(&buffer.row_values(from, columns)?, &reference_row) {
            break;
        }
        from = buffer.advanced(from);
    }
    Ok(from)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;

    use super::*;

    fn buffer_of(blocks: &[&[Option<&str>]]) -> BlockBuffer {
        let schema = Arc::new(Schema::new(vec![Field::new("p", DataType::Utf8, true)]));
        let mut buffer = BlockBuffer::new();
        for block in blocks {
            let array: ArrayRef = Arc::new(StringArray::from(block.to_vec()));
            buffer.append(RecordBatch::try_new(schema.clone(), vec![array]).unwrap(), 0);
        }
        buffer
    }

    #[test]
    fn scan_stops_at_first_mismatch() -> Result<()> {
        let buffer = buffer_of(&[&[Some("a"), Some("a")], &[Some("a"), Some("b")]]);
        let boundary = advance_while_equal(
            &buffer,
            &[0],
            RowCoord::new(0, 0),
            RowCoord::new(0, 0),
            buffer.blocks_end(),
        )?;
        assert_eq!(boundary, RowCoord::new(1, 1));
        Ok(())
    }

    #[test]
    fn scan_runs_to_end_without_mismatch() -> Result<()> {
        let buffer = buffer_of(&[&[Some("a")], &[Some("a"), Some("a")]]);
        let boundary = advance_while_equal(
            &buffer,
            &[0],
            RowCoord::new(0, 0),
            RowCoord::new(0, 0),
            buffer.blocks_end(),
        )?;
        assert_eq!(boundary, buffer.blocks_end());
        Ok(())
    }

    #[test]
    fn nulls_are_equal_to_nulls() -> Result<()> {
        let buffer = buffer_of(&[&[None, None, Some("a")]]);
        assert!(rows_equal_at(
            &buffer,
            &[0],
            RowCoord::new(0, 0),
            RowCoord::new(0, 1)
        )?);
        assert!(!rows_equal_at(
            &buffer,
            &[0],
            RowCoord::new(0, 1),
            RowCoord::new(0, 2)
        )?);
        Ok(())
    }

    #[test]
    fn empty_index_set_matches_everything() -> Result<()> {
        let buffer = buffer_of(&[&[Some("a"), Some("b")]]);
        assert!(rows_equal_at(
            &buffer,
            &[],
            RowCoord::new(0, 0),
            RowCoord::new(0, 1)
        )?);
        let boundary = advance_while_equal(
            &buffer,
            &[],
            RowCoord::new(0, 0),
            RowCoord::new(0, 0),
            buffer.blocks_end(),
        )?;
        assert_eq!(boundary, buffer.blocks_end());
        Ok(())
    }
}
