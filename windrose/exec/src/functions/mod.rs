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

//! Built-in window functions: the per-row evaluation context the operator
//! hands them and the evaluator implementations.

mod lead_lag;
mod nth_value;
mod ntile;
mod rank;
mod row_number;

use std::fmt::Debug;

use arrow::array::Array;
use arrow::datatypes::DataType;

use windrose_common::{Result, ScalarValue, WindroseError};
use windrose_expr::BuiltInWindowFunction;

use crate::buffer::BlockBuffer;
use crate::coord::RowCoord;

use lead_lag::WindowShiftEvaluator;
use nth_value::{NthValueEvaluator, NthValueKind};
use ntile::NtileEvaluator;
use rank::{RankEvaluator, RankType};
use row_number::RowNumberEvaluator;

/// The operator's position at the row being computed, as seen by a built-in
/// window function.
pub(crate) struct EvaluationContext<'a> {
    pub buffer: &'a BlockBuffer,
    /// Argument column indices of the function being evaluated.
    pub arguments: &'a [usize],
    pub current_row: RowCoord,
    pub frame_start: RowCoord,
    pub frame_end: RowCoord,
    pub partition_end: RowCoord,
    pub partition_ended: bool,
    /// 1-based position of the current row within its partition.
    pub current_row_number: u64,
    /// Row number of the first peer of the current row.
    pub peer_group_start_row_number: u64,
    /// 1-based number of the current peer group within its partition.
    pub peer_group_number: u64,
}

impl EvaluationContext<'_> {
    /// The cell of argument `position` at row `at`.
    pub fn argument(&self, position: usize, at: RowCoord) -> Result<ScalarValue> {
        let column = self.arguments.get(position).ok_or_else(|| {
            WindroseError::Internal(format!(
                "window function argument {position} out of range"
            ))
        })?;
        ScalarValue::try_from_array(self.buffer.column_at(at, *column), at.row as usize)
    }

    /// The declared type of argument `position`, used for typed nulls.
    pub fn argument_type(&self, position: usize) -> Result<DataType> {
        let column = self.arguments.get(position).ok_or_else(|| {
            WindroseError::Internal(format!(
                "window function argument {position} out of range"
            ))
        })?;
        Ok(self
            .buffer
            .column_at(self.current_row, *column)
            .data_type()
            .clone())
    }

    /// Total number of rows in the current partition. Only known once the
    /// partition has ended, which the frame gate at construction guarantees
    /// for the functions that call this.
    pub fn partition_rows(&self) -> Result<u64> {
        if !self.partition_ended {
            return Err(WindroseError::Internal(
                "partition size read before the partition ended".to_string(),
            ));
        }
        Ok(self.current_row_number - 1
            + self
                .buffer
                .rows_between(self.current_row, self.partition_end))
    }
}

/// A built-in window function writes one result cell per row from the
/// numbering and coordinates in the [`EvaluationContext`].
pub(crate) trait BuiltInEvaluator: Debug + Send {
    fn evaluate(&mut self, ctx: &EvaluationContext<'_>) -> Result<ScalarValue>;
}

pub(crate) fn create_built_in_evaluator(
    fun: &BuiltInWindowFunction,
) -> Box<dyn BuiltInEvaluator> {
    match fun {
        BuiltInWindowFunction::RowNumber => Box::new(RowNumberEvaluator),
        BuiltInWindowFunction::Rank => Box::new(RankEvaluator::new(RankType::Basic)),
        BuiltInWindowFunction::DenseRank => {
            Box::new(RankEvaluator::new(RankType::Dense))
        }
        BuiltInWindowFunction::PercentRank => {
            Box::new(RankEvaluator::new(RankType::Percent))
        }
        BuiltInWindowFunction::Ntile => Box::new(NtileEvaluator),
        BuiltInWindowFunction::Lag => Box::new(WindowShiftEvaluator::new(true)),
        BuiltInWindowFunction::Lead => Box::new(WindowShiftEvaluator::new(false)),
        BuiltInWindowFunction::FirstValue => {
            Box::new(NthValueEvaluator::new(NthValueKind::First))
        }
        BuiltInWindowFunction::LastValue => {
            Box::new(NthValueEvaluator::new(NthValueKind::Last))
        }
        BuiltInWindowFunction::NthValue => {
            Box::new(NthValueEvaluator::new(NthValueKind::Nth))
        }
    }
}

/// Reads a non-negative row offset or bucket count from an argument cell.
fn scalar_to_index(value: &ScalarValue, what: &str) -> Result<u64> {
    match value {
        ScalarValue::Int32(Some(v)) if *v >= 0 => Ok(*v as u64),
        ScalarValue::Int64(Some(v)) if *v >= 0 => Ok(*v as u64),
        ScalarValue::UInt64(Some(v)) => Ok(*v),
        other => Err(WindroseError::Execution(format!(
            "{what} must be a non-negative integer, got {other}"
        ))),
    }
}
