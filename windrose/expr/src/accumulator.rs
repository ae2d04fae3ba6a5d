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

//! Accumulator module contains the trait the window operator drives when a
//! window function is an aggregate.

use std::fmt::Debug;

use arrow::array::ArrayRef;

use windrose_common::{Result, ScalarValue, WindroseError};

/// An accumulator represents a stateful object that lives throughout the
/// evaluation of one partition's frames and aggregates the rows currently
/// inside the frame.
///
/// The frame driver feeds it batch slices: rows entering the frame arrive via
/// [`Accumulator::update_batch`], rows leaving the frame are removed via
/// [`Accumulator::retract_batch`] when the implementation supports it.
/// Accumulators without retraction are recreated and replayed whenever the
/// frame start moves forward.
pub trait Accumulator: Debug + Send {
    /// Updates the accumulator's state from its argument columns, one slice
    /// per argument.
    fn update_batch(&mut self, values: &[ArrayRef]) -> Result<()>;

    /// Retracts (removes) a previously added batch from the accumulator's
    /// state. Only called when [`Accumulator::supports_retract_batch`]
    /// returns true.
    fn retract_batch(&mut self, _values: &[ArrayRef]) -> Result<()> {
        Err(WindroseError::Internal(
            "retract_batch is not implemented for this accumulator".to_string(),
        ))
    }

    /// Whether the accumulator can undo additions. Invertible aggregates
    /// (sum, count, avg) slide their frame in O(1) amortised work per row;
    /// the rest (min, max) are replayed from the new frame start.
    fn supports_retract_batch(&self) -> bool {
        false
    }

    /// Returns the current aggregate value. Called once per output row, so
    /// it must not consume the state.
    fn evaluate(&self) -> Result<ScalarValue>;
}
