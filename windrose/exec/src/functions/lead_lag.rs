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

use windrose_common::{Result, ScalarValue};

use super::{scalar_to_index, BuiltInEvaluator, EvaluationContext};

/// `lag(value[, offset[, default]])` and `lead(...)`, evaluated within the
/// frame: an offset that resolves outside `[frame_start, frame_end)` yields
/// the default. Keeping the reach inside the frame is what guarantees the
/// addressed block is still buffered.
#[derive(Debug)]
pub(super) struct WindowShiftEvaluator {
    is_lag: bool,
}

impl WindowShiftEvaluator {
    pub fn new(is_lag: bool) -> Self {
        Self { is_lag }
    }
}

impl BuiltInEvaluator for WindowShiftEvaluator {
    fn evaluate(&mut self, ctx: &EvaluationContext<'_>) -> Result<ScalarValue> {
        let offset = if ctx.arguments.len() > 1 {
            scalar_to_index(&ctx.argument(1, ctx.current_row)?, "LAG/LEAD offset")?
        } else {
            1
        };
        let default = if ctx.arguments.len() > 2 {
            ctx.argument(2, ctx.current_row)?
        } else {
            ScalarValue::try_from(&ctx.argument_type(0)?)?
        };
        let delta = if self.is_lag {
            -(offset as i64)
        } else {
            offset as i64
        };
        let (target, remainder) = ctx.buffer.move_coord(ctx.current_row, delta);
        if remainder != 0 || target < ctx.frame_start || target >= ctx.frame_end {
            return Ok(default);
        }
        ctx.argument(0, target)
    }
}
