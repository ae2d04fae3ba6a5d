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

use windrose_common::{Result, ScalarValue, WindroseError};

use super::{scalar_to_index, BuiltInEvaluator, EvaluationContext};

/// Tag to differentiate the special cases of the NTH_VALUE window function.
#[derive(Debug, Clone, Copy)]
pub(super) enum NthValueKind {
    First,
    Last,
    Nth,
}

/// `first_value`, `last_value` and `nth_value` over the frame. An empty
/// frame, or an `n` past the frame end, yields a typed null.
#[derive(Debug)]
pub(super) struct NthValueEvaluator {
    kind: NthValueKind,
}

impl NthValueEvaluator {
    pub fn new(kind: NthValueKind) -> Self {
        Self { kind }
    }
}

impl BuiltInEvaluator for NthValueEvaluator {
    fn evaluate(&mut self, ctx: &EvaluationContext<'_>) -> Result<ScalarValue> {
        let null = ScalarValue::try_from(&ctx.argument_type(0)?)?;
        if ctx.frame_start >= ctx.frame_end {
            return Ok(null);
        }
        match self.kind {
            NthValueKind::First => ctx.argument(0, ctx.frame_start),
            NthValueKind::Last => {
                let (last, _) = ctx.buffer.move_coord(ctx.frame_end, -1);
                ctx.argument(0, last)
            }
            NthValueKind::Nth => {
                let n =
                    scalar_to_index(&ctx.argument(1, ctx.current_row)?, "NTH_VALUE index")?;
                if n == 0 {
                    return Err(WindroseError::Execution(
                        "NTH_VALUE index must be at least 1".to_string(),
                    ));
                }
                let (target, remainder) =
                    ctx.buffer.move_coord(ctx.frame_start, (n - 1) as i64);
                if remainder != 0 || target >= ctx.frame_end {
                    Ok(null)
                } else {
                    ctx.argument(0, target)
                }
            }
        }
    }
}
