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

use super::{BuiltInEvaluator, EvaluationContext};

#[derive(Debug, Clone, Copy)]
pub(super) enum RankType {
    /// `rank`: row number of the first peer; jumps by the peer-group size.
    Basic,
    /// `dense_rank`: number of peer groups seen so far.
    Dense,
    /// `percent_rank`: `(rank - 1) / (partition rows - 1)`.
    Percent,
}

#[derive(Debug)]
pub(super) struct RankEvaluator {
    kind: RankType,
}

impl RankEvaluator {
    pub fn new(kind: RankType) -> Self {
        Self { kind }
    }
}

impl BuiltInEvaluator for RankEvaluator {
    fn evaluate(&mut self, ctx: &EvaluationContext<'_>) -> Result<ScalarValue> {
        Ok(match self.kind {
            RankType::Basic => {
                ScalarValue::UInt64(Some(ctx.peer_group_start_row_number))
            }
            RankType::Dense => ScalarValue::UInt64(Some(ctx.peer_group_number)),
            RankType::Percent => {
                let rows = ctx.partition_rows()?;
                ScalarValue::Float64(Some(if rows <= 1 {
                    0.0
                } else {
                    (ctx.peer_group_start_row_number - 1) as f64 / (rows - 1) as f64
                }))
            }
        })
    }
}
