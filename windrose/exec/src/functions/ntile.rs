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

/// `ntile(n)`: splits the partition into `n` buckets as evenly as possible,
/// handing the surplus rows to the earliest buckets.
#[derive(Debug)]
pub(super) struct NtileEvaluator;

impl BuiltInEvaluator for NtileEvaluator {
    fn evaluate(&mut self, ctx: &EvaluationContext<'_>) -> Result<ScalarValue> {
        let buckets =
            scalar_to_index(&ctx.argument(0, ctx.current_row)?, "NTILE bucket count")?;
        if buckets == 0 {
            return Err(WindroseError::Execution(
                "NTILE bucket count must be at least 1".to_string(),
            ));
        }
        let rows = ctx.partition_rows()?;
        let index = ctx.current_row_number - 1;
        let small = rows / buckets;
        let surplus = rows % buckets;
        // The first `surplus` buckets carry one extra row.
        let threshold = surplus * (small + 1);
        let bucket = if index < threshold {
            index / (small + 1)
        } else {
            surplus + (index - threshold) / small
        };
        Ok(ScalarValue::UInt64(Some(bucket + 1)))
    }
}
