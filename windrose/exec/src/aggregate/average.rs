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

use arrow::array::{Array, ArrayRef};

use windrose_common::{Result, ScalarValue, WindroseError};
use windrose_expr::Accumulator;

use super::sum_batch;

/// Sliding AVG over the non-null cells of the argument column. State is a
/// running sum and a non-null count, both invertible.
#[derive(Debug)]
pub(crate) struct AvgAccumulator {
    sum: f64,
    count: u64,
}

impl AvgAccumulator {
    pub fn new() -> Self {
        Self { sum: 0.0, count: 0 }
    }

    fn delta(values: &[ArrayRef]) -> Result<(f64, u64)> {
        let array = &values[0];
        let count = (array.len() - array.null_count()) as u64;
        let sum = match sum_batch(array)? {
            ScalarValue::Int64(v) => v.map(|v| v as f64),
            ScalarValue::UInt64(v) => v.map(|v| v as f64),
            ScalarValue::Float64(v) => v,
            other => {
                return Err(WindroseError::Internal(format!(
                    "AVG is not expected to sum into {other:?}"
                )))
            }
        };
        Ok((sum.unwrap_or(0.0), count))
    }
}

impl Accumulator for AvgAccumulator {
    fn update_batch(&mut self, values: &[ArrayRef]) -> Result<()> {
        let (sum, count) = Self::delta(values)?;
        self.sum += sum;
        self.count += count;
        Ok(())
    }

    fn retract_batch(&mut self, values: &[ArrayRef]) -> Result<()> {
        let (sum, count) = Self::delta(values)?;
        self.sum -= sum;
        self.count -= count;
        Ok(())
    }

    fn supports_retract_batch(&self) -> bool {
        true
    }

    fn evaluate(&self) -> Result<ScalarValue> {
        Ok(ScalarValue::Float64(if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::Int64Array;

    use super::*;

    fn array(values: Vec<Option<i64>>) -> Vec<ArrayRef> {
        vec![Arc::new(Int64Array::from(values)) as ArrayRef]
    }

    #[test]
    fn averages_non_null_cells() -> Result<()> {
        let mut acc = AvgAccumulator::new();
        assert_eq!(acc.evaluate()?, ScalarValue::Float64(None));
        acc.update_batch(&array(vec![Some(1), Some(2), None]))?;
        assert_eq!(acc.evaluate()?, ScalarValue::Float64(Some(1.5)));
        acc.retract_batch(&array(vec![Some(1)]))?;
        assert_eq!(acc.evaluate()?, ScalarValue::Float64(Some(2.0)));
        Ok(())
    }
}
