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

use arrow::array::ArrayRef;
use arrow::datatypes::DataType;

use windrose_common::{Result, ScalarValue};
use windrose_expr::Accumulator;

use super::sum_batch;

/// Sliding SUM. The state is a single scalar of the widened result type;
/// retraction subtracts the leaving slice's sum.
#[derive(Debug)]
pub(crate) struct SumAccumulator {
    sum: ScalarValue,
}

impl SumAccumulator {
    pub fn try_new(data_type: &DataType) -> Result<Self> {
        Ok(Self {
            sum: ScalarValue::try_from(data_type)?,
        })
    }
}

impl Accumulator for SumAccumulator {
    fn update_batch(&mut self, values: &[ArrayRef]) -> Result<()> {
        let delta = sum_batch(&values[0])?;
        if delta.is_null() {
            return Ok(());
        }
        self.sum = if self.sum.is_null() {
            delta
        } else {
            self.sum.add(&delta)?
        };
        Ok(())
    }

    fn retract_batch(&mut self, values: &[ArrayRef]) -> Result<()> {
        let delta = sum_batch(&values[0])?;
        if delta.is_null() {
            return Ok(());
        }
        // The retracted rows were added before, so the state is non-null.
        self.sum = self.sum.sub(&delta)?;
        Ok(())
    }

    fn supports_retract_batch(&self) -> bool {
        true
    }

    fn evaluate(&self) -> Result<ScalarValue> {
        Ok(self.sum.clone())
    }
}
