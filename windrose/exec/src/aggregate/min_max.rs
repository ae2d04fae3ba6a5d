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

use std::cmp::Ordering;

use arrow::array::ArrayRef;
use arrow::datatypes::DataType;

use windrose_common::{Result, ScalarValue};
use windrose_expr::Accumulator;

use super::{max_batch, min_batch};

/// MIN over the frame. The extremum of a set cannot be maintained under row
/// removal, so this accumulator does not support retraction; the frame
/// driver recreates and replays it whenever the frame start advances.
#[derive(Debug)]
pub(crate) struct MinAccumulator {
    min: ScalarValue,
}

impl MinAccumulator {
    pub fn try_new(data_type: &DataType) -> Result<Self> {
        Ok(Self {
            min: ScalarValue::try_from(data_type)?,
        })
    }
}

impl Accumulator for MinAccumulator {
    fn update_batch(&mut self, values: &[ArrayRef]) -> Result<()> {
        let delta = min_batch(&values[0])?;
        if delta.is_null() {
            return Ok(());
        }
        if self.min.is_null()
            || delta.partial_cmp(&self.min) == Some(Ordering::Less)
        {
            self.min = delta;
        }
        Ok(())
    }

    fn evaluate(&self) -> Result<ScalarValue> {
        Ok(self.min.clone())
    }
}

/// MAX over the frame; see [`MinAccumulator`] for the retraction caveat.
#[derive(Debug)]
pub(crate) struct MaxAccumulator {
    max: ScalarValue,
}

impl MaxAccumulator {
    pub fn try_new(data_type: &DataType) -> Result<Self> {
        Ok(Self {
            max: ScalarValue::try_from(data_type)?,
        })
    }
}

impl Accumulator for MaxAccumulator {
    fn update_batch(&mut self, values: &[ArrayRef]) -> Result<()> {
        let delta = max_batch(&values[0])?;
        if delta.is_null() {
            return Ok(());
        }
        if self.max.is_null()
            || delta.partial_cmp(&self.max) == Some(Ordering::Greater)
        {
            self.max = delta;
        }
        Ok(())
    }

    fn evaluate(&self) -> Result<ScalarValue> {
        Ok(self.max.clone())
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
    fn min_tracks_smallest() -> Result<()> {
        let mut acc = MinAccumulator::try_new(&DataType::Int64)?;
        assert!(!acc.supports_retract_batch());
        acc.update_batch(&array(vec![Some(3), None]))?;
        acc.update_batch(&array(vec![Some(-2), Some(7)]))?;
        assert_eq!(acc.evaluate()?, ScalarValue::Int64(Some(-2)));
        Ok(())
    }

    #[test]
    fn max_tracks_largest() -> Result<()> {
        let mut acc = MaxAccumulator::try_new(&DataType::Int64)?;
        acc.update_batch(&array(vec![Some(3), Some(7)]))?;
        acc.update_batch(&array(vec![None]))?;
        assert_eq!(acc.evaluate()?, ScalarValue::Int64(Some(7)));
        Ok(())
    }

    #[test]
    fn retract_is_refused() -> Result<()> {
        let mut acc = MinAccumulator::try_new(&DataType::Int64)?;
        assert!(acc.retract_batch(&array(vec![Some(1)])).is_err());
        Ok(())
    }
}
