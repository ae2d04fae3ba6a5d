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

use windrose_common::{Result, ScalarValue};
use windrose_expr::Accumulator;

/// Sliding COUNT. `count_all` counts every frame row (`count(*)`); otherwise
/// only non-null cells of the argument column are counted.
#[derive(Debug)]
pub(crate) struct CountAccumulator {
    count: i64,
    count_all: bool,
}

impl CountAccumulator {
    pub fn new(count_all: bool) -> Self {
        Self {
            count: 0,
            count_all,
        }
    }

    fn delta(&self, values: &[ArrayRef]) -> i64 {
        let array = &values[0];
        if self.count_all {
            array.len() as i64
        } else {
            (array.len() - array.null_count()) as i64
        }
    }
}

impl Accumulator for CountAccumulator {
    fn update_batch(&mut self, values: &[ArrayRef]) -> Result<()> {
        self.count += self.delta(values);
        Ok(())
    }

    fn retract_batch(&mut self, values: &[ArrayRef]) -> Result<()> {
        self.count -= self.delta(values);
        Ok(())
    }

    fn supports_retract_batch(&self) -> bool {
        true
    }

    fn evaluate(&self) -> Result<ScalarValue> {
        Ok(ScalarValue::Int64(Some(self.count)))
    }
}
