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

//! Accumulator implementations for the aggregates usable over window
//! frames, and the arrow-kernel helpers they share.

mod average;
mod count;
mod min_max;
mod sum;

use arrow::array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, StringArray, UInt64Array,
};
use arrow::compute;
use arrow::datatypes::DataType;

use windrose_common::{Result, ScalarValue, WindroseError};
use windrose_expr::{Accumulator, AggregateFunction};

pub(crate) use average::AvgAccumulator;
pub(crate) use count::CountAccumulator;
pub(crate) use min_max::{MaxAccumulator, MinAccumulator};
pub(crate) use sum::SumAccumulator;

/// Creates the accumulator for `fun` over arguments of `arg_types`. An empty
/// argument list is only meaningful for `count`, which then counts frame
/// rows instead of non-null cells.
pub(crate) fn create_accumulator(
    fun: &AggregateFunction,
    arg_types: &[DataType],
) -> Result<Box<dyn Accumulator>> {
    Ok(match fun {
        AggregateFunction::Count => {
            Box::new(CountAccumulator::new(arg_types.is_empty()))
        }
        AggregateFunction::Sum => {
            Box::new(SumAccumulator::try_new(&fun.return_type(arg_types)?)?)
        }
        AggregateFunction::Min => {
            Box::new(MinAccumulator::try_new(&fun.return_type(arg_types)?)?)
        }
        AggregateFunction::Max => {
            Box::new(MaxAccumulator::try_new(&fun.return_type(arg_types)?)?)
        }
        AggregateFunction::Avg => Box::new(AvgAccumulator::new()),
    })
}

macro_rules! sum_typed {
    ($array:expr, $ARRAYTYPE:ident, $SCALAR:ident, $TY:ty) => {{
        let array = downcast::<$ARRAYTYPE>($array)?;
        ScalarValue::$SCALAR(compute::sum(array).map(|v| v as $TY))
    }};
}

/// Sums the non-null values of `values`, widening integers the way
/// [`AggregateFunction::Sum::return_type`] declares. Returns a typed null
/// when every value is null.
pub(super) fn sum_batch(values: &ArrayRef) -> Result<ScalarValue> {
    Ok(match values.data_type() {
        DataType::Int32 => sum_typed!(values, Int32Array, Int64, i64),
        DataType::Int64 => sum_typed!(values, Int64Array, Int64, i64),
        DataType::UInt64 => sum_typed!(values, UInt64Array, UInt64, u64),
        DataType::Float64 => sum_typed!(values, Float64Array, Float64, f64),
        other => {
            return Err(WindroseError::Internal(format!(
                "SUM is not expected to receive type {other:?}"
            )))
        }
    })
}

macro_rules! min_max_typed {
    ($array:expr, $KERNEL:ident, $ARRAYTYPE:ident, $SCALAR:ident) => {{
        let array = downcast::<$ARRAYTYPE>($array)?;
        ScalarValue::$SCALAR(compute::$KERNEL(array))
    }};
}

/// Minimum of the non-null values of `values`, or a typed null.
pub(super) fn min_batch(values: &ArrayRef) -> Result<ScalarValue> {
    Ok(match values.data_type() {
        DataType::Int32 => min_max_typed!(values, min, Int32Array, Int32),
        DataType::Int64 => min_max_typed!(values, min, Int64Array, Int64),
        DataType::UInt64 => min_max_typed!(values, min, UInt64Array, UInt64),
        DataType::Float64 => min_max_typed!(values, min, Float64Array, Float64),
        DataType::Utf8 => ScalarValue::Utf8(
            compute::min_string(downcast::<StringArray>(values)?).map(|v| v.to_string()),
        ),
        other => {
            return Err(WindroseError::Internal(format!(
                "MIN is not expected to receive type {other:?}"
            )))
        }
    })
}

/// Maximum of the non-null values of `values`, or a typed null.
pub(super) fn max_batch(values: &ArrayRef) -> Result<ScalarValue> {
    Ok(match values.data_type() {
        DataType::Int32 => min_max_typed!(values, max, Int32Array, Int32),
        DataType::Int64 => min_max_typed!(values, max, Int64Array, Int64),
        DataType::UInt64 => min_max_typed!(values, max, UInt64Array, UInt64),
        DataType::Float64 => min_max_typed!(values, max, Float64Array, Float64),
        DataType::Utf8 => ScalarValue::Utf8(
            compute::max_string(downcast::<StringArray>(values)?).map(|v| v.to_string()),
        ),
        other => {
            return Err(WindroseError::Internal(format!(
                "MAX is not expected to receive type {other:?}"
            )))
        }
    })
}

fn downcast<T: Array + 'static>(array: &ArrayRef) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        WindroseError::Internal(format!(
            "could not downcast array of type {:?}",
            array.data_type()
        ))
    })
}
