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

//! [`ScalarValue`]: a dynamically typed single cell value.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, BooleanBuilder, Float64Array, Float64Builder,
    Int32Array, Int32Builder, Int64Array, Int64Builder, StringArray, StringBuilder,
    UInt64Array, UInt64Builder,
};
use arrow::datatypes::DataType;

use crate::error::{Result, WindroseError};

/// A single cell value, as moved between argument columns, aggregate state
/// and result columns. The set of variants covers the types the window
/// operator and its function library touch; anything else is rejected when
/// the description is resolved.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    /// untyped null value
    Null,
    /// true or false value
    Boolean(Option<bool>),
    /// 32bit int
    Int32(Option<i32>),
    /// 64bit int
    Int64(Option<i64>),
    /// unsigned 64bit int
    UInt64(Option<u64>),
    /// 64bit float
    Float64(Option<f64>),
    /// utf-8 encoded string
    Utf8(Option<String>),
}

macro_rules! typed_cast {
    ($array:expr, $index:expr, $ARRAYTYPE:ident, $SCALAR:ident) => {{
        let array = $array
            .as_any()
            .downcast_ref::<$ARRAYTYPE>()
            .ok_or_else(|| {
                WindroseError::Internal(format!(
                    "could not cast array of type {:?} to {}",
                    $array.data_type(),
                    stringify!($ARRAYTYPE)
                ))
            })?;
        ScalarValue::$SCALAR(if array.is_null($index) {
            None
        } else {
            Some(array.value($index).into())
        })
    }};
}

macro_rules! build_primitive_array {
    ($values:expr, $BUILDER:ident, $SCALAR:ident) => {{
        let mut builder = $BUILDER::with_capacity($values.len());
        for value in $values {
            match value {
                ScalarValue::$SCALAR(Some(v)) => builder.append_value(v),
                ScalarValue::$SCALAR(None) | ScalarValue::Null => builder.append_null(),
                other => {
                    return Err(WindroseError::Internal(format!(
                        "inconsistent types in iter_to_array: expected {}, got {other:?}",
                        stringify!($SCALAR)
                    )))
                }
            }
        }
        Arc::new(builder.finish()) as ArrayRef
    }};
}

impl ScalarValue {
    /// Getter for the `DataType` of the value.
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarValue::Null => DataType::Null,
            ScalarValue::Boolean(_) => DataType::Boolean,
            ScalarValue::Int32(_) => DataType::Int32,
            ScalarValue::Int64(_) => DataType::Int64,
            ScalarValue::UInt64(_) => DataType::UInt64,
            ScalarValue::Float64(_) => DataType::Float64,
            ScalarValue::Utf8(_) => DataType::Utf8,
        }
    }

    /// Whether this value is null or not.
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            ScalarValue::Null
                | ScalarValue::Boolean(None)
                | ScalarValue::Int32(None)
                | ScalarValue::Int64(None)
                | ScalarValue::UInt64(None)
                | ScalarValue::Float64(None)
                | ScalarValue::Utf8(None)
        )
    }

    /// Converts a value in `array` at `index` into a ScalarValue.
    pub fn try_from_array(array: &ArrayRef, index: usize) -> Result<Self> {
        Ok(match array.data_type() {
            DataType::Null => ScalarValue::Null,
            DataType::Boolean => typed_cast!(array, index, BooleanArray, Boolean),
            DataType::Int32 => typed_cast!(array, index, Int32Array, Int32),
            DataType::Int64 => typed_cast!(array, index, Int64Array, Int64),
            DataType::UInt64 => typed_cast!(array, index, UInt64Array, UInt64),
            DataType::Float64 => typed_cast!(array, index, Float64Array, Float64),
            DataType::Utf8 => typed_cast!(array, index, StringArray, Utf8),
            other => {
                return Err(WindroseError::NotImplemented(format!(
                    "unsupported column type for window computation: {other:?}"
                )))
            }
        })
    }

    /// Converts `values` into an array of `data_type`. Every value must be
    /// of the corresponding variant or [`ScalarValue::Null`].
    pub fn iter_to_array(values: Vec<ScalarValue>, data_type: &DataType) -> Result<ArrayRef> {
        Ok(match data_type {
            DataType::Boolean => build_primitive_array!(values, BooleanBuilder, Boolean),
            DataType::Int32 => build_primitive_array!(values, Int32Builder, Int32),
            DataType::Int64 => build_primitive_array!(values, Int64Builder, Int64),
            DataType::UInt64 => build_primitive_array!(values, UInt64Builder, UInt64),
            DataType::Float64 => build_primitive_array!(values, Float64Builder, Float64),
            DataType::Utf8 => {
                let mut builder = StringBuilder::with_capacity(values.len(), 0);
                for value in values {
                    match value {
                        ScalarValue::Utf8(Some(v)) => builder.append_value(v),
                        ScalarValue::Utf8(None) | ScalarValue::Null => {
                            builder.append_null()
                        }
                        other => {
                            return Err(WindroseError::Internal(format!(
                                "inconsistent types in iter_to_array: expected Utf8, \
                                 got {other:?}"
                            )))
                        }
                    }
                }
                Arc::new(builder.finish()) as ArrayRef
            }
            other => {
                return Err(WindroseError::NotImplemented(format!(
                    "unsupported result type for window computation: {other:?}"
                )))
            }
        })
    }

    /// Addition with null propagation. Only defined for numeric variants of
    /// the same type.
    pub fn add(&self, rhs: &ScalarValue) -> Result<ScalarValue> {
        use ScalarValue::*;
        Ok(match (self, rhs) {
            (Int32(a), Int32(b)) => Int32(a.zip(*b).map(|(x, y)| x + y)),
            (Int64(a), Int64(b)) => Int64(a.zip(*b).map(|(x, y)| x + y)),
            (UInt64(a), UInt64(b)) => UInt64(a.zip(*b).map(|(x, y)| x + y)),
            (Float64(a), Float64(b)) => Float64(a.zip(*b).map(|(x, y)| x + y)),
            (l, r) => {
                return Err(WindroseError::Internal(format!(
                    "cannot add {l:?} and {r:?}"
                )))
            }
        })
    }

    /// Subtraction with null propagation. Only defined for numeric variants
    /// of the same type.
    pub fn sub(&self, rhs: &ScalarValue) -> Result<ScalarValue> {
        use ScalarValue::*;
        Ok(match (self, rhs) {
            (Int32(a), Int32(b)) => Int32(a.zip(*b).map(|(x, y)| x - y)),
            (Int64(a), Int64(b)) => Int64(a.zip(*b).map(|(x, y)| x - y)),
            (UInt64(a), UInt64(b)) => UInt64(a.zip(*b).map(|(x, y)| x - y)),
            (Float64(a), Float64(b)) => Float64(a.zip(*b).map(|(x, y)| x - y)),
            (l, r) => {
                return Err(WindroseError::Internal(format!(
                    "cannot subtract {r:?} from {l:?}"
                )))
            }
        })
    }
}

impl TryFrom<&DataType> for ScalarValue {
    type Error = WindroseError;

    /// Create a typed null of `data_type`.
    fn try_from(data_type: &DataType) -> Result<Self> {
        Ok(match data_type {
            DataType::Null => ScalarValue::Null,
            DataType::Boolean => ScalarValue::Boolean(None),
            DataType::Int32 => ScalarValue::Int32(None),
            DataType::Int64 => ScalarValue::Int64(None),
            DataType::UInt64 => ScalarValue::UInt64(None),
            DataType::Float64 => ScalarValue::Float64(None),
            DataType::Utf8 => ScalarValue::Utf8(None),
            other => {
                return Err(WindroseError::NotImplemented(format!(
                    "unsupported column type for window computation: {other:?}"
                )))
            }
        })
    }
}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use ScalarValue::*;
        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Boolean(a), Boolean(b)) => a.partial_cmp(b),
            (Int32(a), Int32(b)) => a.partial_cmp(b),
            (Int64(a), Int64(b)) => a.partial_cmp(b),
            (UInt64(a), UInt64(b)) => a.partial_cmp(b),
            (Float64(a), Float64(b)) => a.partial_cmp(b),
            (Utf8(a), Utf8(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Boolean(e) => format_option(f, e),
            ScalarValue::Int32(e) => format_option(f, e),
            ScalarValue::Int64(e) => format_option(f, e),
            ScalarValue::UInt64(e) => format_option(f, e),
            ScalarValue::Float64(e) => format_option(f, e),
            ScalarValue::Utf8(e) => format_option(f, e),
        }
    }
}

fn format_option<T: fmt::Display>(
    f: &mut fmt::Formatter,
    value: &Option<T>,
) -> fmt::Result {
    match value {
        Some(v) => write!(f, "{v}"),
        None => write!(f, "NULL"),
    }
}
