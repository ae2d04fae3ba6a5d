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

//! Window functions provide the ability to perform calculations across
//! sets of rows that are related to the current query row.
//!
//! see also <https://www.postgresql.org/docs/current/functions-window.html>

use std::{fmt, str::FromStr};

use arrow::datatypes::DataType;

use windrose_common::{Result, WindroseError};

/// WindowFunction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowFunction {
    /// window function that leverages an aggregate function
    AggregateFunction(AggregateFunction),
    /// window function that leverages a built-in window function
    BuiltInWindowFunction(BuiltInWindowFunction),
}

impl FromStr for WindowFunction {
    type Err = WindroseError;
    fn from_str(name: &str) -> Result<WindowFunction> {
        if let Ok(aggregate) = AggregateFunction::from_str(name) {
            Ok(WindowFunction::AggregateFunction(aggregate))
        } else if let Ok(built_in_function) = BuiltInWindowFunction::from_str(name) {
            Ok(WindowFunction::BuiltInWindowFunction(built_in_function))
        } else {
            Err(WindroseError::Plan(format!(
                "There is no window function named {name}"
            )))
        }
    }
}

impl fmt::Display for WindowFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WindowFunction::AggregateFunction(fun) => fun.fmt(f),
            WindowFunction::BuiltInWindowFunction(fun) => fun.fmt(f),
        }
    }
}

impl WindowFunction {
    /// Returns the datatype of the window function, given the types of its
    /// argument columns.
    ///
    /// Note that this function *must* return the same type that the
    /// corresponding workspace produces cells of, or emission fails.
    pub fn return_type(&self, arg_types: &[DataType]) -> Result<DataType> {
        match self {
            WindowFunction::AggregateFunction(fun) => fun.return_type(arg_types),
            WindowFunction::BuiltInWindowFunction(fun) => fun.return_type(arg_types),
        }
    }
}

/// An aggregate function usable over a window frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateFunction {
    /// count
    Count,
    /// sum
    Sum,
    /// min
    Min,
    /// max
    Max,
    /// avg
    Avg,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // uppercase of the debug.
        write!(f, "{}", format!("{self:?}").to_uppercase())
    }
}

impl FromStr for AggregateFunction {
    type Err = WindroseError;
    fn from_str(name: &str) -> Result<AggregateFunction> {
        Ok(match name.to_lowercase().as_str() {
            "count" => AggregateFunction::Count,
            "sum" => AggregateFunction::Sum,
            "min" => AggregateFunction::Min,
            "max" => AggregateFunction::Max,
            "avg" => AggregateFunction::Avg,
            _ => {
                return Err(WindroseError::Plan(format!(
                    "There is no aggregate function named {name}"
                )))
            }
        })
    }
}

impl AggregateFunction {
    /// Returns the datatype of the aggregate, given its argument column type.
    /// `count` takes no argument when counting frame rows.
    pub fn return_type(&self, arg_types: &[DataType]) -> Result<DataType> {
        match self {
            AggregateFunction::Count => Ok(DataType::Int64),
            AggregateFunction::Sum => {
                match Self::single_arg(arg_types, "SUM")? {
                    // Integer sums are widened so long frames don't overflow
                    // the narrow input type.
                    DataType::Int32 | DataType::Int64 => Ok(DataType::Int64),
                    DataType::UInt64 => Ok(DataType::UInt64),
                    DataType::Float64 => Ok(DataType::Float64),
                    other => Err(WindroseError::Plan(format!(
                        "SUM does not support type {other:?}"
                    ))),
                }
            }
            AggregateFunction::Min | AggregateFunction::Max => {
                match Self::single_arg(arg_types, "MIN/MAX")? {
                    dt @ (DataType::Int32
                    | DataType::Int64
                    | DataType::UInt64
                    | DataType::Float64
                    | DataType::Utf8) => Ok(dt.clone()),
                    other => Err(WindroseError::Plan(format!(
                        "MIN/MAX does not support type {other:?}"
                    ))),
                }
            }
            AggregateFunction::Avg => {
                match Self::single_arg(arg_types, "AVG")? {
                    DataType::Int32
                    | DataType::Int64
                    | DataType::UInt64
                    | DataType::Float64 => Ok(DataType::Float64),
                    other => Err(WindroseError::Plan(format!(
                        "AVG does not support type {other:?}"
                    ))),
                }
            }
        }
    }

    fn single_arg<'a>(arg_types: &'a [DataType], name: &str) -> Result<&'a DataType> {
        arg_types.first().ok_or_else(|| {
            WindroseError::Plan(format!("{name} requires an argument column"))
        })
    }
}

/// A built-in window function that computes its result from row and peer
/// numbering rather than from aggregate state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltInWindowFunction {
    /// number of the current row within its partition, counting from 1
    RowNumber,
    /// rank of the current row with gaps; same as row_number of its first peer
    Rank,
    /// rank of the current row without gaps; this function counts peer groups
    DenseRank,
    /// relative rank of the current row: (rank - 1) / (total rows - 1)
    PercentRank,
    /// integer ranging from 1 to the argument value, dividing the partition as equally as possible
    Ntile,
    /// value evaluated at the row that is offset rows before the current row
    /// within the frame; if there is no such row, the default value instead
    Lag,
    /// value evaluated at the row that is offset rows after the current row
    /// within the frame; if there is no such row, the default value instead
    Lead,
    /// value evaluated at the row that is the first row of the window frame
    FirstValue,
    /// value evaluated at the row that is the last row of the window frame
    LastValue,
    /// value evaluated at the row that is the nth row of the window frame
    /// (counting from 1); null if no such row
    NthValue,
}

impl fmt::Display for BuiltInWindowFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            BuiltInWindowFunction::RowNumber => "ROW_NUMBER",
            BuiltInWindowFunction::Rank => "RANK",
            BuiltInWindowFunction::DenseRank => "DENSE_RANK",
            BuiltInWindowFunction::PercentRank => "PERCENT_RANK",
            BuiltInWindowFunction::Ntile => "NTILE",
            BuiltInWindowFunction::Lag => "LAG",
            BuiltInWindowFunction::Lead => "LEAD",
            BuiltInWindowFunction::FirstValue => "FIRST_VALUE",
            BuiltInWindowFunction::LastValue => "LAST_VALUE",
            BuiltInWindowFunction::NthValue => "NTH_VALUE",
        })
    }
}

impl FromStr for BuiltInWindowFunction {
    type Err = WindroseError;
    fn from_str(name: &str) -> Result<BuiltInWindowFunction> {
        Ok(match name.to_lowercase().as_str() {
            "row_number" => BuiltInWindowFunction::RowNumber,
            "rank" => BuiltInWindowFunction::Rank,
            "dense_rank" => BuiltInWindowFunction::DenseRank,
            "percent_rank" => BuiltInWindowFunction::PercentRank,
            "ntile" => BuiltInWindowFunction::Ntile,
            "lag" => BuiltInWindowFunction::Lag,
            "lead" => BuiltInWindowFunction::Lead,
            "first_value" => BuiltInWindowFunction::FirstValue,
            "last_value" => BuiltInWindowFunction::LastValue,
            "nth_value" => BuiltInWindowFunction::NthValue,
            _ => {
                return Err(WindroseError::Plan(format!(
                    "There is no built-in window function named {name}"
                )))
            }
        })
    }
}

impl BuiltInWindowFunction {
    /// Returns the datatype of the built-in window function.
    pub fn return_type(&self, arg_types: &[DataType]) -> Result<DataType> {
        match self {
            BuiltInWindowFunction::RowNumber
            | BuiltInWindowFunction::Rank
            | BuiltInWindowFunction::DenseRank
            | BuiltInWindowFunction::Ntile => Ok(DataType::UInt64),
            BuiltInWindowFunction::PercentRank => Ok(DataType::Float64),
            BuiltInWindowFunction::Lag
            | BuiltInWindowFunction::Lead
            | BuiltInWindowFunction::FirstValue
            | BuiltInWindowFunction::LastValue
            | BuiltInWindowFunction::NthValue => {
                arg_types.first().cloned().ok_or_else(|| {
                    WindroseError::Plan(format!(
                        "{self} requires an argument column"
                    ))
                })
            }
        }
    }
}
