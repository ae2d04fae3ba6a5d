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

//! The fully resolved description the window operator executes: partition
//! and order columns by index, one shared frame, and the window function
//! calls with their argument columns.

use arrow::compute::SortOptions;
use arrow::datatypes::{DataType, Field, Schema};

use windrose_common::{Result, ScalarValue, WindroseError};

use crate::window_frame::{WindowFrame, WindowFrameBound};
use crate::window_function::{
    AggregateFunction, BuiltInWindowFunction, WindowFunction,
};

/// One ORDER BY term: the column it refers to and its direction / NULL
/// placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnOrder {
    /// Index of the column in the input schema.
    pub column: usize,
    /// Ascending/descending and NULLS FIRST/LAST.
    pub options: SortOptions,
}

/// One window function call within a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowFunctionDescription {
    /// The function to compute.
    pub function: WindowFunction,
    /// Indices of the argument columns in the input schema. `count` accepts
    /// an empty list (count of frame rows).
    pub arguments: Vec<usize>,
    /// Name of the result column in the output schema.
    pub result_name: String,
}

impl WindowFunctionDescription {
    /// Resolves the result field of this call against the input schema,
    /// checking argument arity and types along the way.
    pub fn result_field(&self, input_schema: &Schema) -> Result<Field> {
        self.check_arity()?;
        let arg_types = self
            .arguments
            .iter()
            .map(|&i| {
                let field = input_schema.fields().get(i).ok_or_else(|| {
                    WindroseError::Plan(format!(
                        "{} argument refers to column {i}, but the input only \
                         has {} columns",
                        self.function,
                        input_schema.fields().len()
                    ))
                })?;
                // Reject cell types the workspaces cannot move around.
                ScalarValue::try_from(field.data_type())?;
                Ok(field.data_type().clone())
            })
            .collect::<Result<Vec<DataType>>>()?;
        let return_type = self.function.return_type(&arg_types)?;
        Ok(Field::new(&self.result_name, return_type, true))
    }

    fn check_arity(&self) -> Result<()> {
        let n = self.arguments.len();
        let expected: (usize, usize) = match &self.function {
            WindowFunction::AggregateFunction(AggregateFunction::Count) => (0, 1),
            WindowFunction::AggregateFunction(_) => (1, 1),
            WindowFunction::BuiltInWindowFunction(fun) => match fun {
                BuiltInWindowFunction::RowNumber
                | BuiltInWindowFunction::Rank
                | BuiltInWindowFunction::DenseRank
                | BuiltInWindowFunction::PercentRank => (0, 0),
                BuiltInWindowFunction::Ntile => (1, 1),
                BuiltInWindowFunction::Lag | BuiltInWindowFunction::Lead => (1, 3),
                BuiltInWindowFunction::FirstValue
                | BuiltInWindowFunction::LastValue => (1, 1),
                BuiltInWindowFunction::NthValue => (2, 2),
            },
        };
        if n < expected.0 || n > expected.1 {
            return Err(WindroseError::Plan(format!(
                "{} takes between {} and {} arguments, got {n}",
                self.function, expected.0, expected.1
            )));
        }
        Ok(())
    }
}

/// A fully resolved window: `OVER (PARTITION BY … ORDER BY … frame)` plus
/// the function calls computed over it. All functions of one description
/// share the partition, ordering and frame.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescription {
    /// Indices of the PARTITION BY columns in the input schema.
    pub partition_by: Vec<usize>,
    /// ORDER BY terms, in significance order.
    pub order_by: Vec<ColumnOrder>,
    /// The shared window frame.
    pub frame: WindowFrame,
    /// The window function calls.
    pub functions: Vec<WindowFunctionDescription>,
}

impl WindowDescription {
    /// Checks the description against the input schema. The operator calls
    /// this at construction and refuses to start on any error.
    pub fn validate(&self, input_schema: &Schema) -> Result<()> {
        if self.functions.is_empty() {
            return Err(WindroseError::Plan(
                "window description contains no window functions".to_string(),
            ));
        }
        if input_schema.fields().is_empty() {
            return Err(WindroseError::Plan(
                "window input must have at least one column".to_string(),
            ));
        }
        self.frame.validate()?;
        let n_columns = input_schema.fields().len();
        let check_column = |clause: &str, i: usize| -> Result<()> {
            if i >= n_columns {
                return Err(WindroseError::Plan(format!(
                    "{clause} refers to column {i}, but the input only has \
                     {n_columns} columns"
                )));
            }
            // The scan compares these cells; reject types it cannot extract.
            ScalarValue::try_from(input_schema.field(i).data_type())?;
            Ok(())
        };
        for &i in self.partition_by.iter() {
            check_column("PARTITION BY", i)?;
        }
        for order in self.order_by.iter() {
            check_column("ORDER BY", order.column)?;
        }
        for function in self.functions.iter() {
            function.result_field(input_schema)?;
            // Functions whose result depends on the partition size can only
            // become ready once the partition has fully arrived, which the
            // frame end bound has to guarantee.
            if matches!(
                function.function,
                WindowFunction::BuiltInWindowFunction(
                    BuiltInWindowFunction::PercentRank | BuiltInWindowFunction::Ntile
                )
            ) && self.frame.end_bound != WindowFrameBound::UnboundedFollowing
            {
                return Err(WindroseError::NotImplemented(format!(
                    "{} requires a frame ending at UNBOUNDED FOLLOWING, got {}",
                    function.function, self.frame
                )));
            }
        }
        Ok(())
    }

    /// The output schema: input columns passed through in declared order,
    /// followed by one result column per window function.
    pub fn output_schema(&self, input_schema: &Schema) -> Result<Schema> {
        let mut fields: Vec<Field> = input_schema
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        for function in self.functions.iter() {
            fields.push(function.result_field(input_schema)?);
        }
        Ok(Schema::new(fields))
    }
}
