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

//! Per-window-function scratch space.

use arrow::datatypes::{DataType, Schema};

use windrose_common::{Result, WindroseError};
use windrose_expr::{Accumulator, WindowFunction, WindowFunctionDescription};

use crate::aggregate;
use crate::functions::{self, BuiltInEvaluator};

/// The runtime of one window function call: either an aggregate driven
/// through frame deltas, or a built-in function computed from row and peer
/// numbering.
#[derive(Debug)]
pub(crate) enum WindowFn {
    Aggregate(Box<dyn Accumulator>),
    Builtin(Box<dyn BuiltInEvaluator>),
}

/// Runtime data for computing one window function. Argument columns are
/// addressed by index and fetched per access, so nothing here dangles when
/// the buffer releases old blocks.
#[derive(Debug)]
pub(crate) struct WindowFunctionWorkspace {
    function: WindowFunction,
    /// Columns the frame driver slices for the function. For a no-argument
    /// `count` this holds the first input column purely as a row-count
    /// carrier.
    pub arguments: Vec<usize>,
    /// Declared argument types; empty for a no-argument `count`.
    arg_types: Vec<DataType>,
    result_type: DataType,
    pub window_fn: WindowFn,
}

impl WindowFunctionWorkspace {
    pub fn try_new(
        description: &WindowFunctionDescription,
        input_schema: &Schema,
    ) -> Result<Self> {
        let result_type = description
            .result_field(input_schema)?
            .data_type()
            .clone();
        let arg_types: Vec<DataType> = description
            .arguments
            .iter()
            .map(|&i| input_schema.field(i).data_type().clone())
            .collect();
        let arguments = if description.arguments.is_empty() {
            vec![0]
        } else {
            description.arguments.clone()
        };
        let window_fn = match &description.function {
            WindowFunction::AggregateFunction(fun) => {
                WindowFn::Aggregate(aggregate::create_accumulator(fun, &arg_types)?)
            }
            WindowFunction::BuiltInWindowFunction(fun) => {
                WindowFn::Builtin(functions::create_built_in_evaluator(fun))
            }
        };
        Ok(Self {
            function: description.function.clone(),
            arguments,
            arg_types,
            result_type,
            window_fn,
        })
    }

    pub fn result_type(&self) -> &DataType {
        &self.result_type
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.window_fn, WindowFn::Aggregate(_))
    }

    pub fn accumulator_mut(&mut self) -> Result<&mut Box<dyn Accumulator>> {
        match &mut self.window_fn {
            WindowFn::Aggregate(accumulator) => Ok(accumulator),
            WindowFn::Builtin(_) => Err(WindroseError::Internal(
                "workspace does not hold an aggregate".to_string(),
            )),
        }
    }

    /// Replaces the accumulator with a fresh one. Used at partition
    /// boundaries and when a non-invertible aggregate has to be replayed
    /// from a new frame start.
    pub fn reset_accumulator(&mut self) -> Result<()> {
        let WindowFunction::AggregateFunction(fun) = &self.function else {
            return Err(WindroseError::Internal(
                "workspace does not hold an aggregate".to_string(),
            ));
        };
        self.window_fn =
            WindowFn::Aggregate(aggregate::create_accumulator(fun, &self.arg_types)?);
        Ok(())
    }
}
