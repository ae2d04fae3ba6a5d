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

//! Error types for the Windrose crates.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::result;

use arrow::error::ArrowError;

/// Result type for operations that could result in a [WindroseError].
pub type Result<T> = result::Result<T, WindroseError>;

/// Error type covering all the ways a window computation can fail.
#[derive(Debug)]
pub enum WindroseError {
    /// Error returned by arrow.
    ArrowError(ArrowError),
    /// The operator was asked to execute something it does not support,
    /// e.g. a RANGE frame with a numeric offset.
    NotImplemented(String),
    /// Error returned as a consequence of an error in Windrose.
    /// This error should not happen in normal usage of Windrose.
    Internal(String),
    /// A resolved window description is invalid, e.g. a function argument
    /// refers to a column that does not exist or has an unusable type.
    Plan(String),
    /// Error returned during execution of the window computation.
    Execution(String),
    /// The surrounding pipeline requested cancellation.
    Cancelled,
}

impl From<ArrowError> for WindroseError {
    fn from(e: ArrowError) -> Self {
        WindroseError::ArrowError(e)
    }
}

impl Display for WindroseError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            WindroseError::ArrowError(desc) => write!(f, "Arrow error: {desc}"),
            WindroseError::NotImplemented(desc) => {
                write!(f, "This feature is not implemented: {desc}")
            }
            WindroseError::Internal(desc) => {
                write!(
                    f,
                    "Internal error: {desc}. This was likely caused by a bug \
                     in Windrose's code and we would welcome that you file a \
                     bug report in our issue tracker"
                )
            }
            WindroseError::Plan(desc) => write!(f, "Error during planning: {desc}"),
            WindroseError::Execution(desc) => write!(f, "Execution error: {desc}"),
            WindroseError::Cancelled => write!(f, "Operation was cancelled"),
        }
    }
}

impl Error for WindroseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WindroseError::ArrowError(e) => Some(e),
            _ => None,
        }
    }
}
