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

//! The streaming window-function operator: consumes an ordered stream of
//! record batches and emits batches of identical row count augmented with
//! one result column per window function, buffering only as much input as
//! the current frames need.

mod aggregate;
mod buffer;
mod coord;
mod frame;
mod functions;
mod operator;
mod scan;
mod stream;
mod workspace;

pub use coord::RowCoord;
pub use operator::WindowStream;
pub use stream::{BlockStream, MemoryBlockStream, SendableBlockStream};
