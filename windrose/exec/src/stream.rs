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

//! The block-stream contract between pipeline stages, and an in-memory
//! source for tests and embedding.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use futures::Stream;

use windrose_common::{Result, WindroseError};

/// Trait for types that stream record batches between pipeline stages. The
/// end of the stream is the stream yielding `None`.
pub trait BlockStream: Stream<Item = Result<RecordBatch>> {
    /// Returns the schema of this stream's batches.
    fn schema(&self) -> SchemaRef;
}

/// Trait object for sending a [`BlockStream`] between threads.
pub type SendableBlockStream = Pin<Box<dyn BlockStream + Send>>;

/// Iterates over a preloaded vector of record batches.
pub struct MemoryBlockStream {
    schema: SchemaRef,
    batches: VecDeque<RecordBatch>,
}

impl MemoryBlockStream {
    /// Creates a stream over `batches`, all of which must carry `schema`.
    pub fn try_new(batches: Vec<RecordBatch>, schema: SchemaRef) -> Result<Self> {
        for batch in batches.iter() {
            if batch.schema().fields() != schema.fields() {
                return Err(WindroseError::Plan(
                    "all batches of a memory stream must share its schema".to_string(),
                ));
            }
        }
        Ok(Self {
            schema,
            batches: batches.into(),
        })
    }

    /// The stream boxed for use as a pipeline stage input.
    pub fn boxed(self) -> SendableBlockStream {
        Box::pin(self)
    }
}

impl Stream for MemoryBlockStream {
    type Item = Result<RecordBatch>;

    fn poll_next(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.get_mut().batches.pop_front().map(Ok))
    }
}

impl BlockStream for MemoryBlockStream {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}
