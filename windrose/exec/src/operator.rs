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

//! The streaming window operator. It buffers upstream blocks only as long
//! as some frame, the current row or an unemitted result still addresses
//! them, which keeps memory bounded for infinite inputs as long as
//! partitions and frames are bounded.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use arrow::array::{Array, ArrayRef};
use arrow::compute::SortOptions;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use futures::{ready, Stream, StreamExt};
use log::debug;

use windrose_common::utils::compare_rows;
use windrose_common::{Result, ScalarValue, WindroseError};
use windrose_expr::WindowDescription;

use crate::buffer::BlockBuffer;
use crate::coord::RowCoord;
use crate::frame::{self, FrameContext};
use crate::functions::EvaluationContext;
use crate::scan;
use crate::stream::{BlockStream, SendableBlockStream};
use crate::workspace::{WindowFn, WindowFunctionWorkspace};

/// Stream of record batches augmented with window function result columns.
///
/// The operator computes rows strictly in upstream order. For every row it
/// first advances the end of the current partition, then settles the frame
/// boundaries, feeds the frame delta to the aggregate workspaces, and writes
/// one result cell per function. A block whose last row is computed is
/// assembled and handed downstream; buffered blocks below the frame reach
/// are dropped so addresses stay stable while memory stays bounded.
pub struct WindowStream {
    input: SendableBlockStream,
    input_schema: SchemaRef,
    output_schema: SchemaRef,
    description: WindowDescription,
    order_by_indices: Vec<usize>,
    order_by_options: Vec<SortOptions>,
    workspaces: Vec<WindowFunctionWorkspace>,

    buffer: BlockBuffer,
    ready_blocks: VecDeque<RecordBatch>,
    /// Number of the next block to hand downstream.
    next_output_block_number: u64,
    /// The first row for which we still haven't calculated the window
    /// functions. Determines which blocks can be handed downstream.
    first_not_ready_row: RowCoord,

    // Boundaries of the current partition. `partition_start` may address an
    // already-released block; it is only ever compared, never dereferenced.
    // While `partition_ended` is false, `partition_end` is the next row the
    // partition scan will look at.
    partition_start: RowCoord,
    partition_end: RowCoord,
    partition_ended: bool,

    /// The row for which we are now computing the window functions.
    current_row: RowCoord,
    /// 1-based position of `current_row` within the partition.
    current_row_number: u64,
    /// Start of the current peer group; equals `current_row` under ROWS
    /// frames, may be earlier under RANGE frames.
    peer_group_start: RowCoord,
    peer_group_start_row_number: u64,
    peer_group_number: u64,

    // The frame is [frame_start, frame_end) once both flags are set; until
    // then the coordinates are tentative and may still grow with new input.
    frame_start: RowCoord,
    frame_end: RowCoord,
    frame_started: bool,
    frame_ended: bool,
    /// The frame bounds currently reflected in the aggregate state, used to
    /// decide what to retract, add or replay.
    prev_frame_start: RowCoord,
    prev_frame_end: RowCoord,

    input_is_finished: bool,
    finished: bool,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl WindowStream {
    /// Creates the operator over `input`, refusing descriptions it cannot
    /// execute faithfully.
    pub fn try_new(
        input: SendableBlockStream,
        description: WindowDescription,
    ) -> Result<Self> {
        let input_schema = input.schema();
        description.validate(&input_schema)?;
        let output_schema = Arc::new(description.output_schema(&input_schema)?);
        let workspaces = description
            .functions
            .iter()
            .map(|f| WindowFunctionWorkspace::try_new(f, &input_schema))
            .collect::<Result<Vec<_>>>()?;
        let order_by_indices = description.order_by.iter().map(|o| o.column).collect();
        let order_by_options = description.order_by.iter().map(|o| o.options).collect();
        Ok(Self {
            input,
            input_schema,
            output_schema,
            description,
            order_by_indices,
            order_by_options,
            workspaces,
            buffer: BlockBuffer::new(),
            ready_blocks: VecDeque::new(),
            next_output_block_number: 0,
            first_not_ready_row: RowCoord::default(),
            partition_start: RowCoord::default(),
            partition_end: RowCoord::default(),
            partition_ended: false,
            current_row: RowCoord::default(),
            current_row_number: 1,
            peer_group_start: RowCoord::default(),
            peer_group_start_row_number: 1,
            peer_group_number: 1,
            frame_start: RowCoord::default(),
            frame_end: RowCoord::default(),
            frame_started: false,
            frame_ended: false,
            prev_frame_start: RowCoord::default(),
            prev_frame_end: RowCoord::default(),
            input_is_finished: false,
            finished: false,
            cancel_flag: None,
        })
    }

    /// Lets the surrounding pipeline request cancellation; the flag is
    /// polled between rows.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// The output schema: input columns followed by one result column per
    /// window function.
    pub fn schema(&self) -> SchemaRef {
        self.output_schema.clone()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    fn append_block(&mut self, batch: RecordBatch) -> Result<()> {
        if batch.num_rows() == 0 {
            return Ok(());
        }
        if batch.schema().fields() != self.input_schema.fields() {
            return Err(WindroseError::Execution(format!(
                "window input block schema changed mid-stream: expected {:?}, \
                 got {:?}",
                self.input_schema.fields(),
                batch.schema().fields()
            )));
        }
        debug!(
            "window: buffering block {} ({} rows)",
            self.buffer.blocks_end().block,
            batch.num_rows()
        );
        self.buffer.append(batch, self.workspaces.len());
        Ok(())
    }

    /// Scans forward for the end of the current partition. The reference row
    /// is `prev_frame_start`: it is always buffered (the release horizon
    /// never passes it) and always inside the current partition, unlike
    /// `partition_start` which may already be released.
    fn advance_partition_end(&mut self) -> Result<()> {
        if self.partition_ended {
            return Ok(());
        }
        let end = self.buffer.blocks_end();
        if self.description.partition_by.is_empty() {
            self.partition_end = end;
            self.partition_ended = self.input_is_finished;
            return Ok(());
        }
        let boundary = scan::advance_while_equal(
            &self.buffer,
            &self.description.partition_by,
            self.prev_frame_start,
            self.partition_end,
            end,
        )?;
        self.partition_end = boundary;
        self.partition_ended = boundary < end || self.input_is_finished;
        Ok(())
    }

    fn are_peers(&self, x: RowCoord, y: RowCoord) -> Result<bool> {
        scan::rows_equal_at(&self.buffer, &self.order_by_indices, x, y)
    }

    /// The operator relies on the upstream delivering rows in ORDER BY
    /// order; a violation would silently corrupt ranks and RANGE frames.
    /// Checked once per peer-group boundary, where both rows are at hand.
    fn check_order_by_progression(&self) -> Result<()> {
        let previous = self
            .buffer
            .row_values(self.peer_group_start, &self.order_by_indices)?;
        let current = self
            .buffer
            .row_values(self.current_row, &self.order_by_indices)?;
        if compare_rows(&previous, &current, &self.order_by_options)?.is_gt() {
            return Err(WindroseError::Execution(format!(
                "window input is not sorted by the ORDER BY columns at row {}",
                self.current_row
            )));
        }
        Ok(())
    }

    fn frame_context(&self) -> FrameContext<'_> {
        FrameContext {
            buffer: &self.buffer,
            order_by: &self.order_by_indices,
            partition_start: self.partition_start,
            partition_end: self.partition_end,
            partition_ended: self.partition_ended,
            current_row: self.current_row,
            peer_group_start: self.peer_group_start,
        }
    }

    /// Runs the computation as far as the buffered data allows: advances the
    /// partition end, settles frames, updates aggregate state and writes
    /// result cells row by row. Returns when it needs more input or when all
    /// buffered rows are computed.
    fn compute(&mut self) -> Result<()> {
        loop {
            self.advance_partition_end()?;
            debug_assert!(
                self.partition_ended || self.partition_end == self.buffer.blocks_end()
            );

            while self.current_row < self.partition_end {
                if self.is_cancelled() {
                    return Err(WindroseError::Cancelled);
                }

                // The current row is now known to be inside the partition,
                // so the peer group can be settled. This must happen before
                // frame advancement: RANGE CURRENT ROW starts at the peer
                // group start.
                if !self.are_peers(self.peer_group_start, self.current_row)? {
                    self.check_order_by_progression()?;
                    self.peer_group_start = self.current_row;
                    self.peer_group_start_row_number = self.current_row_number;
                    self.peer_group_number += 1;
                }

                if !self.frame_started {
                    let (start, started) =
                        frame::advance_frame_start(&self.frame_context(), &self.description.frame)?;
                    self.frame_start = start;
                    self.frame_started = started;
                }
                if !self.frame_started {
                    // Wait for more input to find the start of the frame.
                    debug_assert!(!self.partition_ended);
                    return Ok(());
                }

                // The frame end never precedes the frame start; catching it
                // up here saves the end scan some work.
                if self.frame_end < self.frame_start {
                    self.frame_end = self.frame_start;
                }
                if !self.frame_ended {
                    let (end, ended) = frame::advance_frame_end(
                        &self.frame_context(),
                        &self.description.frame,
                        self.frame_end,
                    )?;
                    self.frame_end = end;
                    self.frame_ended = ended;
                }
                if !self.frame_ended {
                    // Wait for more input to find the end of the frame.
                    debug_assert!(!self.partition_ended);
                    return Ok(());
                }

                if self.frame_start > self.frame_end {
                    return Err(WindroseError::Internal(format!(
                        "frame start {} passed frame end {}",
                        self.frame_start, self.frame_end
                    )));
                }

                self.update_aggregate_states()?;
                self.write_out_current_row()?;

                self.prev_frame_start = self.frame_start;
                self.prev_frame_end = self.frame_end;
                self.current_row = self.buffer.advanced(self.current_row);
                self.current_row_number += 1;
                self.first_not_ready_row = self.current_row;
                self.frame_started = false;
                self.frame_ended = false;
            }

            if self.partition_ended && self.partition_end == self.buffer.blocks_end() {
                // The final partition is done; there is no more data.
                debug_assert!(self.input_is_finished);
                return Ok(());
            }
            if !self.partition_ended {
                // Wait for more input to find the end of the partition.
                debug_assert!(self.partition_end == self.buffer.blocks_end());
                return Ok(());
            }

            // Start the next partition.
            let new_partition_start = self.partition_end;
            debug_assert!(self.current_row == new_partition_start);
            debug!(
                "window: partition boundary at {}, {} rows numbered",
                new_partition_start,
                self.current_row_number - 1
            );
            self.partition_start = new_partition_start;
            self.partition_ended = false;
            self.frame_start = new_partition_start;
            self.frame_end = new_partition_start;
            self.prev_frame_start = new_partition_start;
            self.prev_frame_end = new_partition_start;
            self.current_row_number = 1;
            self.peer_group_start = new_partition_start;
            self.peer_group_start_row_number = 1;
            self.peer_group_number = 1;
            for workspace in self.workspaces.iter_mut() {
                if workspace.is_aggregate() {
                    workspace.reset_accumulator()?;
                }
            }
        }
    }

    /// Brings every aggregate workspace from the previous frame to the
    /// current one: retract what left, add what entered, or replay from
    /// scratch when the accumulator cannot retract.
    fn update_aggregate_states(&mut self) -> Result<()> {
        let frame_start = self.frame_start;
        let frame_end = self.frame_end;
        let prev_start = self.prev_frame_start;
        let prev_end = self.prev_frame_end;
        if frame_start < prev_start {
            return Err(WindroseError::Internal(format!(
                "frame start moved backwards: {prev_start} to {frame_start}"
            )));
        }
        debug_assert!(prev_end <= frame_end);

        for workspace in self.workspaces.iter_mut() {
            if !workspace.is_aggregate() {
                continue;
            }
            if frame_start > prev_start {
                if workspace.accumulator_mut()?.supports_retract_batch() {
                    let retract_to = frame_start.min(prev_end);
                    apply_range(&self.buffer, workspace, prev_start, retract_to, true)?;
                } else {
                    // Not invertible: replay the whole new frame.
                    workspace.reset_accumulator()?;
                    apply_range(&self.buffer, workspace, frame_start, frame_end, false)?;
                    continue;
                }
            }
            let add_from = prev_end.max(frame_start);
            apply_range(&self.buffer, workspace, add_from, frame_end, false)?;
        }
        Ok(())
    }

    /// Writes one result cell per window function for the current row.
    fn write_out_current_row(&mut self) -> Result<()> {
        let mut row_values: Vec<ScalarValue> = Vec::with_capacity(self.workspaces.len());
        for workspace in self.workspaces.iter_mut() {
            let value = match &mut workspace.window_fn {
                WindowFn::Aggregate(accumulator) => accumulator.evaluate()?,
                WindowFn::Builtin(evaluator) => {
                    let ctx = EvaluationContext {
                        buffer: &self.buffer,
                        arguments: &workspace.arguments,
                        current_row: self.current_row,
                        frame_start: self.frame_start,
                        frame_end: self.frame_end,
                        partition_end: self.partition_end,
                        partition_ended: self.partition_ended,
                        current_row_number: self.current_row_number,
                        peer_group_start_row_number: self.peer_group_start_row_number,
                        peer_group_number: self.peer_group_number,
                    };
                    evaluator.evaluate(&ctx)?
                }
            };
            row_values.push(value);
        }
        let current_row = self.current_row;
        let block = self.buffer.block_mut(current_row.block);
        for (out, value) in block.output.iter_mut().zip(row_values) {
            debug_assert_eq!(out.len() as u64, current_row.row);
            out.push(value);
        }
        Ok(())
    }

    /// Assembles fully computed blocks for the consumer and releases
    /// buffered blocks nothing can address anymore.
    fn collect_ready_blocks(&mut self) -> Result<()> {
        while self.next_output_block_number < self.first_not_ready_row.block {
            let batch = self.assemble_output_block(self.next_output_block_number)?;
            debug!(
                "window: emitting block {} ({} rows)",
                self.next_output_block_number,
                batch.num_rows()
            );
            self.ready_blocks.push_back(batch);
            self.next_output_block_number += 1;
        }
        // Keep everything the frames, the peer group or the current row can
        // still reach; release the rest.
        let first_used_block = self
            .next_output_block_number
            .min(self.prev_frame_start.block)
            .min(self.current_row.block)
            .min(self.peer_group_start.block);
        self.buffer.release_before(first_used_block);
        Ok(())
    }

    fn assemble_output_block(&mut self, number: u64) -> Result<RecordBatch> {
        let block = self.buffer.block_mut(number);
        let rows = block.rows();
        let outputs = std::mem::take(&mut block.output);
        let mut columns: Vec<ArrayRef> = block.input.columns().to_vec();
        debug_assert_eq!(outputs.len(), self.workspaces.len());
        for (workspace, values) in self.workspaces.iter().zip(outputs) {
            if values.len() != rows {
                return Err(WindroseError::Internal(format!(
                    "emitted block {number} has {} of {rows} result rows",
                    values.len()
                )));
            }
            columns.push(ScalarValue::iter_to_array(values, workspace.result_type())?);
        }
        RecordBatch::try_new(self.output_schema.clone(), columns)
            .map_err(WindroseError::ArrowError)
    }

    fn on_batch(&mut self, batch: RecordBatch) -> Result<()> {
        self.append_block(batch)?;
        self.compute()?;
        self.collect_ready_blocks()
    }

    fn on_input_finished(&mut self) -> Result<()> {
        self.input_is_finished = true;
        self.compute()?;
        self.collect_ready_blocks()?;
        debug_assert!(self.first_not_ready_row == self.buffer.blocks_end());
        self.buffer.release_before(self.next_output_block_number);
        Ok(())
    }

    /// Terminates the stream, dropping buffered state.
    fn fail(&mut self, e: WindroseError) -> Result<RecordBatch> {
        self.finished = true;
        self.ready_blocks.clear();
        self.buffer = BlockBuffer::new();
        Err(e)
    }

    fn poll_next_inner(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<RecordBatch>>> {
        loop {
            if let Some(batch) = self.ready_blocks.pop_front() {
                return Poll::Ready(Some(Ok(batch)));
            }
            if self.finished {
                return Poll::Ready(None);
            }
            if self.is_cancelled() {
                return Poll::Ready(Some(self.fail(WindroseError::Cancelled)));
            }
            match ready!(self.input.poll_next_unpin(cx)) {
                Some(Ok(batch)) => {
                    if let Err(e) = self.on_batch(batch) {
                        return Poll::Ready(Some(self.fail(e)));
                    }
                }
                Some(Err(e)) => return Poll::Ready(Some(self.fail(e))),
                None => {
                    if let Err(e) = self.on_input_finished() {
                        return Poll::Ready(Some(self.fail(e)));
                    }
                    self.finished = true;
                }
            }
        }
    }
}

/// Feeds the rows of `[from, to)` to the workspace's accumulator, one
/// per-block slice of the argument columns at a time.
fn apply_range(
    buffer: &BlockBuffer,
    workspace: &mut WindowFunctionWorkspace,
    from: RowCoord,
    to: RowCoord,
    retract: bool,
) -> Result<()> {
    let mut at = from;
    while at < to {
        let block = buffer.block(at.block);
        let upper = if to.block == at.block {
            to.row
        } else {
            block.rows() as u64
        };
        let length = (upper - at.row) as usize;
        if length > 0 {
            let values: Vec<ArrayRef> = workspace
                .arguments
                .iter()
                .map(|&c| block.input.column(c).slice(at.row as usize, length))
                .collect();
            let accumulator = workspace.accumulator_mut()?;
            if retract {
                accumulator.retract_batch(&values)?;
            } else {
                accumulator.update_batch(&values)?;
            }
        }
        at = RowCoord::new(at.block + 1, 0);
    }
    Ok(())
}

impl Stream for WindowStream {
    type Item = Result<RecordBatch>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_next_inner(cx)
    }
}

impl BlockStream for WindowStream {
    fn schema(&self) -> SchemaRef {
        self.output_schema.clone()
    }
}
