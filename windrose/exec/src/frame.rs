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

//! Frame boundary advancement. Both functions are pure over the buffered
//! data: they take the previous state as arguments and return the new
//! boundary together with a flag telling whether it is final. A boundary
//! that is not final means the buffered data ran out while the partition was
//! still open; the operator then waits for more input.

use windrose_common::{Result, WindroseError};
use windrose_expr::{WindowFrame, WindowFrameBound, WindowFrameUnits};

use crate::buffer::BlockBuffer;
use crate::coord::RowCoord;
use crate::scan;

/// Everything the boundary functions need to know about the operator's
/// position: the buffer, the ORDER BY columns for peer scans, the current
/// partition and the row being computed.
pub(crate) struct FrameContext<'a> {
    pub buffer: &'a BlockBuffer,
    pub order_by: &'a [usize],
    pub partition_start: RowCoord,
    pub partition_end: RowCoord,
    pub partition_ended: bool,
    pub current_row: RowCoord,
    pub peer_group_start: RowCoord,
}

/// Computes the frame start for the current row. Returns `(start, started)`.
pub(crate) fn advance_frame_start(
    ctx: &FrameContext<'_>,
    frame: &WindowFrame,
) -> Result<(RowCoord, bool)> {
    match frame.start_bound {
        WindowFrameBound::UnboundedPreceding => Ok((ctx.partition_start, true)),
        WindowFrameBound::CurrentRow => match frame.units {
            WindowFrameUnits::Rows => Ok((ctx.current_row, true)),
            // In RANGE mode the frame starts with the current peer group.
            WindowFrameUnits::Range => Ok((ctx.peer_group_start, true)),
        },
        WindowFrameBound::Preceding(n) => Ok(offset_frame_start(ctx, -(n as i64))),
        WindowFrameBound::Following(n) => Ok(offset_frame_start(ctx, n as i64)),
        WindowFrameBound::UnboundedFollowing => Err(WindroseError::Internal(
            "frame start UNBOUNDED FOLLOWING should have been rejected at \
             construction"
                .to_string(),
        )),
    }
}

/// Frame start at a fixed row offset from the current row. `partition_start`
/// clamps the left side by coordinate comparison alone, so it may safely
/// address a block that has already been released.
fn offset_frame_start(ctx: &FrameContext<'_>, offset: i64) -> (RowCoord, bool) {
    let (moved, remainder) = ctx.buffer.move_coord(ctx.current_row, offset);
    if moved <= ctx.partition_start {
        return (ctx.partition_start, true);
    }
    if ctx.partition_ended && ctx.partition_end <= moved {
        // A FOLLOWING start ran into the end of the partition; the frame is
        // empty there.
        return (ctx.partition_end, true);
    }
    // The start is final iff the whole offset was walked within buffered
    // data; a remainder means the target row has not arrived yet.
    (moved, remainder == 0)
}

/// Computes the frame end (exclusive) for the current row, resuming peer
/// scans from `from`. Returns `(end, ended)`.
pub(crate) fn advance_frame_end(
    ctx: &FrameContext<'_>,
    frame: &WindowFrame,
    from: RowCoord,
) -> Result<(RowCoord, bool)> {
    match frame.end_bound {
        WindowFrameBound::UnboundedFollowing => {
            Ok((ctx.partition_end, ctx.partition_ended))
        }
        WindowFrameBound::CurrentRow => match frame.units {
            WindowFrameUnits::Rows => Ok((ctx.buffer.advanced(ctx.current_row), true)),
            WindowFrameUnits::Range => peer_group_end(ctx, from),
        },
        WindowFrameBound::Preceding(n) => {
            // The end is exclusive, so "n PRECEDING" ends just after the row
            // n before the current one. Near the partition start the frame
            // may come out empty.
            let (moved, _) = ctx.buffer.move_coord(ctx.current_row, 1 - n as i64);
            Ok((moved.max(ctx.partition_start), true))
        }
        WindowFrameBound::Following(n) => {
            // "+1" because the end is past the last frame row.
            let (moved, remainder) = ctx.buffer.move_coord(ctx.current_row, n as i64 + 1);
            if ctx.partition_ended && ctx.partition_end <= moved {
                Ok((ctx.partition_end, true))
            } else {
                // An exact walk is final even while the partition is open:
                // the end cannot move past `current + n + 1` later.
                Ok((moved.min(ctx.partition_end), remainder == 0))
            }
        }
        WindowFrameBound::UnboundedPreceding => Err(WindroseError::Internal(
            "frame end UNBOUNDED PRECEDING should have been rejected at \
             construction"
                .to_string(),
        )),
    }
}

/// First coordinate past the current peer group, scanned forward from
/// `from`. The end is only final if the scan found a non-peer or the
/// partition has ended.
fn peer_group_end(ctx: &FrameContext<'_>, from: RowCoord) -> Result<(RowCoord, bool)> {
    let lo = from.max(ctx.buffer.advanced(ctx.current_row));
    let end = scan::advance_while_equal(
        ctx.buffer,
        ctx.order_by,
        ctx.current_row,
        lo,
        ctx.partition_end,
    )?;
    if end < ctx.partition_end {
        Ok((end, true))
    } else {
        Ok((ctx.partition_end, ctx.partition_ended))
    }
}
