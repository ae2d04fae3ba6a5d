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

//! Window frame specifications: `ROWS`/`RANGE` units and their bounds.

use std::fmt;

use windrose_common::{Result, WindroseError};

/// The frame-spec determines which rows are in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFrameUnits {
    /// The ROWS frame type means that the starting and ending boundaries for
    /// the frame are determined by counting individual rows relative to the
    /// current row.
    Rows,
    /// The RANGE frame type requires that the ORDER BY clause of the window
    /// have exactly one term. Call that term "X". With the RANGE frame type,
    /// the elements of the frame are determined by computing the value of
    /// expression X for all rows in the partition and framing those rows for
    /// which the value of X is within a certain range of the value of X for
    /// the current row.
    Range,
}

impl fmt::Display for WindowFrameUnits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            WindowFrameUnits::Rows => "ROWS",
            WindowFrameUnits::Range => "RANGE",
        })
    }
}

/// One boundary of a window frame. Row offsets arrive already resolved to
/// unsigned integers; RANGE frames only admit the unbounded and current-row
/// variants (see [`WindowFrame::validate`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowFrameBound {
    /// The frame boundary is the first row of the partition.
    UnboundedPreceding,
    /// The frame boundary is `n` rows before the current row.
    Preceding(u64),
    /// The frame boundary is the current row.
    CurrentRow,
    /// The frame boundary is `n` rows after the current row.
    Following(u64),
    /// The frame boundary is the last row of the partition.
    UnboundedFollowing,
}

impl WindowFrameBound {
    /// Position of the boundary relative to the current row, used to check
    /// that a frame start does not lie after its end. Unbounded variants map
    /// to the extremes.
    fn relative_position(&self) -> i128 {
        match self {
            WindowFrameBound::UnboundedPreceding => i128::MIN,
            WindowFrameBound::Preceding(n) => -(*n as i128),
            WindowFrameBound::CurrentRow => 0,
            WindowFrameBound::Following(n) => *n as i128,
            WindowFrameBound::UnboundedFollowing => i128::MAX,
        }
    }

    fn is_offset(&self) -> bool {
        matches!(
            self,
            WindowFrameBound::Preceding(_) | WindowFrameBound::Following(_)
        )
    }
}

impl fmt::Display for WindowFrameBound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WindowFrameBound::UnboundedPreceding => f.write_str("UNBOUNDED PRECEDING"),
            WindowFrameBound::Preceding(n) => write!(f, "{n} PRECEDING"),
            WindowFrameBound::CurrentRow => f.write_str("CURRENT ROW"),
            WindowFrameBound::Following(n) => write!(f, "{n} FOLLOWING"),
            WindowFrameBound::UnboundedFollowing => f.write_str("UNBOUNDED FOLLOWING"),
        }
    }
}

/// The window frame of a window function call, e.g.
/// `ROWS BETWEEN 1 PRECEDING AND 1 FOLLOWING`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowFrame {
    /// ROWS or RANGE
    pub units: WindowFrameUnits,
    /// The starting (inclusive) boundary of the frame.
    pub start_bound: WindowFrameBound,
    /// The ending (inclusive) boundary of the frame.
    pub end_bound: WindowFrameBound,
}

impl fmt::Display for WindowFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} BETWEEN {} AND {}",
            self.units, self.start_bound, self.end_bound
        )
    }
}

impl WindowFrame {
    /// Checks that this frame can be executed at all. Resolved descriptions
    /// that fail here must be refused at operator construction rather than
    /// silently computed with different semantics.
    pub fn validate(&self) -> Result<()> {
        if self.start_bound == WindowFrameBound::UnboundedFollowing {
            return Err(WindroseError::Plan(format!(
                "Invalid window frame: start bound cannot be UNBOUNDED FOLLOWING ({self})"
            )));
        }
        if self.end_bound == WindowFrameBound::UnboundedPreceding {
            return Err(WindroseError::Plan(format!(
                "Invalid window frame: end bound cannot be UNBOUNDED PRECEDING ({self})"
            )));
        }
        if self.start_bound.relative_position() > self.end_bound.relative_position() {
            return Err(WindroseError::Plan(format!(
                "Invalid window frame: start bound cannot exceed end bound ({self})"
            )));
        }
        if self.units == WindowFrameUnits::Range
            && (self.start_bound.is_offset() || self.end_bound.is_offset())
        {
            // Offsets in RANGE mode require arithmetic in the ORDER BY column
            // type; computing a ROWS result instead would be silently wrong.
            return Err(WindroseError::NotImplemented(format!(
                "RANGE window frames with numeric offsets are not supported ({self})"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(
        units: WindowFrameUnits,
        start_bound: WindowFrameBound,
        end_bound: WindowFrameBound,
    ) -> WindowFrame {
        WindowFrame {
            units,
            start_bound,
            end_bound,
        }
    }

    #[test]
    fn validate_accepts_common_frames() {
        let cases = [
            frame(
                WindowFrameUnits::Rows,
                WindowFrameBound::UnboundedPreceding,
                WindowFrameBound::CurrentRow,
            ),
            frame(
                WindowFrameUnits::Rows,
                WindowFrameBound::Preceding(1),
                WindowFrameBound::Following(1),
            ),
            frame(
                WindowFrameUnits::Rows,
                WindowFrameBound::Preceding(5),
                WindowFrameBound::Preceding(2),
            ),
            frame(
                WindowFrameUnits::Range,
                WindowFrameBound::CurrentRow,
                WindowFrameBound::UnboundedFollowing,
            ),
        ];
        for case in cases {
            case.validate().unwrap();
        }
    }

    #[test]
    fn validate_rejects_reversed_bounds() {
        let err = frame(
            WindowFrameUnits::Rows,
            WindowFrameBound::CurrentRow,
            WindowFrameBound::Preceding(2),
        )
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("start bound cannot exceed"));
    }

    #[test]
    fn validate_rejects_unbounded_misuse() {
        assert!(frame(
            WindowFrameUnits::Rows,
            WindowFrameBound::UnboundedFollowing,
            WindowFrameBound::UnboundedFollowing,
        )
        .validate()
        .is_err());
        assert!(frame(
            WindowFrameUnits::Rows,
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::UnboundedPreceding,
        )
        .validate()
        .is_err());
    }

    #[test]
    fn validate_rejects_numeric_range_offsets() {
        let err = frame(
            WindowFrameUnits::Range,
            WindowFrameBound::Preceding(2),
            WindowFrameBound::CurrentRow,
        )
        .validate()
        .unwrap_err();
        assert!(matches!(err, WindroseError::NotImplemented(_)));
    }

    #[test]
    fn display() {
        let f = frame(
            WindowFrameUnits::Rows,
            WindowFrameBound::Preceding(1),
            WindowFrameBound::Following(1),
        );
        assert_eq!(f.to_string(), "ROWS BETWEEN 1 PRECEDING AND 1 FOLLOWING");
    }
}
