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

//! End-to-end tests for the streaming window operator.

use std::pin::Pin;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use arrow::array::{
    Array, ArrayRef, Float64Array, Int64Array, StringArray, UInt64Array,
};
use arrow::compute::{concat_batches, SortOptions};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use futures::{Stream, StreamExt, TryStreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use windrose_common::{Result, WindroseError};
use windrose_exec::{BlockStream, MemoryBlockStream, WindowStream};
use windrose_expr::{
    ColumnOrder, WindowDescription, WindowFrame, WindowFrameBound, WindowFrameUnits,
    WindowFunction, WindowFunctionDescription,
};

fn rows_frame(start_bound: WindowFrameBound, end_bound: WindowFrameBound) -> WindowFrame {
    WindowFrame {
        units: WindowFrameUnits::Rows,
        start_bound,
        end_bound,
    }
}

fn range_frame(start_bound: WindowFrameBound, end_bound: WindowFrameBound) -> WindowFrame {
    WindowFrame {
        units: WindowFrameUnits::Range,
        start_bound,
        end_bound,
    }
}

fn call(name: &str, arguments: Vec<usize>, result_name: &str) -> WindowFunctionDescription {
    WindowFunctionDescription {
        function: WindowFunction::from_str(name).unwrap(),
        arguments,
        result_name: result_name.to_string(),
    }
}

fn order_by(columns: &[usize]) -> Vec<ColumnOrder> {
    columns
        .iter()
        .map(|&column| ColumnOrder {
            column,
            options: SortOptions::default(),
        })
        .collect()
}

/// Schema `(x: Int64)`.
fn x_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![Field::new("x", DataType::Int64, true)]))
}

fn x_batch(values: &[i64]) -> RecordBatch {
    RecordBatch::try_new(
        x_schema(),
        vec![Arc::new(Int64Array::from(values.to_vec())) as ArrayRef],
    )
    .unwrap()
}

/// Schema `(p: Utf8, x: Int64)`.
fn px_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("p", DataType::Utf8, true),
        Field::new("x", DataType::Int64, true),
    ]))
}

fn px_batch(partitions: &[Option<&str>], values: &[i64]) -> RecordBatch {
    RecordBatch::try_new(
        px_schema(),
        vec![
            Arc::new(StringArray::from(partitions.to_vec())) as ArrayRef,
            Arc::new(Int64Array::from(values.to_vec())) as ArrayRef,
        ],
    )
    .unwrap()
}

/// Cuts one batch into consecutive slices of the given sizes.
fn split(batch: &RecordBatch, sizes: &[usize]) -> Vec<RecordBatch> {
    let mut offset = 0;
    let mut out = Vec::with_capacity(sizes.len());
    for &size in sizes {
        out.push(batch.slice(offset, size));
        offset += size;
    }
    assert_eq!(offset, batch.num_rows());
    out
}

async fn run_window(
    batches: Vec<RecordBatch>,
    schema: SchemaRef,
    description: WindowDescription,
) -> Result<RecordBatch> {
    let input = MemoryBlockStream::try_new(batches, schema)?.boxed();
    let stream = WindowStream::try_new(input, description)?;
    let schema = stream.schema();
    let output: Vec<RecordBatch> = stream.try_collect().await?;
    for batch in output.iter() {
        assert_eq!(batch.schema().fields(), schema.fields());
    }
    if output.is_empty() {
        Ok(RecordBatch::new_empty(schema))
    } else {
        Ok(concat_batches(&schema, &output)?)
    }
}

fn i64_column(batch: &RecordBatch, name: &str) -> Vec<Option<i64>> {
    let array = batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    (0..array.len())
        .map(|i| (!array.is_null(i)).then(|| array.value(i)))
        .collect()
}

fn u64_column(batch: &RecordBatch, name: &str) -> Vec<u64> {
    let array = batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<UInt64Array>()
        .unwrap();
    (0..array.len()).map(|i| array.value(i)).collect()
}

fn f64_column(batch: &RecordBatch, name: &str) -> Vec<Option<f64>> {
    let array = batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    (0..array.len())
        .map(|i| (!array.is_null(i)).then(|| array.value(i)))
        .collect()
}

#[tokio::test]
async fn cumulative_sum() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: order_by(&[0]),
        frame: rows_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![call("sum", vec![0], "sum_x")],
    };
    let output = run_window(vec![x_batch(&[1, 2, 2, 3])], x_schema(), description).await?;
    assert_eq!(
        i64_column(&output, "sum_x"),
        vec![Some(1), Some(3), Some(5), Some(8)]
    );
    Ok(())
}

#[tokio::test]
async fn rank_family_over_peer_groups() -> Result<()> {
    // The SQL default frame: RANGE UNBOUNDED PRECEDING .. CURRENT ROW.
    let description = WindowDescription {
        partition_by: vec![],
        order_by: order_by(&[0]),
        frame: range_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![
            call("rank", vec![], "rank"),
            call("dense_rank", vec![], "dense_rank"),
            call("row_number", vec![], "row_number"),
        ],
    };
    let output = run_window(vec![x_batch(&[1, 2, 2, 3])], x_schema(), description).await?;
    assert_eq!(u64_column(&output, "rank"), vec![1, 2, 2, 4]);
    assert_eq!(u64_column(&output, "dense_rank"), vec![1, 2, 2, 3]);
    assert_eq!(u64_column(&output, "row_number"), vec![1, 2, 3, 4]);
    Ok(())
}

#[tokio::test]
async fn row_number_restarts_per_partition() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![0],
        order_by: order_by(&[1]),
        frame: range_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![call("row_number", vec![], "row_number")],
    };
    let batch = px_batch(
        &[Some("A"), Some("A"), Some("B"), Some("B"), Some("B")],
        &[10, 20, 5, 5, 6],
    );
    // Also split so the partition boundary falls mid-block and across a
    // block seam.
    for sizes in [vec![5], vec![3, 2], vec![1, 1, 1, 1, 1]] {
        let output = run_window(
            split(&batch, &sizes),
            px_schema(),
            description.clone(),
        )
        .await?;
        assert_eq!(u64_column(&output, "row_number"), vec![1, 2, 1, 2, 3]);
    }
    Ok(())
}

#[tokio::test]
async fn range_current_row_counts_peers() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: order_by(&[0]),
        frame: range_frame(WindowFrameBound::CurrentRow, WindowFrameBound::CurrentRow),
        functions: vec![call("count", vec![], "count_star")],
    };
    let output = run_window(vec![x_batch(&[1, 2, 2, 3])], x_schema(), description).await?;
    assert_eq!(
        i64_column(&output, "count_star"),
        vec![Some(1), Some(2), Some(2), Some(1)]
    );
    Ok(())
}

#[tokio::test]
async fn sliding_sum_is_split_invariant() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: order_by(&[0]),
        frame: rows_frame(WindowFrameBound::Preceding(1), WindowFrameBound::Following(1)),
        functions: vec![call("sum", vec![0], "sum_x")],
    };
    let batch = x_batch(&[1, 2, 3, 4, 5]);
    let mut outputs = Vec::new();
    for sizes in [vec![1, 1, 1, 1, 1], vec![5], vec![2, 3]] {
        let output = run_window(
            split(&batch, &sizes),
            x_schema(),
            description.clone(),
        )
        .await?;
        assert_eq!(
            i64_column(&output, "sum_x"),
            vec![Some(3), Some(6), Some(9), Some(12), Some(9)]
        );
        outputs.push(output);
    }
    assert!(outputs.iter().all(|o| o == &outputs[0]));
    Ok(())
}

#[tokio::test]
async fn current_row_only_sum_is_identity() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: vec![],
        frame: rows_frame(WindowFrameBound::CurrentRow, WindowFrameBound::CurrentRow),
        functions: vec![call("sum", vec![0], "sum_x")],
    };
    let batch = x_batch(&[5, -1, 42, 0, 7]);
    let output = run_window(
        split(&batch, &[2, 2, 1]),
        x_schema(),
        description,
    )
    .await?;
    assert_eq!(i64_column(&output, "x"), i64_column(&output, "sum_x"));
    Ok(())
}

#[tokio::test]
async fn row_numbers_sum_to_triangular_numbers() -> Result<()> {
    // For every partition of n rows the row numbers must sum to n(n+1)/2.
    let partitions: Vec<Option<&str>> = std::iter::repeat(Some("a"))
        .take(3)
        .chain(std::iter::repeat(Some("b")).take(7))
        .chain(std::iter::repeat(Some("c")).take(1))
        .chain(std::iter::repeat(Some("d")).take(5))
        .collect();
    let values: Vec<i64> = (0..partitions.len() as i64).collect();
    let description = WindowDescription {
        partition_by: vec![0],
        order_by: order_by(&[1]),
        frame: range_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![call("row_number", vec![], "row_number")],
    };
    let batch = px_batch(&partitions, &values);
    let output = run_window(split(&batch, &[4, 4, 4, 4]), px_schema(), description).await?;
    let row_numbers = u64_column(&output, "row_number");
    let mut sums = std::collections::HashMap::new();
    for (p, rn) in partitions.iter().zip(row_numbers) {
        *sums.entry(p.unwrap()).or_insert(0u64) += rn;
    }
    for (key, n) in [("a", 3u64), ("b", 7), ("c", 1), ("d", 5)] {
        assert_eq!(sums[key], n * (n + 1) / 2, "partition {key}");
    }
    Ok(())
}

/// Brute-force reference for ROWS frames over a single partition.
fn reference_rows_aggregate(
    values: &[Option<i64>],
    preceding: u64,
    following: u64,
    aggregate: impl Fn(&[Option<i64>]) -> Option<i64>,
) -> Vec<Option<i64>> {
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(preceding as usize);
            let end = (i + following as usize + 1).min(values.len());
            aggregate(&values[start..end])
        })
        .collect()
}

#[tokio::test]
async fn sliding_min_replays_without_retraction() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let values: Vec<Option<i64>> = (0..100)
        .map(|_| (!rng.gen_bool(0.2)).then(|| rng.gen_range(-50..50)))
        .collect();
    let batch = RecordBatch::try_new(
        x_schema(),
        vec![Arc::new(Int64Array::from(values.clone())) as ArrayRef],
    )
    .unwrap();
    let description = WindowDescription {
        partition_by: vec![],
        order_by: vec![],
        frame: rows_frame(WindowFrameBound::Preceding(3), WindowFrameBound::Following(1)),
        functions: vec![
            call("min", vec![0], "min_x"),
            call("max", vec![0], "max_x"),
            call("sum", vec![0], "sum_x"),
        ],
    };
    let output = run_window(
        split(&batch, &[13, 1, 40, 20, 26]),
        x_schema(),
        description,
    )
    .await?;
    let min = |w: &[Option<i64>]| w.iter().flatten().min().copied();
    let max = |w: &[Option<i64>]| w.iter().flatten().max().copied();
    let sum = |w: &[Option<i64>]| {
        w.iter()
            .flatten()
            .copied()
            .reduce(|a, b| a + b)
    };
    assert_eq!(
        i64_column(&output, "min_x"),
        reference_rows_aggregate(&values, 3, 1, min)
    );
    assert_eq!(
        i64_column(&output, "max_x"),
        reference_rows_aggregate(&values, 3, 1, max)
    );
    assert_eq!(
        i64_column(&output, "sum_x"),
        reference_rows_aggregate(&values, 3, 1, sum)
    );
    Ok(())
}

#[tokio::test]
async fn cumulative_average() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: order_by(&[0]),
        frame: rows_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![call("avg", vec![0], "avg_x")],
    };
    let output = run_window(vec![x_batch(&[1, 2, 3, 4])], x_schema(), description).await?;
    assert_eq!(
        f64_column(&output, "avg_x"),
        vec![Some(1.0), Some(1.5), Some(2.0), Some(2.5)]
    );
    Ok(())
}

#[tokio::test]
async fn lead_and_lag_within_frame() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: order_by(&[0]),
        frame: rows_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::UnboundedFollowing,
        ),
        functions: vec![
            call("lag", vec![0], "lag_x"),
            call("lead", vec![0], "lead_x"),
        ],
    };
    let batch = x_batch(&[1, 2, 3, 4]);
    let output = run_window(split(&batch, &[2, 2]), x_schema(), description).await?;
    assert_eq!(
        i64_column(&output, "lag_x"),
        vec![None, Some(1), Some(2), Some(3)]
    );
    assert_eq!(
        i64_column(&output, "lead_x"),
        vec![Some(2), Some(3), Some(4), None]
    );
    Ok(())
}

#[tokio::test]
async fn value_functions_over_sliding_frame() -> Result<()> {
    let schema: SchemaRef = Arc::new(Schema::new(vec![
        Field::new("x", DataType::Int64, true),
        Field::new("n", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3, 4])) as ArrayRef,
            Arc::new(Int64Array::from(vec![2, 2, 2, 2])) as ArrayRef,
        ],
    )
    .unwrap();
    let description = WindowDescription {
        partition_by: vec![],
        order_by: order_by(&[0]),
        frame: rows_frame(WindowFrameBound::Preceding(1), WindowFrameBound::Following(1)),
        functions: vec![
            call("first_value", vec![0], "first_x"),
            call("last_value", vec![0], "last_x"),
            call("nth_value", vec![0, 1], "second_x"),
        ],
    };
    let output = run_window(split(&batch, &[1, 3]), schema, description).await?;
    assert_eq!(
        i64_column(&output, "first_x"),
        vec![Some(1), Some(1), Some(2), Some(3)]
    );
    assert_eq!(
        i64_column(&output, "last_x"),
        vec![Some(2), Some(3), Some(4), Some(4)]
    );
    assert_eq!(
        i64_column(&output, "second_x"),
        vec![Some(2), Some(2), Some(3), Some(4)]
    );
    Ok(())
}

#[tokio::test]
async fn percent_rank_and_ntile_need_the_whole_partition() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: order_by(&[0]),
        frame: rows_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::UnboundedFollowing,
        ),
        functions: vec![
            call("percent_rank", vec![], "pr"),
            call("ntile", vec![1], "bucket"),
        ],
    };
    let schema: SchemaRef = Arc::new(Schema::new(vec![
        Field::new("x", DataType::Int64, true),
        Field::new("n", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 2, 3])) as ArrayRef,
            Arc::new(Int64Array::from(vec![2, 2, 2, 2])) as ArrayRef,
        ],
    )
    .unwrap();
    let output = run_window(split(&batch, &[3, 1]), schema, description).await?;
    assert_eq!(
        f64_column(&output, "pr"),
        vec![Some(0.0), Some(1.0 / 3.0), Some(1.0 / 3.0), Some(1.0)]
    );
    assert_eq!(u64_column(&output, "bucket"), vec![1, 1, 2, 2]);
    Ok(())
}

#[tokio::test]
async fn unbounded_following_holds_blocks_until_partition_end() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![0],
        order_by: order_by(&[1]),
        frame: rows_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::UnboundedFollowing,
        ),
        functions: vec![call("sum", vec![1], "total")],
    };
    let batch = px_batch(
        &[Some("a"), Some("a"), Some("a"), Some("b"), Some("b")],
        &[1, 2, 3, 10, 20],
    );
    let output = run_window(split(&batch, &[2, 2, 1]), px_schema(), description).await?;
    assert_eq!(
        i64_column(&output, "total"),
        vec![Some(6), Some(6), Some(6), Some(30), Some(30)]
    );
    Ok(())
}

#[tokio::test]
async fn null_partition_keys_compare_equal() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![0],
        order_by: order_by(&[1]),
        frame: range_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![call("row_number", vec![], "row_number")],
    };
    let batch = px_batch(&[None, None, Some("a")], &[1, 2, 3]);
    let output = run_window(vec![batch], px_schema(), description).await?;
    assert_eq!(u64_column(&output, "row_number"), vec![1, 2, 1]);
    Ok(())
}

#[tokio::test]
async fn input_columns_pass_through_unchanged() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![0],
        order_by: order_by(&[1]),
        frame: range_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![
            call("sum", vec![1], "sum_x"),
            call("rank", vec![], "rank"),
        ],
    };
    let partitions = &[Some("a"), Some("a"), Some("b"), Some("b"), Some("b")];
    let values = &[3, 1, 4, 1, 5];
    let batch = px_batch(partitions, values);
    let output = run_window(split(&batch, &[2, 3]), px_schema(), description).await?;
    assert_eq!(output.num_rows(), batch.num_rows());
    assert_eq!(output.project(&[0, 1])?, batch);
    Ok(())
}

#[tokio::test]
async fn resplitting_blocks_gives_identical_output() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let n = 64;
    // Sorted runs of partition keys, values ordered within each partition
    // the way an upstream sort stage would deliver them.
    let mut partitions: Vec<Option<&str>> = Vec::with_capacity(n);
    let keys = ["a", "b", "c", "d", "e"];
    let mut key = 0;
    while partitions.len() < n {
        let run = rng.gen_range(1..=8).min(n - partitions.len());
        partitions.extend(std::iter::repeat(Some(keys[key % keys.len()])).take(run));
        key += 1;
    }
    let mut values: Vec<i64> = Vec::with_capacity(n);
    let mut prev_key = partitions[0];
    let mut v = 0;
    for p in partitions.iter() {
        if *p != prev_key {
            prev_key = *p;
            v = 0;
        }
        v += rng.gen_range(0..3);
        values.push(v);
    }
    let batch = px_batch(&partitions, &values);
    let description = WindowDescription {
        partition_by: vec![0],
        order_by: order_by(&[1]),
        frame: rows_frame(WindowFrameBound::Preceding(2), WindowFrameBound::Following(2)),
        functions: vec![
            call("sum", vec![1], "sum_x"),
            call("count", vec![1], "count_x"),
            call("row_number", vec![], "row_number"),
        ],
    };

    let reference = run_window(vec![batch.clone()], px_schema(), description.clone()).await?;
    for _ in 0..8 {
        let mut sizes = Vec::new();
        let mut remaining = n;
        while remaining > 0 {
            let size = rng.gen_range(1..=remaining.min(9));
            sizes.push(size);
            remaining -= size;
        }
        let output = run_window(split(&batch, &sizes), px_schema(), description.clone())
            .await?;
        assert_eq!(output, reference, "split {sizes:?}");
    }
    Ok(())
}

#[tokio::test]
async fn misordered_input_is_rejected() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: order_by(&[0]),
        frame: rows_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![call("rank", vec![], "rank")],
    };
    let err = run_window(vec![x_batch(&[2, 1])], x_schema(), description)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not sorted by the ORDER BY columns"));
    Ok(())
}

#[tokio::test]
async fn empty_input_produces_no_rows() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: vec![],
        frame: rows_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![call("sum", vec![0], "sum_x")],
    };
    let output = run_window(vec![], x_schema(), description).await?;
    assert_eq!(output.num_rows(), 0);
    Ok(())
}

#[tokio::test]
async fn cancellation_releases_and_fails() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: vec![],
        frame: rows_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![call("sum", vec![0], "sum_x")],
    };
    let input = MemoryBlockStream::try_new(vec![x_batch(&[1, 2, 3])], x_schema())?.boxed();
    let flag = Arc::new(AtomicBool::new(false));
    let mut stream =
        WindowStream::try_new(input, description)?.with_cancellation(flag.clone());
    flag.store(true, Ordering::Relaxed);
    let result = stream.next().await.unwrap();
    assert!(matches!(result, Err(WindroseError::Cancelled)));
    assert!(stream.next().await.is_none());
    Ok(())
}

/// Upstream that fails after its first batch.
struct FailingStream {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
    failed: bool,
}

impl Stream for FailingStream {
    type Item = Result<RecordBatch>;

    fn poll_next(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if let Some(batch) = this.batches.pop() {
            return Poll::Ready(Some(Ok(batch)));
        }
        if !this.failed {
            this.failed = true;
            return Poll::Ready(Some(Err(WindroseError::Execution(
                "upstream exploded".to_string(),
            ))));
        }
        Poll::Ready(None)
    }
}

impl BlockStream for FailingStream {
    fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}

#[tokio::test]
async fn upstream_errors_propagate_unchanged() -> Result<()> {
    let description = WindowDescription {
        partition_by: vec![],
        order_by: vec![],
        frame: rows_frame(
            WindowFrameBound::UnboundedPreceding,
            WindowFrameBound::CurrentRow,
        ),
        functions: vec![call("sum", vec![0], "sum_x")],
    };
    let input = Box::pin(FailingStream {
        schema: x_schema(),
        batches: vec![x_batch(&[1, 2])],
        failed: false,
    });
    let mut stream = WindowStream::try_new(input, description)?;
    // The first batch computes fine and is emitted before the error arrives.
    let first = stream.next().await.unwrap()?;
    assert_eq!(i64_column(&first, "sum_x"), vec![Some(1), Some(3)]);
    let err = stream.next().await.unwrap().unwrap_err();
    assert_eq!(err.to_string(), "Execution error: upstream exploded");
    assert!(stream.next().await.is_none());
    Ok(())
}
