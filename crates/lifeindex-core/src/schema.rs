//! Arrow schemas and record batches for the engine's output series.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, Int32Array, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::decade::DecadeBar;
use crate::index::LifeIndexSeries;

/// Schema for the yearly compounded series.
pub fn life_index_schema() -> Schema {
    Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("age", DataType::UInt32, false),
        Field::new("signal", DataType::Float64, false),
        Field::new("life_index", DataType::Float64, false),
    ])
}

/// Schema for decade OHLC bars.
pub fn decade_bar_schema() -> Schema {
    Schema::new(vec![
        Field::new("decade", DataType::Int32, false),
        Field::new("open", DataType::Float64, false),
        Field::new("high", DataType::Float64, false),
        Field::new("low", DataType::Float64, false),
        Field::new("close", DataType::Float64, false),
    ])
}

impl LifeIndexSeries {
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let points = self.points();
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from_iter_values(points.iter().map(|p| p.year))),
            Arc::new(UInt32Array::from_iter_values(points.iter().map(|p| p.age))),
            Arc::new(Float64Array::from_iter_values(points.iter().map(|p| p.signal))),
            Arc::new(Float64Array::from_iter_values(points.iter().map(|p| p.index))),
        ];
        RecordBatch::try_new(Arc::new(life_index_schema()), columns)
    }
}

pub fn decade_bars_to_record_batch(bars: &[DecadeBar]) -> Result<RecordBatch, ArrowError> {
    let floats = |f: fn(&DecadeBar) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(bars.iter().map(f)))
    };
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from_iter_values(bars.iter().map(|b| b.decade))),
        floats(|b| b.open),
        floats(|b| b.high),
        floats(|b| b.low),
        floats(|b| b.close),
    ];
    RecordBatch::try_new(Arc::new(decade_bar_schema()), columns)
}

/// Read decade bars back from batches shaped like [`decade_bar_schema`].
pub fn decade_bars_from_batches(batches: &[RecordBatch]) -> Result<Vec<DecadeBar>, ArrowError> {
    let mut bars = Vec::new();
    for batch in batches {
        let decade = column::<Int32Array>(batch, "decade")?;
        let open = column::<Float64Array>(batch, "open")?;
        let high = column::<Float64Array>(batch, "high")?;
        let low = column::<Float64Array>(batch, "low")?;
        let close = column::<Float64Array>(batch, "close")?;

        for row in 0..batch.num_rows() {
            bars.push(DecadeBar {
                decade: decade.value(row),
                open: open.value(row),
                high: high.value(row),
                low: low.value(row),
                close: close.value(row),
            });
        }
    }
    Ok(bars)
}

// ── Arrow extraction helpers ──

fn column<'a, T: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a T, ArrowError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| ArrowError::SchemaError(format!("missing '{name}' column")))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ArrowError::SchemaError(format!("unexpected type for '{name}' column")))
}
