//! Terminal rendering for series, decade bars and tuning results.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use lifeindex_core::tables::ACTOR_CODES;
use lifeindex_core::{
    ActorTables, DecadeBar, LifeIndexSeries, SeriesDelta, SpecialPattern, TunedWeights,
    closing_moving_average, decade_bars_to_record_batch,
};

/// Print the yearly series with two trailing moving averages.
pub fn print_series(
    series: &LifeIndexSeries,
    ma_short: usize,
    ma_long: usize,
) -> anyhow::Result<()> {
    let batch = series.to_record_batch()?;
    let batch = with_float_columns(
        &batch,
        vec![
            (format!("ma{ma_short}"), series.moving_average(ma_short)),
            (format!("ma{ma_long}"), series.moving_average(ma_long)),
        ],
    )?;
    println!("=== Life index ({} years) ===", series.len());
    println!("{}", pretty_format_batches(&[batch])?);
    println!();
    Ok(())
}

/// Print decade OHLC bars with two moving averages of the close.
pub fn print_bars(bars: &[DecadeBar], ma_short: usize, ma_long: usize) -> anyhow::Result<()> {
    let batch = decade_bars_to_record_batch(bars)?;
    let batch = with_float_columns(
        &batch,
        vec![
            (format!("ma{ma_short}"), closing_moving_average(bars, ma_short)),
            (format!("ma{ma_long}"), closing_moving_average(bars, ma_long)),
        ],
    )?;
    println!("=== Decade bars ===");
    println!("{}", pretty_format_batches(&[batch])?);
    println!();
    Ok(())
}

pub fn print_adjustments(weights: &TunedWeights) {
    println!("=== Adjustments ({}) ===", weights.adjustments.len());
    if weights.adjustments.is_empty() {
        println!("  (no annotation matched a year with an actor code)");
    }
    for adj in &weights.adjustments {
        println!("  {:<6} {:<4} {:+.4}", adj.year, adj.actor_code, adj.delta);
    }
    println!();
}

/// Side-by-side default and tuned weights for every actor code touched or known.
pub fn print_tuned_tables(defaults: &ActorTables, weights: &TunedWeights) {
    println!("=== Actor weights (default → tuned) ===");
    println!("  {:<4} {:>16} {:>16}", "code", "strong", "weak");

    let mut codes: Vec<&str> = ACTOR_CODES.to_vec();
    for (code, _) in weights.strong.iter() {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    for code in codes {
        println!(
            "  {:<4} {:>+7.3} → {:>+6.3} {:>+7.3} → {:>+6.3}",
            code,
            defaults.strong.get(code),
            weights.strong.get(code),
            defaults.weak.get(code),
            weights.weak.get(code),
        );
    }
    println!();
}

pub fn print_comparison(deltas: &[SeriesDelta]) {
    println!("=== Baseline vs tuned ===");
    println!("  {:<6} {:>12} {:>12} {:>10}", "year", "baseline", "tuned", "delta");
    for d in deltas {
        println!(
            "  {:<6} {:>12.3} {:>12.3} {:>+10.3}",
            d.year, d.baseline, d.tuned, d.delta
        );
    }
    println!();
}

pub fn print_patterns() {
    for pattern in SpecialPattern::ALL {
        let table = pattern.table();
        println!("{} ({})", pattern.name(), pattern.slug());
        let row: Vec<String> = ACTOR_CODES
            .iter()
            .map(|code| format!("{code} {:+.2}", table.get(code)))
            .collect();
        println!("  {}", row.join("  "));
    }
}

// ── Arrow helpers ──

/// Append Float64 columns to a batch.
fn with_float_columns(
    batch: &RecordBatch,
    extra: Vec<(String, Vec<f64>)>,
) -> anyhow::Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();

    for (name, values) in extra {
        fields.push(Field::new(name, DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(values)));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
