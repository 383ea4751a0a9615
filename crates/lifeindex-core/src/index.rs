//! Life-index compounding.
//!
//! `index[i] = index[i-1] * (1 + signal[i] / 100)`, starting from `base`.
//! A running product keeps the index strictly positive for any signal above -100.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::info;

use crate::error::EngineError;
use crate::records::YearRecord;
use crate::signal::YearSignal;

/// One compounded year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LifePoint {
    pub year: i32,
    pub age: u32,
    /// Signal copied from the [`YearSignal`] for auditing.
    pub signal: f64,
    pub index: f64,
}

/// Year-ordered compounded series. Built fresh per run and never edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LifeIndexSeries {
    points: Vec<LifePoint>,
}

impl LifeIndexSeries {
    pub fn points(&self) -> &[LifePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.index).collect()
    }

    pub fn last(&self) -> Option<&LifePoint> {
        self.points.last()
    }

    /// Trailing mean of the index over `window` years.
    pub fn moving_average(&self, window: usize) -> Vec<f64> {
        rolling_mean(&self.values(), window)
    }
}

/// Year records sorted ascending, rejecting repeated years.
pub fn ordered_by_year(years: &[YearRecord]) -> Result<Vec<&YearRecord>, EngineError> {
    let mut seen = HashSet::with_capacity(years.len());
    for record in years {
        if !seen.insert(record.year) {
            return Err(EngineError::DuplicateYear { year: record.year });
        }
    }
    let mut ordered: Vec<&YearRecord> = years.iter().collect();
    ordered.sort_by_key(|r| r.year);
    Ok(ordered)
}

/// Compound `signal` over `years` from `base`.
///
/// A year absent from `signal` compounds with zero.
pub fn build_life_index(
    years: &[YearRecord],
    signal: &YearSignal,
    base: f64,
) -> Result<LifeIndexSeries, EngineError> {
    if !(base.is_finite() && base > 0.0) {
        return Err(EngineError::NonPositiveBase(base));
    }
    let ordered = ordered_by_year(years)?;

    let mut value = base;
    let points: Vec<LifePoint> = ordered
        .into_iter()
        .map(|record| {
            let s = signal.get(record.year).unwrap_or(0.0);
            value *= 1.0 + s / 100.0;
            LifePoint {
                year: record.year,
                age: record.age,
                signal: s,
                index: value,
            }
        })
        .collect();

    info!(
        years = points.len(),
        base,
        last = points.last().map(|p| p.index),
        "compounded life index"
    );
    Ok(LifeIndexSeries { points })
}

/// Trailing mean with a minimum of one sample; `window = 0` behaves as 1.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        let n = (i + 1).min(window);
        out.push(sum / n as f64);
    }
    out
}

/// Per-year difference between a baseline and a re-scored series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesDelta {
    pub year: i32,
    pub baseline: f64,
    pub tuned: f64,
    pub delta: f64,
}

/// Join two series on year; years present in only one side are dropped.
pub fn compare_series(baseline: &LifeIndexSeries, tuned: &LifeIndexSeries) -> Vec<SeriesDelta> {
    let tuned_by_year: BTreeMap<i32, f64> =
        tuned.points().iter().map(|p| (p.year, p.index)).collect();
    baseline
        .points()
        .iter()
        .filter_map(|p| {
            tuned_by_year.get(&p.year).map(|&t| SeriesDelta {
                year: p.year,
                baseline: p.index,
                tuned: t,
                delta: t - p.index,
            })
        })
        .collect()
}
