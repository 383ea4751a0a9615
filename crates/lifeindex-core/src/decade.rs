//! Decade OHLC aggregation of the life index.

use serde::Serialize;

use crate::index::{LifeIndexSeries, rolling_mean};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecadeBar {
    /// `floor(year / 10) * 10`
    pub decade: i32,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Bucket start for `year`; floors toward negative infinity.
pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

/// One bar per decade present in `series`, in ascending decade order.
pub fn to_decade_bars(series: &LifeIndexSeries) -> Vec<DecadeBar> {
    let mut bars: Vec<DecadeBar> = Vec::new();
    for point in series.points() {
        let decade = decade_of(point.year);
        match bars.last_mut() {
            Some(bar) if bar.decade == decade => {
                bar.high = bar.high.max(point.index);
                bar.low = bar.low.min(point.index);
                bar.close = point.index;
            }
            _ => bars.push(DecadeBar {
                decade,
                open: point.index,
                high: point.index,
                low: point.index,
                close: point.index,
            }),
        }
    }
    bars
}

/// Trailing mean of bar closes over `window` decades.
pub fn closing_moving_average(bars: &[DecadeBar], window: usize) -> Vec<f64> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    rolling_mean(&closes, window)
}
