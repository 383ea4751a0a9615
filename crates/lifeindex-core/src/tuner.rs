//! Feedback tuning: nudge actor weights toward annotated real-world outcomes,
//! then re-run the forward pipeline with the tuned tables.
//!
//! Each matched annotation moves the actor's strong and weak entries by the
//! same `learning_rate * sentiment * intensity`, clamped to
//! `[-WEIGHT_LIMIT, WEIGHT_LIMIT]`. Tuning always starts from a copy of the
//! tables it is given; the caller's tables are never touched.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;
use crate::decade::{DecadeBar, to_decade_bars};
use crate::error::EngineError;
use crate::index::{LifeIndexSeries, build_life_index};
use crate::records::{Annotation, EraRecord, YearRecord};
use crate::signal::build_year_signal;
use crate::tables::{ActorTables, ScoringTables, WeightTable};

pub const DEFAULT_LEARNING_RATE: f64 = 0.05;
pub const WEIGHT_LIMIT: f64 = 0.8;

/// One applied nudge, in annotation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Adjustment {
    pub year: i32,
    pub actor_code: String,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TunedWeights {
    pub strong: WeightTable,
    pub weak: WeightTable,
    pub adjustments: Vec<Adjustment>,
}

impl TunedWeights {
    pub fn actor_tables(&self) -> ActorTables {
        ActorTables {
            strong: self.strong.clone(),
            weak: self.weak.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub weights: TunedWeights,
    pub series: LifeIndexSeries,
    pub bars: Vec<DecadeBar>,
}

fn clamp_weight(value: f64) -> f64 {
    value.clamp(-WEIGHT_LIMIT, WEIGHT_LIMIT)
}

/// Apply every annotation, in order, to a copy of `initial`.
///
/// An annotation is skipped when no year record has its year or when that
/// record has no actor code, and also when its delta is not finite (a NaN
/// or infinite learning rate or intensity). If several records share the
/// year, the first one in `years` is used.
pub fn tune_actor_weights(
    years: &[YearRecord],
    annotations: &[Annotation],
    initial: &ActorTables,
    learning_rate: f64,
) -> TunedWeights {
    let mut strong = initial.strong.clone();
    let mut weak = initial.weak.clone();
    let mut adjustments = Vec::new();

    for ann in annotations {
        let Some(record) = years.iter().find(|r| r.year == ann.year) else {
            debug!(year = ann.year, label = %ann.label, "no year record for annotation, skipping");
            continue;
        };
        let Some(code) = record.actor() else {
            debug!(year = ann.year, "annotated year has no actor code, skipping");
            continue;
        };

        let delta = learning_rate * ann.direction();
        if !delta.is_finite() {
            warn!(
                year = ann.year,
                learning_rate,
                intensity = ann.intensity,
                "non-finite weight delta, skipping annotation"
            );
            continue;
        }
        strong.set(code, clamp_weight(strong.get(code) + delta));
        weak.set(code, clamp_weight(weak.get(code) + delta));
        debug!(year = ann.year, actor = code, delta, "adjusted actor weight");

        adjustments.push(Adjustment {
            year: ann.year,
            actor_code: code.to_string(),
            delta,
        });
    }

    info!(
        annotations = annotations.len(),
        applied = adjustments.len(),
        learning_rate,
        "tuned actor weights"
    );
    TunedWeights {
        strong,
        weak,
        adjustments,
    }
}

/// Tune from `tables.actors` and rebuild signal, index and decade bars.
pub fn apply_feedback_loop(
    years: &[YearRecord],
    eras: &[EraRecord],
    annotations: &[Annotation],
    config: &ScoringConfig,
    tables: &ScoringTables,
    learning_rate: f64,
) -> Result<BacktestResult, EngineError> {
    let weights = tune_actor_weights(years, annotations, &tables.actors, learning_rate);
    let tuned = weights.actor_tables();

    let signal = build_year_signal(years, eras, config, tables, Some(&tuned));
    let series = build_life_index(years, &signal, config.base)?;
    let bars = to_decade_bars(&series);

    Ok(BacktestResult {
        weights,
        series,
        bars,
    })
}
