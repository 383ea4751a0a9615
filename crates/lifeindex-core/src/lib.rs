//! Life-index scoring engine.
//!
//! Turns per-year chart annotations into a scalar signal, compounds it into a
//! life index, aggregates decade OHLC bars, and tunes actor weights from
//! user-annotated outcomes.

pub mod config;
pub mod decade;
pub mod era;
pub mod error;
pub mod index;
pub mod records;
pub mod schema;
pub mod scoring;
pub mod signal;
pub mod tables;
pub mod tuner;

pub use config::{ScoringConfig, StrengthFeatures};
pub use decade::{DecadeBar, closing_moving_average, to_decade_bars};
pub use era::locate_era;
pub use error::EngineError;
pub use index::{LifeIndexSeries, LifePoint, SeriesDelta, build_life_index, compare_series};
pub use records::{Annotation, ElementalRelation, EraRecord, Sentiment, YearRecord};
pub use schema::decade_bars_to_record_batch;
pub use scoring::{ActorScorer, Contribution, ContributionKind, keyword_score, relation_score};
pub use signal::{YearSignal, build_year_signal};
pub use tables::{ActorTables, ScoringTables, SpecialPattern, WeightTable};
pub use tuner::{
    Adjustment, BacktestResult, DEFAULT_LEARNING_RATE, TunedWeights, apply_feedback_loop,
    tune_actor_weights,
};
