//! Per-run scoring configuration.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::tables::{
    DEFAULT_STRENGTH, ScoringTables, SpecialPattern, WeightTable, normalize_strength,
};

/// Numeric parameters for one scoring run.
///
/// Deserialisation fills absent fields from [`Default`], so a partial JSON
/// file overrides only what it names. `special_pattern` may be given either
/// as a pattern name (`"从旺"`, `"follow-strong"`) or as an explicit table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Cyclical contribution during the up half of each cycle.
    pub base_up: f64,
    /// Cyclical drawdown (subtracted) during the down half.
    pub base_down: f64,
    /// Cycle length in years; `0` behaves as `1`.
    pub cycle: u32,
    /// Scale applied to every boost keyword weight.
    pub keyword_boost: f64,
    /// Scale applied to every risk keyword weight.
    pub keyword_risk: f64,
    /// Flat penalty when the era description carries a risk keyword.
    pub era_drag: f64,
    /// Subject strength in `[0, 1]`; clamped at use, non-finite reads as 0.5.
    pub strength_index: f64,
    #[serde(deserialize_with = "pattern_or_table")]
    pub special_pattern: Option<WeightTable>,
    pub relation_trigger: f64,
    pub actor_weight: f64,
    /// Starting value of the compounding index.
    pub base: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_up: 1.2,
            base_down: 1.0,
            cycle: 6,
            keyword_boost: 1.0,
            keyword_risk: 0.6,
            era_drag: 0.6,
            strength_index: DEFAULT_STRENGTH,
            special_pattern: None,
            relation_trigger: 0.8,
            actor_weight: 10.0,
            base: 100.0,
        }
    }
}

impl ScoringConfig {
    pub fn with_special_pattern(mut self, pattern: SpecialPattern) -> Self {
        self.special_pattern = Some(pattern.table());
        self
    }

    pub fn clamped_strength(&self) -> f64 {
        normalize_strength(self.strength_index)
    }

    pub fn cycle_len(&self) -> usize {
        self.cycle.max(1) as usize
    }

    /// Boost keywords with `keyword_boost` applied to each entry.
    pub fn boost_table(&self, tables: &ScoringTables) -> WeightTable {
        tables.boost.scaled(self.keyword_boost)
    }

    /// Risk keywords with `keyword_risk` applied to each entry.
    pub fn risk_table(&self, tables: &ScoringTables) -> WeightTable {
        tables.risk.scaled(self.keyword_risk)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPattern {
    Named(String),
    Table(WeightTable),
}

fn pattern_or_table<'de, D>(deserializer: D) -> Result<Option<WeightTable>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawPattern>::deserialize(deserializer)? {
        None => None,
        Some(RawPattern::Table(table)) => Some(table).filter(|t| !t.is_empty()),
        Some(RawPattern::Named(name)) if name.trim().is_empty() || name.trim() == "无" => None,
        Some(RawPattern::Named(name)) => match name.parse::<SpecialPattern>() {
            Ok(pattern) => Some(pattern.table()),
            Err(e) => {
                warn!(error = %e, "ignoring special pattern");
                None
            }
        },
    })
}

/// Normalised chart features that determine the strength index.
///
/// Each value is expected in `[0, 1]`: 得令 (seasonal command), 得地 (rooted
/// in the branches), 得势 (supported by peers), 通根 (hidden roots).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthFeatures {
    #[serde(rename = "得令", alias = "season")]
    pub season: f64,
    #[serde(rename = "得地", alias = "ground")]
    pub ground: f64,
    #[serde(rename = "得势", alias = "support")]
    pub support: f64,
    #[serde(rename = "通根", alias = "root")]
    pub root: f64,
}

impl StrengthFeatures {
    /// Weighted blend `0.4 * season + 0.2 * (ground + support + root)`,
    /// clamped to `[0, 1]`.
    pub fn strength_index(&self) -> f64 {
        let score = self.season * 0.4 + self.ground * 0.2 + self.support * 0.2 + self.root * 0.2;
        normalize_strength(score)
    }
}
