//! Default weight tables.
//!
//! Actor codes form a closed ten-symbol vocabulary (比 劫 食 伤 财 才 官 杀 印 枭).
//! Each default table is built on demand by its constructor: there are no
//! shared statics, so a tuning run can clone and edit a table freely.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::records::ElementalRelation;

/// The actor-code vocabulary in display order.
pub const ACTOR_CODES: [&str; 10] = ["比", "劫", "食", "伤", "财", "才", "官", "杀", "印", "枭"];

/// Strength index used when none is given or the given one is not finite.
pub const DEFAULT_STRENGTH: f64 = 0.5;

/// Clamp a strength index to `[0, 1]`; NaN and infinities fall back to
/// [`DEFAULT_STRENGTH`].
pub fn normalize_strength(strength_index: f64) -> f64 {
    if strength_index.is_finite() {
        strength_index.clamp(0.0, 1.0)
    } else {
        DEFAULT_STRENGTH
    }
}

/// Signed weights keyed by actor code or keyword token.
///
/// Missing keys read as `0.0`. Iteration is in key order so that any sum over
/// a table is reproducible bit for bit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable(BTreeMap<String, f64>);

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    /// Weight for `key`, or `0.0` when absent.
    pub fn get(&self, key: &str) -> f64 {
        self.0.get(key).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: f64) {
        self.0.insert(key.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of this table with every entry multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        self.iter().map(|(k, v)| (k.to_string(), v * factor)).collect()
    }

    /// True if any key occurs as a literal substring of `text`.
    pub fn any_key_in(&self, text: &str) -> bool {
        self.0.keys().any(|k| text.contains(k.as_str()))
    }
}

impl FromIterator<(String, f64)> for WeightTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Actor weights under the strong and weak regimes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorTables {
    pub strong: WeightTable,
    pub weak: WeightTable,
}

impl Default for ActorTables {
    fn default() -> Self {
        Self {
            strong: WeightTable::from_pairs(&[
                ("官", -0.40),
                ("杀", -0.40),
                ("印", -0.30),
                ("枭", -0.30),
                ("比", 0.35),
                ("劫", 0.35),
                ("食", 0.30),
                ("伤", 0.30),
                ("财", 0.25),
                ("才", 0.25),
            ]),
            weak: WeightTable::from_pairs(&[
                ("官", -0.35),
                ("杀", -0.35),
                ("印", 0.40),
                ("枭", 0.40),
                ("比", 0.35),
                ("劫", 0.35),
                ("食", -0.30),
                ("伤", -0.30),
                ("财", -0.25),
                ("才", -0.25),
            ]),
        }
    }
}

impl ActorTables {
    /// `I * strong[code] + (1 - I) * weak[code]` with `I` normalised by
    /// [`normalize_strength`].
    pub fn interpolate(&self, code: &str, strength_index: f64) -> f64 {
        let i = normalize_strength(strength_index);
        i * self.strong.get(code) + (1.0 - i) * self.weak.get(code)
    }
}

/// Every table a scoring run reads from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringTables {
    pub actors: ActorTables,
    /// Fine-tune applied as `base * (1 + multiplier)`.
    pub elemental: BTreeMap<ElementalRelation, f64>,
    /// Base score per relational trigger token, before the trigger coefficient.
    pub relation_base: WeightTable,
    /// Keyword tokens that raise a year's score.
    pub boost: WeightTable,
    /// Keyword tokens that lower a year's score, and flag an unfavorable era.
    pub risk: WeightTable,
}

impl Default for ScoringTables {
    fn default() -> Self {
        let elemental = BTreeMap::from([
            (ElementalRelation::GeneratesMe, 0.20),
            (ElementalRelation::SameAsMe, 0.10),
            (ElementalRelation::IOvercome, 0.05),
            (ElementalRelation::OvercomesMe, -0.15),
            (ElementalRelation::IGenerate, -0.10),
        ]);

        Self {
            actors: ActorTables::default(),
            elemental,
            relation_base: WeightTable::from_pairs(&[
                ("三合", 6.0),
                ("六合", 4.0),
                ("半合", 2.0),
                ("冲", -5.0),
                ("刑", -3.0),
                ("害", -2.0),
                ("破", -1.0),
            ]),
            boost: WeightTable::from_pairs(&[
                ("合", 0.9),
                ("生", 0.6),
                ("禄", 0.8),
                ("喜", 0.6),
                ("财", 0.7),
                ("官", 0.8),
                ("贵", 0.9),
            ]),
            risk: WeightTable::from_pairs(&[
                ("刑", 0.9),
                ("冲", 1.1),
                ("破", 0.8),
                ("害", 1.0),
                ("劫", 0.6),
                ("空亡", 1.2),
            ]),
        }
    }
}

impl ScoringTables {
    /// Elemental multiplier, `0.0` for an absent relation.
    pub fn elemental_multiplier(&self, relation: Option<ElementalRelation>) -> f64 {
        relation
            .and_then(|r| self.elemental.get(&r).copied())
            .unwrap_or(0.0)
    }
}

/// Archetypal chart patterns whose table replaces regime interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialPattern {
    /// 从旺
    FollowStrong,
    /// 专旺
    ExclusiveStrong,
    /// 化气
    Transformed,
    /// 两气成象
    TwoElements,
}

impl SpecialPattern {
    pub const ALL: [SpecialPattern; 4] = [
        Self::FollowStrong,
        Self::ExclusiveStrong,
        Self::Transformed,
        Self::TwoElements,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FollowStrong => "从旺",
            Self::ExclusiveStrong => "专旺",
            Self::Transformed => "化气",
            Self::TwoElements => "两气成象",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::FollowStrong => "follow-strong",
            Self::ExclusiveStrong => "exclusive-strong",
            Self::Transformed => "transformed",
            Self::TwoElements => "two-elements",
        }
    }

    pub fn table(&self) -> WeightTable {
        let pairs: [(&str, f64); 10] = match self {
            Self::FollowStrong => [
                ("比", 0.45),
                ("劫", 0.45),
                ("食", 0.35),
                ("伤", 0.35),
                ("印", -0.35),
                ("枭", -0.35),
                ("财", 0.20),
                ("才", 0.20),
                ("官", -0.45),
                ("杀", -0.45),
            ],
            Self::ExclusiveStrong => [
                ("比", 0.50),
                ("劫", 0.50),
                ("印", -0.40),
                ("枭", -0.40),
                ("食", 0.30),
                ("伤", 0.30),
                ("财", 0.10),
                ("才", 0.10),
                ("官", -0.50),
                ("杀", -0.50),
            ],
            Self::Transformed => [
                ("食", 0.40),
                ("伤", 0.40),
                ("财", 0.35),
                ("才", 0.35),
                ("官", -0.40),
                ("杀", -0.40),
                ("印", -0.20),
                ("枭", -0.20),
                ("比", -0.10),
                ("劫", -0.10),
            ],
            Self::TwoElements => [
                ("比", 0.30),
                ("劫", 0.30),
                ("印", 0.25),
                ("枭", 0.25),
                ("食", 0.25),
                ("伤", 0.25),
                ("财", -0.25),
                ("才", -0.25),
                ("官", -0.30),
                ("杀", -0.30),
            ],
        };
        WeightTable::from_pairs(&pairs)
    }
}

impl fmt::Display for SpecialPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpecialPattern {
    type Err = String;

    /// Accepts either the Chinese name or the ASCII slug.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s || p.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown special pattern: {s}"))
    }
}
