//! The three independent scorers and the tagged contribution type.
//!
//! Keyword matching is plain substring search. Overlapping tokens all count:
//! "空亡" and any shorter token inside it both contribute, which over-counts
//! by construction and is kept as is.

use std::fmt;

use serde::Serialize;

use crate::records::ElementalRelation;
use crate::tables::{ActorTables, ScoringTables, WeightTable, normalize_strength};

/// Sum of boost weights minus risk weights for every key found in `text`.
pub fn keyword_score(text: &str, boost: &WeightTable, risk: &WeightTable) -> f64 {
    let mut score = 0.0;
    for (token, weight) in boost.iter() {
        if text.contains(token) {
            score += weight;
        }
    }
    for (token, weight) in risk.iter() {
        if text.contains(token) {
            score -= weight;
        }
    }
    score
}

/// `base[token] * trigger` summed over every token, repeats included.
pub fn relation_score<'a, I>(tokens: I, base: &WeightTable, trigger: f64) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    tokens.into_iter().map(|t| base.get(t) * trigger).sum()
}

/// Scores actor codes for one run.
///
/// A special-pattern table, when present and non-empty, replaces regime
/// interpolation outright; the elemental multiplier applies in both cases.
pub struct ActorScorer<'a> {
    actors: &'a ActorTables,
    tables: &'a ScoringTables,
    strength_index: f64,
    special_pattern: Option<&'a WeightTable>,
}

impl<'a> ActorScorer<'a> {
    pub fn new(
        actors: &'a ActorTables,
        tables: &'a ScoringTables,
        strength_index: f64,
        special_pattern: Option<&'a WeightTable>,
    ) -> Self {
        Self {
            actors,
            tables,
            strength_index: normalize_strength(strength_index),
            special_pattern: special_pattern.filter(|t| !t.is_empty()),
        }
    }

    /// Regime-dependent baseline before the elemental fine-tune.
    pub fn base(&self, code: &str) -> f64 {
        match self.special_pattern {
            Some(pattern) => pattern.get(code),
            None => self.actors.interpolate(code, self.strength_index),
        }
    }

    pub fn score(&self, code: &str, relation: Option<ElementalRelation>) -> f64 {
        self.base(code) * (1.0 + self.tables.elemental_multiplier(relation))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    Cyclical,
    Keyword,
    /// Flat penalty for an era whose description carries a risk keyword.
    EraDrag,
    Actor,
    Relation,
}

impl ContributionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cyclical => "cyclical",
            Self::Keyword => "keyword",
            Self::EraDrag => "era_drag",
            Self::Actor => "actor",
            Self::Relation => "relation",
        }
    }
}

impl fmt::Display for ContributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named term of a year's signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub kind: ContributionKind,
    pub value: f64,
}

impl Contribution {
    pub fn new(kind: ContributionKind, value: f64) -> Self {
        Self { kind, value }
    }
}
