//! Per-year signal construction.
//!
//! Each year's signal is the sum of a tagged list of contributions, in order:
//! cyclical, keyword, era drag, actor, relation. Missing or unknown inputs
//! contribute zero; nothing in this module can fail.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::ScoringConfig;
use crate::era::locate_era;
use crate::records::{EraRecord, YearRecord};
use crate::scoring::{ActorScorer, Contribution, ContributionKind, keyword_score, relation_score};
use crate::tables::{ActorTables, ScoringTables};

/// Scalar signal per calendar year, with its contribution breakdown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearSignal {
    values: BTreeMap<i32, f64>,
    contributions: BTreeMap<i32, Vec<Contribution>>,
}

impl YearSignal {
    /// Signal built directly from `(year, value)` pairs, with no breakdown.
    pub fn from_values<I: IntoIterator<Item = (i32, f64)>>(values: I) -> Self {
        Self {
            values: values.into_iter().collect(),
            contributions: BTreeMap::new(),
        }
    }

    fn insert(&mut self, year: i32, contributions: Vec<Contribution>) {
        let total = contributions.iter().map(|c| c.value).sum();
        self.values.insert(year, total);
        self.contributions.insert(year, contributions);
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied()
    }

    /// Named terms that make up `year`'s signal; empty if unknown.
    pub fn contributions(&self, year: i32) -> &[Contribution] {
        self.contributions
            .get(&year)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Value of one contribution kind for `year`, `0.0` if absent.
    pub fn contribution(&self, year: i32, kind: ContributionKind) -> f64 {
        self.contributions(year)
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.value)
            .sum()
    }

    /// `(year, signal)` in ascending year order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values.iter().map(|(y, v)| (*y, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Build the signal for every year record.
///
/// `actor_override` replaces the strong/weak actor tables from `tables`,
/// which is how tuned weights are fed back in. Records are processed in
/// ascending year order and the cyclical phase follows that position, not
/// the calendar year. Repeated years overwrite one another here; the index
/// builder rejects them.
pub fn build_year_signal(
    years: &[YearRecord],
    eras: &[EraRecord],
    config: &ScoringConfig,
    tables: &ScoringTables,
    actor_override: Option<&ActorTables>,
) -> YearSignal {
    let boost = config.boost_table(tables);
    let risk = config.risk_table(tables);
    let cycle = config.cycle_len();
    let actors = ActorScorer::new(
        actor_override.unwrap_or(&tables.actors),
        tables,
        config.clamped_strength(),
        config.special_pattern.as_ref(),
    );

    let mut ordered: Vec<&YearRecord> = years.iter().collect();
    ordered.sort_by_key(|r| r.year);

    let mut signal = YearSignal::default();
    for (idx, record) in ordered.into_iter().enumerate() {
        let era = locate_era(record.age, eras);
        let era_description = era.map(|e| e.description.as_str()).unwrap_or("");

        let cyclical = if ((idx % cycle) as f64) < cycle as f64 / 2.0 {
            config.base_up
        } else {
            -config.base_down
        };

        let text = format!("{} {}", record.description, era_description);
        let keyword = keyword_score(&text, &boost, &risk);

        let era_drag = if risk.any_key_in(era_description) {
            -config.era_drag
        } else {
            0.0
        };

        let actor = record
            .actor()
            .map(|code| actors.score(code, record.elemental_relation) * config.actor_weight)
            .unwrap_or(0.0);

        let era_relations = era.map(|e| e.relations.as_slice()).unwrap_or(&[]);
        let relation = relation_score(
            record
                .relations
                .iter()
                .chain(era_relations)
                .map(String::as_str),
            &tables.relation_base,
            config.relation_trigger,
        );

        debug!(
            year = record.year,
            cyclical, keyword, era_drag, actor, relation, "scored year"
        );

        signal.insert(
            record.year,
            vec![
                Contribution::new(ContributionKind::Cyclical, cyclical),
                Contribution::new(ContributionKind::Keyword, keyword),
                Contribution::new(ContributionKind::EraDrag, era_drag),
                Contribution::new(ContributionKind::Actor, actor),
                Contribution::new(ContributionKind::Relation, relation),
            ],
        );
    }

    info!(years = signal.len(), eras = eras.len(), "built year signal");
    signal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ElementalRelation;
    use crate::tables::SpecialPattern;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// Config with every term switched off so single contributions can be isolated.
    fn quiet_config() -> ScoringConfig {
        ScoringConfig {
            base_up: 0.0,
            base_down: 0.0,
            cycle: 6,
            keyword_boost: 1.0,
            keyword_risk: 1.0,
            era_drag: 0.0,
            strength_index: 0.5,
            special_pattern: None,
            relation_trigger: 1.0,
            actor_weight: 1.0,
            base: 100.0,
        }
    }

    fn plain_years(from: i32, count: i32) -> Vec<YearRecord> {
        (0..count)
            .map(|i| YearRecord::new((from - 1990 + i) as u32, from + i))
            .collect()
    }

    #[test]
    fn cyclical_follows_position_not_year() {
        let config = ScoringConfig {
            base_up: 1.0,
            base_down: 2.0,
            cycle: 4,
            ..quiet_config()
        };
        // Deliberately unsorted input.
        let mut years = plain_years(2000, 6);
        years.reverse();
        let signal = build_year_signal(&years, &[], &config, &ScoringTables::default(), None);
        let values: Vec<f64> = signal.iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![1.0, 1.0, -2.0, -2.0, 1.0, 1.0]);
    }

    #[test]
    fn odd_cycle_splits_at_half() {
        let config = ScoringConfig {
            base_up: 1.0,
            base_down: 1.0,
            cycle: 3,
            ..quiet_config()
        };
        let signal =
            build_year_signal(&plain_years(2000, 3), &[], &config, &ScoringTables::default(), None);
        let values: Vec<f64> = signal.iter().map(|(_, v)| v).collect();
        // positions 0 and 1 are below 1.5
        assert_eq!(values, vec![1.0, 1.0, -1.0]);
    }

    #[test]
    fn zero_cycle_behaves_as_one() {
        let config = ScoringConfig {
            base_up: 1.0,
            base_down: 1.0,
            cycle: 0,
            ..quiet_config()
        };
        let signal =
            build_year_signal(&plain_years(2000, 3), &[], &config, &ScoringTables::default(), None);
        assert!(signal.iter().all(|(_, v)| v == 1.0));
    }

    #[test]
    fn keyword_reads_year_and_era_text() {
        let years = vec![YearRecord::new(20, 2010).with_description("逢合")];
        let eras = vec![EraRecord::new(18, "贵人")];
        let signal =
            build_year_signal(&years, &eras, &quiet_config(), &ScoringTables::default(), None);
        assert!(approx(signal.contribution(2010, ContributionKind::Keyword), 1.8));
    }

    #[test]
    fn risky_era_adds_flat_drag() {
        let config = ScoringConfig {
            era_drag: 0.6,
            ..quiet_config()
        };
        let years = vec![YearRecord::new(20, 2010), YearRecord::new(5, 1995)];
        let eras = vec![EraRecord::new(18, "大运逢冲")];
        let signal = build_year_signal(&years, &eras, &config, &ScoringTables::default(), None);

        assert!(approx(signal.contribution(2010, ContributionKind::EraDrag), -0.6));
        assert!(approx(signal.contribution(2010, ContributionKind::Keyword), -1.1));
        assert!(approx(signal.get(2010).unwrap(), -1.7));
        // before the first era: no era, no drag
        assert_eq!(signal.get(1995), Some(0.0));
    }

    #[test]
    fn actor_scaled_by_weight() {
        let config = ScoringConfig {
            strength_index: 1.0,
            actor_weight: 10.0,
            ..quiet_config()
        };
        let years = vec![YearRecord::new(30, 2020).with_actor("比")];
        let signal = build_year_signal(&years, &[], &config, &ScoringTables::default(), None);
        assert!(approx(signal.contribution(2020, ContributionKind::Actor), 3.5));
    }

    #[test]
    fn actor_override_replaces_default_tables() {
        let tables = ScoringTables::default();
        let mut tuned = tables.actors.clone();
        tuned.strong.set("官", 0.2);
        tuned.weak.set("官", 0.2);
        let years = vec![YearRecord::new(30, 2020).with_actor("官")];

        let base = build_year_signal(&years, &[], &quiet_config(), &tables, None);
        let over = build_year_signal(&years, &[], &quiet_config(), &tables, Some(&tuned));
        assert!(base.get(2020).unwrap() < 0.0);
        assert!(approx(over.get(2020).unwrap(), 0.2));
    }

    #[test]
    fn special_pattern_from_config() {
        let config = quiet_config().with_special_pattern(SpecialPattern::FollowStrong);
        let years = vec![
            YearRecord::new(30, 2020)
                .with_actor("官")
                .with_relation(ElementalRelation::SameAsMe),
        ];
        let signal = build_year_signal(&years, &[], &config, &ScoringTables::default(), None);
        assert!(approx(signal.get(2020).unwrap(), -0.45 * 1.1));
    }

    #[test]
    fn relations_union_year_and_era() {
        let years = vec![YearRecord::new(20, 2010).with_relations(&["冲", "冲"])];
        let eras = vec![EraRecord::new(18, "").with_relations(&["三合"])];
        let config = ScoringConfig {
            relation_trigger: 0.8,
            ..quiet_config()
        };
        let signal = build_year_signal(&years, &eras, &config, &ScoringTables::default(), None);
        assert!(approx(
            signal.contribution(2010, ContributionKind::Relation),
            (-5.0 - 5.0 + 6.0) * 0.8
        ));
    }

    #[test]
    fn empty_inputs_give_empty_signal() {
        let signal =
            build_year_signal(&[], &[], &ScoringConfig::default(), &ScoringTables::default(), None);
        assert!(signal.is_empty());
    }

    #[test]
    fn signal_equals_sum_of_contributions() {
        let years = vec![
            YearRecord::new(20, 2010)
                .with_actor("印")
                .with_relation(ElementalRelation::GeneratesMe)
                .with_description("禄到 逢刑")
                .with_relations(&["六合"]),
        ];
        let eras = vec![EraRecord::new(18, "空亡")];
        let config = ScoringConfig::default();
        let signal = build_year_signal(&years, &eras, &config, &ScoringTables::default(), None);
        let sum: f64 = signal.contributions(2010).iter().map(|c| c.value).sum();
        assert_eq!(signal.get(2010), Some(sum));
        assert_eq!(signal.contributions(2010).len(), 5);
    }

    #[test]
    fn deterministic_across_calls() {
        let years: Vec<YearRecord> = (0..30)
            .map(|i| {
                YearRecord::new(i, 1990 + i as i32)
                    .with_actor(["比", "官", "印", "财"][i as usize % 4])
                    .with_description(if i % 3 == 0 { "合 冲" } else { "贵" })
            })
            .collect();
        let eras = vec![EraRecord::new(0, "刑"), EraRecord::new(10, "禄")];
        let config = ScoringConfig::default();
        let tables = ScoringTables::default();
        let a = build_year_signal(&years, &eras, &config, &tables, None);
        let b = build_year_signal(&years, &eras, &config, &tables, None);
        let bits = |s: &YearSignal| s.iter().map(|(y, v)| (y, v.to_bits())).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn non_finite_strength_keeps_signal_finite() {
        let years = vec![
            YearRecord::new(30, 2020).with_actor("官"),
            YearRecord::new(31, 2021).with_actor("印"),
        ];
        let tables = ScoringTables::default();
        let nan = ScoringConfig {
            strength_index: f64::NAN,
            ..quiet_config()
        };
        let signal = build_year_signal(&years, &[], &nan, &tables, None);
        let midpoint = build_year_signal(&years, &[], &quiet_config(), &tables, None);
        for (year, value) in signal.iter() {
            assert!(value.is_finite(), "{year}: {value}");
            assert_eq!(Some(value), midpoint.get(year));
        }
    }
}
