//! Input rows supplied by the upstream chart parser, and user annotations.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Relationship between a year's element and the subject's own element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementalRelation {
    #[serde(rename = "生我")]
    GeneratesMe,
    #[serde(rename = "同我")]
    SameAsMe,
    #[serde(rename = "我克")]
    IOvercome,
    #[serde(rename = "克我")]
    OvercomesMe,
    #[serde(rename = "我生")]
    IGenerate,
}

impl ElementalRelation {
    pub const ALL: [ElementalRelation; 5] = [
        Self::GeneratesMe,
        Self::SameAsMe,
        Self::IOvercome,
        Self::OvercomesMe,
        Self::IGenerate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::GeneratesMe => "生我",
            Self::SameAsMe => "同我",
            Self::IOvercome => "我克",
            Self::OvercomesMe => "克我",
            Self::IGenerate => "我生",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::GeneratesMe => "generates-me",
            Self::SameAsMe => "same-as-me",
            Self::IOvercome => "i-overcome",
            Self::OvercomesMe => "overcomes-me",
            Self::IGenerate => "i-generate",
        }
    }

    /// Parse a Chinese label or ASCII slug; anything else is `None`.
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|r| r.label() == s || r.slug().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ElementalRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One calendar year of the subject's life.
///
/// Field aliases accept the column names the chart parser emits
/// (`shishen`, `wuxing_relation`, `desc`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub age: u32,
    pub year: i32,
    #[serde(default, alias = "shishen", skip_serializing_if = "Option::is_none")]
    pub actor_code: Option<String>,
    #[serde(
        default,
        alias = "wuxing_relation",
        deserialize_with = "lenient_relation",
        skip_serializing_if = "Option::is_none"
    )]
    pub elemental_relation: Option<ElementalRelation>,
    #[serde(default, alias = "desc")]
    pub description: String,
    #[serde(default, deserialize_with = "relation_tokens")]
    pub relations: Vec<String>,
}

impl YearRecord {
    pub fn new(age: u32, year: i32) -> Self {
        Self {
            age,
            year,
            ..Self::default()
        }
    }

    pub fn with_actor(mut self, code: &str) -> Self {
        self.actor_code = Some(code.to_string());
        self
    }

    pub fn with_relation(mut self, relation: ElementalRelation) -> Self {
        self.elemental_relation = Some(relation);
        self
    }

    pub fn with_description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn with_relations(mut self, tokens: &[&str]) -> Self {
        self.relations = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Trimmed actor code, `None` when absent or blank.
    pub fn actor(&self) -> Option<&str> {
        self.actor_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// A multi-year phase covering every age from `start_age` until the next era.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EraRecord {
    pub start_age: u32,
    #[serde(default, alias = "desc")]
    pub description: String,
    #[serde(default, deserialize_with = "relation_tokens")]
    pub relations: Vec<String>,
}

impl EraRecord {
    pub fn new(start_age: u32, description: &str) -> Self {
        Self {
            start_age,
            description: description.to_string(),
            relations: Vec::new(),
        }
    }

    pub fn with_relations(mut self, tokens: &[&str]) -> Self {
        self.relations = tokens.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// Split a relation string such as `"刑/冲 合"` into tokens.
pub fn split_relation_tokens(raw: &str) -> Vec<String> {
    raw.split('/')
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRelations {
    List(Vec<String>),
    Text(String),
}

fn relation_tokens<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawRelations>::deserialize(deserializer)? {
        Some(RawRelations::List(items)) => items,
        Some(RawRelations::Text(text)) => split_relation_tokens(&text),
        None => Vec::new(),
    })
}

fn lenient_relation<'de, D>(deserializer: D) -> Result<Option<ElementalRelation>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        if s.trim().is_empty() {
            return None;
        }
        let parsed = ElementalRelation::from_label(&s);
        if parsed.is_none() {
            warn!(relation = %s, "unknown elemental relation, treating as none");
        }
        parsed
    }))
}

/// Tokens in outcome text that mark a favorable outcome.
pub const POSITIVE_MARKERS: &[&str] = &["喜", "正", "好", "升", "成功"];
/// Tokens in outcome text that mark an unfavorable outcome.
pub const NEGATIVE_MARKERS: &[&str] = &["悲", "负", "跌", "裁", "失"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub fn sign(&self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// A real-world outcome the user pinned to a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub year: i32,
    #[serde(default)]
    pub label: String,
    /// Free-form outcome text, e.g. "正向 / 大喜".
    #[serde(default)]
    pub outcome: String,
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

fn default_intensity() -> f64 {
    1.0
}

impl Annotation {
    pub fn new(year: i32, label: &str, outcome: &str, intensity: f64) -> Self {
        Self {
            year,
            label: label.to_string(),
            outcome: outcome.to_string(),
            intensity,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }

    /// Positive markers win over negative ones; with neither present the
    /// sign of `intensity` decides.
    pub fn sentiment(&self) -> Sentiment {
        let outcome = self.outcome.trim();
        if POSITIVE_MARKERS.iter().any(|m| outcome.contains(m)) {
            Sentiment::Positive
        } else if NEGATIVE_MARKERS.iter().any(|m| outcome.contains(m)) {
            Sentiment::Negative
        } else if self.intensity >= 0.0 {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        }
    }

    /// `sentiment sign * intensity`.
    pub fn direction(&self) -> f64 {
        self.sentiment().sign() * self.intensity
    }
}
