use super::domain::{Conflict, ConflictCandidate, ResolutionMethod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_UNMATCHED_PRIORITY: i32 = 0;

/// Document-label priorities matched by longest key, case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityTable {
    entries: BTreeMap<String, i32>,
    default_priority: i32,
}

impl PriorityTable {
    pub fn empty(default_priority: i32) -> Self {
        Self {
            entries: BTreeMap::new(),
            default_priority,
        }
    }

    /// Built-in ranking of common submittal document types.
    pub fn standard() -> Self {
        let mut table = Self::empty(DEFAULT_UNMATCHED_PRIORITY);
        for (key, score) in [
            ("equipment schedule", 100),
            ("mechanical schedule", 100),
            ("submittal", 90),
            ("energy model", 85),
            ("calculation", 80),
            ("specification", 70),
            ("drawing", 60),
            ("narrative", 40),
            ("letter", 30),
        ] {
            table.insert(key, score);
        }
        table
    }

    pub fn insert(&mut self, key: &str, score: i32) {
        self.entries.insert(key.trim().to_lowercase(), score);
    }

    /// Overrides replace built-in entries with the same key.
    pub fn with_overrides<'a>(
        mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a i32)>,
    ) -> Self {
        for (key, score) in overrides {
            self.insert(key, *score);
        }
        self
    }

    pub fn with_default_priority(mut self, default_priority: i32) -> Self {
        self.default_priority = default_priority;
        self
    }

    pub fn default_priority(&self) -> i32 {
        self.default_priority
    }

    /// Score of the longest table key found in the label; prefix matches win ties.
    pub fn score(&self, label: &str) -> i32 {
        let label = label.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|(key, _)| !key.is_empty() && label.contains(key.as_str()))
            .max_by_key(|(key, _)| (key.len(), label.starts_with(key.as_str())))
            .map(|(_, score)| *score)
            .unwrap_or(self.default_priority)
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// How conflicting candidates are narrowed to one value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionPolicy {
    Priority(PriorityTable),
    Latest,
    /// Parameter name to chosen document label.
    Manual(BTreeMap<String, String>),
    /// Keep the first recorded value.
    FirstOccurrence,
}

impl ResolutionPolicy {
    pub fn priority() -> Self {
        Self::Priority(PriorityTable::standard())
    }

    pub fn from_spec(spec: &PolicySpec, default_priority: i32) -> Self {
        match spec.strategy.trim().to_ascii_lowercase().as_str() {
            "priority" => Self::Priority(
                PriorityTable::standard()
                    .with_default_priority(default_priority)
                    .with_overrides(&spec.priorities),
            ),
            "latest" => Self::Latest,
            "manual" => Self::Manual(spec.manual_choices.clone()),
            _ => Self::FirstOccurrence,
        }
    }

    /// Candidate chosen for a conflict, or `None` to leave it unresolved.
    pub(crate) fn choose<'a>(
        &self,
        conflict: &'a Conflict,
    ) -> Option<(&'a ConflictCandidate, ResolutionMethod)> {
        match self {
            Self::Priority(table) => {
                let mut best: Option<(&ConflictCandidate, i32)> = None;
                for candidate in &conflict.candidates {
                    let score = table.score(&candidate.document);
                    if best.map_or(true, |(_, top)| score > top) {
                        best = Some((candidate, score));
                    }
                }
                best.map(|(candidate, _)| (candidate, ResolutionMethod::PriorityBased))
            }
            Self::Latest => conflict
                .candidates
                .last()
                .map(|candidate| (candidate, ResolutionMethod::Latest)),
            Self::Manual(choices) => match choices.get(&conflict.parameter) {
                Some(document) => conflict
                    .candidate_from(document)
                    .map(|candidate| (candidate, ResolutionMethod::Manual)),
                None => conflict
                    .candidates
                    .first()
                    .map(|candidate| (candidate, ResolutionMethod::FirstOccurrence)),
            },
            Self::FirstOccurrence => conflict
                .candidates
                .first()
                .map(|candidate| (candidate, ResolutionMethod::FirstOccurrence)),
        }
    }
}

/// Caller-facing policy description, e.g. decoded from a request body or CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySpec {
    pub strategy: String,
    #[serde(default)]
    pub priorities: BTreeMap<String, i32>,
    #[serde(default, alias = "manualChoices")]
    pub manual_choices: BTreeMap<String, String>,
}

impl PolicySpec {
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            ..Self::default()
        }
    }
}
