use crate::assessment::{ParameterMap, ParameterValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Parameters one document supplies for one credit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditEntry {
    #[serde(alias = "declaredParameters")]
    pub declared_parameters: Vec<String>,
    pub values: BTreeMap<String, ParameterValue>,
}

impl CreditEntry {
    pub fn declare(&mut self, parameter: &str, value: ParameterValue) {
        if !self
            .declared_parameters
            .iter()
            .any(|existing| existing == parameter)
        {
            self.declared_parameters.push(parameter.to_string());
        }
        if !value.is_empty() {
            self.values.insert(parameter.to_string(), value);
        }
    }

    /// Declared parameters carrying a non-empty value, in declaration order.
    /// A name declared twice is supplied once.
    pub fn supplied(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        let declared = &self.declared_parameters;
        declared.iter().enumerate().filter_map(move |(index, name)| {
            if declared[..index].contains(name) {
                return None;
            }
            self.values
                .get(name)
                .filter(|value| !value.is_empty())
                .map(|value| (name.as_str(), value))
        })
    }
}

/// Source document identified by an opaque label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub label: String,
    pub credits: BTreeMap<String, CreditEntry>,
}

impl Document {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            credits: BTreeMap::new(),
        }
    }

    pub fn with_credit(mut self, credit_id: &str, entry: CreditEntry) -> Self {
        self.credits.insert(credit_id.to_string(), entry);
        self
    }

    pub fn entry_mut(&mut self, credit_id: &str) -> &mut CreditEntry {
        self.credits.entry(credit_id.to_string()).or_default()
    }
}

/// Documents in processing order. Later documents arrive later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSet {
    documents: Vec<Document>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub fn with(mut self, document: Document) -> Self {
        self.push(document);
        self
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, label: &str) -> Option<&Document> {
        self.documents.iter().find(|document| document.label == label)
    }

    pub(crate) fn get_mut(&mut self, label: &str) -> Option<&mut Document> {
        self.documents
            .iter_mut()
            .find(|document| document.label == label)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl FromIterator<Document> for DocumentSet {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}

/// One document's claim on a conflicting parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictCandidate {
    pub document: String,
    pub value: ParameterValue,
}

/// Parameter supplied by two or more documents; candidates are in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub parameter: String,
    pub candidates: Vec<ConflictCandidate>,
    pub resolved: bool,
}

impl Conflict {
    pub fn values_diverge(&self) -> bool {
        self.candidates
            .windows(2)
            .any(|pair| pair[0].value != pair[1].value)
    }

    pub fn candidate_from(&self, document: &str) -> Option<&ConflictCandidate> {
        self.candidates
            .iter()
            .find(|candidate| candidate.document == document)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMethod {
    PriorityBased,
    Latest,
    Manual,
    FirstOccurrence,
}

impl ResolutionMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PriorityBased => "priority-based",
            Self::Latest => "latest",
            Self::Manual => "manual",
            Self::FirstOccurrence => "first-occurrence",
        }
    }
}

impl fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionEntry {
    pub parameter: String,
    pub value: ParameterValue,
    pub source: String,
    pub method: ResolutionMethod,
}

/// Merged view of every document's contribution to one credit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedDataset {
    pub credit_id: String,
    pub parameters: ParameterMap,
    pub sources: BTreeMap<String, String>,
    pub conflicts: Vec<Conflict>,
    pub resolution_log: Vec<ResolutionEntry>,
    pub documents_processed: Vec<String>,
}

impl ConsolidatedDataset {
    pub fn unresolved_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|conflict| !conflict.resolved)
    }

    pub fn conflict(&self, parameter: &str) -> Option<&Conflict> {
        self.conflicts
            .iter()
            .find(|conflict| conflict.parameter == parameter)
    }

    pub fn source_of(&self, parameter: &str) -> Option<&str> {
        self.sources.get(parameter).map(String::as_str)
    }
}
