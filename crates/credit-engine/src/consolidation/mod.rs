//! Multi-document parameter consolidation.
//!
//! Documents are merged in processing order. Every parameter supplied by more than
//! one document becomes a [`Conflict`]; a [`ResolutionPolicy`] then decides which
//! candidate feeds the evaluator.

pub mod domain;
mod loader;
mod resolution;
mod sheet;

pub use domain::{
    Conflict, ConflictCandidate, ConsolidatedDataset, CreditEntry, Document, DocumentSet,
    ResolutionEntry, ResolutionMethod,
};
pub use loader::{
    parse_documents, read_documents_json, validate_documents, DocumentLoadError, StructuralError,
};
pub use resolution::{PolicySpec, PriorityTable, ResolutionPolicy, DEFAULT_UNMATCHED_PRIORITY};
pub use sheet::{read_parameter_map, read_parameter_sheet};

use tracing::{debug, info, warn};

/// Stateless merger of per-document credit parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Consolidator;

impl Consolidator {
    pub fn new() -> Self {
        Self
    }

    /// Merge and resolve in one step.
    pub fn consolidate(
        &self,
        documents: &DocumentSet,
        credit_id: &str,
        policy: &ResolutionPolicy,
    ) -> ConsolidatedDataset {
        let mut dataset = self.merge(documents, credit_id);
        self.resolve(&mut dataset, policy);
        dataset
    }

    /// Record first-seen values and collect conflicts, without resolving them.
    pub fn merge(&self, documents: &DocumentSet, credit_id: &str) -> ConsolidatedDataset {
        let mut dataset = ConsolidatedDataset {
            credit_id: credit_id.to_string(),
            ..ConsolidatedDataset::default()
        };

        for document in documents.documents() {
            let Some(entry) = document.credits.get(credit_id) else {
                continue;
            };
            dataset.documents_processed.push(document.label.clone());

            for (parameter, value) in entry.supplied() {
                match dataset.sources.get(parameter) {
                    None => {
                        dataset
                            .parameters
                            .insert(parameter.to_string(), value.clone());
                        dataset
                            .sources
                            .insert(parameter.to_string(), document.label.clone());
                    }
                    Some(first_source) => {
                        let candidate = ConflictCandidate {
                            document: document.label.clone(),
                            value: value.clone(),
                        };
                        match dataset
                            .conflicts
                            .iter_mut()
                            .find(|conflict| conflict.parameter == parameter)
                        {
                            Some(conflict) => conflict.candidates.push(candidate),
                            None => {
                                let first = ConflictCandidate {
                                    document: first_source.clone(),
                                    value: dataset.parameters[parameter].clone(),
                                };
                                dataset.conflicts.push(Conflict {
                                    parameter: parameter.to_string(),
                                    candidates: vec![first, candidate],
                                    resolved: false,
                                });
                            }
                        }
                        debug!(parameter, document = %document.label, "conflicting source recorded");
                    }
                }
            }
        }

        info!(
            credit = credit_id,
            documents = dataset.documents_processed.len(),
            parameters = dataset.parameters.len(),
            conflicts = dataset.conflicts.len(),
            "documents merged"
        );
        dataset
    }

    /// Apply a policy to every unresolved conflict. Values never become empty: an
    /// unresolvable conflict keeps its first recorded value and source.
    pub fn resolve(&self, dataset: &mut ConsolidatedDataset, policy: &ResolutionPolicy) {
        for conflict in dataset.conflicts.iter_mut().filter(|conflict| !conflict.resolved) {
            let Some((candidate, method)) = policy.choose(conflict) else {
                if let ResolutionPolicy::Manual(choices) = policy {
                    if let Some(document) = choices.get(&conflict.parameter) {
                        warn!(
                            parameter = %conflict.parameter,
                            document = %document,
                            "manual choice is not a candidate; conflict left unresolved"
                        );
                    }
                }
                continue;
            };

            dataset
                .parameters
                .insert(conflict.parameter.clone(), candidate.value.clone());
            dataset
                .sources
                .insert(conflict.parameter.clone(), candidate.document.clone());
            dataset.resolution_log.push(ResolutionEntry {
                parameter: conflict.parameter.clone(),
                value: candidate.value.clone(),
                source: candidate.document.clone(),
                method,
            });
            conflict.resolved = true;
        }

        info!(
            credit = %dataset.credit_id,
            resolved = dataset.resolution_log.len(),
            unresolved = dataset.unresolved_conflicts().count(),
            "conflicts resolved"
        );
    }
}
