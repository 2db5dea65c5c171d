use crate::assessment::{
    AssessmentResult, CatalogError, CreditCatalog, ParameterMap, RuleEvaluator, UnitSystem,
};
use crate::consolidation::{
    ConsolidatedDataset, Consolidator, Document, DocumentSet, ResolutionPolicy,
};
use crate::recommendations::{self, Recommendation};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("document '{0}' is not part of the document set")]
    UnknownDocument(String),
}

/// Combined output of consolidation, evaluation and recommendations for one credit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditReport {
    pub unit_system: UnitSystem,
    pub assessment: AssessmentResult,
    pub consolidation: ConsolidatedDataset,
    pub recommendations: Vec<Recommendation>,
}

/// Documents → consolidated parameters → verdict → advice.
#[derive(Debug, Clone, Default)]
pub struct AssessmentPipeline {
    catalog: CreditCatalog,
    evaluator: RuleEvaluator,
    consolidator: Consolidator,
}

impl AssessmentPipeline {
    pub fn new(catalog: CreditCatalog) -> Self {
        Self {
            catalog,
            evaluator: RuleEvaluator::new(),
            consolidator: Consolidator::new(),
        }
    }

    pub fn catalog(&self) -> &CreditCatalog {
        &self.catalog
    }

    pub fn evaluate_parameters(
        &self,
        credit_id: &str,
        parameters: &ParameterMap,
        unit_system: UnitSystem,
    ) -> Result<AssessmentResult, AssessmentError> {
        let definition = self.catalog.get(credit_id)?;
        Ok(self.evaluator.evaluate(&definition, parameters, unit_system))
    }

    pub fn consolidate(
        &self,
        documents: &DocumentSet,
        credit_id: &str,
        policy: &ResolutionPolicy,
    ) -> Result<ConsolidatedDataset, AssessmentError> {
        let definition = self.catalog.get(credit_id)?;
        let dataset = self.consolidator.consolidate(documents, credit_id, policy);
        for parameter in dataset.parameters.keys() {
            if !definition.recognizes(parameter) {
                debug!(credit = credit_id, parameter = %parameter, "parameter not used by credit");
            }
        }
        Ok(dataset)
    }

    pub fn run(
        &self,
        documents: &DocumentSet,
        credit_id: &str,
        policy: &ResolutionPolicy,
        unit_system: UnitSystem,
    ) -> Result<CreditReport, AssessmentError> {
        let consolidation = self.consolidate(documents, credit_id, policy)?;
        let assessment =
            self.evaluate_parameters(credit_id, &consolidation.parameters, unit_system)?;
        let recommendations = recommendations::generate(&assessment, &consolidation);

        Ok(CreditReport {
            unit_system,
            assessment,
            consolidation,
            recommendations,
        })
    }
}

impl DocumentSet {
    pub fn require(&self, label: &str) -> Result<&Document, AssessmentError> {
        self.get(label)
            .ok_or_else(|| AssessmentError::UnknownDocument(label.to_string()))
    }
}
