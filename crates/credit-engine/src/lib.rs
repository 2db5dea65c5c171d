pub mod assessment;
pub mod config;
pub mod consolidation;
pub mod error;
pub mod pipeline;
pub mod recommendations;
pub mod telemetry;

pub use assessment::{
    AssessmentResult, AssessmentStatus, CreditCatalog, ParameterMap, ParameterValue,
    RuleEvaluator, UnitSystem,
};
pub use consolidation::{ConsolidatedDataset, Consolidator, DocumentSet, ResolutionPolicy};
pub use pipeline::{AssessmentError, AssessmentPipeline, CreditReport};
