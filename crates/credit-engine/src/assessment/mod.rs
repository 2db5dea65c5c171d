//! Credit definitions, numeric formulas and the rule evaluator.

pub mod calculations;
pub mod catalog;
pub mod domain;
mod evaluation;

#[cfg(test)]
mod tests;

pub use calculations::{
    linear_reduction_percentage, refrigerant_impact, thermal_control_percentage,
    tiered_point_lookup, CalculationError, PointTier, RefrigerantFleet, RefrigerantGroup,
    RefrigerantImpact,
};
pub use catalog::{
    CalculationKind, CatalogError, CreditCatalog, CreditDefinition, GroupStrategy,
    ReductionMetric, Requirement, RequirementGroup,
};
pub use domain::{
    AssessmentResult, AssessmentStatus, ParameterMap, ParameterValue, UnitSystem,
    UnknownUnitSystem,
};
pub use evaluation::RuleEvaluator;
