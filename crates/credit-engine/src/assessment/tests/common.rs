use crate::assessment::catalog::{CreditCatalog, CreditDefinition};
use crate::assessment::domain::{AssessmentResult, ParameterMap, ParameterValue, UnitSystem};
use crate::assessment::evaluation::RuleEvaluator;

pub(super) fn catalog() -> CreditCatalog {
    CreditCatalog::standard()
}

pub(super) fn definition(credit_id: &str) -> CreditDefinition {
    catalog()
        .get(credit_id)
        .expect("standard credit defined")
        .as_ref()
        .clone()
}

pub(super) fn parameters(values: &[(&str, ParameterValue)]) -> ParameterMap {
    values
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

pub(super) fn number(value: f64) -> ParameterValue {
    ParameterValue::Number(value)
}

pub(super) fn text(value: &str) -> ParameterValue {
    ParameterValue::text(value)
}

pub(super) fn evaluate(credit_id: &str, values: &[(&str, ParameterValue)]) -> AssessmentResult {
    evaluate_in(credit_id, values, UnitSystem::Imperial)
}

pub(super) fn evaluate_in(
    credit_id: &str,
    values: &[(&str, ParameterValue)],
    unit_system: UnitSystem,
) -> AssessmentResult {
    RuleEvaluator::new().evaluate(&definition(credit_id), &parameters(values), unit_system)
}

/// Chiller fleet whose weighted impact is far above the Imperial threshold.
pub(super) fn high_gwp_fleet() -> Vec<(&'static str, ParameterValue)> {
    vec![
        ("GWP", number(2088.0)),
        ("ODP", number(0.0)),
        ("Refrigerant charge", number(8.0)),
        ("Leakage Rate", number(15.0)),
        ("Equipment Life", number(15.0)),
        ("Equipment Cooling Capacity", number(25.0)),
        ("Equipment Quantity", number(10.0)),
    ]
}

/// Fleet with weighted impact 21: compliant in IP, non-compliant in SI.
pub(super) fn moderate_fleet() -> Vec<(&'static str, ParameterValue)> {
    vec![
        ("GWP", number(60.0)),
        ("ODP", number(0.0)),
        ("Refrigerant charge", number(5.0)),
        ("Leakage Rate", number(2.0)),
        ("Equipment Life", number(20.0)),
        ("Equipment Cooling Capacity", number(10.0)),
        ("Equipment Quantity", number(2.0)),
    ]
}

pub(super) fn assert_award_invariant(result: &AssessmentResult) {
    if result.awarded {
        assert!(result.gaps.is_empty(), "awarded result has gaps: {result:?}");
        assert!(
            result.non_compliant.is_empty(),
            "awarded result has non-compliance: {result:?}"
        );
        assert!(result.points > 0);
    } else {
        assert_eq!(result.points, 0);
    }
}
