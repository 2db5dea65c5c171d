mod policy;
mod rules;

use super::catalog::{CreditDefinition, GroupStrategy};
use super::domain::{AssessmentResult, AssessmentStatus, ParameterMap, UnitSystem};
use policy::{all_parts, first_satisfied_option};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Stateless interpreter of credit requirement trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEvaluator;

impl RuleEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        definition: &CreditDefinition,
        parameters: &ParameterMap,
        unit_system: UnitSystem,
    ) -> AssessmentResult {
        let verdict = match definition.strategy {
            GroupStrategy::Option => first_satisfied_option(definition, parameters, unit_system),
            GroupStrategy::Parts => all_parts(definition, parameters, unit_system),
        };

        let verdict = match verdict {
            Ok(verdict) => verdict,
            Err(err) => {
                warn!(credit = %definition.id, error = %err, "evaluation aborted");
                return AssessmentResult {
                    credit_id: definition.id.clone(),
                    credit_name: definition.name.clone(),
                    awarded: false,
                    points: 0,
                    max_points: definition.max_points,
                    status: AssessmentStatus::Error,
                    option: None,
                    gaps: Vec::new(),
                    non_compliant: Vec::new(),
                    calculations: BTreeMap::new(),
                    error: Some(err.to_string()),
                };
            }
        };

        let outcome = verdict.outcome;
        let awarded =
            verdict.awarded && outcome.gaps.is_empty() && outcome.non_compliant.is_empty();
        let points = if awarded {
            outcome
                .tier_points
                .map(|points| points.min(definition.max_points))
                .unwrap_or(definition.max_points)
        } else {
            0
        };
        let status = if awarded {
            AssessmentStatus::Compliant
        } else if !outcome.non_compliant.is_empty() || outcome.gaps.is_empty() {
            AssessmentStatus::NonCompliant
        } else {
            AssessmentStatus::Gaps
        };

        info!(
            credit = %definition.id,
            units = %unit_system,
            status = status.label(),
            points,
            option = ?verdict.option,
            gaps = outcome.gaps.len(),
            non_compliant = outcome.non_compliant.len(),
            "credit evaluated"
        );

        AssessmentResult {
            credit_id: definition.id.clone(),
            credit_name: definition.name.clone(),
            awarded,
            points,
            max_points: definition.max_points,
            status,
            option: verdict.option,
            gaps: outcome.gaps,
            non_compliant: outcome.non_compliant,
            calculations: outcome.calculations,
            error: None,
        }
    }
}
