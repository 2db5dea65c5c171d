use super::super::calculations::CalculationError;
use super::super::catalog::CreditDefinition;
use super::super::domain::{ParameterMap, UnitSystem};
use super::rules::{walk_group, GroupOutcome};
use tracing::debug;

/// Outcome of applying a group strategy to a credit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StrategyVerdict {
    pub awarded: bool,
    /// 1-based option reported (winner, or last evaluated).
    pub option: Option<usize>,
    pub outcome: GroupOutcome,
}

/// First fully satisfied option wins. Findings are kept per option; when none
/// succeeds only the last evaluated option is reported.
pub(crate) fn first_satisfied_option(
    definition: &CreditDefinition,
    parameters: &ParameterMap,
    unit_system: UnitSystem,
) -> Result<StrategyVerdict, CalculationError> {
    let mut last = StrategyVerdict {
        awarded: false,
        option: None,
        outcome: GroupOutcome::default(),
    };

    for (index, group) in definition.groups.iter().enumerate() {
        let option = index + 1;
        let outcome = walk_group(group, parameters, unit_system)?;

        if outcome.is_clear() {
            debug!(credit = %definition.id, option, "option satisfied");
            return Ok(StrategyVerdict {
                awarded: true,
                option: Some(option),
                outcome,
            });
        }

        debug!(
            credit = %definition.id,
            option,
            gaps = outcome.gaps.len(),
            non_compliant = outcome.non_compliant.len(),
            disqualified = outcome.disqualified,
            "option not satisfied"
        );
        last = StrategyVerdict {
            awarded: false,
            option: Some(option),
            outcome,
        };
    }

    Ok(last)
}

/// Every part is evaluated; findings are concatenated in declared order.
pub(crate) fn all_parts(
    definition: &CreditDefinition,
    parameters: &ParameterMap,
    unit_system: UnitSystem,
) -> Result<StrategyVerdict, CalculationError> {
    let mut combined = GroupOutcome::default();
    let mut every_part_clear = true;

    for (index, group) in definition.groups.iter().enumerate() {
        let outcome = walk_group(group, parameters, unit_system)?;
        debug!(
            credit = %definition.id,
            part = index + 1,
            clear = outcome.is_clear(),
            "part evaluated"
        );

        every_part_clear &= outcome.is_clear();
        combined.gaps.extend(outcome.gaps);
        combined.non_compliant.extend(outcome.non_compliant);
        combined.calculations.extend(outcome.calculations);
        if let Some(points) = outcome.tier_points {
            combined.tier_points = Some(combined.tier_points.unwrap_or(0) + points);
        }
    }

    let awarded =
        every_part_clear && combined.gaps.is_empty() && combined.non_compliant.is_empty();

    Ok(StrategyVerdict {
        awarded,
        option: None,
        outcome: combined,
    })
}
