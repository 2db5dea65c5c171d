use super::super::calculations::{
    linear_reduction_percentage, refrigerant_impact, thermal_control_percentage,
    tiered_point_lookup, CalculationError, RefrigerantGroup,
};
use super::super::catalog::{CalculationKind, Requirement, RequirementGroup};
use super::super::domain::{lookup, ParameterMap, ParameterValue, UnitSystem};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Findings for one requirement group. Never shared between groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct GroupOutcome {
    pub gaps: Vec<String>,
    pub non_compliant: Vec<String>,
    pub calculations: BTreeMap<String, Value>,
    pub tier_points: Option<u32>,
    pub disqualified: bool,
}

impl GroupOutcome {
    pub fn is_clear(&self) -> bool {
        !self.disqualified && self.gaps.is_empty() && self.non_compliant.is_empty()
    }

    fn gap(&mut self, parameter: &str) {
        if !self.gaps.iter().any(|existing| existing == parameter) {
            self.gaps.push(parameter.to_string());
        }
    }

    fn record(&mut self, key: &str, value: Value) {
        self.calculations.insert(key.to_string(), value);
    }
}

enum Flow {
    Continue,
    Abandon,
}

/// Walk every requirement of a group in declared order.
///
/// Only malformed calculation input escapes as an error; every other failure is
/// folded into the outcome.
pub(crate) fn walk_group(
    group: &RequirementGroup,
    parameters: &ParameterMap,
    unit_system: UnitSystem,
) -> Result<GroupOutcome, CalculationError> {
    let mut outcome = GroupOutcome::default();

    for requirement in &group.requirements {
        if let Flow::Abandon = apply(requirement, parameters, unit_system, &mut outcome)? {
            debug!(group = %group.label, "load-bearing requirement failed; group abandoned");
            outcome.disqualified = true;
            break;
        }
    }

    Ok(outcome)
}

fn apply(
    requirement: &Requirement,
    parameters: &ParameterMap,
    unit_system: UnitSystem,
    outcome: &mut GroupOutcome,
) -> Result<Flow, CalculationError> {
    let flow = match requirement {
        Requirement::Presence { parameter } => {
            if lookup(parameters, parameter).is_none() {
                outcome.gap(parameter);
            }
            Flow::Continue
        }
        Requirement::AllPresent { parameters: names } => {
            for name in names {
                if lookup(parameters, name).is_none() {
                    outcome.gap(name);
                }
            }
            Flow::Continue
        }
        Requirement::Equals {
            parameter,
            expected,
            load_bearing,
        } => {
            let verdict = lookup(parameters, parameter)
                .and_then(|actual| actual.matches(expected).map(|ok| (ok, actual)));
            match verdict {
                None => {
                    outcome.gap(parameter);
                    Flow::Continue
                }
                Some((true, _)) => Flow::Continue,
                Some((false, actual)) => fail(
                    outcome,
                    *load_bearing,
                    format!("{parameter} must be {expected} (found {actual})"),
                ),
            }
        }
        Requirement::LessThan {
            parameter,
            limit,
            load_bearing,
        } => match numeric(parameters, parameter) {
            None => {
                outcome.gap(parameter);
                Flow::Continue
            }
            Some(actual) if actual < *limit => Flow::Continue,
            Some(actual) => fail(
                outcome,
                *load_bearing,
                format!("{parameter} must be less than {limit} (found {actual})"),
            ),
        },
        Requirement::Range {
            parameter,
            min,
            max,
            load_bearing,
        } => match numeric(parameters, parameter) {
            None => {
                outcome.gap(parameter);
                Flow::Continue
            }
            Some(actual) if actual >= *min && actual <= *max => Flow::Continue,
            Some(actual) => fail(
                outcome,
                *load_bearing,
                format!("{parameter} must be between {min} and {max} (found {actual})"),
            ),
        },
        Requirement::Calculate {
            calculation,
            parameters: names,
        } => {
            calculate(calculation, names, parameters, unit_system, outcome)?;
            Flow::Continue
        }
    };

    Ok(flow)
}

fn numeric(parameters: &ParameterMap, name: &str) -> Option<f64> {
    lookup(parameters, name).and_then(ParameterValue::as_number)
}

fn fail(outcome: &mut GroupOutcome, load_bearing: bool, message: String) -> Flow {
    outcome.non_compliant.push(message);
    if load_bearing {
        Flow::Abandon
    } else {
        Flow::Continue
    }
}

fn calculate(
    kind: &CalculationKind,
    names: &[String],
    parameters: &ParameterMap,
    unit_system: UnitSystem,
    outcome: &mut GroupOutcome,
) -> Result<(), CalculationError> {
    if names.len() != kind.arity() {
        return Err(CalculationError::MalformedInput(format!(
            "{} calculation expects {} parameters, found {}",
            kind.label(),
            kind.arity(),
            names.len()
        )));
    }

    let mut inputs = Vec::with_capacity(names.len());
    for name in names {
        match numeric(parameters, name) {
            Some(value) => inputs.push(value),
            None => outcome.gap(name),
        }
    }
    if inputs.len() != names.len() {
        debug!(calculation = kind.label(), "skipped; inputs missing");
        return Ok(());
    }

    let result = match kind {
        CalculationKind::RefrigerantImpact => refrigerant(&inputs, unit_system, outcome),
        CalculationKind::ThermalControl { minimum_percentage } => {
            thermal_control_percentage(inputs[0], inputs[1]).map(|percentage| {
                outcome.record("thermal_control_percentage", json!(percentage));
                if percentage <= *minimum_percentage {
                    outcome.non_compliant.push(format!(
                        "Individual thermal comfort controls cover {percentage:.1}% of occupant spaces; more than {minimum_percentage}% is required"
                    ));
                }
            })
        }
        CalculationKind::LinearReduction {
            metric,
            minimum_percentage,
            tiers,
        } => linear_reduction_percentage(inputs[0], inputs[1]).map(|percentage| {
            let points = tiered_point_lookup(percentage, tiers);
            outcome.record(
                &format!("{}_reduction_percentage", metric.label()),
                json!(percentage),
            );
            outcome.record("tier_points", json!(points));
            if percentage < *minimum_percentage || points == 0 {
                outcome.non_compliant.push(format!(
                    "{} reduction of {percentage:.1}% is below the {minimum_percentage}% minimum",
                    capitalize(metric.label())
                ));
            } else {
                outcome.tier_points = Some(outcome.tier_points.unwrap_or(0) + points);
            }
        }),
    };

    match result {
        Ok(()) => Ok(()),
        Err(CalculationError::InvalidInput { field, reason }) => {
            outcome.non_compliant.push(format!(
                "{} calculation could not be completed: {field} {reason}",
                kind.label()
            ));
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn refrigerant(
    inputs: &[f64],
    unit_system: UnitSystem,
    outcome: &mut GroupOutcome,
) -> Result<(), CalculationError> {
    let group = match inputs {
        [gwp, odp, refrigerant_charge, leakage_rate_percent, equipment_life, cooling_capacity, quantity] => {
            RefrigerantGroup {
                gwp: *gwp,
                odp: *odp,
                refrigerant_charge: *refrigerant_charge,
                leakage_rate_percent: *leakage_rate_percent,
                equipment_life: *equipment_life,
                cooling_capacity: *cooling_capacity,
                quantity: *quantity,
            }
        }
        _ => {
            return Err(CalculationError::MalformedInput(format!(
                "refrigerant impact expects 7 inputs, found {}",
                inputs.len()
            )))
        }
    };

    let impact = refrigerant_impact(&group, unit_system)?;
    outcome.record("lcodp", json!(impact.lcodp));
    outcome.record("lcgwp", json!(impact.lcgwp));
    outcome.record("unit_impact", json!(impact.unit_impact));
    outcome.record("weighted_average", json!(impact.weighted_average));
    outcome.record("threshold", json!(impact.threshold));
    outcome.record("compliant", json!(impact.compliant));

    if !impact.compliant {
        outcome.non_compliant.push(format!(
            "Weighted average refrigerant impact {:.2} exceeds the {} threshold of {}",
            impact.weighted_average, unit_system, impact.threshold
        ));
    }
    Ok(())
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
