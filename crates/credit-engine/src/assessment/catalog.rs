use super::calculations::PointTier;
use super::domain::ParameterValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("credit '{0}' is not defined in the catalog")]
    UnknownCredit(String),
    #[error("credit '{credit}' rejected: {reason}")]
    Invalid { credit: String, reason: String },
    #[error("catalog definition is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// How a credit's requirement groups combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStrategy {
    /// Mutually exclusive paths; the first fully satisfied option wins.
    Option,
    /// Conjunctive sub-requirements; every part must pass.
    Parts,
}

impl GroupStrategy {
    pub const fn group_label(self) -> &'static str {
        match self {
            Self::Option => "Option",
            Self::Parts => "Part",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionMetric {
    Energy,
    Water,
}

impl ReductionMetric {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Energy => "energy",
            Self::Water => "water",
        }
    }
}

/// Formula invoked by a `Calculate` requirement. Parameters are positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationKind {
    /// `[GWP, ODP, charge, leakage %, life, capacity, quantity]`
    RefrigerantImpact,
    /// `[total spaces, controlled spaces]`; passes when strictly above the minimum.
    ThermalControl { minimum_percentage: f64 },
    /// `[baseline, design]`; awards the tier reached, non-compliant below the minimum.
    LinearReduction {
        metric: ReductionMetric,
        minimum_percentage: f64,
        tiers: Vec<PointTier>,
    },
}

impl CalculationKind {
    pub const fn arity(&self) -> usize {
        match self {
            Self::RefrigerantImpact => 7,
            Self::ThermalControl { .. } => 2,
            Self::LinearReduction { .. } => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RefrigerantImpact => "refrigerant impact",
            Self::ThermalControl { .. } => "thermal comfort control",
            Self::LinearReduction { metric, .. } => match metric {
                ReductionMetric::Energy => "energy reduction",
                ReductionMetric::Water => "water reduction",
            },
        }
    }
}

/// Declarative requirement node interpreted by the rule evaluator.
///
/// A `load_bearing` comparison that fails records its non-compliance message and
/// then disqualifies the whole group; later requirements in the group are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requirement {
    Presence {
        parameter: String,
    },
    Equals {
        parameter: String,
        expected: ParameterValue,
        #[serde(default)]
        load_bearing: bool,
    },
    LessThan {
        parameter: String,
        limit: f64,
        #[serde(default)]
        load_bearing: bool,
    },
    Range {
        parameter: String,
        min: f64,
        max: f64,
        #[serde(default)]
        load_bearing: bool,
    },
    AllPresent {
        parameters: Vec<String>,
    },
    Calculate {
        calculation: CalculationKind,
        parameters: Vec<String>,
    },
}

impl Requirement {
    pub fn presence(parameter: &str) -> Self {
        Self::Presence {
            parameter: parameter.to_string(),
        }
    }

    pub fn equals(parameter: &str, expected: impl Into<ParameterValue>) -> Self {
        Self::Equals {
            parameter: parameter.to_string(),
            expected: expected.into(),
            load_bearing: false,
        }
    }

    pub fn less_than(parameter: &str, limit: f64) -> Self {
        Self::LessThan {
            parameter: parameter.to_string(),
            limit,
            load_bearing: false,
        }
    }

    pub fn range(parameter: &str, min: f64, max: f64) -> Self {
        Self::Range {
            parameter: parameter.to_string(),
            min,
            max,
            load_bearing: false,
        }
    }

    pub fn all_present(parameters: &[&str]) -> Self {
        Self::AllPresent {
            parameters: parameters.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn calculate(calculation: CalculationKind, parameters: &[&str]) -> Self {
        Self::Calculate {
            calculation,
            parameters: parameters.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Mark a comparison as disqualifying. No effect on other node types.
    pub fn load_bearing(mut self) -> Self {
        match &mut self {
            Self::Equals { load_bearing, .. }
            | Self::LessThan { load_bearing, .. }
            | Self::Range { load_bearing, .. } => *load_bearing = true,
            Self::Presence { .. } | Self::AllPresent { .. } | Self::Calculate { .. } => {}
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementGroup {
    pub label: String,
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditDefinition {
    pub id: String,
    pub name: String,
    pub max_points: u32,
    pub parameters: Vec<String>,
    pub strategy: GroupStrategy,
    pub groups: Vec<RequirementGroup>,
}

impl CreditDefinition {
    pub fn recognizes(&self, parameter: &str) -> bool {
        self.parameters.iter().any(|name| name == parameter)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: String| CatalogError::Invalid {
            credit: self.id.clone(),
            reason,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("credit id must not be empty".to_string()));
        }
        if self.groups.is_empty() {
            return Err(invalid("at least one requirement group is required".to_string()));
        }

        for group in &self.groups {
            if group.requirements.is_empty() {
                return Err(invalid(format!("group '{}' has no requirements", group.label)));
            }
            for requirement in &group.requirements {
                if let Requirement::Calculate {
                    calculation,
                    parameters,
                } = requirement
                {
                    if parameters.len() != calculation.arity() {
                        return Err(invalid(format!(
                            "{} calculation in '{}' expects {} parameters, found {}",
                            calculation.label(),
                            group.label,
                            calculation.arity(),
                            parameters.len()
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Read-only set of credit definitions.
///
/// Snapshots share definitions through `Arc`; [`CreditCatalog::with_credit`] builds a
/// new snapshot and never touches one already handed to an evaluation.
#[derive(Debug, Clone)]
pub struct CreditCatalog {
    credits: Arc<BTreeMap<String, Arc<CreditDefinition>>>,
}

impl CreditCatalog {
    pub fn standard() -> Self {
        let credits = standard_credit_definitions()
            .into_iter()
            .map(|definition| (definition.id.clone(), Arc::new(definition)))
            .collect();
        Self {
            credits: Arc::new(credits),
        }
    }

    pub fn from_definitions(definitions: Vec<CreditDefinition>) -> Result<Self, CatalogError> {
        let mut credits = BTreeMap::new();
        for definition in definitions {
            definition.validate()?;
            if credits.contains_key(&definition.id) {
                return Err(CatalogError::Invalid {
                    credit: definition.id,
                    reason: "duplicate credit id".to_string(),
                });
            }
            credits.insert(definition.id.clone(), Arc::new(definition));
        }
        Ok(Self {
            credits: Arc::new(credits),
        })
    }

    /// Load a JSON array of credit definitions.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let definitions: Vec<CreditDefinition> = serde_json::from_reader(reader)?;
        Self::from_definitions(definitions)
    }

    pub fn get(&self, credit_id: &str) -> Result<Arc<CreditDefinition>, CatalogError> {
        self.credits
            .get(credit_id)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownCredit(credit_id.to_string()))
    }

    pub fn credits(&self) -> impl Iterator<Item = &CreditDefinition> {
        self.credits.values().map(|definition| definition.as_ref())
    }

    pub fn len(&self) -> usize {
        self.credits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credits.is_empty()
    }

    /// New snapshot containing `definition`, replacing any credit with the same id.
    pub fn with_credit(&self, definition: CreditDefinition) -> Result<Self, CatalogError> {
        definition.validate()?;
        let mut credits = (*self.credits).clone();
        credits.insert(definition.id.clone(), Arc::new(definition));
        Ok(Self {
            credits: Arc::new(credits),
        })
    }
}

impl Default for CreditCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn names(parameters: &[&str]) -> Vec<String> {
    parameters.iter().map(|name| name.to_string()).collect()
}

const REFRIGERANT_PARAMETERS: [&str; 7] = [
    "GWP",
    "ODP",
    "Refrigerant charge",
    "Leakage Rate",
    "Equipment Life",
    "Equipment Cooling Capacity",
    "Equipment Quantity",
];

fn standard_credit_definitions() -> Vec<CreditDefinition> {
    vec![
        CreditDefinition {
            id: "EAc6".to_string(),
            name: "Enhanced Refrigerant Management".to_string(),
            max_points: 1,
            parameters: names(&[
                "Refrigerant Used",
                "ODP",
                "GWP",
                "Confirmation Statement",
                "Refrigerant charge",
                "Leakage Rate",
                "Equipment Life",
                "Equipment Cooling Capacity",
                "Equipment Quantity",
            ]),
            strategy: GroupStrategy::Option,
            groups: vec![
                RequirementGroup {
                    label: "No refrigerants or low-impact refrigerants".to_string(),
                    requirements: vec![
                        Requirement::presence("Refrigerant Used"),
                        Requirement::equals("ODP", 0).load_bearing(),
                        Requirement::less_than("GWP", 50.0).load_bearing(),
                        Requirement::equals("Confirmation Statement", "Yes"),
                    ],
                },
                RequirementGroup {
                    label: "Weighted refrigerant impact calculation".to_string(),
                    requirements: vec![Requirement::calculate(
                        CalculationKind::RefrigerantImpact,
                        &REFRIGERANT_PARAMETERS,
                    )],
                },
            ],
        },
        CreditDefinition {
            id: "EQc5".to_string(),
            name: "Thermal Comfort".to_string(),
            max_points: 1,
            parameters: names(&[
                "ASHRAE 55 Compliance",
                "Design Conditions",
                "Total Individual Spaces",
                "Controlled Spaces",
                "Multi-Occupant Controls",
            ]),
            strategy: GroupStrategy::Parts,
            groups: vec![
                RequirementGroup {
                    label: "Thermal comfort design".to_string(),
                    requirements: vec![
                        Requirement::equals("ASHRAE 55 Compliance", "Yes"),
                        Requirement::presence("Design Conditions"),
                    ],
                },
                RequirementGroup {
                    label: "Thermal comfort control".to_string(),
                    requirements: vec![
                        Requirement::calculate(
                            CalculationKind::ThermalControl {
                                minimum_percentage: 50.0,
                            },
                            &["Total Individual Spaces", "Controlled Spaces"],
                        ),
                        Requirement::equals("Multi-Occupant Controls", "Yes"),
                    ],
                },
            ],
        },
        CreditDefinition {
            id: "EAc2".to_string(),
            name: "Optimize Energy Performance".to_string(),
            max_points: 18,
            parameters: names(&["Baseline Energy Cost", "Proposed Energy Cost"]),
            strategy: GroupStrategy::Option,
            groups: vec![RequirementGroup {
                label: "Whole-building energy simulation".to_string(),
                requirements: vec![Requirement::calculate(
                    CalculationKind::LinearReduction {
                        metric: ReductionMetric::Energy,
                        minimum_percentage: 6.0,
                        tiers: energy_tiers(),
                    },
                    &["Baseline Energy Cost", "Proposed Energy Cost"],
                )],
            }],
        },
        CreditDefinition {
            id: "WEc2".to_string(),
            name: "Indoor Water Use Reduction".to_string(),
            max_points: 6,
            parameters: names(&["Fixture Schedule", "Baseline Water Use", "Design Water Use"]),
            strategy: GroupStrategy::Option,
            groups: vec![RequirementGroup {
                label: "Fixture and fitting reduction".to_string(),
                requirements: vec![
                    Requirement::presence("Fixture Schedule"),
                    Requirement::calculate(
                        CalculationKind::LinearReduction {
                            metric: ReductionMetric::Water,
                            minimum_percentage: 25.0,
                            tiers: water_tiers(),
                        },
                        &["Baseline Water Use", "Design Water Use"],
                    ),
                ],
            }],
        },
    ]
}

fn energy_tiers() -> Vec<PointTier> {
    [
        (6.0, 1),
        (8.0, 2),
        (10.0, 3),
        (12.0, 4),
        (14.0, 5),
        (16.0, 6),
        (18.0, 7),
        (20.0, 8),
        (22.0, 9),
        (24.0, 10),
        (26.0, 11),
        (29.0, 12),
        (32.0, 13),
        (35.0, 14),
        (38.0, 15),
        (42.0, 16),
        (46.0, 17),
        (50.0, 18),
    ]
    .into_iter()
    .map(|(threshold, points)| PointTier::new(threshold, points))
    .collect()
}

fn water_tiers() -> Vec<PointTier> {
    [(25.0, 1), (30.0, 2), (35.0, 3), (40.0, 4), (45.0, 5), (50.0, 6)]
        .into_iter()
        .map(|(threshold, points)| PointTier::new(threshold, points))
        .collect()
}
