use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Measurement convention the submitted values are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitSystem {
    #[default]
    #[serde(rename = "IP", alias = "ip")]
    Imperial,
    #[serde(rename = "SI", alias = "si")]
    Metric,
}

impl UnitSystem {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Imperial => "IP",
            Self::Metric => "SI",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUnitSystem(pub String);

impl fmt::Display for UnknownUnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown unit system '{}' (expected IP or SI)", self.0)
    }
}

impl std::error::Error for UnknownUnitSystem {}

impl FromStr for UnitSystem {
    type Err = UnknownUnitSystem;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IP" | "IMPERIAL" => Ok(Self::Imperial),
            "SI" | "METRIC" => Ok(Self::Metric),
            _ => Err(UnknownUnitSystem(value.to_string())),
        }
    }
}

/// Scalar supplied for a credit parameter.
///
/// `null`, a missing key and an empty string are the same "absent" state; callers
/// should go through [`ParameterValue::is_empty`] rather than matching variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Text(String),
    Null,
}

impl ParameterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Locale-free numeric view of the value. Non-finite and non-numeric values yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        let number = match self {
            Self::Number(number) => *number,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
            Self::Null => return None,
        };
        number.is_finite().then_some(number)
    }

    /// Interpret a raw sheet cell: numeric-looking cells become numbers.
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// Equality used by `Equals` requirements: numeric when the expectation is
    /// numeric, otherwise trimmed and case-insensitive.
    pub(crate) fn matches(&self, expected: &ParameterValue) -> Option<bool> {
        match expected {
            ParameterValue::Number(target) => self.as_number().map(|actual| actual == *target),
            ParameterValue::Text(target) => match self {
                ParameterValue::Text(actual) => {
                    Some(actual.trim().eq_ignore_ascii_case(target.trim()))
                }
                ParameterValue::Number(actual) => Some(
                    target
                        .trim()
                        .parse::<f64>()
                        .map(|parsed| parsed == *actual)
                        .unwrap_or(false),
                ),
                ParameterValue::Null => None,
            },
            ParameterValue::Null => Some(self.is_empty()),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Number(number) => write!(f, "{number}"),
            ParameterValue::Text(text) => f.write_str(text),
            ParameterValue::Null => f.write_str("(empty)"),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Flat parameter map the evaluator consumes.
pub type ParameterMap = BTreeMap<String, ParameterValue>;

pub(crate) fn lookup<'a>(parameters: &'a ParameterMap, name: &str) -> Option<&'a ParameterValue> {
    parameters.get(name).filter(|value| !value.is_empty())
}

/// Terminal state of a single credit evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Compliant,
    NonCompliant,
    Gaps,
    Error,
}

impl AssessmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compliant => "Compliant",
            Self::NonCompliant => "Non-compliant",
            Self::Gaps => "Missing information",
            Self::Error => "Error",
        }
    }
}

/// Verdict for one credit. Immutable once returned by the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub credit_id: String,
    pub credit_name: String,
    pub awarded: bool,
    pub points: u32,
    pub max_points: u32,
    pub status: AssessmentStatus,
    /// 1-based option used (winning option, or the last one evaluated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<usize>,
    pub gaps: Vec<String>,
    pub non_compliant: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub calculations: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssessmentResult {
    pub fn summary(&self) -> String {
        match self.status {
            AssessmentStatus::Compliant => match self.option {
                Some(option) => format!(
                    "{} ({}) achieved via option {option}: {} of {} point(s)",
                    self.credit_name, self.credit_id, self.points, self.max_points
                ),
                None => format!(
                    "{} ({}) achieved: {} of {} point(s)",
                    self.credit_name, self.credit_id, self.points, self.max_points
                ),
            },
            AssessmentStatus::NonCompliant => format!(
                "{} ({}) not achieved: {} requirement(s) not met",
                self.credit_name,
                self.credit_id,
                self.non_compliant.len()
            ),
            AssessmentStatus::Gaps => format!(
                "{} ({}) incomplete: missing {}",
                self.credit_name,
                self.credit_id,
                self.gaps.join(", ")
            ),
            AssessmentStatus::Error => format!(
                "{} ({}) could not be evaluated: {}",
                self.credit_name,
                self.credit_id,
                self.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
