use crate::assessment::AssessmentResult;
use crate::consolidation::ConsolidatedDataset;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    MissingData,
    NonCompliance,
    DataConflicts,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

/// Advisory message attached to an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: RecommendationPriority,
    pub message: String,
    pub action: String,
}

/// Every applicable advisory, in the order missing data, non-compliance, conflicts, success.
pub fn generate(result: &AssessmentResult, dataset: &ConsolidatedDataset) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if !result.gaps.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::MissingData,
            priority: RecommendationPriority::High,
            message: format!(
                "{} required parameter{} missing for {}: {}",
                result.gaps.len(),
                plural(result.gaps.len()),
                result.credit_name,
                result.gaps.join(", ")
            ),
            action: "Upload documentation that states the missing values".to_string(),
        });
    }

    if !result.non_compliant.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::NonCompliance,
            priority: RecommendationPriority::High,
            message: format!(
                "{} requirement{} not met: {}",
                result.non_compliant.len(),
                plural(result.non_compliant.len()),
                result.non_compliant.join("; ")
            ),
            action: "Revise the design or equipment selection, then resubmit supporting documents"
                .to_string(),
        });
    }

    if !dataset.conflicts.is_empty() {
        let unresolved = dataset.unresolved_conflicts().count();
        let parameters: Vec<&str> = dataset
            .conflicts
            .iter()
            .map(|conflict| conflict.parameter.as_str())
            .collect();
        let action = if unresolved > 0 {
            format!("Choose the authoritative document for {unresolved} unresolved parameter(s)")
        } else {
            "Confirm the resolved values match the final design documents".to_string()
        };
        recommendations.push(Recommendation {
            kind: RecommendationKind::DataConflicts,
            priority: RecommendationPriority::Medium,
            message: format!(
                "{} parameter{} reported by more than one document: {}",
                parameters.len(),
                plural(parameters.len()),
                parameters.join(", ")
            ),
            action,
        });
    }

    if result.awarded {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Success,
            priority: RecommendationPriority::Low,
            message: format!(
                "{} achieved with {} of {} point{}",
                result.credit_name,
                result.points,
                result.max_points,
                plural(result.max_points as usize)
            ),
            action: "Archive the supporting documents with the credit submission".to_string(),
        });
    }

    recommendations
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
