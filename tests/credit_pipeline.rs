use approx::assert_relative_eq;
use credit_engine::consolidation::{parse_documents, validate_documents, StructuralError};
use credit_engine::{AssessmentPipeline, AssessmentStatus, ResolutionPolicy, UnitSystem};
use serde_json::json;

fn submittal_package() -> serde_json::Value {
    json!({
        "Chiller Submittal": {
            "EAc6": {
                "declaredParameters": [
                    "GWP", "ODP", "Refrigerant charge", "Leakage Rate",
                    "Equipment Life", "Equipment Cooling Capacity", "Equipment Quantity"
                ],
                "values": {
                    "GWP": 2088, "ODP": 0, "Refrigerant charge": 8, "Leakage Rate": 15,
                    "Equipment Life": 15, "Equipment Cooling Capacity": 25, "Equipment Quantity": 10
                }
            }
        },
        "Design Narrative": {
            "EAc6": {
                "declaredParameters": ["Refrigerant Used", "GWP"],
                "values": {"Refrigerant Used": "R-410A", "GWP": 2088}
            },
            "EQc5": "see mechanical drawings"
        },
        "Photo Log": []
    })
}

#[test]
fn structural_errors_do_not_stop_the_assessment() {
    let raw = submittal_package();

    let errors = validate_documents(&raw).expect("object input");
    assert_eq!(errors.len(), 2);
    assert!(errors.contains(&StructuralError::DocumentNotObject {
        document: "Photo Log".to_string()
    }));

    let (documents, _) = parse_documents(&raw).expect("object input");
    let report = AssessmentPipeline::default()
        .run(
            &documents,
            "EAc6",
            &ResolutionPolicy::priority(),
            UnitSystem::Imperial,
        )
        .expect("pipeline runs");

    assert_eq!(
        report.consolidation.documents_processed,
        ["Chiller Submittal", "Design Narrative"]
    );
    assert_eq!(report.consolidation.source_of("GWP"), Some("Chiller Submittal"));
    assert!(!report.consolidation.conflicts[0].values_diverge());

    let assessment = &report.assessment;
    assert_eq!(assessment.status, AssessmentStatus::NonCompliant);
    assert_eq!(assessment.option, Some(2));
    assert_eq!(assessment.non_compliant.len(), 1);
    assert!(assessment.gaps.is_empty());
    assert_relative_eq!(
        assessment.calculations["weighted_average"]
            .as_f64()
            .expect("numeric average"),
        3619.2,
        epsilon = 1e-6
    );
}

#[test]
fn non_object_input_is_rejected_outright() {
    assert!(parse_documents(&json!(["Chiller Submittal"])).is_err());
}
