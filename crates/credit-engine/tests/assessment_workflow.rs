use credit_engine::consolidation::{
    read_documents_json, CreditEntry, Document, PolicySpec, ResolutionMethod,
};
use credit_engine::recommendations::RecommendationKind;
use credit_engine::{
    AssessmentError, AssessmentPipeline, AssessmentStatus, CreditCatalog, DocumentSet,
    ParameterValue, ResolutionPolicy, UnitSystem,
};
use std::collections::BTreeMap;
use std::io::Cursor;

fn entry(values: &[(&str, ParameterValue)]) -> CreditEntry {
    let mut entry = CreditEntry::default();
    for (name, value) in values {
        entry.declare(name, value.clone());
    }
    entry
}

/// Three submittals for one chiller plant. The schedule and narrative disagree on GWP,
/// and the winning value decides the credit.
fn chiller_documents() -> DocumentSet {
    DocumentSet::new()
        .with(Document::new("Mechanical Schedule").with_credit(
            "EAc6",
            entry(&[
                ("GWP", 675.into()),
                ("ODP", 0.into()),
                ("Refrigerant charge", 2.1.into()),
                ("Leakage Rate", 2.into()),
                ("Equipment Life", 20.into()),
                ("Equipment Cooling Capacity", 10.into()),
                ("Equipment Quantity", 2.into()),
            ]),
        ))
        .with(Document::new("Design Narrative").with_credit(
            "EAc6",
            entry(&[("GWP", 700.into()), ("Refrigerant Used", "R-410A".into())]),
        ))
        .with(Document::new("Commissioning Letter").with_credit(
            "EAc6",
            entry(&[("Confirmation Statement", "Yes".into())]),
        ))
}

#[test]
fn priority_resolution_feeds_the_evaluator() {
    let pipeline = AssessmentPipeline::new(CreditCatalog::standard());

    let report = pipeline
        .run(
            &chiller_documents(),
            "EAc6",
            &ResolutionPolicy::priority(),
            UnitSystem::Imperial,
        )
        .expect("pipeline runs");

    let consolidation = &report.consolidation;
    assert_eq!(consolidation.parameters["GWP"], ParameterValue::Number(675.0));
    assert_eq!(consolidation.source_of("GWP"), Some("Mechanical Schedule"));
    assert_eq!(
        consolidation.resolution_log[0].method,
        ResolutionMethod::PriorityBased
    );
    assert_eq!(
        consolidation.documents_processed,
        ["Mechanical Schedule", "Design Narrative", "Commissioning Letter"]
    );

    let assessment = &report.assessment;
    assert!(assessment.awarded, "expected award: {assessment:?}");
    assert_eq!(assessment.option, Some(2));
    assert_eq!(assessment.points, 1);

    let kinds: Vec<_> = report
        .recommendations
        .iter()
        .map(|recommendation| recommendation.kind)
        .collect();
    assert_eq!(
        kinds,
        [RecommendationKind::DataConflicts, RecommendationKind::Success]
    );
}

#[test]
fn latest_resolution_changes_the_verdict() {
    let pipeline = AssessmentPipeline::default();

    let report = pipeline
        .run(
            &chiller_documents(),
            "EAc6",
            &ResolutionPolicy::Latest,
            UnitSystem::Imperial,
        )
        .expect("pipeline runs");

    assert_eq!(
        report.consolidation.parameters["GWP"],
        ParameterValue::Number(700.0)
    );
    assert_eq!(report.assessment.status, AssessmentStatus::NonCompliant);
    assert_eq!(report.assessment.non_compliant.len(), 1);
    assert_eq!(
        report.recommendations[0].kind,
        RecommendationKind::NonCompliance
    );
}

#[test]
fn manual_choice_from_policy_spec() {
    let mut spec = PolicySpec::new("manual");
    spec.manual_choices
        .insert("GWP".to_string(), "Design Narrative".to_string());
    let policy = ResolutionPolicy::from_spec(&spec, 0);

    let report = AssessmentPipeline::default()
        .run(&chiller_documents(), "EAc6", &policy, UnitSystem::Imperial)
        .expect("pipeline runs");

    assert_eq!(report.consolidation.source_of("GWP"), Some("Design Narrative"));
    assert_eq!(
        report.consolidation.resolution_log[0].method,
        ResolutionMethod::Manual
    );
    assert!(!report.assessment.awarded);
}

#[test]
fn manual_policy_without_choice_keeps_first_occurrence() {
    let policy = ResolutionPolicy::Manual(BTreeMap::new());

    let report = AssessmentPipeline::default()
        .run(&chiller_documents(), "EAc6", &policy, UnitSystem::Imperial)
        .expect("pipeline runs");

    assert_eq!(report.consolidation.source_of("GWP"), Some("Mechanical Schedule"));
    assert_eq!(
        report.consolidation.resolution_log[0].method,
        ResolutionMethod::FirstOccurrence
    );
    assert_eq!(report.consolidation.unresolved_conflicts().count(), 0);
    assert!(report.assessment.awarded);
}

#[test]
fn manual_choice_outside_candidates_keeps_first_value_unresolved() {
    let policy = ResolutionPolicy::Manual(BTreeMap::from([(
        "GWP".to_string(),
        "Commissioning Letter".to_string(),
    )]));

    let report = AssessmentPipeline::default()
        .run(&chiller_documents(), "EAc6", &policy, UnitSystem::Imperial)
        .expect("pipeline runs");

    assert_eq!(
        report.consolidation.parameters["GWP"],
        ParameterValue::Number(675.0)
    );
    assert_eq!(report.consolidation.unresolved_conflicts().count(), 1);
    let conflicts = report
        .recommendations
        .iter()
        .find(|recommendation| recommendation.kind == RecommendationKind::DataConflicts)
        .expect("conflict advice");
    assert!(conflicts.action.contains("1 unresolved"));
}

#[test]
fn unknown_credit_is_an_error() {
    let pipeline = AssessmentPipeline::default();

    match pipeline.run(
        &chiller_documents(),
        "XXc1",
        &ResolutionPolicy::Latest,
        UnitSystem::Imperial,
    ) {
        Err(AssessmentError::Catalog(_)) => {}
        other => panic!("expected catalog error, got {other:?}"),
    }
}

#[test]
fn missing_document_lookup_fails() {
    let documents = chiller_documents();

    assert!(documents.require("Mechanical Schedule").is_ok());
    match documents.require("Site Survey") {
        Err(AssessmentError::UnknownDocument(label)) => assert_eq!(label, "Site Survey"),
        other => panic!("expected unknown document, got {other:?}"),
    }
}

#[test]
fn json_documents_run_through_thermal_comfort() {
    let json = r#"{
        "Mechanical Drawings": {
            "EQc5": {
                "declaredParameters": ["ASHRAE 55 Compliance", "Design Conditions"],
                "values": {"ASHRAE 55 Compliance": "Yes", "Design Conditions": "72F / 50% RH"}
            }
        },
        "Controls Submittal": {
            "EQc5": {
                "declaredParameters": [
                    "Total Individual Spaces",
                    "Controlled Spaces",
                    "Multi-Occupant Controls"
                ],
                "values": {
                    "Total Individual Spaces": 200,
                    "Controlled Spaces": "120",
                    "Multi-Occupant Controls": "yes"
                }
            }
        },
        "Lighting Narrative": {
            "SSc6": {"declaredParameters": ["Uplight"], "values": {"Uplight": 2}}
        }
    }"#;

    let (documents, errors) = read_documents_json(Cursor::new(json)).expect("documents parse");
    assert!(errors.is_empty());

    let report = AssessmentPipeline::default()
        .run(&documents, "EQc5", &ResolutionPolicy::priority(), UnitSystem::Metric)
        .expect("pipeline runs");

    assert_eq!(report.consolidation.documents_processed.len(), 2);
    assert!(report.consolidation.conflicts.is_empty());
    assert!(report.assessment.awarded);
    assert_eq!(report.assessment.option, None);
    assert_eq!(report.unit_system, UnitSystem::Metric);
}

#[test]
fn report_serializes_for_callers() {
    let report = AssessmentPipeline::default()
        .run(
            &chiller_documents(),
            "EAc6",
            &ResolutionPolicy::priority(),
            UnitSystem::Imperial,
        )
        .expect("pipeline runs");

    let json = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(json["unit_system"], "IP");
    assert_eq!(json["assessment"]["status"], "compliant");
    assert_eq!(json["consolidation"]["resolution_log"][0]["method"], "priority-based");
    assert_eq!(json["recommendations"][1]["type"], "success");
}
