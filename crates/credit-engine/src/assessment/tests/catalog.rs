use super::common::*;
use crate::assessment::catalog::{
    CalculationKind, CatalogError, CreditCatalog, GroupStrategy, Requirement, RequirementGroup,
};
use std::io::Cursor;

#[test]
fn standard_catalog_defines_known_credits() {
    let catalog = catalog();

    let ids: Vec<_> = catalog.credits().map(|credit| credit.id.as_str()).collect();
    assert_eq!(ids, ["EAc2", "EAc6", "EQc5", "WEc2"]);

    let refrigerant = catalog.get("EAc6").expect("EAc6 defined");
    assert_eq!(refrigerant.strategy, GroupStrategy::Option);
    assert_eq!(refrigerant.groups.len(), 2);
    assert!(refrigerant.recognizes("Leakage Rate"));
    assert!(!refrigerant.recognizes("Design Conditions"));

    assert_eq!(catalog.get("EQc5").expect("EQc5").strategy, GroupStrategy::Parts);
    assert_eq!(catalog.get("EAc2").expect("EAc2").max_points, 18);
}

#[test]
fn unknown_credit_is_reported() {
    match catalog().get("MRc9") {
        Err(CatalogError::UnknownCredit(id)) => assert_eq!(id, "MRc9"),
        other => panic!("expected unknown credit, got {other:?}"),
    }
}

#[test]
fn with_credit_leaves_existing_snapshot_untouched() {
    let original = catalog();
    let mut revised = definition("EAc6");
    revised.name = "Refrigerant Management (revised)".to_string();
    revised.max_points = 2;

    let updated = original.with_credit(revised).expect("valid definition");

    assert_eq!(original.get("EAc6").expect("EAc6").max_points, 1);
    assert_eq!(updated.get("EAc6").expect("EAc6").max_points, 2);
    assert_eq!(updated.len(), original.len());
}

#[test]
fn with_credit_rejects_wrong_calculation_arity() {
    let mut broken = definition("EQc5");
    broken.groups[1].requirements[0] = Requirement::calculate(
        CalculationKind::ThermalControl {
            minimum_percentage: 50.0,
        },
        &["Controlled Spaces"],
    );

    match catalog().with_credit(broken) {
        Err(CatalogError::Invalid { credit, reason }) => {
            assert_eq!(credit, "EQc5");
            assert!(reason.contains("expects 2 parameters, found 1"));
        }
        other => panic!("expected invalid definition, got {other:?}"),
    }
}

#[test]
fn definitions_load_from_json() {
    let json = r#"[
        {
            "id": "SSc6",
            "name": "Light Pollution Reduction",
            "max_points": 1,
            "parameters": ["Exterior Lighting Plan", "Uplight Rating"],
            "strategy": "option",
            "groups": [
                {
                    "label": "Backlight-uplight-glare method",
                    "requirements": [
                        { "type": "presence", "parameter": "Exterior Lighting Plan" },
                        { "type": "less_than", "parameter": "Uplight Rating", "limit": 3 }
                    ]
                }
            ]
        }
    ]"#;

    let catalog = CreditCatalog::from_reader(Cursor::new(json)).expect("catalog parses");

    assert_eq!(catalog.len(), 1);
    let credit = catalog.get("SSc6").expect("SSc6");
    assert_eq!(
        credit.groups[0].requirements[1],
        Requirement::less_than("Uplight Rating", 3.0)
    );
}

#[test]
fn duplicate_ids_are_rejected() {
    let definition = definition("WEc2");

    match CreditCatalog::from_definitions(vec![definition.clone(), definition]) {
        Err(CatalogError::Invalid { reason, .. }) => assert_eq!(reason, "duplicate credit id"),
        other => panic!("expected duplicate rejection, got {other:?}"),
    }
}

#[test]
fn empty_groups_are_rejected() {
    let mut definition = definition("WEc2");
    definition.groups.push(RequirementGroup {
        label: "Empty".to_string(),
        requirements: Vec::new(),
    });

    assert!(matches!(
        CreditCatalog::from_definitions(vec![definition]),
        Err(CatalogError::Invalid { .. })
    ));
}

#[test]
fn malformed_json_is_a_parse_error() {
    match CreditCatalog::from_reader(Cursor::new("[{\"id\": 7}]")) {
        Err(CatalogError::Parse(_)) => {}
        other => panic!("expected parse error, got {other:?}"),
    }
}
