#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use archmodel_core::config::AnalysisConfig;
use archmodel_core::model::Properties;
use archmodel_core::references::{
    Cardinality, DefinitionViolation, ReferenceDefinition, ReferenceDefinitionCatalog,
};
use archmodel_core::{Element, Model, PropertyValue, ReferenceRegistry};
use common::{element, registered, user_of};
use serde_json::json;
use std::collections::{BTreeSet, HashSet};

fn props(value: serde_json::Value) -> Properties {
    match PropertyValue::from(value) {
        PropertyValue::Map(map) => map,
        other => panic!("expected map, got {:?}", other),
    }
}

#[test]
fn test_known_properties_are_extracted_with_types() {
    let mut registry = ReferenceRegistry::new();
    let app = Element::new("application.service.crm", "service", "application")
        .with_property("realizes", "business.service.crm")
        .with_property("accesses", vec!["data-model.schema.customer", "data-model.schema.order"])
        .with_property("description", "not a reference");

    assert_eq!(registry.register_element(&app), 3);

    let outgoing = registry.references_from("application.service.crm");
    assert_eq!(outgoing.len(), 3);
    assert!(outgoing.iter().all(|r| r.source == "application.service.crm"));

    let realization = registry.references_by_type("realization");
    assert_eq!(realization.len(), 1);
    assert_eq!(realization[0].target, "business.service.crm");
    assert_eq!(realization[0].property, "realizes");
    assert_eq!(registry.references_by_type("access").len(), 2);
}

#[test]
fn test_nested_suffix_properties_record_dot_paths() {
    let mut registry = ReferenceRegistry::new();
    let mut operation = Element::new("api.operation.get-customer", "operation", "api");
    operation.properties = props(json!({
        "name": "Get Customer",
        "response": {"body": {"schemaRef": "data-model.schema.customer"}},
        "policyReference": "security.policy.read",
        "tags": ["read"]
    }));

    registry.register_element(&operation);

    let paths: BTreeSet<&str> = registry
        .references_from("api.operation.get-customer")
        .iter()
        .map(|r| r.property.as_str())
        .collect();
    assert_eq!(
        paths,
        BTreeSet::from(["policyReference", "response.body.schemaRef"])
    );
    assert_eq!(
        registry.references_to("data-model.schema.customer")[0].reference_type,
        "schema"
    );
    assert_eq!(
        registry.references_to("security.policy.read")[0].reference_type,
        "association"
    );
}

#[test]
fn test_known_name_below_top_level_is_not_a_reference() {
    let mut registry = ReferenceRegistry::new();
    let mut element = Element::new("x", "service", "application");
    element.properties = props(json!({"metadata": {"uses": "y"}}));

    assert_eq!(registry.register_element(&element), 0);
}

#[test]
fn test_registering_twice_duplicates_references() {
    let mut registry = ReferenceRegistry::new();
    let element = user_of("a", &["b"]);

    registry.register_element(&element);
    registry.register_element(&element);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.references_to("b").len(), 2);
    assert_eq!(registry.dependency_graph().in_degree("b"), 2);
}

#[test]
fn test_empty_lookups_return_empty_slices() {
    let registry = ReferenceRegistry::new();
    assert!(registry.references_from("nobody").is_empty());
    assert!(registry.references_to("nobody").is_empty());
    assert!(registry.references_by_type("realization").is_empty());
    assert!(registry.is_empty());
}

#[test]
fn test_broken_references() {
    let (model, registry) = registered(vec![user_of("a", &["b", "ghost"]), user_of("b", &[])]);

    let broken = registry.find_broken_references(&model.ids());
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].target, "ghost");

    let everything: HashSet<String> = ["a", "b", "ghost"].iter().map(|s| s.to_string()).collect();
    assert!(registry.find_broken_references(&everything).is_empty());
}

#[test]
fn test_circular_dependencies() {
    let (_, registry) = registered(vec![
        user_of("a", &["b"]),
        user_of("b", &["c"]),
        user_of("c", &["a"]),
        user_of("self", &["self"]),
        user_of("tail", &["a"]),
    ]);

    let cycles = registry.find_circular_dependencies();
    assert_eq!(cycles.len(), 2);
    assert!(cycles.contains(&vec!["a".to_string(), "b".to_string(), "c".to_string()]));
    assert!(cycles.contains(&vec!["self".to_string()]));
}

#[test]
fn test_acyclic_registry_has_no_cycles() {
    let (_, registry) = registered(vec![user_of("a", &["b", "c"]), user_of("b", &["c"])]);
    assert!(registry.find_circular_dependencies().is_empty());
}

#[test]
fn test_impact_analysis_follows_incoming_references() {
    // d <- c <- b <- a, and e -> c
    let (_, registry) = registered(vec![
        user_of("a", &["b"]),
        user_of("b", &["c"]),
        user_of("c", &["d"]),
        user_of("e", &["c"]),
    ]);

    let all = registry.impact_analysis("d", None);
    assert_eq!(all, BTreeSet::from(["a", "b", "c", "e"].map(String::from)));

    let near = registry.impact_analysis("d", Some(2));
    assert_eq!(near, BTreeSet::from(["b", "c", "e"].map(String::from)));

    assert!(registry.impact_analysis("d", Some(0)).is_empty());
    assert!(registry.impact_analysis("unknown", None).is_empty());
}

#[test]
fn test_impact_analysis_defaults_to_configured_depth() {
    let config = AnalysisConfig {
        impact_max_depth: Some(1),
        ..AnalysisConfig::default()
    };
    let mut registry = ReferenceRegistry::from_config(&config);
    registry.register_model(&Model::from_elements(vec![
        user_of("a", &["b"]),
        user_of("b", &["c"]),
        user_of("c", &["d"]),
    ]));

    assert_eq!(registry.impact_analysis("d", None), BTreeSet::from(["c".to_string()]));
    assert_eq!(
        registry.impact_analysis("d", Some(3)),
        BTreeSet::from(["a", "b", "c"].map(String::from))
    );
}

#[test]
fn test_impact_analysis_excludes_self_on_cycle() {
    let (_, registry) = registered(vec![user_of("a", &["b"]), user_of("b", &["a"])]);
    assert_eq!(
        registry.impact_analysis("a", None),
        BTreeSet::from(["b".to_string()])
    );
}

#[test]
fn test_statistics() {
    let (_, registry) = registered(vec![
        user_of("a", &["b", "c"]),
        Element::new("x", "service", "application").with_property("realizes", "b"),
    ]);

    let stats = registry.statistics();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.by_type.get("usage"), Some(&2));
    assert_eq!(stats.by_type.get("realization"), Some(&1));
    assert_eq!(stats.distinct_sources, 2);
    assert_eq!(stats.distinct_targets, 2);
}

#[test]
fn test_definition_violations() {
    let model = Model::from_elements(vec![
        element("application.service.crm", "service", "application", "CRM")
            .with_property("realizes", "business.process.onboard"),
        element("business.process.onboard", "process", "business", "Onboard"),
        element("datastore.table.customer", "table", "datastore", "Customer")
            .with_property("schemaRef", vec!["data-model.schema.a", "data-model.schema.b"]),
        element("data-model.schema.a", "schema", "data-model", "A"),
        element("data-model.schema.b", "schema", "data-model", "B"),
    ]);
    let mut catalog = ReferenceDefinitionCatalog::builtin();
    catalog.add(ReferenceDefinition {
        layer: "business".to_string(),
        element_type: Some("process".to_string()),
        property_path: "assignedTo".to_string(),
        target_layer: "business".to_string(),
        target_type: Some("actor".to_string()),
        reference_type: "assignment".to_string(),
        required: true,
        cardinality: Cardinality::One,
    });
    let mut registry = ReferenceRegistry::new().with_definitions(catalog);
    registry.register_model(&model);

    let violations = registry.find_definition_violations(&model);

    assert!(violations.iter().any(|v| matches!(
        v,
        DefinitionViolation::WrongTargetType { expected, actual, .. }
            if expected == "service" && actual == "process"
    )));
    assert!(violations.iter().any(|v| matches!(
        v,
        DefinitionViolation::TooManyTargets { element_id, count: 2, .. }
            if element_id == "datastore.table.customer"
    )));
    assert!(violations.iter().any(|v| matches!(
        v,
        DefinitionViolation::MissingRequired { element_id, property_path }
            if element_id == "business.process.onboard" && property_path == "assignedTo"
    )));
    assert_eq!(violations.len(), 3);
}
