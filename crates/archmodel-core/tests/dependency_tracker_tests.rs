#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use archmodel_core::config::AnalysisConfig;
use archmodel_core::traversal::UNKNOWN_LAYER;
use archmodel_core::{DependencyTracker, Element, Model, TraceDirection};
use common::{chain_model, diamond_model, element, registered, user_of};
use std::collections::BTreeSet;

fn ids(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_trace_up_follows_dependencies() {
    let model = chain_model();
    let tracker = DependencyTracker::new(&model);

    assert_eq!(
        tracker.trace_dependencies("a", TraceDirection::Up, None),
        ids(&["b", "c", "d"])
    );
    assert_eq!(
        tracker.trace_dependencies("a", TraceDirection::Up, Some(2)),
        ids(&["b", "c"])
    );
    assert!(tracker
        .trace_dependencies("d", TraceDirection::Up, None)
        .is_empty());
}

#[test]
fn test_trace_down_follows_dependents() {
    let model = chain_model();
    let tracker = DependencyTracker::new(&model);

    assert_eq!(
        tracker.trace_dependencies("d", TraceDirection::Down, None),
        ids(&["a", "b", "c"])
    );
    assert_eq!(
        tracker.trace_dependencies("d", TraceDirection::Down, Some(1)),
        ids(&["c"])
    );
}

#[test]
fn test_trace_both_is_union() {
    let model = chain_model();
    let tracker = DependencyTracker::new(&model);

    assert_eq!(
        tracker.trace_dependencies("b", TraceDirection::Both, None),
        ids(&["a", "c", "d"])
    );
}

#[test]
fn test_trace_excludes_start_on_cycle() {
    let model = Model::from_elements(vec![user_of("a", &["b"]), user_of("b", &["a"])]);
    let tracker = DependencyTracker::new(&model);

    assert_eq!(
        tracker.trace_dependencies("a", TraceDirection::Up, None),
        ids(&["b"])
    );
}

#[test]
fn test_diamond_paths() {
    let model = diamond_model();
    let tracker = DependencyTracker::new(&model);

    let paths = tracker.find_dependency_paths("a", "d", None);
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[0].path, vec!["a", "b", "d"]);
    assert_eq!(paths[1].path, vec!["a", "c", "d"]);
    for path in &paths {
        assert_eq!(path.depth, 2);
        assert_eq!(path.source, "a");
        assert_eq!(path.target, "d");
        assert_eq!(path.relationship_types, vec!["usage", "usage"]);
    }

    assert_eq!(tracker.find_dependency_paths("a", "d", Some(1)).len(), 1);
}

#[test]
fn test_paths_degrade_to_empty() {
    let model = diamond_model();
    let tracker = DependencyTracker::new(&model);

    assert!(tracker.find_dependency_paths("d", "a", None).is_empty());
    assert!(tracker.find_dependency_paths("a", "a", None).is_empty());
    assert!(tracker.find_dependency_paths("a", "nowhere", None).is_empty());
}

#[test]
fn test_path_limit_comes_from_config() {
    // a fans out to 5 middles, each reaching z
    let mut elements = vec![user_of("a", &["m1", "m2", "m3", "m4", "m5"])];
    for m in ["m1", "m2", "m3", "m4", "m5"] {
        elements.push(user_of(m, &["z"]));
    }
    let model = Model::from_elements(elements);
    let config = AnalysisConfig {
        max_paths: 3,
        ..AnalysisConfig::default()
    };
    let tracker = DependencyTracker::new(&model).with_config(config);

    assert_eq!(tracker.find_dependency_paths("a", "z", None).len(), 3);
    assert_eq!(tracker.find_dependency_paths("a", "z", Some(10)).len(), 5);
}

#[test]
fn test_dependency_layers_groups_unknown_ids() {
    let model = Model::from_elements(vec![
        element("application.service.crm", "service", "application", "CRM")
            .with_property("realizes", "business.service.crm")
            .with_property("uses", "technology.node.missing"),
        element("business.service.crm", "service", "business", "CRM"),
        element("ux.view.customers", "view", "ux", "Customers")
            .with_property("uses", "application.service.crm"),
    ]);
    let tracker = DependencyTracker::new(&model);

    let layers = tracker.dependency_layers("application.service.crm");
    assert_eq!(layers.len(), 3);
    assert_eq!(layers["business"], ids(&["business.service.crm"]));
    assert_eq!(layers["ux"], ids(&["ux.view.customers"]));
    assert_eq!(layers[UNKNOWN_LAYER], ids(&["technology.node.missing"]));
    assert!(!layers.contains_key("application"));
}

#[test]
fn test_orphaned_elements() {
    let model = Model::from_elements(vec![
        user_of("a", &["b"]),
        Element::new("b", "table", "datastore"),
        Element::new("loner", "goal", "motivation"),
        Element::new("another", "view", "ux"),
    ]);
    let tracker = DependencyTracker::new(&model);

    assert_eq!(tracker.orphaned_elements(), vec!["another", "loner"]);
}

#[test]
fn test_hub_elements_sorted_by_degree() {
    let mut elements = Vec::new();
    for (hub, fan_in) in [("hub-15", 15), ("hub-12", 12), ("hub-5", 5)] {
        elements.push(Element::new(hub, "service", "application"));
        for i in 0..fan_in {
            elements.push(user_of(&format!("{}-user-{}", hub, i), &[hub]));
        }
    }
    let model = Model::from_elements(elements);
    let tracker = DependencyTracker::new(&model);

    let hubs = tracker.hub_elements(Some(10));
    assert_eq!(
        hubs,
        vec![("hub-15".to_string(), 15), ("hub-12".to_string(), 12)]
    );

    assert_eq!(tracker.hub_elements(None), hubs);
    assert_eq!(tracker.hub_elements(Some(5)).len(), 3);
}

#[test]
fn test_hub_ties_break_by_id() {
    let model = Model::from_elements(vec![
        user_of("x", &["beta", "alpha"]),
        user_of("y", &["beta", "alpha"]),
    ]);
    let tracker = DependencyTracker::new(&model);

    let hubs = tracker.hub_elements(Some(2));
    assert_eq!(
        hubs,
        vec![
            ("alpha".to_string(), 2),
            ("beta".to_string(), 2),
            ("x".to_string(), 2),
            ("y".to_string(), 2),
        ]
    );
}

#[test]
fn test_tracker_from_shared_registry() {
    let (model, registry) = registered(vec![user_of("a", &["b"]), user_of("b", &[])]);
    let tracker = DependencyTracker::with_registry(&model, &registry);

    assert_eq!(tracker.graph().edge_count(), registry.len());
    assert_eq!(
        tracker.trace_dependencies("b", TraceDirection::Down, None),
        ids(&["a"])
    );
}

#[test]
fn test_config_scan_depth_reaches_the_registry() {
    let mut meta = archmodel_core::Properties::new();
    meta.insert("ownerRef".to_string(), "business.actor.crm-team".into());
    let model = Model::from_elements(vec![
        Element::new("application.service.crm", "service", "application").with_property("meta", meta),
        Element::new("business.actor.crm-team", "actor", "business"),
    ]);

    let shallow = AnalysisConfig {
        reference_scan_depth: 0,
        ..AnalysisConfig::default()
    };
    let tracker = DependencyTracker::new_with_config(&model, shallow);
    assert_eq!(tracker.graph().edge_count(), 0);
    assert_eq!(tracker.orphaned_elements().len(), 2);

    let tracker = DependencyTracker::new(&model);
    assert_eq!(tracker.graph().edge_count(), 1);
    assert_eq!(
        tracker.trace_dependencies("application.service.crm", TraceDirection::Up, None),
        ids(&["business.actor.crm-team"])
    );
}
