//! Projection and dependency analysis demonstration
//!
//! Loads the bundled rule file, projects a small business layer into the
//! application layer, then inspects the resulting reference graph.

use archmodel_core::logging_facility::{init, Profile};
use archmodel_core::{
    DependencyTracker, Element, Model, ProjectionEngine, ReferenceRegistry, TraceDirection,
};

const RULES: &str = include_str!("../rules/default_projections.yaml");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    println!("=== ArchModel Projection Demo ===\n");

    let mut model = Model::from_elements(vec![
        Element::new("business.service.customer-management", "service", "business")
            .with_property("name", "Customer Management")
            .with_property("owner", "crm-team"),
        Element::new("business.service.billing", "service", "business")
            .with_property("name", "Billing"),
        Element::new("motivation.requirement.gdpr", "requirement", "motivation")
            .with_property("name", "GDPR Erasure"),
    ]);
    let mut registry = ReferenceRegistry::new();
    registry.register_model(&model);

    let engine = ProjectionEngine::from_yaml_str(RULES)?;
    for summary in engine.rule_summaries() {
        println!("rule {:<45} {} -> {}", summary.name, summary.from, summary.to);
    }

    let report = engine.project_all(&mut model, &mut registry, None, None, false)?;
    println!("\nprojected {} element(s):", report.projected.len());
    for element in &report.projected {
        println!("  + {} ({})", element.id, element.name());
    }
    for skipped in &report.skipped {
        println!("  ! {} via {}: {}", skipped.source_id, skipped.rule, skipped.error);
    }

    let tracker = DependencyTracker::with_registry(&model, &registry);
    println!("\ndependents of business.service.customer-management:");
    for id in tracker.trace_dependencies(
        "business.service.customer-management",
        TraceDirection::Down,
        None,
    ) {
        println!("  <- {}", id);
    }

    println!("\norphans: {:?}", tracker.orphaned_elements());
    println!("cycles:  {:?}", registry.find_circular_dependencies());
    Ok(())
}
