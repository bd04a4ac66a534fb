use archmodel_core::{Element, Model, PropertyValue, ReferenceRegistry};

/// Create an element with a `name` property
#[allow(dead_code)]
pub fn element(id: &str, element_type: &str, layer: &str, name: &str) -> Element {
    Element::new(id, element_type, layer).with_property("name", name)
}

/// Create an element whose only property is a `uses` reference list
#[allow(dead_code)]
pub fn user_of(id: &str, targets: &[&str]) -> Element {
    Element::new(id, "service", "application").with_property(
        "uses",
        PropertyValue::StringList(targets.iter().map(|t| t.to_string()).collect()),
    )
}

/// Build a model from elements and register all of them
#[allow(dead_code)]
pub fn registered(elements: Vec<Element>) -> (Model, ReferenceRegistry) {
    let model = Model::from_elements(elements);
    let mut registry = ReferenceRegistry::new();
    registry.register_model(&model);
    (model, registry)
}

/// Chain `a -> b -> c -> d` over `uses`
#[allow(dead_code)]
pub fn chain_model() -> Model {
    Model::from_elements(vec![
        user_of("a", &["b"]),
        user_of("b", &["c"]),
        user_of("c", &["d"]),
        Element::new("d", "table", "datastore"),
    ])
}

/// Diamond `a -> {b, c} -> d`
#[allow(dead_code)]
pub fn diamond_model() -> Model {
    Model::from_elements(vec![
        user_of("a", &["b", "c"]),
        user_of("b", &["d"]),
        user_of("c", &["d"]),
        Element::new("d", "table", "datastore"),
    ])
}

/// The business service used across projection tests
#[allow(dead_code)]
pub fn customer_management() -> Element {
    element(
        "business.service.customer-management",
        "service",
        "business",
        "Customer Management",
    )
    .with_property("criticality", "high")
    .with_property("owner", "crm-team")
}

/// Rule file projecting business services into application services
#[allow(dead_code)]
pub const SERVICE_RULES: &str = r#"
projections:
  - name: business-service-to-application-service
    from: business.service
    to: application.service
    conditions:
      - { field: properties.criticality, operator: in, value: [high, critical] }
    rules:
      - create_type: service
        name_template: "{source.name} Service"
        create_bidirectional: true
        properties:
          owner: { source: properties.owner, default: platform-team }
          code: { source: name, transform: kebab, required: true }
          label: { source: name, transform: { type: prefix, value: "svc-" } }
"#;
